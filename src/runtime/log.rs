use std::sync::RwLock;

use crate::runtime::ActionResult;

/// Ordered log of action results for one run.
///
/// Results are appended to one slot per top-level action. Reading flattens
/// the slots in declaration order, so the log order does not depend on which
/// concurrent branch finished first. All appends go through the write lock.
#[derive(Debug, Default)]
pub struct ResultLog {
    slots: RwLock<Vec<Vec<ActionResult>>>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards previous results and prepares `slots` empty slots.
    pub fn reset(
        &self,
        slots: usize,
    ) {
        let mut guard = self.slots.write().unwrap_or_else(|e| e.into_inner());
        *guard = vec![Vec::new(); slots];
    }

    pub fn push(
        &self,
        slot: usize,
        result: ActionResult,
    ) {
        let mut guard = self.slots.write().unwrap_or_else(|e| e.into_inner());
        if guard.len() <= slot {
            guard.resize_with(slot + 1, Vec::new);
        }
        guard[slot].push(result);
    }

    /// Copy of every result recorded so far, in log order.
    pub fn snapshot(&self) -> Vec<ActionResult> {
        let guard = self.slots.read().unwrap_or_else(|e| e.into_inner());
        guard.iter().flatten().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::result;

    #[test]
    fn test_snapshot_orders_by_slot() {
        let log = ResultLog::new();
        log.reset(2);

        log.push(1, result("b", true));
        log.push(0, result("a", true));
        log.push(1, result("b1", false));
        log.push(0, result("a1", true));

        let names: Vec<String> = log.snapshot().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "a1", "b", "b1"]);

        log.reset(1);
        assert!(log.snapshot().is_empty());
    }
}
