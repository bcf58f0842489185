use std::{sync::Arc, time::Duration};

use crate::{
    client::RemoteClient,
    common::{BroadcastQueue, MemCache},
    runtime::{ActionResult, ResultLog},
};

/// Per-run state shared by every branch of the run.
///
/// Each `Engine::execute` builds its own context, so concurrent runs never
/// share a log or a lookup table. Clones of one context do.
#[derive(Clone)]
pub struct ExecutionContext {
    beacon_id: String,
    client: Arc<dyn RemoteClient>,
    timeout: Duration,
    /// latest result per action name
    results: Arc<MemCache<String, ActionResult>>,
    log: Arc<ResultLog>,
    events: Arc<BroadcastQueue<ActionResult>>,
}

impl ExecutionContext {
    pub(crate) fn new(
        beacon_id: String,
        client: Arc<dyn RemoteClient>,
        timeout: Duration,
        capacity: usize,
        log: Arc<ResultLog>,
        events: Arc<BroadcastQueue<ActionResult>>,
    ) -> Self {
        Self {
            beacon_id,
            client,
            timeout,
            results: Arc::new(MemCache::new(capacity)),
            log,
            events,
        }
    }

    pub fn beacon_id(&self) -> &str {
        &self.beacon_id
    }

    pub fn client(&self) -> &Arc<dyn RemoteClient> {
        &self.client
    }

    /// Timeout for actions that do not set their own.
    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    /// Latest result recorded under `name`, if the action has executed.
    pub fn result_of(
        &self,
        name: &str,
    ) -> Option<ActionResult> {
        self.results.get(&name.to_string())
    }

    /// Appends a result to the run log under the slot of its top-level
    /// action, makes it visible to later conditions and publishes it.
    pub fn record(
        &self,
        slot: usize,
        result: ActionResult,
    ) {
        self.results.set(result.name.clone(), result.clone());
        self.log.push(slot, result.clone());
        self.events.send(result);
    }
}
