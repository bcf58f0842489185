use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BeaconflowError, Result, runtime::ActionResult};

/// An action that was not executed.
///
/// `error` is set when a condition could not be evaluated at all (unknown
/// operator, invalid pattern, non-numeric operand) and is `None` when the
/// conditions simply did not hold.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SkippedAction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything a run produced: the full result log, the actions that were
/// skipped, and the terminal error when the run counts as failed.
///
/// The log is complete whether or not `error` is set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: String,
    pub workflow: String,
    pub beacon_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: Duration,
    pub results: Vec<ActionResult>,
    /// actions whose conditions did not hold or were invalid, in visit order
    pub skipped: Vec<SkippedAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<BeaconflowError>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn failed_actions(&self) -> impl Iterator<Item = &ActionResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Skipped actions whose conditions were rejected as invalid.
    pub fn invalid_conditions(&self) -> impl Iterator<Item = &SkippedAction> {
        self.skipped.iter().filter(|s| s.error.is_some())
    }

    /// Splits the report into the `(log, terminal error)` pair.
    pub fn into_parts(self) -> (Vec<ActionResult>, Option<BeaconflowError>) {
        (self.results, self.error)
    }

    /// The log on success, the terminal error otherwise.
    pub fn into_result(self) -> Result<Vec<ActionResult>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.results),
        }
    }
}
