//! The seam to the command-and-control server.
//!
//! The engine never talks to the server itself. It is handed a client that
//! is already authenticated and calls [`RemoteClient::execute_action`] once
//! per executed action, possibly from several tasks at the same time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, common::Parameters};

/// What the server reported for one operation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteOutput {
    /// console output collected for the task
    pub output: String,
    /// whether the server considers the task successful
    pub success: bool,
}

impl RemoteOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: false,
        }
    }
}

#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Runs one operation on the beacon and waits for its output.
    ///
    /// # Arguments
    ///
    /// * `beacon_id` - The target beacon.
    /// * `action_type` - The operation kind tag from the workflow (`shell`, `bof`, ...).
    /// * `parameters` - Assembled parameters; BOF argument lists are already
    ///   packed into [`crate::ParamValue::Bytes`].
    ///
    /// # Cancellation
    ///
    /// The engine drops the returned future when the action timeout elapses.
    /// Implementations must not rely on being polled to completion.
    async fn execute_action(
        &self,
        beacon_id: &str,
        action_type: &str,
        parameters: &Parameters,
    ) -> Result<RemoteOutput>;
}
