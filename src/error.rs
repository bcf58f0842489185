//! Error types for beaconflow.
//!
//! All errors are represented by the `BeaconflowError` enum. Action-level
//! failures (packing, remote call, timeout) are recorded in the result log and
//! never abort the run; only workflow-level variants surface as a terminal
//! error of `Engine::execute`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all beaconflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum BeaconflowError {
    /// BOF argument carries a type tag the packer does not know.
    #[error("unsupported argument type: {0}")]
    UnsupportedType(String),

    /// BOF argument value cannot be coerced to its declared type.
    #[error("failed to pack {arg_type} argument: {message}")]
    TypeMismatch {
        arg_type: String,
        message: String,
    },

    /// Condition with an unknown operator or an unusable expected value.
    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    /// The remote client reported an error for the call.
    #[error("{0}")]
    RemoteCall(String),

    /// The remote call did not finish within the action timeout.
    #[error("action timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A `{{#action.field#}}` reference in a parameter could not be resolved.
    #[error("{0}")]
    Template(String),

    /// Workflow definition errors (shape, depth, cycles, missing beacon).
    #[error("{0}")]
    Workflow(String),

    /// A top-level action failed with nothing to absorb the failure.
    #[error("action '{action}' failed: {message}")]
    ActionFailed {
        action: String,
        message: String,
    },

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML, hex).
    #[error("{0}")]
    Convert(String),

    /// Engine-level errors (task join failures, logging setup).
    #[error("{0}")]
    Engine(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<std::io::Error> for BeaconflowError {
    fn from(error: std::io::Error) -> Self {
        BeaconflowError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for BeaconflowError {
    fn from(error: serde_json::Error) -> Self {
        BeaconflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for BeaconflowError {
    fn from(error: toml::de::Error) -> Self {
        BeaconflowError::Config(error.to_string())
    }
}

impl From<tokio::task::JoinError> for BeaconflowError {
    fn from(error: tokio::task::JoinError) -> Self {
        BeaconflowError::Engine(format!("action task aborted: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: BeaconflowError = std::io::Error::other("disk full").into();
        assert_eq!(err, BeaconflowError::IoError("disk full".to_string()));

        let err: BeaconflowError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, BeaconflowError::Convert(_)));

        let err: BeaconflowError = toml::from_str::<toml::Table>("= 1").unwrap_err().into();
        assert!(matches!(err, BeaconflowError::Config(_)));
    }

    #[tokio::test]
    async fn test_join_error_is_engine_error() {
        let handle = tokio::spawn(std::future::pending::<()>());
        handle.abort();
        let err: BeaconflowError = handle.await.unwrap_err().into();
        assert!(matches!(err, BeaconflowError::Engine(ref m) if m.starts_with("action task aborted")));
    }
}
