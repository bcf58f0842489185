use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why an executed action failed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// the client returned an error or reported the operation as failed
    Remote,
    /// the call exceeded the action timeout and was cancelled
    Timeout,
    /// BOF arguments could not be packed
    Packing,
    /// a `{{#action.field#}}` reference could not be resolved
    Template,
}

/// Recorded outcome of one executed action.
///
/// Exactly one is produced per action that reaches execution. Skipped
/// actions produce none.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub name: String,
    #[serde(rename = "type")]
    pub action_type: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: Duration,
    pub success: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ActionResult {
    /// Fields a condition source or template can read.
    pub const FIELDS: [&'static str; 6] = ["output", "success", "error", "error_kind", "duration_ms", "type"];

    pub fn field(
        &self,
        field: &str,
    ) -> Option<String> {
        match field {
            "output" => Some(self.output.clone()),
            "success" => Some(self.success.to_string()),
            "error" => Some(self.error.clone().unwrap_or_default()),
            "error_kind" => Some(self.error_kind.map(|k| k.to_string()).unwrap_or_default()),
            "duration_ms" => Some(self.duration.as_millis().to_string()),
            "type" => Some(self.action_type.clone()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.error_kind == Some(ErrorKind::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActionResult {
        let now = Utc::now();
        ActionResult {
            name: "ls".to_string(),
            action_type: "shell".to_string(),
            start_time: now,
            end_time: now,
            duration: Duration::from_millis(1500),
            success: false,
            output: String::new(),
            error: Some("action timed out after 1.5s".to_string()),
            error_kind: Some(ErrorKind::Timeout),
        }
    }

    #[test]
    fn test_fields() {
        let result = sample();
        assert_eq!(result.field("success").as_deref(), Some("false"));
        assert_eq!(result.field("error_kind").as_deref(), Some("timeout"));
        assert_eq!(result.field("duration_ms").as_deref(), Some("1500"));
        assert_eq!(result.field("type").as_deref(), Some("shell"));
        assert_eq!(result.field("pid"), None);
        assert!(result.is_timeout());
    }

    #[test]
    fn test_serialize_skips_empty() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], "shell");
        assert_eq!(value["error_kind"], "timeout");
        assert!(value.get("output").is_none());
    }
}
