use serde::{Deserialize, Serialize};

/// A condition as written in a workflow document.
///
/// The operator stays a plain string so that an unknown operator surfaces
/// when the condition is evaluated, not when the document is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionModel {
    pub source: String,
    pub operator: String,
    #[serde(default)]
    pub value: String,
}
