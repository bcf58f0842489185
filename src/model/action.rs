use serde::{Deserialize, Serialize};

use crate::{common::Parameters, model::ConditionModel};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionModel {
    pub name: String,
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub conditions: Vec<ConditionModel>,
    #[serde(default)]
    pub on_success: Vec<ActionModel>,
    #[serde(default)]
    pub on_failure: Vec<ActionModel>,
    /// timeout in seconds, overrides the engine default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}
