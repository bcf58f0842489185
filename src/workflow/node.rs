use std::time::Duration;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::{
    common::{ParamValue, Parameters},
    model::{ActionModel, ConditionModel},
};

/// Index of an action inside its workflow arena.
pub type ActionId = NodeIndex;

/// Lifecycle of one action during traversal.
///
/// `Pending → Evaluating → {Skipped | Executing} → {Succeeded | Failed} → Branching → Done`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionState {
    #[default]
    Pending,
    Evaluating,
    Skipped,
    Executing,
    Succeeded,
    Failed,
    Branching,
    Done,
}

/// One remote operation. Its branches live on the graph edges.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionNode {
    /// action name, also the key conditions and templates look results up by
    pub name: String,
    /// remote operation kind, forwarded verbatim to the client
    pub action_type: String,
    pub parameters: Parameters,
    /// AND-combined; empty means always eligible
    pub conditions: Vec<ConditionModel>,
    /// overrides the engine's default task timeout
    pub timeout: Option<Duration>,
}

impl ActionNode {
    pub fn new(
        name: impl Into<String>,
        action_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            action_type: action_type.into(),
            parameters: Parameters::new(),
            conditions: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_condition(
        mut self,
        source: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.conditions.push(ConditionModel {
            source: source.into(),
            operator: operator.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_bof(&self) -> bool {
        self.action_type.eq_ignore_ascii_case("bof") || self.parameters.values().any(ParamValue::is_args)
    }
}

impl From<&ActionModel> for ActionNode {
    fn from(model: &ActionModel) -> Self {
        Self {
            name: model.name.clone(),
            action_type: model.action_type.clone(),
            parameters: model.parameters.clone(),
            conditions: model.conditions.clone(),
            timeout: model.timeout.map(Duration::from_secs),
        }
    }
}
