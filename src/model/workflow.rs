use serde::{Deserialize, Serialize};

use crate::{BeaconflowError, Result, model::ActionModel};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowModel {
    pub name: String,
    #[serde(default)]
    pub beacon_id: String,
    #[serde(default)]
    pub parallel: bool,
    pub actions: Vec<ActionModel>,
}

impl WorkflowModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let workflow = serde_json::from_str::<WorkflowModel>(s);
        match workflow {
            Ok(v) => Ok(v),
            Err(e) => Err(BeaconflowError::Workflow(format!("{}", e))),
        }
    }
}
