//! Branch edges between actions.
//!
//! An edge points from a parent action to one child in its `on_success` or
//! `on_failure` list. The `order` field keeps the declared position so that
//! children are visited in document order regardless of how the graph
//! stores its adjacency lists.

use serde::{Deserialize, Serialize};

/// Which outcome of the parent action leads to the child.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Branch {
    OnSuccess,
    OnFailure,
}

/// Runtime edge stored in the workflow graph.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Branch list of the parent this edge belongs to.
    pub branch: Branch,
    /// Position of the child inside that list.
    pub order: usize,
}
