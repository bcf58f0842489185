//! Runtime workflow representation as an arena of actions.
//!
//! The nested `on_success`/`on_failure` lists of a workflow document are
//! flattened into a directed graph (petgraph): every action is a node
//! addressed by index, every branch membership is an edge from parent to
//! child. Holding the forest this way makes the structural limits checkable
//! up front: at most one parent per action, no cycles, bounded depth.

use petgraph::{
    Direction,
    algo::{has_path_connecting, is_cyclic_directed},
    graph::DiGraph,
    visit::EdgeRef,
};

use crate::{
    BeaconflowError, Result,
    model::{ActionModel, WorkflowModel},
    workflow::{
        edge::{Branch, Edge},
        node::{ActionId, ActionNode},
    },
};

/// Nesting limit applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// An immutable, validated action forest plus its run settings.
#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    beacon_id: String,
    parallel: bool,
    graph: DiGraph<ActionNode, Edge>,
    /// top-level actions in declaration order
    roots: Vec<ActionId>,
}

impl Workflow {
    /// create an empty workflow
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            beacon_id: String::new(),
            parallel: false,
            graph: DiGraph::new(),
            roots: Vec::new(),
        }
    }

    /// Builds the arena from a document, rejecting trees nested deeper than
    /// `max_depth` (top-level actions are at depth 1).
    pub fn from_model(
        model: &WorkflowModel,
        max_depth: usize,
    ) -> Result<Self> {
        let mut workflow = Workflow::new(&model.name);
        workflow.beacon_id = model.beacon_id.clone();
        workflow.parallel = model.parallel;

        // (action, parent edge, depth)
        let mut stack: Vec<(&ActionModel, Option<(ActionId, Branch, usize)>, usize)> = Vec::new();
        for action in model.actions.iter().rev() {
            stack.push((action, None, 1));
        }

        // Roots are pushed in reverse, so they pop in declaration order.
        while let Some((action, parent, depth)) = stack.pop() {
            if depth > max_depth {
                return Err(BeaconflowError::Workflow(format!(
                    "action '{}' is nested {} levels deep, limit is {}",
                    action.name, depth, max_depth
                )));
            }

            let id = workflow.add_action(ActionNode::from(action));
            match parent {
                None => workflow.roots.push(id),
                Some((parent_id, branch, order)) => {
                    workflow.graph.add_edge(parent_id, id, Edge { branch, order });
                }
            }

            for (order, child) in action.on_failure.iter().enumerate().rev() {
                stack.push((child, Some((id, Branch::OnFailure, order)), depth + 1));
            }
            for (order, child) in action.on_success.iter().enumerate().rev() {
                stack.push((child, Some((id, Branch::OnSuccess, order)), depth + 1));
            }
        }

        Ok(workflow)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn beacon_id(&self) -> &str {
        &self.beacon_id
    }

    /// Sets the target beacon, for callers that resolve it after loading.
    pub fn set_beacon_id(
        &mut self,
        beacon_id: impl Into<String>,
    ) {
        self.beacon_id = beacon_id.into();
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn set_parallel(
        &mut self,
        parallel: bool,
    ) {
        self.parallel = parallel;
    }

    /// Adds a detached action to the arena. Attach it with [`Workflow::add_root`]
    /// or [`Workflow::add_branch`].
    pub fn add_action(
        &mut self,
        node: ActionNode,
    ) -> ActionId {
        self.graph.add_node(node)
    }

    /// Appends an action to the top-level sequence.
    pub fn add_root(
        &mut self,
        id: ActionId,
    ) -> Result<()> {
        self.ensure_detached(id)?;
        self.roots.push(id);
        Ok(())
    }

    /// Appends `child` to the `branch` list of `parent`.
    ///
    /// Fails if the child already has a place in the forest or if the edge
    /// would close a cycle.
    pub fn add_branch(
        &mut self,
        parent: ActionId,
        branch: Branch,
        child: ActionId,
    ) -> Result<()> {
        if self.graph.node_weight(parent).is_none() {
            return Err(BeaconflowError::Workflow(format!("parent action {} not found", parent.index())));
        }
        self.ensure_detached(child)?;
        if has_path_connecting(&self.graph, child, parent, None) {
            return Err(BeaconflowError::Workflow(format!(
                "attaching '{}' under '{}' would create a cycle",
                self.graph[child].name, self.graph[parent].name
            )));
        }

        let order = self.graph.edges_directed(parent, Direction::Outgoing).filter(|e| e.weight().branch == branch).count();
        self.graph.add_edge(parent, child, Edge { branch, order });
        Ok(())
    }

    fn ensure_detached(
        &self,
        id: ActionId,
    ) -> Result<()> {
        let Some(node) = self.graph.node_weight(id) else {
            return Err(BeaconflowError::Workflow(format!("action {} not found", id.index())));
        };
        if self.roots.contains(&id) || self.parent(id).is_some() {
            return Err(BeaconflowError::Workflow(format!("action '{}' already belongs to a branch list", node.name)));
        }
        Ok(())
    }

    /// Checks the forest invariants: no cycles, at most one parent per
    /// action, top-level actions have no parent, depth within `max_depth`.
    pub fn validate(
        &self,
        max_depth: usize,
    ) -> Result<()> {
        if is_cyclic_directed(&self.graph) {
            return Err(BeaconflowError::Workflow("action tree contains a cycle".to_string()));
        }

        for id in self.graph.node_indices() {
            let parents = self.graph.edges_directed(id, Direction::Incoming).count();
            if parents > 1 {
                return Err(BeaconflowError::Workflow(format!("action '{}' belongs to {} branch lists", self.graph[id].name, parents)));
            }
            if parents == 1 && self.roots.contains(&id) {
                return Err(BeaconflowError::Workflow(format!("top-level action '{}' is also a branch child", self.graph[id].name)));
            }
        }

        let depth = self.depth();
        if depth > max_depth {
            return Err(BeaconflowError::Workflow(format!("action tree is {} levels deep, limit is {}", depth, max_depth)));
        }

        Ok(())
    }

    /// Top-level actions in declaration order.
    pub fn roots(&self) -> &[ActionId] {
        &self.roots
    }

    pub fn get(
        &self,
        id: ActionId,
    ) -> Option<&ActionNode> {
        self.graph.node_weight(id)
    }

    /// Children of `id` in one branch list, in declared order.
    pub fn children(
        &self,
        id: ActionId,
        branch: Branch,
    ) -> Vec<ActionId> {
        let mut edges: Vec<(usize, ActionId)> = self
            .graph
            .edges_directed(id, Direction::Outgoing)
            .filter(|e| e.weight().branch == branch)
            .map(|e| (e.weight().order, e.target()))
            .collect();
        edges.sort_by_key(|(order, _)| *order);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    pub fn has_children(
        &self,
        id: ActionId,
        branch: Branch,
    ) -> bool {
        self.graph.edges_directed(id, Direction::Outgoing).any(|e| e.weight().branch == branch)
    }

    pub fn parent(
        &self,
        id: ActionId,
    ) -> Option<ActionId> {
        self.graph.edges_directed(id, Direction::Incoming).next().map(|e| e.source())
    }

    pub fn action_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Length of the longest root-to-leaf path; 0 for an empty workflow.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        // Bounded by node count: a cycle would otherwise loop forever.
        let mut budget = self.graph.node_count() + 1;
        let mut stack: Vec<(ActionId, usize)> = self.roots.iter().map(|id| (*id, 1)).collect();
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            budget = budget.saturating_sub(1);
            if budget == 0 {
                return usize::MAX;
            }
            for edge in self.graph.edges_directed(id, Direction::Outgoing) {
                stack.push((edge.target(), depth + 1));
            }
        }
        max
    }

    /// Output a human-readable listing of the action tree.
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("=== Workflow: {} ===", self.name));
        lines.push(format!(
            "Beacon: {}",
            if self.beacon_id.is_empty() { "(not set)" } else { self.beacon_id.as_str() }
        ));
        lines.push(format!("Mode: {}", if self.parallel { "parallel" } else { "sequential" }));
        lines.push(format!("Actions: {}", self.action_count()));

        let mut stack: Vec<(ActionId, usize, String)> = Vec::new();
        for (i, id) in self.roots.iter().enumerate().rev() {
            stack.push((*id, 0, format!("[{}]", i + 1)));
        }

        while let Some((id, indent, label)) = stack.pop() {
            let node = &self.graph[id];
            let pad = "    ".repeat(indent);
            let kind = if node.is_bof() { format!("{}, bof", node.action_type) } else { node.action_type.clone() };
            lines.push(format!("{}{} {} ({})", pad, label, node.name, kind));

            for (key, value) in &node.parameters {
                lines.push(format!("{}      - {}: {}", pad, key, value));
            }
            for cond in &node.conditions {
                lines.push(format!("{}      ? {} {} '{}'", pad, cond.source, cond.operator, cond.value));
            }
            if let Some(timeout) = node.timeout {
                lines.push(format!("{}      timeout: {}s", pad, timeout.as_secs()));
            }

            let failure = self.children(id, Branch::OnFailure);
            let success = self.children(id, Branch::OnSuccess);
            for child in failure.into_iter().rev() {
                stack.push((child, indent + 1, "on_failure:".to_string()));
            }
            for child in success.into_iter().rev() {
                stack.push((child, indent + 1, "on_success:".to_string()));
            }
        }

        lines.join("\n")
    }
}

impl TryFrom<&WorkflowModel> for Workflow {
    type Error = BeaconflowError;

    fn try_from(model: &WorkflowModel) -> Result<Self> {
        Workflow::from_model(model, DEFAULT_MAX_DEPTH)
    }
}
