//! Traversal of one top-level action and its branch subtree.
//!
//! Each action moves through
//! `Pending → Evaluating → {Skipped | Executing} → {Succeeded | Failed} → Branching → Done`.
//! A subtree is always walked sequentially: an action's selected branch list
//! runs in declared order, each child's own subtree completing before the
//! next sibling starts. The walk uses an explicit stack so nesting depth
//! never grows the call stack.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    BeaconflowError, Result, bof,
    common::{ParamValue, Parameters},
    runtime::{ActionResult, ErrorKind, ExecutionContext, SkippedAction},
    workflow::{
        Workflow, condition,
        edge::Branch,
        node::{ActionId, ActionNode, ActionState},
        template,
    },
};

/// How a top-level action ended, plus what its subtree skipped.
#[derive(Debug, Clone)]
pub(crate) struct TreeOutcome {
    /// name of the top-level action
    pub name: String,
    /// `Skipped`, `Succeeded` or `Failed`
    pub state: ActionState,
    pub error: Option<String>,
    /// the top-level action has children in the branch its outcome selected
    pub has_branch: bool,
    /// skipped actions in visit order
    pub skipped: Vec<SkippedAction>,
}

impl TreeOutcome {
    /// A failed top-level action with no `on_failure` list fails the run.
    pub fn is_unabsorbed_failure(&self) -> bool {
        self.state == ActionState::Failed && !self.has_branch
    }
}

/// Walks the subtree under `root`, recording results into `slot`.
pub(crate) async fn run_tree(
    ctx: &ExecutionContext,
    workflow: &Workflow,
    root: ActionId,
    slot: usize,
) -> TreeOutcome {
    let mut outcome = TreeOutcome {
        name: workflow.get(root).map(|n| n.name.clone()).unwrap_or_default(),
        state: ActionState::Pending,
        error: None,
        has_branch: false,
        skipped: Vec::new(),
    };

    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some(node) = workflow.get(id) else {
            continue;
        };

        let (state, error) = step(ctx, node, slot).await;
        if state == ActionState::Skipped {
            outcome.skipped.push(SkippedAction {
                name: node.name.clone(),
                error: error.clone(),
            });
        }

        let branch = match state {
            ActionState::Succeeded => Branch::OnSuccess,
            _ => Branch::OnFailure,
        };
        let children = workflow.children(id, branch);
        debug!(action = %node.name, state = %ActionState::Branching, branch = %branch, children = children.len());

        if id == root {
            outcome.state = state;
            outcome.error = error;
            outcome.has_branch = !children.is_empty();
        }

        stack.extend(children.into_iter().rev());
        debug!(action = %node.name, state = %ActionState::Done);
    }

    outcome
}

/// Evaluates and, when eligible, executes one action. Returns its terminal
/// state and the error message, if any.
async fn step(
    ctx: &ExecutionContext,
    node: &ActionNode,
    slot: usize,
) -> (ActionState, Option<String>) {
    debug!(action = %node.name, state = %ActionState::Evaluating, conditions = node.conditions.len());

    match condition::evaluate_all(&node.conditions, ctx) {
        Ok(true) => {}
        Ok(false) => {
            debug!(action = %node.name, state = %ActionState::Skipped, "conditions not met");
            return (ActionState::Skipped, None);
        }
        Err(e) => {
            warn!(action = %node.name, state = %ActionState::Skipped, error = %e, "condition rejected");
            return (ActionState::Skipped, Some(e.to_string()));
        }
    }

    let result = execute(ctx, node).await;
    let state = if result.success { ActionState::Succeeded } else { ActionState::Failed };
    let error = result.error.clone();

    ctx.record(slot, result);
    (state, error)
}

async fn execute(
    ctx: &ExecutionContext,
    node: &ActionNode,
) -> ActionResult {
    let start_time = Utc::now();
    let clock = Instant::now();
    let timeout = node.timeout.unwrap_or(ctx.default_timeout());

    info!(action = %node.name, kind = %node.action_type, state = %ActionState::Executing, timeout_secs = timeout.as_secs_f64());

    let parameters = match assemble_parameters(ctx, node) {
        Ok(parameters) => parameters,
        Err((kind, e)) => {
            warn!(action = %node.name, error = %e, "parameter assembly failed");
            return finish(node, start_time, clock, false, String::new(), Some((kind, e)));
        }
    };

    // Dropping the call future on elapse cancels the in-flight request.
    let call = ctx.client().execute_action(ctx.beacon_id(), &node.action_type, &parameters);
    let result = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(remote)) if remote.success => finish(node, start_time, clock, true, remote.output, None),
        Ok(Ok(remote)) => {
            let e = BeaconflowError::RemoteCall("remote task reported failure".to_string());
            finish(node, start_time, clock, false, remote.output, Some((ErrorKind::Remote, e)))
        }
        Ok(Err(e)) => {
            let e = match e {
                BeaconflowError::RemoteCall(_) => e,
                other => BeaconflowError::RemoteCall(other.to_string()),
            };
            finish(node, start_time, clock, false, String::new(), Some((ErrorKind::Remote, e)))
        }
        Err(_) => {
            warn!(action = %node.name, timeout_secs = timeout.as_secs_f64(), "action timed out, call cancelled");
            finish(node, start_time, clock, false, String::new(), Some((ErrorKind::Timeout, BeaconflowError::Timeout(timeout))))
        }
    };

    if result.success {
        info!(action = %node.name, state = %ActionState::Succeeded, duration_ms = result.duration.as_millis() as u64);
    } else {
        info!(action = %node.name, state = %ActionState::Failed, duration_ms = result.duration.as_millis() as u64, error = result.error.as_deref().unwrap_or_default());
    }

    result
}

/// Resolves templates and packs BOF argument lists into byte buffers.
fn assemble_parameters(
    ctx: &ExecutionContext,
    node: &ActionNode,
) -> std::result::Result<Parameters, (ErrorKind, BeaconflowError)> {
    let mut parameters = Parameters::new();

    for (key, value) in &node.parameters {
        let value = template::resolve_value(ctx, value).map_err(|e| (ErrorKind::Template, e))?;
        let value = match value {
            ParamValue::Args(args) => {
                let packed: Result<Vec<u8>> = bof::pack(&args);
                ParamValue::Bytes(packed.map_err(|e| (ErrorKind::Packing, e))?)
            }
            other => other,
        };
        parameters.insert(key.clone(), value);
    }

    Ok(parameters)
}

fn finish(
    node: &ActionNode,
    start_time: chrono::DateTime<Utc>,
    clock: Instant,
    success: bool,
    output: String,
    error: Option<(ErrorKind, BeaconflowError)>,
) -> ActionResult {
    let (error_kind, error) = match error {
        Some((kind, e)) => (Some(kind), Some(e.to_string())),
        None => (None, None),
    };

    ActionResult {
        name: node.name.clone(),
        action_type: node.action_type.clone(),
        start_time,
        end_time: Utc::now(),
        duration: clock.elapsed(),
        success,
        output,
        error,
        error_kind,
    }
}
