//! Workflow engine - the main entry point for beaconflow.
//!
//! The engine runs one workflow at a time against a shared remote client:
//! - Validating the action forest before anything is dispatched
//! - Walking top-level actions in order, or one task each in parallel mode
//! - Collecting the result log in a completion-independent order
//! - Deciding whether the run as a whole failed

use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use chrono::Utc;
use tokio::{sync::broadcast, task::JoinSet};
use tracing::{Instrument, error, info, info_span};

use crate::{
    BeaconflowError, Config,
    client::RemoteClient,
    common::BroadcastQueue,
    runtime::{ActionResult, ExecutionContext, ResultLog, RunReport, TreeOutcome, run_tree},
    utils,
    workflow::Workflow,
};

/// The workflow engine.
///
/// Engine owns the pieces that outlive a single run: the client handle, the
/// timeout and depth settings, and the broadcast queue behind
/// [`Engine::subscribe`]. Every run records into its own result log, so one
/// engine can serve concurrent runs; [`Engine::results`] reads the log of the
/// most recently started run.
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new(client).task_timeout(Duration::from_secs(60)).build()?;
///
/// let mut workflow = Workflow::try_from(&WorkflowModel::from_json(text)?)?;
/// workflow.set_beacon_id("12345");
///
/// let report = engine.execute(workflow).await;
/// for result in &report.results {
///     println!("{} -> {}", result.name, result.success);
/// }
/// ```
pub struct Engine {
    /// Pre-authenticated client shared by every branch.
    client: Arc<dyn RemoteClient>,
    /// Timeout for actions that do not set their own.
    task_timeout: Duration,
    /// Nesting limit checked before a run starts.
    max_depth: usize,
    /// Result log of the most recently started run.
    current: RwLock<Arc<ResultLog>>,
    /// Live stream of results as they are recorded.
    events: Arc<BroadcastQueue<ActionResult>>,
}

impl Engine {
    pub fn new(
        client: Arc<dyn RemoteClient>,
        task_timeout: Duration,
        max_depth: usize,
        event_capacity: usize,
    ) -> Self {
        Self {
            client,
            task_timeout,
            max_depth,
            current: RwLock::new(Arc::new(ResultLog::new())),
            events: BroadcastQueue::new(event_capacity),
        }
    }

    /// Creates an engine with the timeout and limits of `config`.
    pub fn new_with_config(
        client: Arc<dyn RemoteClient>,
        config: &Config,
    ) -> Self {
        Self::new(client, config.task_timeout(), config.limits.max_depth, config.limits.event_capacity)
    }

    pub fn task_timeout(&self) -> Duration {
        self.task_timeout
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Runs `workflow` to completion.
    ///
    /// Never panics on action failures: they are recorded in the log. The
    /// report carries a terminal error when the workflow is invalid, has no
    /// beacon, or when a top-level action failed without an `on_failure`
    /// list to absorb it.
    pub async fn execute(
        &self,
        workflow: Workflow,
    ) -> RunReport {
        let workflow = Arc::new(workflow);
        let run_id = utils::longid();
        let start_time = Utc::now();
        let clock = std::time::Instant::now();
        let span = info_span!("run", run_id = %run_id, workflow = %workflow.name());

        let log = Arc::new(ResultLog::new());
        log.reset(workflow.roots().len());
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = log.clone();

        let error = match self.preflight(&workflow) {
            Ok(()) => None,
            Err(e) => Some(e),
        };

        let (outcomes, join_error) = if error.is_none() {
            self.run(workflow.clone(), log.clone()).instrument(span.clone()).await
        } else {
            (Vec::new(), None)
        };

        let skipped: Vec<_> = outcomes.iter().flat_map(|o| o.skipped.iter().cloned()).collect();
        let error = error.or(join_error).or_else(|| {
            outcomes.iter().find(|o| o.is_unabsorbed_failure()).map(|o| BeaconflowError::ActionFailed {
                action: o.name.clone(),
                message: o.error.clone().unwrap_or_else(|| "action failed".to_string()),
            })
        });

        let report = RunReport {
            run_id,
            workflow: workflow.name().to_string(),
            beacon_id: workflow.beacon_id().to_string(),
            start_time,
            end_time: Utc::now(),
            duration: clock.elapsed(),
            results: log.snapshot(),
            skipped,
            error,
        };

        span.in_scope(|| match &report.error {
            None => info!(actions = report.results.len(), skipped = report.skipped.len(), "workflow completed successfully"),
            Some(e) => error!(actions = report.results.len(), error = %e, "workflow execution failed"),
        });

        report
    }

    fn preflight(
        &self,
        workflow: &Workflow,
    ) -> crate::Result<()> {
        if workflow.beacon_id().trim().is_empty() {
            return Err(BeaconflowError::Workflow(format!("workflow '{}' has no beacon id", workflow.name())));
        }
        workflow.validate(self.max_depth)
    }

    async fn run(
        &self,
        workflow: Arc<Workflow>,
        log: Arc<ResultLog>,
    ) -> (Vec<TreeOutcome>, Option<BeaconflowError>) {
        let ctx = ExecutionContext::new(
            workflow.beacon_id().to_string(),
            self.client.clone(),
            self.task_timeout,
            workflow.action_count(),
            log,
            self.events.clone(),
        );

        if !workflow.is_parallel() {
            info!(actions = workflow.roots().len(), subscribers = self.events.receiver_count(), "executing sequentially");
            let mut outcomes = Vec::with_capacity(workflow.roots().len());
            for (slot, root) in workflow.roots().iter().enumerate() {
                outcomes.push(run_tree(&ctx, &workflow, *root, slot).await);
            }
            return (outcomes, None);
        }

        info!(actions = workflow.roots().len(), subscribers = self.events.receiver_count(), "executing in parallel");
        // dropping the set aborts every task still running
        let mut tasks = JoinSet::new();
        for (slot, root) in workflow.roots().iter().enumerate() {
            let ctx = ctx.clone();
            let workflow = workflow.clone();
            let root = *root;
            tasks.spawn(async move { (slot, run_tree(&ctx, &workflow, root, slot).await) }.in_current_span());
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        let mut join_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    let e = BeaconflowError::from(e);
                    error!(error = %e, "top-level action task did not finish");
                    join_error.get_or_insert(e);
                }
            }
        }
        outcomes.sort_by_key(|(slot, _)| *slot);

        (outcomes.into_iter().map(|(_, outcome)| outcome).collect(), join_error)
    }

    /// Snapshot of the result log of the most recently started run. Safe to
    /// call while that run is in flight; returns what has been recorded so
    /// far.
    pub fn results(&self) -> Vec<ActionResult> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).snapshot()
    }

    /// Streams every result recorded from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ActionResult> {
        self.events.subscribe()
    }
}
