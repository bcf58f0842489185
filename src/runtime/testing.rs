//! Test helpers: a scripted remote client and context builders.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    BeaconflowError, Result,
    client::{RemoteClient, RemoteOutput},
    common::{BroadcastQueue, ParamValue, Parameters},
    runtime::{ActionResult, ExecutionContext, ResultLog},
};

/// How the scripted client answers a command.
#[derive(Debug, Clone)]
pub enum Reply {
    Succeed(String),
    Fail(String),
    Error(String),
    /// never finishes on its own
    Hang,
}

/// Answers calls by the `command` parameter of the action.
///
/// Unknown commands succeed with the command echoed back. Every call is
/// recorded with its parameters; a `Hang` call that gets dropped bumps
/// `cancelled`.
#[derive(Default)]
pub struct ScriptedClient {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<(String, Parameters)>>,
    pub cancelled: Arc<AtomicUsize>,
    pub completed: AtomicUsize,
}

struct DropGuard(Arc<AtomicUsize>);

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(
        mut self,
        command: &str,
        reply: Reply,
    ) -> Self {
        self.replies.insert(command.to_string(), reply);
        self
    }

    pub fn delay(
        mut self,
        command: &str,
        delay: Duration,
    ) -> Self {
        self.delays.insert(command.to_string(), delay);
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }
}

#[async_trait]
impl RemoteClient for ScriptedClient {
    async fn execute_action(
        &self,
        _beacon_id: &str,
        _action_type: &str,
        parameters: &Parameters,
    ) -> Result<RemoteOutput> {
        let command = parameters.get("command").and_then(ParamValue::as_str).unwrap_or_default().to_string();
        self.calls.lock().unwrap().push((command.clone(), parameters.clone()));

        if let Some(delay) = self.delays.get(&command) {
            tokio::time::sleep(*delay).await;
        }

        let reply = self.replies.get(&command).cloned().unwrap_or_else(|| Reply::Succeed(command.clone()));
        let out = match reply {
            Reply::Succeed(output) => Ok(RemoteOutput::success(output)),
            Reply::Fail(output) => Ok(RemoteOutput::failed(output)),
            Reply::Error(message) => Err(BeaconflowError::RemoteCall(message)),
            Reply::Hang => {
                let _guard = DropGuard(self.cancelled.clone());
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(RemoteOutput::success("late"))
            }
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        out
    }
}

/// Context over an empty scripted client with a single log slot.
pub fn context() -> ExecutionContext {
    let log = Arc::new(ResultLog::new());
    log.reset(1);
    ExecutionContext::new(
        "beacon-1".to_string(),
        Arc::new(ScriptedClient::new()),
        Duration::from_secs(5),
        64,
        log,
        BroadcastQueue::new(16),
    )
}

pub fn result(
    name: &str,
    success: bool,
) -> ActionResult {
    let now = Utc::now();
    ActionResult {
        name: name.to_string(),
        action_type: "shell".to_string(),
        start_time: now,
        end_time: now,
        duration: Duration::ZERO,
        success,
        output: String::new(),
        error: None,
        error_kind: None,
    }
}

/// Records a finished action so conditions and templates can see it.
pub fn record(
    ctx: &ExecutionContext,
    name: &str,
    success: bool,
    output: &str,
) {
    let mut result = result(name, success);
    result.output = output.to_string();
    ctx.record(0, result);
}
