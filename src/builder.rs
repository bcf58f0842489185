use std::{sync::Arc, time::Duration};

use crate::{BeaconflowError, Config, Engine, Result, client::RemoteClient};

pub struct EngineBuilder {
    client: Arc<dyn RemoteClient>,
    task_timeout: Duration,
    max_depth: usize,
    event_capacity: usize,
}

impl EngineBuilder {
    /// Starts from the default configuration around an authenticated client.
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        Self::with_config(client, &Config::default())
    }

    pub fn with_config(
        client: Arc<dyn RemoteClient>,
        config: &Config,
    ) -> Self {
        Self {
            client,
            task_timeout: config.task_timeout(),
            max_depth: config.limits.max_depth,
            event_capacity: config.limits.event_capacity,
        }
    }

    pub fn task_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn max_depth(
        mut self,
        depth: usize,
    ) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn event_capacity(
        mut self,
        capacity: usize,
    ) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<Engine> {
        if self.task_timeout.is_zero() {
            return Err(BeaconflowError::Config("task timeout must be greater than 0".to_string()));
        }
        if self.max_depth == 0 {
            return Err(BeaconflowError::Config("max depth must be greater than 0".to_string()));
        }

        Ok(Engine::new(self.client, self.task_timeout, self.max_depth, self.event_capacity))
    }
}
