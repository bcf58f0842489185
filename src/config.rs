use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::{BeaconflowError, Result, workflow::DEFAULT_MAX_DEPTH};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// timeout config
    pub timeouts: TimeoutConfig,
    /// structural and buffering limits
    pub limits: LimitConfig,
    /// logging config
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// per-action timeout in seconds when the action sets none, defaults to 300
    pub task_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// maximum nesting of on_success/on_failure lists, defaults to 64
    pub max_depth: usize,
    /// results buffered per live subscriber before it lags, defaults to 1024
    pub event_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `debug`, `info`, `warn`, `error`, or any `EnvFilter` directive
    pub level: String,
    /// emit console logs as JSON lines
    pub json_format: bool,
    /// also append JSON logs to this file
    pub file: Option<String>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            task_timeout_secs: 300,
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            event_capacity: 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file: None,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())
            .map_err(|e| BeaconflowError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeouts.task_timeout_secs == 0 {
            return Err(BeaconflowError::Config("timeouts.task_timeout_secs must be greater than 0".to_string()));
        }
        if self.limits.max_depth == 0 {
            return Err(BeaconflowError::Config("limits.max_depth must be greater than 0".to_string()));
        }
        if self.limits.event_capacity == 0 {
            return Err(BeaconflowError::Config("limits.event_capacity must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.task_timeout_secs)
    }
}

#[cfg(test)]
mod test {
    use crate::{BeaconflowError, Config};

    #[test]
    fn test_config_deserialize() {
        let toml_str = r#"
        [timeouts]
        task_timeout_secs = 60

        [limits]
        max_depth = 8

        [logging]
        level = "debug"
        json_format = true
        file = "/tmp/beaconflow.log"
        "#;
        let config = Config::load_from_str(toml_str).unwrap();
        assert_eq!(config.timeouts.task_timeout_secs, 60);
        assert_eq!(config.task_timeout().as_secs(), 60);
        assert_eq!(config.limits.max_depth, 8);
        assert_eq!(config.limits.event_capacity, 1024);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert_eq!(config.logging.file.as_deref(), Some("/tmp/beaconflow.log"));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config.timeouts.task_timeout_secs, 300);
        assert_eq!(config.limits.max_depth, 64);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        let err = Config::load_from_str("[timeouts]\ntask_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, BeaconflowError::Config(_)));

        let err = Config::load_from_str("[limits]\nmax_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, BeaconflowError::Config(_)));
    }

    #[test]
    fn test_config_missing_file() {
        assert!(matches!(Config::create("/nonexistent/beaconflow.toml"), Err(BeaconflowError::Config(_))));
    }
}
