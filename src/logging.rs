//! Tracing subscriber setup for binaries embedding the engine.
//!
//! The library itself only emits `tracing` events; nothing is printed until a
//! subscriber is installed, either by the host application or through
//! [`init`].

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{BeaconflowError, Result, config::LoggingConfig};

/// Installs the global subscriber described by `config`.
///
/// Console output is plain text or JSON lines. When `config.file` is set, JSON
/// lines are also appended to that file through a non-blocking writer; keep
/// the returned guard alive so buffered lines are flushed on exit.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| BeaconflowError::Config(format!("invalid log level '{}': {}", config.level, e)))?;

    let console = if config.json_format {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file_layer, guard) = match &config.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
            let name = path.file_name().ok_or_else(|| BeaconflowError::Config(format!("invalid log file '{}'", file)))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_ansi(false).with_writer(non_blocking).boxed()), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| BeaconflowError::Engine(format!("failed to install tracing subscriber: {}", e)))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_rejects_bad_level() {
        let config = LoggingConfig {
            level: "beaconflow=notalevel".to_string(),
            ..Default::default()
        };
        assert!(matches!(init(&config), Err(BeaconflowError::Config(_))));
    }
}
