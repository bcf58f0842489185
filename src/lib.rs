//! # beaconflow
//!
//! beaconflow replays a declarative script of operations against a remote
//! agent ("beacon") through an already-authenticated command-and-control
//! client.
//!
//! ## Core Features
//!
//! - **Conditional action trees**: every action has ordered `on_success` and
//!   `on_failure` lists and optional conditions over earlier results
//! - **Sequential or parallel runs**: top-level actions run in order or one
//!   `tokio` task each, with a result log whose order never depends on timing
//! - **Per-action timeouts** that cancel the in-flight remote call
//! - **BOF argument packing**: typed argument lists become the byte-exact
//!   buffer native extension modules read on the beacon
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beaconflow::{EngineBuilder, Workflow, WorkflowModel};
//!
//! let engine = EngineBuilder::new(client).build()?;
//!
//! let model = WorkflowModel::from_json(json_str)?;
//! let workflow = Workflow::try_from(&model)?;
//!
//! let report = engine.execute(workflow).await;
//! if let Some(err) = &report.error {
//!     eprintln!("run failed: {}", err);
//! }
//! ```

pub mod bof;
mod builder;
mod client;
mod common;
mod config;
mod engine;
mod error;
pub mod logging;
mod model;
mod runtime;
mod utils;
pub mod workflow;

pub use builder::EngineBuilder;
pub use client::{RemoteClient, RemoteOutput};
pub use common::{ParamValue, Parameters};
pub use config::{Config, LimitConfig, LoggingConfig, TimeoutConfig};
pub use engine::Engine;
pub use error::BeaconflowError;
pub use model::*;
pub use runtime::{ActionResult, ErrorKind, ExecutionContext, RunReport, SkippedAction};
pub use workflow::{
    Workflow,
    edge::Branch,
    node::{ActionId, ActionNode, ActionState},
};

/// Result type alias for beaconflow operations.
pub type Result<T> = std::result::Result<T, BeaconflowError>;
