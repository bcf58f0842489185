pub mod condition;
pub mod edge;
pub mod node;
pub mod template;
mod workflow;

pub use workflow::{DEFAULT_MAX_DEPTH, Workflow};
