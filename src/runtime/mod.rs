mod context;
mod log;
mod report;
mod result;
mod traversal;

#[cfg(test)]
pub(crate) mod testing;

pub use context::ExecutionContext;
pub use log::ResultLog;
pub use report::{RunReport, SkippedAction};
pub use result::{ActionResult, ErrorKind};
pub(crate) use traversal::{TreeOutcome, run_tree};
