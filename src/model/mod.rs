mod action;
mod condition;
mod workflow;

pub use action::ActionModel;
pub use condition::ConditionModel;
pub use workflow::WorkflowModel;
