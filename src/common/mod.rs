mod cache;
mod queue;
mod value;

pub use cache::MemCache;
pub use queue::BroadcastQueue;
pub use value::ParamValue;

/// Named parameters handed to the remote client, ordered by name.
pub type Parameters = std::collections::BTreeMap<String, ParamValue>;
