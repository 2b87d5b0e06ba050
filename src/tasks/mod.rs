//! Serialised execution of document mutations.

mod queuer;

pub use queuer::{QueuerOptions, TaskError, TaskFailure, TaskFailurePolicy, TaskId, TaskQueuer};
