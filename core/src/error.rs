use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure scoped to a single work item. These never abort the run; they
/// are captured into the item's [`TaskResult`](crate::TaskResult) and the
/// worker moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TaskError {
    #[error("unknown engine '{engine_id}'")]
    UnknownEngine { engine_id: String },

    #[error("engine '{engine_id}' failed: {message}")]
    EngineExecution { engine_id: String, message: String },
}

/// A failure of the run itself. Unlike [`TaskError`] these propagate out of
/// the coordinator and abort everything in flight.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("engine '{engine_id}' is already registered")]
    DuplicateEngine { engine_id: String },

    #[error("work list '{path}' is unusable: {reason}")]
    WorkSpecParse { path: String, reason: String },

    #[error("worker(s) {ranks:?} unreachable: {reason}")]
    WorkerUnavailable { ranks: Vec<usize>, reason: String },

    #[error("no workers provisioned")]
    EmptyPool,

    #[error("transport I/O: {0}")]
    Io(#[from] std::io::Error),
}
