//! Core types and traits for a pull-based benchmark worker pool: a
//! coordinator hands work items to workers one at a time, workers run them
//! through an engine registry and report results back as they finish.

mod work_item;
pub use work_item::{TaskResult, WorkItem};

mod error;
pub use error::{RunError, TaskError};

mod engine;
pub use engine::{Engine, EngineRegistry};

mod worker_handle;
pub use worker_handle::{local_host, WorkerHandle};

pub mod executor;

mod work_channel;
pub use work_channel::WorkChannel;

mod worker_io;
pub use worker_io::{ResultSender, WorkReceiver};

mod completion_stream;
pub use completion_stream::{Completion, CompletionStream};

mod worker;
pub use worker::run_worker;

mod coordinator;
pub use coordinator::{Coordinator, PoolMember};

mod progress;
pub use progress::{ConsoleProgress, NullProgress, ProgressObserver};
