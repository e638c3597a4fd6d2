use async_trait::async_trait;

use crate::work_item::{TaskResult, WorkItem};

/// Worker-side source of task assignments. `None` means no further work will
/// ever arrive and the worker should wind down.
#[async_trait]
pub trait WorkReceiver: Send {
    async fn recv(&mut self) -> Option<WorkItem>;
}

/// Worker-side sink for finished tasks. Returns `false` when the coordinator
/// can no longer be reached.
#[async_trait]
pub trait ResultSender: Send + Sync {
    async fn send(&self, result: TaskResult) -> bool;
}
