use async_trait::async_trait;

use crate::work_item::TaskResult;

/// One finished task, tagged with the rank that ran it so the coordinator
/// knows which worker just became idle.
#[derive(Debug)]
pub struct Completion {
    pub rank: usize,
    pub result: TaskResult,
}

/// Coordinator-side merged stream of completions from every worker, in
/// arrival order. `None` while tasks are still in flight means the workers
/// behind it are gone.
#[async_trait]
pub trait CompletionStream: Send {
    async fn next(&mut self) -> Option<Completion>;
}
