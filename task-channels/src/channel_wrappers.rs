use async_trait::async_trait;
use bench_pool_core::{
    Completion, CompletionStream, ResultSender, RunError, TaskResult, WorkChannel, WorkItem,
    WorkReceiver,
};
use tokio::sync::mpsc;

/// Coordinator's sending half of one worker's task channel.
pub struct ChannelWorkChannel {
    rank: usize,
    tx: mpsc::Sender<WorkItem>,
}

impl ChannelWorkChannel {
    pub fn new(rank: usize, tx: mpsc::Sender<WorkItem>) -> Self {
        Self { rank, tx }
    }
}

#[async_trait]
impl WorkChannel for ChannelWorkChannel {
    async fn dispatch(&self, item: WorkItem) -> Result<(), RunError> {
        self.tx
            .send(item)
            .await
            .map_err(|_| RunError::WorkerUnavailable {
                ranks: vec![self.rank],
                reason: "task channel closed".to_string(),
            })
    }
}

/// Worker's receiving half of its task channel.
pub struct ChannelWorkReceiver {
    rx: mpsc::Receiver<WorkItem>,
}

impl ChannelWorkReceiver {
    pub fn new(rx: mpsc::Receiver<WorkItem>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl WorkReceiver for ChannelWorkReceiver {
    async fn recv(&mut self) -> Option<WorkItem> {
        self.rx.recv().await
    }
}

/// Worker's half of the shared completion channel, tagging each result with
/// the worker's rank.
#[derive(Clone)]
pub struct ChannelResultSender {
    rank: usize,
    tx: mpsc::Sender<Completion>,
}

impl ChannelResultSender {
    pub fn new(rank: usize, tx: mpsc::Sender<Completion>) -> Self {
        Self { rank, tx }
    }
}

#[async_trait]
impl ResultSender for ChannelResultSender {
    async fn send(&self, result: TaskResult) -> bool {
        self.tx
            .send(Completion {
                rank: self.rank,
                result,
            })
            .await
            .is_ok()
    }
}

/// Coordinator's receiving end of the shared completion channel.
pub struct ChannelCompletionStream {
    rx: mpsc::Receiver<Completion>,
}

impl ChannelCompletionStream {
    pub fn new(rx: mpsc::Receiver<Completion>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl CompletionStream for ChannelCompletionStream {
    async fn next(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }
}
