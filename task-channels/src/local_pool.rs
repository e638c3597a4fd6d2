use std::sync::Arc;

use bench_pool_core::{
    run_worker, Coordinator, EngineRegistry, PoolMember, ProgressObserver, RunError, TaskResult,
    WorkItem, WorkerHandle,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::channel_wrappers::{
    ChannelCompletionStream, ChannelResultSender, ChannelWorkChannel, ChannelWorkReceiver,
};

/// An in-process pool: `num_workers` tokio tasks running the worker loop,
/// wired to one coordinator over bounded channels.
pub struct LocalPool {
    coordinator: Coordinator<ChannelWorkChannel, ChannelCompletionStream>,
    workers: Vec<JoinHandle<()>>,
}

/// Provisions `num_workers` workers sharing `registry`. Rank `i` is the
/// `i`-th spawned task; every handle carries the local host label.
pub fn spawn_local_pool(num_workers: usize, registry: Arc<EngineRegistry>) -> LocalPool {
    // Completion inbox sized to the pool, task channels sized to one: a
    // worker can never be handed a second item before reporting the first.
    let (completion_tx, completion_rx) = mpsc::channel(num_workers.max(1));
    let mut members = Vec::with_capacity(num_workers);
    let mut workers = Vec::with_capacity(num_workers);

    for rank in 0..num_workers {
        let (task_tx, task_rx) = mpsc::channel(1);
        let handle = WorkerHandle::local(rank, num_workers);

        members.push(PoolMember {
            handle: handle.clone(),
            channel: ChannelWorkChannel::new(rank, task_tx),
        });

        workers.push(tokio::spawn(run_worker(
            handle,
            registry.clone(),
            ChannelWorkReceiver::new(task_rx),
            ChannelResultSender::new(rank, completion_tx.clone()),
        )));
    }

    LocalPool {
        coordinator: Coordinator::new(members, ChannelCompletionStream::new(completion_rx)),
        workers,
    }
}

impl LocalPool {
    pub fn pool_size(&self) -> usize {
        self.coordinator.pool_size()
    }

    /// Runs the work list, then winds the pool down: dropping the task
    /// channels closes every worker's source, and each worker task is joined
    /// before the results are handed back.
    pub async fn run<O>(
        self,
        work_items: Vec<WorkItem>,
        observer: &mut O,
    ) -> Result<Vec<TaskResult>, RunError>
    where
        O: ProgressObserver,
    {
        let LocalPool {
            mut coordinator,
            workers,
        } = self;

        let outcome = coordinator.run(work_items, observer).await;
        drop(coordinator);

        for (rank, worker) in workers.into_iter().enumerate() {
            if let Err(error) = worker.await {
                tracing::warn!(rank, %error, "worker task terminated abnormally");
            }
        }

        outcome
    }
}
