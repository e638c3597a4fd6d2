use std::sync::Arc;

use crate::engine::EngineRegistry;
use crate::executor;
use crate::worker_handle::WorkerHandle;
use crate::worker_io::{ResultSender, WorkReceiver};

/// Sequential task loop for one worker: receive an item, execute it, report
/// the result, repeat. A worker holds at most one task at a time.
///
/// Ends when the work source closes or when the coordinator stops accepting
/// results.
pub async fn run_worker<R, S>(
    handle: WorkerHandle,
    registry: Arc<EngineRegistry>,
    mut tasks: R,
    results: S,
) where
    R: WorkReceiver,
    S: ResultSender,
{
    tracing::debug!(rank = handle.rank, host = %handle.host, "worker ready");

    while let Some(item) = tasks.recv().await {
        let result = executor::execute(item, &registry, &handle).await;
        if !results.send(result).await {
            tracing::warn!(rank = handle.rank, "coordinator gone, worker stopping");
            return;
        }
    }

    tracing::debug!(rank = handle.rank, "worker finished");
}
