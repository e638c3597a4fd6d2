//! Runs one work item on one worker and turns whatever happens into a
//! [`TaskResult`].

use std::sync::Arc;

use serde_json::Value;

use crate::engine::{Engine, EngineRegistry};
use crate::error::TaskError;
use crate::work_item::{TaskResult, WorkItem};
use crate::worker_handle::WorkerHandle;

/// Executes `item` against the registry on behalf of `handle`.
///
/// Emits one trace record per invocation, then resolves the engine and runs
/// it. Failures never escape: an unknown engine, a failing engine, even a
/// panicking engine all end up inside the returned result, leaving the worker
/// free to take its next assignment.
pub async fn execute(
    item: WorkItem,
    registry: &EngineRegistry,
    handle: &WorkerHandle,
) -> TaskResult {
    tracing::info!(
        benchmark = %item.benchmark_id,
        engine = %item.engine_id,
        rank = handle.rank,
        pool_size = handle.pool_size,
        host = %handle.host,
        "executing benchmark"
    );

    let engine = match registry.lookup(&item.engine_id) {
        Ok(engine) => engine,
        Err(error) => {
            tracing::warn!(engine = %item.engine_id, "engine not registered");
            return TaskResult::failure(item, error);
        }
    };

    match invoke(engine, &item.engine_id, &item.benchmark_id).await {
        Ok(output) => TaskResult::success(item, output),
        Err(error) => {
            tracing::warn!(benchmark = %item.benchmark_id, %error, "task failed");
            TaskResult::failure(item, error)
        }
    }
}

/// Invokes the engine on its own task so a panicking engine is confined to
/// this work item instead of tearing down the worker loop.
async fn invoke(
    engine: Arc<dyn Engine>,
    engine_id: &str,
    benchmark_id: &str,
) -> Result<Value, TaskError> {
    let benchmark = benchmark_id.to_string();
    let invocation = tokio::spawn(async move { engine.run(&benchmark).await });

    match invocation.await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(error)) => Err(TaskError::EngineExecution {
            engine_id: engine_id.to_string(),
            message: format!("{error:#}"),
        }),
        Err(join_error) => Err(TaskError::EngineExecution {
            engine_id: engine_id.to_string(),
            message: join_error.to_string(),
        }),
    }
}
