use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bench_pool_core::{Engine, EngineRegistry, NullProgress, RunError, TaskError, WorkItem};
use bench_pool_process_rpc::{connect_pool, WorkerServer};
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct EchoEngine {
    name: &'static str,
}

#[async_trait]
impl Engine for EchoEngine {
    async fn run(&self, benchmark_id: &str) -> anyhow::Result<Value> {
        Ok(json!({ "engine": self.name, "benchmark": benchmark_id }))
    }
}

fn echo_registry() -> Arc<EngineRegistry> {
    let mut registry = EngineRegistry::new();
    for name in ["PMP", "ILAMB", "ESMValTool"] {
        registry.register(name, Arc::new(EchoEngine { name })).unwrap();
    }
    Arc::new(registry)
}

async fn spawn_workers(
    count: usize,
    registry: &Arc<EngineRegistry>,
) -> (Vec<SocketAddr>, Vec<tokio::task::JoinHandle<std::io::Result<()>>>) {
    let mut addrs = Vec::with_capacity(count);
    let mut servers = Vec::with_capacity(count);
    for i in 0..count {
        let server = WorkerServer::bind("127.0.0.1:0", Some(format!("test-host-{i}")))
            .await
            .unwrap();
        addrs.push(server.local_addr());
        servers.push(tokio::spawn(server.serve(registry.clone())));
    }
    (addrs, servers)
}

#[tokio::test]
async fn test_round_trip_over_sockets() {
    let registry = echo_registry();
    let (addrs, _servers) = spawn_workers(2, &registry).await;

    let items = vec![
        WorkItem::new("PMP", "AMOC"),
        WorkItem::new("ILAMB", "nbp"),
        WorkItem::new("ESMValTool", "TCRE"),
        WorkItem::new("PMP", "ENSO"),
        WorkItem::new("ILAMB", "lai"),
        WorkItem::new("UNKNOWN", "x"),
    ];

    let pool = connect_pool(&addrs, "127.0.0.1:0", None).await.unwrap();
    assert_eq!(pool.pool_size(), 2);
    let results = pool.run(items.clone(), &mut NullProgress).await.unwrap();

    assert_eq!(results.len(), items.len());

    let mut submitted: HashMap<(String, String), usize> = HashMap::new();
    for item in &items {
        *submitted
            .entry((item.engine_id.clone(), item.benchmark_id.clone()))
            .or_insert(0) += 1;
    }
    let mut returned: HashMap<(String, String), usize> = HashMap::new();
    for result in &results {
        *returned
            .entry((
                result.item.engine_id.clone(),
                result.item.benchmark_id.clone(),
            ))
            .or_insert(0) += 1;
    }
    assert_eq!(returned, submitted);

    for result in &results {
        if result.item.engine_id == "UNKNOWN" {
            match result.error() {
                Some(TaskError::UnknownEngine { engine_id }) => {
                    assert_eq!(engine_id, "UNKNOWN")
                }
                other => panic!("expected UnknownEngine, got {other:?}"),
            }
        } else {
            let output = result.output().unwrap();
            assert_eq!(output["engine"], result.item.engine_id.as_str());
            assert_eq!(output["benchmark"], result.item.benchmark_id.as_str());
        }
    }
}

#[tokio::test]
async fn test_shutdown_ends_the_worker_process() {
    let registry = echo_registry();
    let (addrs, mut servers) = spawn_workers(1, &registry).await;

    let pool = connect_pool(&addrs, "127.0.0.1:0", None).await.unwrap();
    let results = pool
        .run(vec![WorkItem::new("PMP", "AMOC")], &mut NullProgress)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);

    let served = tokio::time::timeout(Duration::from_secs(5), servers.remove(0))
        .await
        .expect("worker did not stop after shutdown")
        .unwrap();
    assert!(served.is_ok());
}

#[tokio::test]
async fn test_unreachable_worker_fails_provisioning() {
    // Grab a port nobody is listening on by binding and releasing it.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let Err(err) = connect_pool(&[dead_addr], "127.0.0.1:0", None).await else {
        panic!("expected provisioning against a dead port to fail")
    };
    match err {
        RunError::WorkerUnavailable { ranks, .. } => assert_eq!(ranks, vec![0]),
        other => panic!("expected WorkerUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_provisioning_stands_down_reached_workers() {
    let registry = echo_registry();
    let (mut addrs, mut servers) = spawn_workers(1, &registry).await;

    // Rank 1 is a dead port, so provisioning fails after rank 0 was already
    // initialized.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);
    addrs.push(dead_addr);

    let Err(err) = connect_pool(&addrs, "127.0.0.1:0", None).await else {
        panic!("expected provisioning to fail")
    };
    match err {
        RunError::WorkerUnavailable { ranks, .. } => assert_eq!(ranks, vec![1]),
        other => panic!("expected WorkerUnavailable, got {other:?}"),
    }

    // Rank 0 must have been told to stand down, ending its serve loop.
    let served = tokio::time::timeout(Duration::from_secs(10), servers.remove(0))
        .await
        .expect("worker was not shut down after failed provisioning")
        .unwrap();
    assert!(served.is_ok());
}
