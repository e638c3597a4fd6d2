use std::net::{IpAddr, SocketAddr};

use bench_pool_core::{
    Coordinator, PoolMember, ProgressObserver, RunError, TaskResult, WorkItem, WorkerHandle,
};

use crate::rpc::InitInfo;
use crate::rpc_completion_stream::RpcCompletionStream;
use crate::rpc_work_channel::RpcWorkChannel;

/// A coordinator wired to already-listening remote workers.
pub struct RpcPool {
    coordinator: Coordinator<RpcWorkChannel, RpcCompletionStream>,
}

/// Provisions a pool over remote workers. `worker_addrs[i]` becomes rank `i`
/// and receives the `Initialize` handshake before this returns, so every
/// worker knows its identity before the first task moves.
///
/// `collect_bind` is where results are gathered; with `advertise_ip` set,
/// workers dial that address instead of the bind address (needed when
/// binding a wildcard interface).
pub async fn connect_pool(
    worker_addrs: &[SocketAddr],
    collect_bind: &str,
    advertise_ip: Option<IpAddr>,
) -> Result<RpcPool, RunError> {
    let completions = RpcCompletionStream::bind(collect_bind).await?;
    let mut reply_addr = completions.local_addr();
    if let Some(ip) = advertise_ip {
        reply_addr.set_ip(ip);
    }

    let pool_size = worker_addrs.len();
    let mut members: Vec<PoolMember<RpcWorkChannel>> = Vec::with_capacity(pool_size);
    for (rank, addr) in worker_addrs.iter().enumerate() {
        let channel = RpcWorkChannel::new(rank, *addr);
        let init = InitInfo {
            rank,
            pool_size,
            reply_addr,
        };
        if let Err(error) = channel.initialize(init).await {
            // Workers already initialized would otherwise wait for tasks
            // forever.
            for member in &members {
                member.channel.shutdown().await;
            }
            return Err(error);
        }
        // The member's host label is the dial address; the worker reports
        // its own host name in trace records.
        members.push(PoolMember {
            handle: WorkerHandle::new(rank, pool_size, addr.to_string()),
            channel,
        });
    }
    tracing::info!(pool_size, collect = %reply_addr, "pool provisioned");

    Ok(RpcPool {
        coordinator: Coordinator::new(members, completions),
    })
}

impl RpcPool {
    pub fn pool_size(&self) -> usize {
        self.coordinator.pool_size()
    }

    /// Runs the work list, then sends every worker a best-effort shutdown
    /// notice, whether the run succeeded or aborted.
    pub async fn run<O>(
        mut self,
        work_items: Vec<WorkItem>,
        observer: &mut O,
    ) -> Result<Vec<TaskResult>, RunError>
    where
        O: ProgressObserver,
    {
        let outcome = self.coordinator.run(work_items, observer).await;
        for member in self.coordinator.members() {
            member.channel.shutdown().await;
        }
        outcome
    }
}
