use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bench_pool_core::{RunError, WorkChannel, WorkItem};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::rpc::{send_frame, InitInfo, WorkerMessage};

const DISPATCH_ATTEMPTS: usize = 10;
const DISPATCH_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Coordinator-side handle for one remote worker. Dials the worker's task
/// port once per message; a connection never outlives a single frame.
pub struct RpcWorkChannel {
    rank: usize,
    worker_addr: SocketAddr,
}

impl RpcWorkChannel {
    pub fn new(rank: usize, worker_addr: SocketAddr) -> Self {
        Self { rank, worker_addr }
    }

    /// Hands the worker its pool membership. Must complete before any work
    /// is dispatched on this channel.
    pub async fn initialize(&self, info: InitInfo) -> Result<(), RunError> {
        self.send_message(&WorkerMessage::Initialize(info)).await
    }

    /// Best-effort end-of-run notice. A worker that is already gone is not
    /// an error at this point.
    pub async fn shutdown(&self) {
        if let Err(error) = self.send_once(&WorkerMessage::Shutdown).await {
            tracing::warn!(rank = self.rank, %error, "worker unreachable during shutdown");
        }
    }

    async fn send_once(&self, message: &WorkerMessage) -> std::io::Result<()> {
        let stream = TcpStream::connect(self.worker_addr).await?;
        let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
        send_frame(&mut framed, message).await
    }

    async fn send_message(&self, message: &WorkerMessage) -> Result<(), RunError> {
        let mut last_error = String::new();
        for attempt in 0..DISPATCH_ATTEMPTS {
            match self.send_once(message).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    last_error = error.to_string();
                    tracing::debug!(rank = self.rank, attempt, %error, "delivery failed");
                }
            }
            if attempt + 1 < DISPATCH_ATTEMPTS {
                tokio::time::sleep(DISPATCH_RETRY_DELAY).await;
            }
        }
        Err(RunError::WorkerUnavailable {
            ranks: vec![self.rank],
            reason: format!("{} gave no answer: {last_error}", self.worker_addr),
        })
    }
}

#[async_trait]
impl WorkChannel for RpcWorkChannel {
    async fn dispatch(&self, item: WorkItem) -> Result<(), RunError> {
        self.send_message(&WorkerMessage::Work(item)).await
    }
}
