use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bench_pool_core::{
    local_host, run_worker, EngineRegistry, ResultSender, TaskResult, WorkItem, WorkReceiver,
    WorkerHandle,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::rpc::{recv_frame, send_frame, ResultEnvelope, WorkerMessage};

const RESULT_ATTEMPTS: usize = 5;
const RESULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// One remote worker process: listens for coordinator messages, runs the
/// sequential task loop, dials results back to the coordinator.
pub struct WorkerServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    host: String,
}

impl WorkerServer {
    /// Binds the task port. `host_label` overrides the trace-record host,
    /// otherwise the local host name is used.
    pub async fn bind(addr: &str, host_label: Option<String>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            host: host_label.unwrap_or_else(local_host),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves one full run: waits for `Initialize`, then executes `Work`
    /// messages one at a time until `Shutdown` arrives or the coordinator
    /// stops answering.
    pub async fn serve(self, registry: Arc<EngineRegistry>) -> std::io::Result<()> {
        let WorkerServer {
            listener,
            local_addr,
            host,
        } = self;
        tracing::info!(addr = %local_addr, "worker listening");

        let (message_tx, mut message_rx) = mpsc::channel(16);
        // The coordinator dials once per message and messages to one worker
        // are never concurrent, so a sequential accept loop keeps them in
        // arrival order.
        let acceptor = tokio::spawn(async move {
            loop {
                let stream = match listener.accept().await {
                    Ok((stream, _)) => stream,
                    Err(error) => {
                        tracing::warn!(%error, "task port accept failed");
                        return;
                    }
                };
                let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
                if let Some(message) = recv_frame::<WorkerMessage>(&mut framed).await {
                    if message_tx.send(message).await.is_err() {
                        return;
                    }
                }
            }
        });

        let init = loop {
            match message_rx.recv().await {
                Some(WorkerMessage::Initialize(info)) => break info,
                Some(other) => {
                    tracing::warn!(?other, "ignoring message before initialization")
                }
                None => return Ok(()),
            }
        };
        tracing::info!(
            rank = init.rank,
            pool_size = init.pool_size,
            "worker initialized"
        );

        let handle = WorkerHandle::new(init.rank, init.pool_size, host);
        let tasks = RpcWorkReceiver {
            messages: message_rx,
        };
        let results = RpcResultSender {
            rank: init.rank,
            reply_addr: init.reply_addr,
        };
        run_worker(handle, registry, tasks, results).await;

        acceptor.abort();
        Ok(())
    }
}

/// Turns the accepted message sequence into plain work assignments.
struct RpcWorkReceiver {
    messages: mpsc::Receiver<WorkerMessage>,
}

#[async_trait]
impl WorkReceiver for RpcWorkReceiver {
    async fn recv(&mut self) -> Option<WorkItem> {
        loop {
            match self.messages.recv().await? {
                WorkerMessage::Work(item) => return Some(item),
                WorkerMessage::Shutdown => return None,
                WorkerMessage::Initialize(info) => {
                    tracing::warn!(rank = info.rank, "ignoring repeated initialization")
                }
            }
        }
    }
}

/// Dials one connection back to the coordinator per finished task.
struct RpcResultSender {
    rank: usize,
    reply_addr: SocketAddr,
}

impl RpcResultSender {
    async fn send_once(&self, envelope: &ResultEnvelope) -> std::io::Result<()> {
        let stream = TcpStream::connect(self.reply_addr).await?;
        let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
        send_frame(&mut framed, envelope).await
    }
}

#[async_trait]
impl ResultSender for RpcResultSender {
    async fn send(&self, result: TaskResult) -> bool {
        let envelope = ResultEnvelope {
            rank: self.rank,
            result,
        };
        for attempt in 0..RESULT_ATTEMPTS {
            match self.send_once(&envelope).await {
                Ok(()) => return true,
                Err(error) => {
                    tracing::debug!(attempt, %error, "result delivery failed");
                }
            }
            if attempt + 1 < RESULT_ATTEMPTS {
                tokio::time::sleep(RESULT_RETRY_DELAY).await;
            }
        }
        false
    }
}
