use std::net::SocketAddr;

use async_trait::async_trait;
use bench_pool_core::{Completion, CompletionStream};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::rpc::{recv_frame, ResultEnvelope};

/// Coordinator-side collection port. Workers dial it once per finished task;
/// an accept loop bridges the envelopes into one in-process stream.
pub struct RpcCompletionStream {
    rx: mpsc::Receiver<Completion>,
    local_addr: SocketAddr,
}

impl RpcCompletionStream {
    /// Binds `addr` (typically an ephemeral `host:0`) and starts accepting
    /// result connections immediately.
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            loop {
                let stream = match listener.accept().await {
                    Ok((stream, _)) => stream,
                    Err(error) => {
                        tracing::warn!(%error, "collection port accept failed");
                        return;
                    }
                };
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
                    if let Some(envelope) = recv_frame::<ResultEnvelope>(&mut framed).await {
                        let _ = tx
                            .send(Completion {
                                rank: envelope.rank,
                                result: envelope.result,
                            })
                            .await;
                    }
                });
            }
        });

        Ok(Self { rx, local_addr })
    }

    /// The address workers must dial back. Port is the bound one even when
    /// `bind` was called with port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl CompletionStream for RpcCompletionStream {
    async fn next(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }
}
