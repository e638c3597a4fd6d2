use std::net::SocketAddr;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use bench_pool_core::{TaskResult, WorkItem};

/// Messages the coordinator sends to a worker's task port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkerMessage {
    /// First message of a run: who this worker is and where results go.
    Initialize(InitInfo),
    /// One task assignment.
    Work(WorkItem),
    /// The run is over; the worker's task loop should end.
    Shutdown,
}

/// Pool membership details handed to a worker at provisioning time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitInfo {
    pub rank: usize,
    pub pool_size: usize,
    pub reply_addr: SocketAddr,
}

/// One finished task on its way back to the coordinator's collection port.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub rank: usize,
    pub result: TaskResult,
}

/// Writes one length-delimited JSON frame.
pub(crate) async fn send_frame<T: Serialize>(
    framed: &mut Framed<TcpStream, LengthDelimitedCodec>,
    message: &T,
) -> std::io::Result<()> {
    let payload = serde_json::to_vec(message).map_err(std::io::Error::other)?;
    framed.send(Bytes::from(payload)).await
}

/// Reads one length-delimited JSON frame. Undecodable frames and connection
/// errors both come back as `None`; the peer dials again if it still cares.
pub(crate) async fn recv_frame<T: DeserializeOwned>(
    framed: &mut Framed<TcpStream, LengthDelimitedCodec>,
) -> Option<T> {
    match framed.next().await {
        Some(Ok(frame)) => match serde_json::from_slice(&frame) {
            Ok(message) => Some(message),
            Err(error) => {
                tracing::warn!(%error, "discarding undecodable frame");
                None
            }
        },
        Some(Err(error)) => {
            tracing::warn!(%error, "connection failed mid-frame");
            None
        }
        None => None,
    }
}
