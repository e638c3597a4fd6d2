//! Multi-process pool flavor: workers are separate processes reached over
//! TCP, one length-delimited JSON message per connection.

mod rpc;
pub use rpc::{InitInfo, ResultEnvelope, WorkerMessage};

mod rpc_work_channel;
pub use rpc_work_channel::RpcWorkChannel;

mod rpc_completion_stream;
pub use rpc_completion_stream::RpcCompletionStream;

mod worker_server;
pub use worker_server::WorkerServer;

mod rpc_pool;
pub use rpc_pool::{connect_pool, RpcPool};
