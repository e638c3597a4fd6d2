//! Single-process pool flavor: workers are tokio tasks and all coordinator
//! to worker traffic moves over in-process channels.

mod channel_wrappers;
pub use channel_wrappers::{
    ChannelCompletionStream, ChannelResultSender, ChannelWorkChannel, ChannelWorkReceiver,
};

mod local_pool;
pub use local_pool::{spawn_local_pool, LocalPool};
