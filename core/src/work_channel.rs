use async_trait::async_trait;

use crate::error::RunError;
use crate::work_item::WorkItem;

/// Coordinator-side handle for handing one task to one worker.
/// Implemented over in-process channels and over sockets.
#[async_trait]
pub trait WorkChannel: Send + Sync {
    /// Delivers `item` to this channel's worker. A delivery failure means the
    /// worker is unreachable, which is fatal to the run.
    async fn dispatch(&self, item: WorkItem) -> Result<(), RunError>;
}
