use serde::{Deserialize, Serialize};

/// Identity of one worker execution context: its rank within the pool, the
/// pool size, and a host label. Plain data, so the executor can be exercised
/// without provisioning a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerHandle {
    pub rank: usize,
    pub pool_size: usize,
    pub host: String,
}

impl WorkerHandle {
    pub fn new(rank: usize, pool_size: usize, host: impl Into<String>) -> Self {
        Self {
            rank,
            pool_size,
            host: host.into(),
        }
    }

    /// Handle for a worker running in the current process, labeled with the
    /// local host name.
    pub fn local(rank: usize, pool_size: usize) -> Self {
        Self::new(rank, pool_size, local_host())
    }
}

/// Best-effort host label for trace records.
pub fn local_host() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}
