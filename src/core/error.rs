use thiserror::Error;

/// Error type for git-ops-rs construction and configuration paths
///
/// Ordinary command failures never surface through this type: the manager
/// reports them as failed [`GitCommandResult`](crate::GitCommandResult)
/// values so that parallel batches can carry partial outcomes. `GitOpsError`
/// covers misuse that precedes execution, such as invalid configuration.
#[derive(Error, Debug)]
pub enum GitOpsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Manager has been shut down")]
    Shutdown,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GitOpsError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an execution error
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::Execution(msg.into())
    }

    /// Check if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Io(_) | Self::Execution(_))
    }
}

pub type Result<T> = std::result::Result<T, GitOpsError>;
