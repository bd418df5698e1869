//! # git-ops-rs
//!
//! A cache- and concurrency-aware execution layer in front of the `git`
//! command-line tool. Repeated, potentially identical queries (branch name,
//! status, log, diff, config) are answered from a bounded LRU+TTL result
//! cache instead of re-invoking a subprocess; independent queries run in
//! parallel across a bounded worker pool while results come back in
//! caller-specified order.
//!
//! The crate captures opaque text output, exit codes and timing only. It
//! does not parse git object data, manage credentials or drive repository
//! mutation.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use git_ops_rs::{GitCommand, GitOperation, GitOpsManager};
//!
//! # #[tokio::main]
//! # async fn main() -> git_ops_rs::Result<()> {
//! let manager = GitOpsManager::builder()
//!     .working_dir("/path/to/repo")
//!     .build()?;
//!
//! // Single command; the second identical call is served from cache.
//! let status = manager.status().await;
//! println!("clean: {}", status.stdout.is_empty());
//!
//! // Independent queries in parallel, results in submission order.
//! let results = manager
//!     .execute_parallel(vec![
//!         GitCommand::new(GitOperation::Log).args(["-n", "5", "--oneline"]),
//!         GitCommand::new(GitOperation::Branch).arg("--show-current"),
//!         GitCommand::new(GitOperation::Config).args(["--get", "user.name"]),
//!     ])
//!     .await;
//! assert_eq!(results.len(), 3);
//!
//! let stats = manager.statistics();
//! println!("hit rate: {:.2}", stats.cache_hit_rate);
//!
//! manager.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! Every command yields a [`GitCommandResult`] value, failures, timeouts
//! and a missing binary included, so callers branch on
//! [`success`](GitCommandResult::success) rather than catching errors.

pub mod core;
pub mod ops;

pub use crate::core::config::GitOpsConfig;
pub use crate::core::error::{GitOpsError, Result};
pub use crate::core::types::{
    CachePolicy, GitCommand, GitCommandResult, GitOperation, ProjectInfo,
};
pub use crate::ops::cache::{CacheKey, CacheStats, OperationCache};
pub use crate::ops::manager::{GitOpsManager, GitOpsManagerBuilder};
pub use crate::ops::parallel::ParallelExecutor;
pub use crate::ops::stats::{OperationStats, StatsTracker};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
