//! Operations manager facade
//!
//! Composes the cache, statistics tracker, subprocess executor and parallel
//! dispatcher behind one public surface: resolves cache keys, decides
//! cache-or-execute, records statistics, and owns lifecycle.

use crate::core::config::GitOpsConfig;
use crate::core::error::Result;
use crate::core::types::{
    CachePolicy, GitCommand, GitCommandResult, GitOperation, ProjectInfo,
};
use crate::ops::cache::{CacheKey, OperationCache};
use crate::ops::parallel::ParallelExecutor;
use crate::ops::process;
use crate::ops::stats::{OperationStats, StatsTracker};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SHUTDOWN_MESSAGE: &str = "manager has been shut down";

struct ManagerInner {
    config: GitOpsConfig,
    cache: OperationCache,
    stats: StatsTracker,
    parallel: ParallelExecutor,
    shut_down: AtomicBool,
    maintenance: Mutex<Option<JoinHandle<()>>>,
}

/// Cache- and concurrency-aware execution layer in front of the git CLI
///
/// Cloning is cheap and every clone shares the same cache, statistics and
/// worker pool.
///
/// Cache keys incorporate the active branch, resolved through a
/// `branch --show-current` probe issued through this same cached pipeline
/// (the probe's own key carries an empty branch component). A branch switch
/// is therefore observed once the probe entry expires, at which point every
/// derived key rolls over and stale answers stop being served.
///
/// # Examples
///
/// ```rust,no_run
/// use git_ops_rs::{GitCommand, GitOperation, GitOpsManager};
///
/// # #[tokio::main]
/// # async fn main() -> git_ops_rs::Result<()> {
/// let manager = GitOpsManager::builder().cache_size(50).build()?;
/// let result = manager
///     .execute_command(GitCommand::new(GitOperation::Status).arg("--porcelain"))
///     .await;
/// if result.success {
///     println!("{}", result.stdout);
/// }
/// manager.shutdown();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GitOpsManager {
    inner: Arc<ManagerInner>,
}

impl GitOpsManager {
    /// Create a manager with the given configuration
    ///
    /// When called inside a tokio runtime, also spawns the background
    /// maintenance task that sweeps expired cache entries.
    ///
    /// # Errors
    ///
    /// Returns [`GitOpsError::Configuration`](crate::GitOpsError) when the
    /// configuration fails validation.
    pub fn new(config: GitOpsConfig) -> Result<Self> {
        config.validate()?;
        if which::which(&config.git_binary).is_err() {
            warn!(
                binary = %config.git_binary,
                "external tool not found on PATH; commands will fail until it is available"
            );
        }

        let inner = Arc::new(ManagerInner {
            cache: OperationCache::new(config.cache_size, config.default_ttl()),
            stats: StatsTracker::new(),
            parallel: ParallelExecutor::new(config.max_workers),
            shut_down: AtomicBool::new(false),
            maintenance: Mutex::new(None),
            config,
        });

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let task = handle.spawn(maintenance_loop(
                Arc::downgrade(&inner),
                inner.config.maintenance_interval(),
            ));
            *inner.maintenance.lock() = Some(task);
        }

        Ok(Self { inner })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> GitOpsManagerBuilder {
        GitOpsManagerBuilder::new()
    }

    /// Execute a single command through the cached pipeline
    ///
    /// Always returns a result value: execution failures, timeouts, a
    /// missing binary and calls after shutdown all surface as
    /// `success = false` with a populated `error` or `stderr`, never as a
    /// propagated error.
    pub async fn execute_command(&self, command: GitCommand) -> GitCommandResult {
        if self.inner.shut_down.load(Ordering::SeqCst) {
            return GitCommandResult::failure(command.operation, command.args, SHUTDOWN_MESSAGE);
        }
        self.run_pipeline(command).await
    }

    /// Execute a batch of independent commands in parallel
    ///
    /// Output order strictly matches input order regardless of completion
    /// timing; empty input yields empty output. One command's failure is
    /// isolated from its siblings.
    pub async fn execute_parallel(&self, commands: Vec<GitCommand>) -> Vec<GitCommandResult> {
        if self.inner.shut_down.load(Ordering::SeqCst) {
            return commands
                .into_iter()
                .map(|c| GitCommandResult::failure(c.operation, c.args, SHUTDOWN_MESSAGE))
                .collect();
        }

        let manager = self.clone();
        self.inner
            .parallel
            .run(commands, move |command| {
                let manager = manager.clone();
                async move { manager.run_pipeline(command).await }
            })
            .await
    }

    /// Assemble the composite project summary
    ///
    /// Issues the constituent queries (branch, last commit, status) as one
    /// parallel batch through the cached pipeline. The summary itself is
    /// not cached as a unit.
    pub async fn project_info(&self) -> ProjectInfo {
        let commands = vec![
            branch_probe(),
            GitCommand::new(GitOperation::Log).args(["-1", "--format=%H%x09%ct"]),
            GitCommand::new(GitOperation::Status).arg("--porcelain"),
        ];
        let results = self.execute_parallel(commands).await;

        let current_branch = results
            .first()
            .filter(|r| r.success)
            .map(|r| r.stdout.trim().to_string())
            .unwrap_or_default();

        let (last_commit, last_commit_time) = results
            .get(1)
            .filter(|r| r.success)
            .map(|r| parse_commit_line(&r.stdout))
            .unwrap_or((None, None));

        let uncommitted_changes = results
            .get(2)
            .filter(|r| r.success)
            .map(|r| r.stdout.lines().filter(|l| !l.trim().is_empty()).count())
            .unwrap_or(0);

        ProjectInfo {
            current_branch,
            last_commit,
            last_commit_time,
            uncommitted_changes,
            collected_at: Utc::now(),
        }
    }

    /// Current statistics, refreshed with the latest cache snapshot
    pub fn statistics(&self) -> OperationStats {
        self.refresh_cache_snapshot();
        self.inner.stats.snapshot()
    }

    /// Zero all statistics counters and the cache snapshot
    pub fn reset_statistics(&self) {
        self.inner.stats.reset();
    }

    /// Remove every cached result for one operation category
    pub fn clear_cache(&self, operation: GitOperation) -> usize {
        let removed = self.inner.cache.clear_operation(operation);
        self.refresh_cache_snapshot();
        removed
    }

    /// Remove every cached result
    pub fn clear_all_cache(&self) -> usize {
        let removed = self.inner.cache.clear_all();
        self.refresh_cache_snapshot();
        removed
    }

    /// Stop accepting work and halt background maintenance
    ///
    /// Idempotent: repeated calls neither error nor deadlock. In-flight
    /// commands run to completion and their callers receive ordinary
    /// results; only subsequently submitted commands are rejected.
    pub fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(task) = self.inner.maintenance.lock().take() {
            task.abort();
        }
        info!("git operations manager shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::SeqCst)
    }

    // Convenience queries, each a thin wrapper over `execute_command`.

    /// Name of the currently checked-out branch
    pub async fn current_branch(&self) -> GitCommandResult {
        self.execute_command(branch_probe()).await
    }

    /// Porcelain status of the working tree
    pub async fn status(&self) -> GitCommandResult {
        self.execute_command(GitCommand::new(GitOperation::Status).arg("--porcelain"))
            .await
    }

    /// The `limit` most recent commits, one line each
    pub async fn log(&self, limit: usize) -> GitCommandResult {
        let limit = limit.to_string();
        self.execute_command(
            GitCommand::new(GitOperation::Log).args(["-n", limit.as_str(), "--oneline"]),
        )
        .await
    }

    /// Diff of the working tree, optionally restricted to `paths`
    pub async fn diff(&self, paths: &[&str]) -> GitCommandResult {
        let mut command = GitCommand::new(GitOperation::Diff);
        if !paths.is_empty() {
            command = command.arg("--").args(paths.iter().copied());
        }
        self.execute_command(command).await
    }

    /// A single configuration value
    pub async fn config_value(&self, name: &str) -> GitCommandResult {
        self.execute_command(GitCommand::new(GitOperation::Config).args(["--get", name]))
            .await
    }

    /// Configured remotes with their URLs
    pub async fn remotes(&self) -> GitCommandResult {
        self.execute_command(GitCommand::new(GitOperation::Remote).arg("-v"))
            .await
    }

    /// Full pipeline for one command: branch resolution, key derivation,
    /// cache-or-execute, store, statistics.
    async fn run_pipeline(&self, command: GitCommand) -> GitCommandResult {
        let branch = if is_branch_probe(&command) {
            String::new()
        } else {
            self.active_branch().await
        };
        self.execute_keyed(command, &branch).await
    }

    /// Resolve the active branch through the cached pipeline
    ///
    /// The probe's key uses an empty branch component, so this never
    /// recurses. A failed probe (not a repository, missing binary) resolves
    /// to an empty branch, which still yields deterministic keys.
    async fn active_branch(&self) -> String {
        let result = self.execute_keyed(branch_probe(), "").await;
        if result.success {
            result.stdout.trim().to_string()
        } else {
            String::new()
        }
    }

    async fn execute_keyed(&self, command: GitCommand, branch: &str) -> GitCommandResult {
        let work_dir: PathBuf = command
            .working_dir
            .clone()
            .unwrap_or_else(|| self.inner.config.working_dir.clone());
        let bypass = command.cache == CachePolicy::Bypass;
        let key = CacheKey::derive(command.operation, &command.args, &work_dir, branch);

        if !bypass {
            if let Some(hit) = self.inner.cache.get(&key) {
                debug!(operation = %command.operation, "cache hit");
                self.inner.stats.record_hit(hit.duration);
                return hit;
            }
        }

        self.inner.stats.operation_admitted();
        let mut result = process::run_with_retry(&self.inner.config, &command).await;
        self.inner.stats.operation_finished();

        if result.success && !bypass {
            let ttl = match command.cache {
                CachePolicy::Ttl(ttl) => Some(ttl),
                _ => None,
            };
            result.cached = true;
            self.inner.cache.insert(key, result.clone(), ttl);
        }

        self.inner.stats.record_execution(result.duration, result.success);
        self.refresh_cache_snapshot();
        result
    }

    fn refresh_cache_snapshot(&self) {
        self.inner
            .stats
            .update_cache_snapshot(self.inner.cache.stats());
    }
}

fn branch_probe() -> GitCommand {
    GitCommand::new(GitOperation::Branch).arg("--show-current")
}

fn is_branch_probe(command: &GitCommand) -> bool {
    command.operation == GitOperation::Branch
        && command.args.len() == 1
        && command.args[0] == "--show-current"
}

/// Parse `<hash>\t<unix-seconds>` as produced by `log -1 --format=%H%x09%ct`
fn parse_commit_line(stdout: &str) -> (Option<String>, Option<DateTime<Utc>>) {
    let line = match stdout.lines().next() {
        Some(line) if !line.trim().is_empty() => line.trim(),
        _ => return (None, None),
    };
    let mut fields = line.splitn(2, '\t');
    let commit = fields.next().map(|raw| raw.trim().to_string());
    let time = fields
        .next()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0));
    (commit, time)
}

async fn maintenance_loop(inner: Weak<ManagerInner>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let inner = match inner.upgrade() {
            Some(inner) => inner,
            None => break,
        };
        let removed = inner.cache.remove_expired();
        if removed > 0 {
            debug!(removed, "maintenance sweep removed expired cache entries");
        }
        inner.stats.update_cache_snapshot(inner.cache.stats());
    }
}

/// Builder for [`GitOpsManager`] instances
///
/// # Examples
///
/// ```rust,no_run
/// use git_ops_rs::GitOpsManager;
///
/// # fn main() -> git_ops_rs::Result<()> {
/// let manager = GitOpsManager::builder()
///     .max_workers(4)
///     .cache_size(200)
///     .default_ttl_secs(60)
///     .working_dir("/path/to/repo")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct GitOpsManagerBuilder {
    config: GitOpsConfig,
}

impl Default for GitOpsManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GitOpsManagerBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: GitOpsConfig::default(),
        }
    }

    /// Set the configuration directly
    pub fn config(mut self, config: GitOpsConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum number of concurrent workers
    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    /// Set the cache size limit
    pub fn cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    /// Set the default cache TTL in seconds
    pub fn default_ttl_secs(mut self, secs: u64) -> Self {
        self.config.default_ttl_secs = secs;
        self
    }

    /// Set the default per-attempt timeout in seconds
    pub fn default_timeout_secs(mut self, secs: u64) -> Self {
        self.config.default_timeout_secs = secs;
        self
    }

    /// Set the default retry count
    pub fn default_retries(mut self, retries: u32) -> Self {
        self.config.default_retries = retries;
        self
    }

    /// Set the fixed delay between retry attempts in milliseconds
    pub fn retry_delay_ms(mut self, millis: u64) -> Self {
        self.config.retry_delay_ms = millis;
        self
    }

    /// Set the background maintenance period in seconds
    pub fn maintenance_interval_secs(mut self, secs: u64) -> Self {
        self.config.maintenance_interval_secs = secs;
        self
    }

    /// Set the default working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.working_dir = dir.into();
        self
    }

    /// Set the git binary name or path
    pub fn git_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.git_binary = binary.into();
        self
    }

    /// Build the manager
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<GitOpsManager> {
        GitOpsManager::new(self.config)
    }
}
