//! Core data types for git command execution
//!
//! This module defines:
//! - The fixed set of supported git query categories
//! - Command specifications with per-call overrides
//! - Normalized command results with cache provenance flags
//! - The composite project summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The fixed set of git query categories the manager executes
///
/// Each category maps to exactly one git sub-command verb; arguments beyond
/// the verb are passed through opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitOperation {
    Branch,
    Commit,
    Status,
    Log,
    Diff,
    Remote,
    Config,
}

impl GitOperation {
    /// All supported operation categories
    pub const ALL: [GitOperation; 7] = [
        GitOperation::Branch,
        GitOperation::Commit,
        GitOperation::Status,
        GitOperation::Log,
        GitOperation::Diff,
        GitOperation::Remote,
        GitOperation::Config,
    ];

    /// The git sub-command verb for this category
    pub fn verb(&self) -> &'static str {
        match self {
            GitOperation::Branch => "branch",
            GitOperation::Commit => "commit",
            GitOperation::Status => "status",
            GitOperation::Log => "log",
            GitOperation::Diff => "diff",
            GitOperation::Remote => "remote",
            GitOperation::Config => "config",
        }
    }
}

impl fmt::Display for GitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Per-call cache behavior
///
/// `UseDefault` applies the manager's configured TTL, `Ttl` overrides it for
/// this call, and `Bypass` disables caching for this call only (the result
/// is neither looked up nor stored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CachePolicy {
    #[default]
    UseDefault,
    Ttl(Duration),
    Bypass,
}

/// A single git command to execute
///
/// Built fluently; unset overrides fall back to the manager configuration.
///
/// # Examples
///
/// ```rust
/// use git_ops_rs::{GitCommand, GitOperation};
/// use std::time::Duration;
///
/// let cmd = GitCommand::new(GitOperation::Log)
///     .args(["-n", "5", "--oneline"])
///     .cache_ttl(Duration::from_secs(10))
///     .retries(1);
/// assert_eq!(cmd.args.len(), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitCommand {
    /// Operation category, determining the git sub-command verb
    pub operation: GitOperation,

    /// Ordered arguments passed through after the verb
    #[serde(default)]
    pub args: Vec<String>,

    /// Cache behavior for this call
    #[serde(default)]
    pub cache: CachePolicy,

    /// Retry count override; `None` uses the manager default
    #[serde(default)]
    pub retries: Option<u32>,

    /// Per-attempt timeout override; `None` uses the manager default
    #[serde(default)]
    pub timeout: Option<Duration>,

    /// Working directory override; `None` uses the manager default
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl GitCommand {
    /// Create a command specification for the given operation
    pub fn new(operation: GitOperation) -> Self {
        Self {
            operation,
            args: Vec::new(),
            cache: CachePolicy::UseDefault,
            retries: None,
            timeout: None,
            working_dir: None,
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Override the cache TTL for this call
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = CachePolicy::Ttl(ttl);
        self
    }

    /// Disable caching for this call only
    pub fn no_cache(mut self) -> Self {
        self.cache = CachePolicy::Bypass;
        self
    }

    /// Override the retry count for this call
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Override the per-attempt timeout for this call
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the working directory for this call
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Normalized outcome of one git command
///
/// Always returned by value; callers branch on [`success`](Self::success)
/// rather than on errors. A copy served from the cache carries
/// `cache_hit = true` and is never mutated in place by its consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitCommandResult {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error, kept separate from stdout
    pub stderr: String,
    /// Process exit code; `-1` when the process never produced one
    pub exit_code: i32,
    /// Wall-clock time of the attempt that produced this result
    pub duration: Duration,
    /// Whether this result was stored in the cache for future use
    pub cached: bool,
    /// Whether this result was served from the cache this call
    pub cache_hit: bool,
    /// Operation category that produced this result
    pub operation: GitOperation,
    /// The literal argument vector executed, excluding binary and verb
    pub args: Vec<String>,
    /// Cause for failures that never reached a process exit
    pub error: Option<String>,
}

impl GitCommandResult {
    /// Build a failed result that carries no process output
    pub fn failure(
        operation: GitOperation,
        args: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: -1,
            duration: Duration::ZERO,
            cached: false,
            cache_hit: false,
            operation,
            args,
            error: Some(message.into()),
        }
    }
}

/// Composite summary of the repository state
///
/// Assembled from independent underlying queries; the summary itself is
/// never cached as a unit, only its constituent commands are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Currently checked-out branch; empty when detached or unavailable
    pub current_branch: String,
    /// Identifier of the most recent commit
    pub last_commit: Option<String>,
    /// Author time of the most recent commit
    pub last_commit_time: Option<DateTime<Utc>>,
    /// Number of paths with uncommitted changes
    pub uncommitted_changes: usize,
    /// When this summary was assembled
    pub collected_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_verbs_are_stable() {
        assert_eq!(GitOperation::Branch.verb(), "branch");
        assert_eq!(GitOperation::Log.verb(), "log");
        assert_eq!(GitOperation::Config.verb(), "config");
        assert_eq!(GitOperation::ALL.len(), 7);
    }

    #[test]
    fn display_matches_verb() {
        for operation in GitOperation::ALL {
            assert_eq!(operation.to_string(), operation.verb());
        }
    }

    #[test]
    fn builder_accumulates_overrides() {
        let cmd = GitCommand::new(GitOperation::Diff)
            .arg("--stat")
            .args(["HEAD~1", "HEAD"])
            .no_cache()
            .retries(3)
            .timeout(Duration::from_secs(5))
            .working_dir("/tmp");

        assert_eq!(cmd.args, vec!["--stat", "HEAD~1", "HEAD"]);
        assert_eq!(cmd.cache, CachePolicy::Bypass);
        assert_eq!(cmd.retries, Some(3));
        assert_eq!(cmd.timeout, Some(Duration::from_secs(5)));
        assert_eq!(cmd.working_dir, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn command_round_trips_through_json() {
        let cmd = GitCommand::new(GitOperation::Status).arg("--porcelain");
        let json = serde_json::to_string(&cmd).unwrap();
        let back: GitCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back.operation, GitOperation::Status);
        assert_eq!(back.args, vec!["--porcelain"]);
        assert_eq!(back.cache, CachePolicy::UseDefault);
    }

    #[test]
    fn failure_result_reports_cause() {
        let result = GitCommandResult::failure(
            GitOperation::Status,
            vec!["--porcelain".to_string()],
            "binary not found",
        );
        assert!(!result.success);
        assert_eq!(result.exit_code, -1);
        assert!(!result.cache_hit);
        assert_eq!(result.error.as_deref(), Some("binary not found"));
    }
}
