//! Subprocess execution with bounded timeout and retry
//!
//! Builds argv as `[binary, operation-verb, ...args]`, captures stdout and
//! stderr separately, and normalizes every outcome into a
//! [`GitCommandResult`]. Launch failures and timeouts become failed results
//! rather than errors so that batches report partial outcomes.

use crate::core::config::GitOpsConfig;
use crate::core::types::{GitCommand, GitCommandResult};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Execute one command, retrying failed attempts up to the retry budget
///
/// Attempts number `1 + retries`. Only failed attempts (non-zero exit,
/// launch failure, timeout) are retried, with a fixed delay between
/// attempts. When all attempts fail, the returned result reflects the last
/// attempt only: its output, exit code and elapsed time.
pub(crate) async fn run_with_retry(
    config: &GitOpsConfig,
    command: &GitCommand,
) -> GitCommandResult {
    let attempt_timeout = command.timeout.unwrap_or_else(|| config.default_timeout());
    let retries = command.retries.unwrap_or(config.default_retries);
    let work_dir = command
        .working_dir
        .as_deref()
        .unwrap_or(config.working_dir.as_path());
    let attempts = retries.saturating_add(1);

    let mut result = run_once(&config.git_binary, command, work_dir, attempt_timeout).await;
    let mut attempt = 1;
    while !result.success && attempt < attempts {
        warn!(
            operation = %command.operation,
            attempt,
            remaining = attempts - attempt,
            error = result.error.as_deref().unwrap_or("non-zero exit"),
            "command attempt failed, retrying"
        );
        let delay = config.retry_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
        result = run_once(&config.git_binary, command, work_dir, attempt_timeout).await;
        attempt += 1;
    }
    result
}

/// Run a single bounded attempt of the command
async fn run_once(
    binary: &str,
    command: &GitCommand,
    work_dir: &Path,
    attempt_timeout: Duration,
) -> GitCommandResult {
    debug!(
        binary,
        operation = %command.operation,
        args = ?command.args,
        dir = %work_dir.display(),
        "executing command"
    );

    let started = Instant::now();
    let mut process = Command::new(binary);
    process
        .arg(command.operation.verb())
        .args(&command.args)
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(attempt_timeout, process.output()).await {
        Ok(Ok(output)) => GitCommandResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: started.elapsed(),
            cached: false,
            cache_hit: false,
            operation: command.operation,
            args: command.args.clone(),
            error: None,
        },
        Ok(Err(launch_error)) => {
            let mut result = GitCommandResult::failure(
                command.operation,
                command.args.clone(),
                format!("failed to launch {binary}: {launch_error}"),
            );
            result.duration = started.elapsed();
            result
        }
        Err(_) => {
            // The in-flight child is killed when the dropped future releases it.
            let mut result = GitCommandResult::failure(
                command.operation,
                command.args.clone(),
                format!("timed out after {}ms", attempt_timeout.as_millis()),
            );
            result.duration = started.elapsed();
            result
        }
    }
}
