//! Unit tests for order-preserving parallel dispatch

use super::parallel::ParallelExecutor;
use crate::core::types::{GitCommand, GitCommandResult, GitOperation};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn command(operation: GitOperation) -> GitCommand {
    GitCommand::new(operation)
}

fn completed(operation: GitOperation, stdout: &str) -> GitCommandResult {
    GitCommandResult {
        success: true,
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: 0,
        duration: Duration::from_millis(1),
        cached: false,
        cache_hit: false,
        operation,
        args: Vec::new(),
        error: None,
    }
}

#[tokio::test]
async fn empty_input_yields_empty_output() {
    let executor = ParallelExecutor::new(4);
    let results = executor
        .run(Vec::new(), |cmd| async move {
            completed(cmd.operation, "unused")
        })
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn results_come_back_in_submission_order() {
    let executor = ParallelExecutor::new(4);
    let commands = vec![
        command(GitOperation::Log),
        command(GitOperation::Branch),
        command(GitOperation::Config),
    ];

    // Earlier submissions finish last; order must still be structural.
    let results = executor
        .run(commands, |cmd| async move {
            let delay = match cmd.operation {
                GitOperation::Log => 80,
                GitOperation::Branch => 40,
                _ => 0,
            };
            sleep(Duration::from_millis(delay)).await;
            completed(cmd.operation, "ok")
        })
        .await;

    let order: Vec<GitOperation> = results.iter().map(|r| r.operation).collect();
    assert_eq!(
        order,
        vec![GitOperation::Log, GitOperation::Branch, GitOperation::Config]
    );
}

#[tokio::test]
async fn concurrency_is_bounded_by_worker_count() {
    let executor = ParallelExecutor::new(2);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let commands: Vec<GitCommand> = (0..8).map(|_| command(GitOperation::Status)).collect();
    let running_probe = Arc::clone(&running);
    let peak_probe = Arc::clone(&peak);

    let results = executor
        .run(commands, move |cmd| {
            let running = Arc::clone(&running_probe);
            let peak = Arc::clone(&peak_probe);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(30)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                completed(cmd.operation, "ok")
            }
        })
        .await;

    assert_eq!(results.len(), 8);
    assert!(
        peak.load(Ordering::SeqCst) <= 2,
        "no more than max_workers pipelines may run at once"
    );
}

#[tokio::test]
async fn one_failure_does_not_abort_siblings() {
    let executor = ParallelExecutor::new(4);
    let commands = vec![
        command(GitOperation::Log),
        command(GitOperation::Branch),
        command(GitOperation::Config),
    ];

    let results = executor
        .run(commands, |cmd| async move {
            if cmd.operation == GitOperation::Branch {
                GitCommandResult::failure(cmd.operation, cmd.args, "simulated failure")
            } else {
                completed(cmd.operation, "ok")
            }
        })
        .await;

    assert!(results[0].success);
    assert!(!results[1].success);
    assert!(results[2].success);
    assert_eq!(results[1].error.as_deref(), Some("simulated failure"));
}

#[tokio::test]
async fn panicking_worker_leaves_a_failed_slot() {
    let executor = ParallelExecutor::new(4);
    let commands = vec![command(GitOperation::Log), command(GitOperation::Status)];

    let results = executor
        .run(commands, |cmd| async move {
            if cmd.operation == GitOperation::Status {
                panic!("worker blew up");
            }
            completed(cmd.operation, "ok")
        })
        .await;

    assert!(results[0].success);
    assert!(!results[1].success);
    assert_eq!(results[1].operation, GitOperation::Status);
}
