//! Order-preserving parallel command dispatch
//!
//! Fans N independent commands out across a bounded worker pool and
//! reassembles results into submission order. Ordering is structural:
//! each worker writes into a pre-allocated slot addressed by submission
//! index, so no sorting happens after the fact.

use crate::core::types::{GitCommand, GitCommandResult, GitOperation};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Bounded-concurrency executor for batches of independent commands
///
/// The semaphore is the admission gate: at most `max_workers` command
/// pipelines run at any instant, while the rest of the batch queues. One
/// command's failure never aborts or affects its siblings.
pub struct ParallelExecutor {
    max_workers: usize,
    semaphore: Arc<Semaphore>,
}

impl ParallelExecutor {
    /// Create an executor running at most `max_workers` commands at once
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            semaphore: Arc::new(Semaphore::new(max_workers)),
        }
    }

    /// Configured concurrency bound
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run `pipeline` over every command, preserving submission order
    ///
    /// Blocks until the whole batch has completed. `results[i]` always
    /// corresponds to `commands[i]` regardless of completion timing. A
    /// worker that dies without producing a result (panic or cancellation)
    /// leaves a failed result in its slot.
    pub async fn run<F, Fut>(&self, commands: Vec<GitCommand>, pipeline: F) -> Vec<GitCommandResult>
    where
        F: Fn(GitCommand) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = GitCommandResult> + Send + 'static,
    {
        if commands.is_empty() {
            return Vec::new();
        }

        // Identity of each slot, kept so a lost worker can still be reported
        // against the command it was running.
        let identities: Vec<(GitOperation, Vec<String>)> = commands
            .iter()
            .map(|command| (command.operation, command.args.clone()))
            .collect();

        let mut slots: Vec<Option<GitCommandResult>> = Vec::new();
        slots.resize_with(commands.len(), || None);

        let mut workers = JoinSet::new();
        for (index, command) in commands.into_iter().enumerate() {
            let semaphore = Arc::clone(&self.semaphore);
            let pipeline = pipeline.clone();
            workers.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, pipeline(command).await)
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(error) => warn!(%error, "parallel worker task died"),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    let (operation, args) = identities[index].clone();
                    GitCommandResult::failure(operation, args, "worker task did not complete")
                })
            })
            .collect()
    }
}
