// src/pool.rs
//! Bounded fan-out shared by the probing and reverse lookup phases.
//!
//! Every item becomes one spawned task. A semaphore caps how many run at
//! once, results are collected in completion order, and the progress bar
//! advances exactly once per item whatever the task's fate.

use crate::types::DnscopeError;
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::ProgressBar;
use log::warn;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<I, T> {
    Completed(T),
    /// The task panicked or never got to run.
    Failed { item: I, reason: String },
}

impl<I, T> TaskOutcome<I, T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }
}

/// Pool size used when none is configured: min(32, cores + 4).
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_add(4)
        .min(32)
}

pub async fn run_bounded<I, T, F, Fut>(
    items: Vec<I>,
    workers: usize,
    progress: &ProgressBar,
    cancel: &CancellationToken,
    task: F,
) -> Result<Vec<TaskOutcome<I, T>>, DnscopeError>
where
    I: Clone + Debug + Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut futures = FuturesUnordered::new();
    let mut abort_handles = Vec::with_capacity(items.len());

    for item in items {
        let semaphore = semaphore.clone();
        let work = task(item.clone());

        let handle = tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return None;
            };
            Some(work.await)
        });
        abort_handles.push(handle.abort_handle());

        futures.push(async move { (item, handle.await) });
    }

    let mut outcomes = Vec::with_capacity(abort_handles.len());

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                semaphore.close();
                for handle in &abort_handles {
                    handle.abort();
                }
                return Err(DnscopeError::Cancelled);
            }

            next = futures.next() => {
                let outcome = match next {
                    Some((_, Ok(Some(value)))) => TaskOutcome::Completed(value),
                    Some((item, Ok(None))) => TaskOutcome::Failed {
                        item,
                        reason: "worker pool closed".to_string(),
                    },
                    Some((item, Err(e))) => {
                        warn!("Task for {:?} failed: {}", item, e);
                        TaskOutcome::Failed {
                            item,
                            reason: e.to_string(),
                        }
                    }
                    None => break,
                };
                outcomes.push(outcome);
                progress.inc(1);
            }
        }
    }

    Ok(outcomes)
}
