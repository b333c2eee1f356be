//! Periodic usage reporting.

use super::usage::{UsageCounters, UsageSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Background task that logs [`UsageCounters`] whenever they change.
pub struct UsageReporter {
    handle: JoinHandle<UsageSnapshot>,
    cancel: CancellationToken,
}

impl UsageReporter {
    /// Start polling every `interval`. Stops when `cancel` fires or on [`stop`](Self::stop).
    pub fn spawn(
        counters: Arc<UsageCounters>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let token = cancel.child_token();
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut last = UsageSnapshot::default();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let snap = counters.snapshot();
                        if snap != last {
                            info!(
                                total_tokens = snap.total,
                                prompt_tokens = snap.prompt,
                                completion_tokens = snap.completion,
                                "token usage"
                            );
                            last = snap;
                        }
                    }
                }
            }
            counters.snapshot()
        });
        Self {
            handle,
            cancel: token,
        }
    }

    /// Stop the task and return the final snapshot.
    pub async fn stop(self) -> UsageSnapshot {
        self.cancel.cancel();
        self.handle.await.unwrap_or_default()
    }
}
