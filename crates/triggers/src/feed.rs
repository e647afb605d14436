//! Newline-delimited event feed driver.
//!
//! Each line is a [`RawEvent`]. Events are handled on their own tasks, at
//! most `max_instances` at a time; finished tasks are reaped as the feed
//! is read, so a long-running feed holds at most `max_instances` task
//! entries.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::event::RawEvent;
use crate::handlers::HandlerOutcome;
use crate::router::TriggerRouter;

/// Counters for one run over a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    /// Lines parsed and handed to a handler.
    pub accepted: usize,
    /// Non-empty lines that were not a valid event.
    pub malformed: usize,
    /// Handler tasks that panicked.
    pub failed: usize,
    /// Most handler tasks held at once.
    pub peak_in_flight: usize,
}

pub struct FeedRunner {
    router: TriggerRouter,
    max_instances: usize,
}

impl FeedRunner {
    pub fn new(router: TriggerRouter, max_instances: usize) -> Self {
        Self {
            router,
            max_instances: max_instances.max(1),
        }
    }

    /// Read `feed` to the end, or until `shutdown` resolves, then wait for
    /// in-flight handlers. A read error is returned after draining.
    pub async fn run<R, S>(&self, feed: R, shutdown: S) -> std::io::Result<FeedSummary>
    where
        R: AsyncBufRead + Unpin,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut tasks = JoinSet::new();
        let mut summary = FeedSummary::default();
        let mut lines = feed.lines();
        let mut read_error = None;

        loop {
            let next = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested, draining in-flight handlers");
                    break;
                }
                next = lines.next_line() => next,
            };
            let line = match next {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "Error reading event feed");
                    read_error = Some(e);
                    break;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let event: RawEvent = match serde_json::from_str(line) {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, line, "Skipping malformed event line");
                    summary.malformed += 1;
                    continue;
                }
            };

            while let Some(result) = tasks.try_join_next() {
                record(result, &mut summary);
            }
            while tasks.len() >= self.max_instances {
                match tasks.join_next().await {
                    Some(result) => record(result, &mut summary),
                    None => break,
                }
            }

            let router = self.router.clone();
            tasks.spawn(async move {
                let outcome = router.dispatch_raw(&event.path, event.value).await;
                log_outcome(&event.path, &outcome);
            });
            summary.accepted += 1;
            summary.peak_in_flight = summary.peak_in_flight.max(tasks.len());
        }

        while let Some(result) = tasks.join_next().await {
            record(result, &mut summary);
        }

        match read_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}

fn record(result: Result<(), JoinError>, summary: &mut FeedSummary) {
    if let Err(e) = result {
        error!(error = %e, "Handler task failed");
        summary.failed += 1;
    }
}

fn log_outcome(path: &str, outcome: &HandlerOutcome) {
    match outcome {
        HandlerOutcome::Notified { alert_type, report } => info!(
            path,
            alert_type = %alert_type,
            record_written = report.record_written(),
            push_sent = report.push_sent(),
            "Alert dispatched"
        ),
        HandlerOutcome::Suppressed(alert_type) => {
            info!(path, alert_type = %alert_type, "Alert suppressed by cooldown")
        }
        other => debug!(path, outcome = ?other, "Event handled"),
    }
}
