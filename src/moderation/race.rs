// Provider race — first successful answer wins, the rest are dropped.
//
// `first_success` is the reusable combinator: it polls every branch on the
// current task via FuturesUnordered, so losing branches are cancelled simply
// by being dropped when the race returns. A branch that errors is logged and
// ignored; only an Ok value can win.
//
// RacingFeedbackGenerator applies it to the two chat backends. The secondary
// backend sleeps before it is called, which biases wins (and spend) toward
// the primary under normal latency.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::models::{FeedbackResult, FeedbackSource};
use super::prompts::TIMEOUT_FALLBACK;
use crate::llm::traits::{ChatMessage, ChatProvider};

/// How a race ended.
#[derive(Debug, PartialEq, Eq)]
pub enum RaceOutcome<L, T> {
    /// A branch succeeded before the deadline.
    Won { label: L, value: T },
    /// Every branch failed before the deadline.
    AllFailed,
    /// The deadline elapsed with no successful branch.
    TimedOut,
}

/// Run `branches` concurrently and return the first `Ok` within `deadline`.
///
/// Failed branches do not end the race. Branches still pending when the
/// race returns are dropped, and their results are never observed.
pub async fn first_success<'a, L, T, E>(
    branches: Vec<(L, BoxFuture<'a, Result<T, E>>)>,
    deadline: Duration,
) -> RaceOutcome<L, T>
where
    L: fmt::Debug + Send + 'a,
    T: Send + 'a,
    E: fmt::Display + Send + 'a,
{
    let mut pending: FuturesUnordered<_> = branches
        .into_iter()
        .map(|(label, fut)| async move { (label, fut.await) })
        .collect();

    let first = async {
        while let Some((label, result)) = pending.next().await {
            match result {
                Ok(value) => return Some((label, value)),
                Err(e) => {
                    warn!(branch = ?label, error = %e, "Race branch failed, waiting on the rest");
                }
            }
        }
        None
    };

    let outcome = match tokio::time::timeout(deadline, first).await {
        Ok(Some((label, value))) => RaceOutcome::Won { label, value },
        Ok(None) => RaceOutcome::AllFailed,
        Err(_) => RaceOutcome::TimedOut,
    };

    if !pending.is_empty() {
        debug!(cancelled = pending.len(), "Dropping unfinished race branches");
    }
    outcome
}

/// Timing knobs for the moderation pipeline's provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceSettings {
    /// Overall bound on the feedback race, measured from launch.
    pub deadline: Duration,
    /// Unconditional wait before the secondary backend is called.
    pub secondary_delay: Duration,
    /// Bound on each structured extraction call.
    pub extract_timeout: Duration,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(20),
            secondary_delay: Duration::from_secs(10),
            extract_timeout: Duration::from_secs(20),
        }
    }
}

/// Races two chat backends for engagement feedback.
#[derive(Clone)]
pub struct RacingFeedbackGenerator {
    primary: Arc<dyn ChatProvider>,
    secondary: Arc<dyn ChatProvider>,
    secondary_delay: Duration,
}

impl RacingFeedbackGenerator {
    pub fn new(
        primary: Arc<dyn ChatProvider>,
        secondary: Arc<dyn ChatProvider>,
        secondary_delay: Duration,
    ) -> Self {
        Self {
            primary,
            secondary,
            secondary_delay,
        }
    }

    /// Ask both backends for feedback and keep whichever answers first.
    ///
    /// Always resolves: if nothing succeeds within `deadline` the fixed
    /// timeout text is returned with `FeedbackSource::Fallback`.
    pub async fn race(&self, messages: &[ChatMessage], deadline: Duration) -> FeedbackResult {
        let started = Instant::now();

        let secondary: BoxFuture<'_, anyhow::Result<String>> = Box::pin(async move {
            tokio::time::sleep(self.secondary_delay).await;
            self.secondary.complete(messages).await
        });
        let primary: BoxFuture<'_, anyhow::Result<String>> =
            Box::pin(async move { self.primary.complete(messages).await });

        let branches = vec![
            (FeedbackSource::Secondary, secondary),
            (FeedbackSource::Primary, primary),
        ];

        match first_success(branches, deadline).await {
            RaceOutcome::Won { label, value } => {
                info!(
                    source = %label,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Feedback race won"
                );
                FeedbackResult {
                    text: value,
                    source: label,
                }
            }
            RaceOutcome::AllFailed => {
                warn!("Both feedback providers failed, using fallback text");
                fallback()
            }
            RaceOutcome::TimedOut => {
                warn!(
                    deadline_secs = deadline.as_secs_f64(),
                    "No feedback provider answered in time, using fallback text"
                );
                fallback()
            }
        }
    }
}

fn fallback() -> FeedbackResult {
    FeedbackResult {
        text: TIMEOUT_FALLBACK.to_string(),
        source: FeedbackSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Branch = BoxFuture<'static, Result<&'static str, &'static str>>;

    fn after(delay_ms: u64, result: Result<&'static str, &'static str>) -> Branch {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            result
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fastest_success_wins() {
        let outcome = first_success(
            vec![("slow", after(300, Ok("b"))), ("fast", after(100, Ok("a")))],
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(
            outcome,
            RaceOutcome::Won {
                label: "fast",
                value: "a"
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn early_failure_does_not_win() {
        let start = Instant::now();
        let outcome = first_success(
            vec![("broken", after(0, Err("boom"))), ("ok", after(500, Ok("late")))],
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(
            outcome,
            RaceOutcome::Won {
                label: "ok",
                value: "late"
            }
        );
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn all_failures_end_the_race_early() {
        let start = Instant::now();
        let outcome = first_success(
            vec![("a", after(10, Err("x"))), ("b", after(20, Err("y")))],
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(outcome, RaceOutcome::<&str, &str>::AllFailed);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_bounds_the_race() {
        let start = Instant::now();
        let outcome = first_success(
            vec![("a", after(10_000, Ok("x"))), ("b", after(20_000, Ok("y")))],
            Duration::from_secs(2),
        )
        .await;
        assert_eq!(outcome, RaceOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn loser_never_runs_past_cancellation() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();
        let loser: Branch = Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("loser")
        });

        let outcome = first_success(
            vec![("loser", loser), ("winner", after(100, Ok("winner")))],
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(outcome, RaceOutcome::Won { label: "winner", .. }));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
