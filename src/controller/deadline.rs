//! Deadline and retry control for reconcilers
//!
//! [`run`] drives a [`Reconciler`] one step per interval tick until it
//! reports a terminal state, hits a permanent error, or the
//! [`ExecutionContext`] is cancelled. Both the step and the interval wait are
//! raced against cancellation, so a timeout is observed promptly.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::client::ClientError;

/// Upper bound applied when `now + timeout` would overflow the clock
const MAX_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Deadline, cancellation signal and retry interval of one invocation
#[derive(Debug)]
pub struct ExecutionContext {
    deadline: Instant,
    timeout: Duration,
    interval: Duration,
    cancel_tx: watch::Sender<bool>,
}

impl ExecutionContext {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        let now = Instant::now();
        Self {
            deadline: now.checked_add(timeout).unwrap_or(now + MAX_TIMEOUT),
            timeout,
            interval,
            cancel_tx,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Fire the cancellation signal; idempotent
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow() || Instant::now() >= self.deadline
    }

    /// Resolves once the deadline passes or [`cancel`](Self::cancel) is called
    pub async fn cancelled(&self) {
        let mut cancel_rx = self.cancel_tx.subscribe();
        tokio::select! {
            _ = tokio::time::sleep_until(self.deadline) => {}
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => {}
        }
    }

    /// Wait one interval. Returns `false` if cancelled before it elapsed.
    pub async fn wait_interval(&self) -> bool {
        tokio::select! {
            biased;
            _ = self.cancelled() => false,
            _ = tokio::time::sleep(self.interval) => true,
        }
    }
}

/// Terminal result of a reconciliation run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Converged,
    TimedOut,
    Failed(String),
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::Converged => f.write_str("Converged"),
            ReconcileOutcome::TimedOut => f.write_str("TimedOut"),
            ReconcileOutcome::Failed(reason) => write!(f, "Failed: {reason}"),
        }
    }
}

/// Result of a single reconciler step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Not terminal yet, poll again after the interval
    Pending,
    /// Terminal success
    Done,
}

/// A state machine advanced once per poll tick
#[async_trait]
pub trait Reconciler: Send {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Observe remote state and advance. Permanent errors move the
    /// reconciler to its failed state before being returned.
    async fn step(&mut self) -> Result<Progress, ClientError>;
}

/// Drive `reconciler` to a terminal outcome under `ctx`
pub async fn run<R: Reconciler + ?Sized>(
    ctx: &ExecutionContext,
    reconciler: &mut R,
) -> ReconcileOutcome {
    let outcome = poll(ctx, reconciler).await;
    ctx.cancel();
    outcome
}

async fn poll<R: Reconciler + ?Sized>(
    ctx: &ExecutionContext,
    reconciler: &mut R,
) -> ReconcileOutcome {
    let name = reconciler.name();
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        debug!("{} reconciler attempt {}", name, attempt);

        let step = tokio::select! {
            biased;
            _ = ctx.cancelled() => None,
            step = reconciler.step() => Some(step),
        };

        match step {
            None => {
                warn!(
                    "{} reconciler timed out after {:?} ({} attempts)",
                    name, ctx.timeout, attempt
                );
                return ReconcileOutcome::TimedOut;
            }
            Some(Ok(Progress::Done)) => {
                info!("{} reconciler converged after {} attempts", name, attempt);
                return ReconcileOutcome::Converged;
            }
            Some(Ok(Progress::Pending)) => {
                debug!(
                    "{} reconciler not converged, retrying in {:?} ({:?} left)",
                    name,
                    ctx.interval,
                    ctx.remaining()
                );
            }
            Some(Err(ClientError::Transient(reason))) => {
                warn!(
                    "{} reconciler hit a transient error, retrying in {:?}: {}",
                    name, ctx.interval, reason
                );
            }
            Some(Err(ClientError::Permanent(reason))) => {
                error!("{} reconciler failed: {}", name, reason);
                return ReconcileOutcome::Failed(reason);
            }
        }

        if !ctx.wait_interval().await {
            warn!(
                "{} reconciler timed out after {:?} ({} attempts)",
                name, ctx.timeout, attempt
            );
            return ReconcileOutcome::TimedOut;
        }
    }
}
