//! Action routing
//!
//! Maps the requested [`ActionKind`] onto its reconciler and runs it under
//! the deadline controller.

use std::fmt;
use std::str::FromStr;

use tracing::info;

use super::client::ReleaseClient;
use super::deadline::{self, ExecutionContext, ReconcileOutcome};
use super::delete::DeleteReconciler;
use super::install::InstallReconciler;
use crate::error::{Error, Result};
use crate::payload::ReleaseDescriptor;

/// Lifecycle operation requested by the workflow engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Install,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Install => "install",
            ActionKind::Delete => "delete",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "install" => Ok(ActionKind::Install),
            "delete" => Ok(ActionKind::Delete),
            other => Err(Error::ConfigError(format!(
                "invalid executor action: {other:?}, must be either install or delete"
            ))),
        }
    }
}

/// Run the reconciler for `action` to a terminal outcome
pub async fn execute<C: ReleaseClient + ?Sized>(
    action: ActionKind,
    ctx: &ExecutionContext,
    client: &C,
    descriptor: &ReleaseDescriptor,
) -> ReconcileOutcome {
    info!(
        "Executing {} for HelmRelease {} (chart {}, timeout {:?}, interval {:?})",
        action,
        descriptor.identity,
        descriptor.chart_reference(),
        ctx.timeout(),
        ctx.interval()
    );

    match action {
        ActionKind::Install => {
            let mut reconciler = InstallReconciler::new(client, descriptor);
            deadline::run(ctx, &mut reconciler).await
        }
        ActionKind::Delete => {
            let mut reconciler = DeleteReconciler::new(client, descriptor);
            deadline::run(ctx, &mut reconciler).await
        }
    }
}

/// Run `action` and turn its outcome into the executor's result
pub async fn run_action<C: ReleaseClient + ?Sized>(
    action: ActionKind,
    ctx: &ExecutionContext,
    client: &C,
    descriptor: &ReleaseDescriptor,
) -> Result<()> {
    match execute(action, ctx, client, descriptor).await {
        ReconcileOutcome::Converged => {
            match action {
                ActionKind::Install => info!("HelmRelease {} converged", descriptor.identity),
                ActionKind::Delete => info!("HelmRelease {} is absent", descriptor.identity),
            }
            Ok(())
        }
        ReconcileOutcome::TimedOut => Err(Error::TimedOut(ctx.timeout())),
        ReconcileOutcome::Failed(reason) => Err(Error::ReconcileFailed(format!(
            "failed to {} HelmRelease {}: {}",
            action, descriptor.identity, reason
        ))),
    }
}
