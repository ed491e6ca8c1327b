//! Execution core for HelmRelease actions
//! This module contains the resource client facade, the install and delete
//! reconcilers, and the deadline-bounded poll loop that drives them.

mod actions;
pub mod client;
pub mod conditions;
pub mod deadline;
mod delete;
mod install;
#[cfg(test)]
mod testing;

pub use actions::{execute, run_action, ActionKind};
pub use client::{ClientError, KubeReleaseClient, ReleaseClient, RemoteResourceState};
pub use deadline::{ExecutionContext, Progress, ReconcileOutcome, Reconciler};
pub use delete::{DeleteReconciler, DeleteState};
pub use install::{InstallReconciler, InstallState};
