//! Install reconciler
//!
//! Ensures the described HelmRelease exists with the desired spec and waits
//! for the helm-controller to report it ready.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::client::{ClientError, ReleaseClient, RemoteResourceState};
use super::conditions::{ready_summary, stalled_condition};
use super::deadline::{Progress, Reconciler};
use crate::payload::ReleaseDescriptor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallState {
    NotApplied,
    Applying,
    Converging,
    Converged,
    Failed,
}

pub struct InstallReconciler<'a, C: ReleaseClient + ?Sized> {
    client: &'a C,
    descriptor: &'a ReleaseDescriptor,
    state: InstallState,
}

impl<'a, C: ReleaseClient + ?Sized> InstallReconciler<'a, C> {
    pub fn new(client: &'a C, descriptor: &'a ReleaseDescriptor) -> Self {
        if descriptor.spec.suspend == Some(true) {
            warn!(
                "HelmRelease {} is suspended; the helm-controller will not report it ready",
                descriptor.identity
            );
        }
        Self {
            client,
            descriptor,
            state: InstallState::NotApplied,
        }
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    fn transition(&mut self, next: InstallState) {
        if self.state != next {
            info!(
                "HelmRelease {} install: {:?} -> {:?}",
                self.descriptor.identity, self.state, next
            );
            self.state = next;
        }
    }

    #[instrument(skip(self), fields(release = %self.descriptor.identity, state = ?self.state))]
    async fn advance(&mut self) -> Result<Progress, ClientError> {
        let client = self.client;
        let descriptor = self.descriptor;
        match self.state {
            InstallState::NotApplied => {
                match client.fetch(&descriptor.identity).await? {
                    Some(remote) if remote.matches(descriptor) => {
                        if remote.is_ready() {
                            info!(
                                "HelmRelease {} already matches {} and is ready",
                                descriptor.identity,
                                descriptor.chart_reference()
                            );
                            self.transition(InstallState::Converged);
                            return Ok(Progress::Done);
                        }
                        check_stalled(&remote)?;
                        self.transition(InstallState::Converging);
                        Ok(Progress::Pending)
                    }
                    Some(_) => {
                        info!(
                            "HelmRelease {} differs from the desired spec",
                            descriptor.identity
                        );
                        self.transition(InstallState::Applying);
                        self.apply().await
                    }
                    None => {
                        self.transition(InstallState::Applying);
                        self.apply().await
                    }
                }
            }
            InstallState::Applying => self.apply().await,
            InstallState::Converging => {
                match client.fetch(&descriptor.identity).await? {
                    None => {
                        warn!(
                            "HelmRelease {} disappeared while converging, re-applying",
                            descriptor.identity
                        );
                        self.transition(InstallState::NotApplied);
                        Ok(Progress::Pending)
                    }
                    Some(remote) if !remote.matches(descriptor) => {
                        warn!(
                            "HelmRelease {} was modified by another writer, re-applying",
                            descriptor.identity
                        );
                        self.transition(InstallState::NotApplied);
                        Ok(Progress::Pending)
                    }
                    Some(remote) if remote.is_ready() => {
                        self.transition(InstallState::Converged);
                        Ok(Progress::Done)
                    }
                    Some(remote) => {
                        check_stalled(&remote)?;
                        debug!(
                            "HelmRelease {} not ready yet: {}",
                            descriptor.identity,
                            ready_summary(remote.status.as_ref())
                        );
                        Ok(Progress::Pending)
                    }
                }
            }
            InstallState::Converged => Ok(Progress::Done),
            InstallState::Failed => Err(ClientError::Permanent(format!(
                "install of HelmRelease {} already failed",
                descriptor.identity
            ))),
        }
    }

    async fn apply(&mut self) -> Result<Progress, ClientError> {
        self.client.apply(self.descriptor).await?;
        info!(
            "Applied HelmRelease {} with chart {}",
            self.descriptor.identity,
            self.descriptor.chart_reference()
        );
        self.transition(InstallState::Converging);
        Ok(Progress::Pending)
    }
}

/// The helm-controller stops retrying a stalled release, so waiting is pointless
fn check_stalled(remote: &RemoteResourceState) -> Result<(), ClientError> {
    match stalled_condition(remote.status.as_ref(), remote.generation) {
        Some(stalled) => Err(ClientError::Permanent(format!(
            "release stalled ({}): {}",
            stalled.reason, stalled.message
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl<'a, C: ReleaseClient + ?Sized> Reconciler for InstallReconciler<'a, C> {
    fn name(&self) -> &'static str {
        "install"
    }

    async fn step(&mut self) -> Result<Progress, ClientError> {
        let result = self.advance().await;
        if let Err(ClientError::Permanent(_)) = &result {
            self.transition(InstallState::Failed);
        }
        result
    }
}
