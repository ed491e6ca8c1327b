//! Delete reconciler
//!
//! Ensures the described HelmRelease is absent. Deletion only completes once
//! the helm-controller has uninstalled the Helm release and dropped its
//! finalizer, so the reconciler polls until the object is gone.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::client::{ClientError, ReleaseClient};
use super::deadline::{Progress, Reconciler};
use crate::payload::ReleaseDescriptor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteState {
    Present,
    Removing,
    Absent,
    Failed,
}

pub struct DeleteReconciler<'a, C: ReleaseClient + ?Sized> {
    client: &'a C,
    descriptor: &'a ReleaseDescriptor,
    state: DeleteState,
}

impl<'a, C: ReleaseClient + ?Sized> DeleteReconciler<'a, C> {
    pub fn new(client: &'a C, descriptor: &'a ReleaseDescriptor) -> Self {
        Self {
            client,
            descriptor,
            state: DeleteState::Present,
        }
    }

    pub fn state(&self) -> DeleteState {
        self.state
    }

    fn transition(&mut self, next: DeleteState) {
        if self.state != next {
            info!(
                "HelmRelease {} delete: {:?} -> {:?}",
                self.descriptor.identity, self.state, next
            );
            self.state = next;
        }
    }

    #[instrument(skip(self), fields(release = %self.descriptor.identity, state = ?self.state))]
    async fn advance(&mut self) -> Result<Progress, ClientError> {
        let client = self.client;
        let descriptor = self.descriptor;
        let identity = &descriptor.identity;
        match self.state {
            DeleteState::Present => match client.fetch(identity).await? {
                None => {
                    info!("HelmRelease {} is already absent", identity);
                    self.transition(DeleteState::Absent);
                    Ok(Progress::Done)
                }
                Some(remote) if remote.deleting => {
                    info!("HelmRelease {} is already being deleted", identity);
                    self.transition(DeleteState::Removing);
                    Ok(Progress::Pending)
                }
                Some(_) => {
                    client.remove(identity).await?;
                    self.transition(DeleteState::Removing);
                    Ok(Progress::Pending)
                }
            },
            DeleteState::Removing => match client.fetch(identity).await? {
                None => {
                    self.transition(DeleteState::Absent);
                    Ok(Progress::Done)
                }
                Some(_) => {
                    debug!(
                        "HelmRelease {} still present, waiting for finalizers",
                        identity
                    );
                    Ok(Progress::Pending)
                }
            },
            DeleteState::Absent => Ok(Progress::Done),
            DeleteState::Failed => Err(ClientError::Permanent(format!(
                "delete of HelmRelease {} already failed",
                identity
            ))),
        }
    }
}

#[async_trait]
impl<'a, C: ReleaseClient + ?Sized> Reconciler for DeleteReconciler<'a, C> {
    fn name(&self) -> &'static str {
        "delete"
    }

    async fn step(&mut self) -> Result<Progress, ClientError> {
        let result = self.advance().await;
        if let Err(ClientError::Permanent(_)) = &result {
            self.transition(DeleteState::Failed);
        }
        result
    }
}
