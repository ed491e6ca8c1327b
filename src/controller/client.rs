//! Resource client facade over the Kubernetes API
//!
//! Reconcilers only talk to the control plane through [`ReleaseClient`], so
//! they can be driven by a fake in tests. Every failure is classified as
//! transient or permanent where the call returns.

use async_trait::async_trait;
use kube::{
    api::{Api, DeleteParams, Patch, PatchParams},
    Client, ResourceExt,
};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::crd::{HelmRelease, HelmReleaseSpec, HelmReleaseStatus};
use crate::payload::{ReleaseDescriptor, ReleaseIdentity};

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "helmrelease-executor";

/// Classified failure of a remote call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Connectivity or server-side hiccup, safe to retry
    #[error("transient error: {0}")]
    Transient(String),

    /// Authorization, validation or malformed request, never retried
    #[error("permanent error: {0}")]
    Permanent(String),
}

impl ClientError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Transient(_))
    }
}

/// Live read of a release from the control plane
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteResourceState {
    pub generation: Option<i64>,
    pub spec: HelmReleaseSpec,
    pub status: Option<HelmReleaseStatus>,
    /// Deletion was requested and finalizers are still running
    pub deleting: bool,
}

impl RemoteResourceState {
    /// Whether the live spec contains every field of the desired spec
    pub fn matches(&self, desired: &ReleaseDescriptor) -> bool {
        match (
            serde_json::to_value(&desired.spec),
            serde_json::to_value(&self.spec),
        ) {
            (Ok(desired), Ok(live)) => is_subset(&desired, &live),
            _ => false,
        }
    }

    pub fn is_ready(&self) -> bool {
        super::conditions::is_ready(self.status.as_ref(), self.generation)
    }
}

impl From<HelmRelease> for RemoteResourceState {
    fn from(release: HelmRelease) -> Self {
        Self {
            generation: release.metadata.generation,
            deleting: release.metadata.deletion_timestamp.is_some(),
            spec: release.spec,
            status: release.status,
        }
    }
}

/// Objects must match key by key; every other value must be equal
fn is_subset(desired: &serde_json::Value, live: &serde_json::Value) -> bool {
    match (desired, live) {
        (serde_json::Value::Object(desired), serde_json::Value::Object(live)) => {
            desired.iter().all(|(key, value)| {
                live.get(key)
                    .map(|live_value| is_subset(value, live_value))
                    .unwrap_or(false)
            })
        }
        _ => desired == live,
    }
}

/// Capabilities the reconcilers need from the control plane
#[async_trait]
pub trait ReleaseClient: Send + Sync {
    /// Read the release; `Ok(None)` when it does not exist
    async fn fetch(
        &self,
        identity: &ReleaseIdentity,
    ) -> Result<Option<RemoteResourceState>, ClientError>;

    /// Create or update the release to the desired descriptor
    async fn apply(&self, descriptor: &ReleaseDescriptor) -> Result<(), ClientError>;

    /// Request deletion of the release
    async fn remove(&self, identity: &ReleaseIdentity) -> Result<(), ClientError>;
}

/// [`ReleaseClient`] backed by a kube-rs client
#[derive(Clone)]
pub struct KubeReleaseClient {
    client: Client,
}

impl KubeReleaseClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<HelmRelease> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ReleaseClient for KubeReleaseClient {
    #[instrument(skip(self), fields(release = %identity))]
    async fn fetch(
        &self,
        identity: &ReleaseIdentity,
    ) -> Result<Option<RemoteResourceState>, ClientError> {
        let release = self
            .api(&identity.namespace)
            .get_opt(&identity.name)
            .await
            .map_err(classify)?;
        Ok(release.map(RemoteResourceState::from))
    }

    #[instrument(skip(self, descriptor), fields(release = %descriptor.identity))]
    async fn apply(&self, descriptor: &ReleaseDescriptor) -> Result<(), ClientError> {
        let identity = &descriptor.identity;
        let resource = descriptor.to_resource();
        let params = PatchParams::apply(FIELD_MANAGER).force();

        let applied = self
            .api(&identity.namespace)
            .patch(&identity.name, &params, &Patch::Apply(&resource))
            .await
            .map_err(classify)?;

        debug!(
            "Applied HelmRelease {} at generation {:?} (resourceVersion {:?})",
            identity,
            applied.metadata.generation,
            applied.resource_version()
        );
        Ok(())
    }

    #[instrument(skip(self), fields(release = %identity))]
    async fn remove(&self, identity: &ReleaseIdentity) -> Result<(), ClientError> {
        match self
            .api(&identity.namespace)
            .delete(&identity.name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("HelmRelease {} already gone", identity);
                Ok(())
            }
            Err(e) => Err(classify(e)),
        }
    }
}

/// Classify a kube error as transient or permanent
pub fn classify(err: kube::Error) -> ClientError {
    match &err {
        kube::Error::Api(response) => {
            let reason = format!(
                "{} ({}): {}",
                response.reason, response.code, response.message
            );
            if is_retryable_status(response.code) {
                ClientError::Transient(reason)
            } else {
                ClientError::Permanent(reason)
            }
        }
        kube::Error::HyperError(_) | kube::Error::Service(_) => {
            ClientError::Transient(err.to_string())
        }
        _ => ClientError::Permanent(err.to_string()),
    }
}

/// HTTP statuses worth retrying within the poll loop
pub fn is_retryable_status(code: u16) -> bool {
    matches!(code, 408 | 409 | 425 | 429) || (500..=599).contains(&code)
}
