//! Scripted in-memory [`ReleaseClient`] for reconciler tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{ClientError, ReleaseClient, RemoteResourceState};
use super::conditions::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, CONDITION_TYPE_STALLED,
};
use crate::crd::{Condition, HelmReleaseStatus};
use crate::payload::{self, ReleaseDescriptor, ReleaseIdentity};

pub type FetchResult = Result<Option<RemoteResourceState>, ClientError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Fetch,
    Apply,
    Remove,
}

/// Each queue replays its responses in order and keeps repeating the last
/// one. Empty queues answer NotFound / ack.
#[derive(Default)]
pub struct FakeReleaseClient {
    fetches: Mutex<VecDeque<FetchResult>>,
    applies: Mutex<VecDeque<Result<(), ClientError>>>,
    removes: Mutex<VecDeque<Result<(), ClientError>>>,
    hang_fetch: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeReleaseClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fetches(self, responses: impl IntoIterator<Item = FetchResult>) -> Self {
        *self.fetches.lock().unwrap() = responses.into_iter().collect();
        self
    }

    pub fn with_applies(
        self,
        responses: impl IntoIterator<Item = Result<(), ClientError>>,
    ) -> Self {
        *self.applies.lock().unwrap() = responses.into_iter().collect();
        self
    }

    pub fn with_removes(
        self,
        responses: impl IntoIterator<Item = Result<(), ClientError>>,
    ) -> Self {
        *self.removes.lock().unwrap() = responses.into_iter().collect();
        self
    }

    /// Every fetch blocks forever, simulating a hung API server
    pub fn hanging(mut self) -> Self {
        self.hang_fetch = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T: Clone>(queue: &Mutex<VecDeque<T>>, default: T) -> T {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().cloned().unwrap_or(default)
    }
}

#[async_trait]
impl ReleaseClient for FakeReleaseClient {
    async fn fetch(&self, _identity: &ReleaseIdentity) -> FetchResult {
        self.record(Call::Fetch);
        if self.hang_fetch {
            std::future::pending::<()>().await;
        }
        next(&self.fetches, Ok(None))
    }

    async fn apply(&self, _descriptor: &ReleaseDescriptor) -> Result<(), ClientError> {
        self.record(Call::Apply);
        next(&self.applies, Ok(()))
    }

    async fn remove(&self, _identity: &ReleaseIdentity) -> Result<(), ClientError> {
        self.record(Call::Remove);
        next(&self.removes, Ok(()))
    }
}

pub fn demo_descriptor() -> ReleaseDescriptor {
    let manifest = r#"
apiVersion: helm.toolkit.fluxcd.io/v2beta1
kind: HelmRelease
metadata:
  name: demo
  namespace: default
spec:
  interval: 5m
  chart:
    spec:
      chart: chart
      version: 1.0.0
      sourceRef:
        kind: HelmRepository
        name: charts
  values:
    replicaCount: 2
"#;
    payload::decode(manifest.as_bytes()).unwrap()
}

fn condition(type_: &str, status: &str, reason: &str) -> Condition {
    Condition {
        type_: type_.to_string(),
        status: status.to_string(),
        reason: reason.to_string(),
        message: format!("{type_} is {status}"),
        ..Default::default()
    }
}

/// Live state with the descriptor's spec and the given conditions
pub fn remote(descriptor: &ReleaseDescriptor, conditions: Vec<Condition>) -> RemoteResourceState {
    RemoteResourceState {
        generation: Some(1),
        spec: descriptor.spec.clone(),
        status: Some(HelmReleaseStatus {
            observed_generation: Some(1),
            conditions,
            ..Default::default()
        }),
        deleting: false,
    }
}

pub fn ready(descriptor: &ReleaseDescriptor) -> FetchResult {
    Ok(Some(remote(
        descriptor,
        vec![condition(CONDITION_TYPE_READY, CONDITION_STATUS_TRUE, "InstallSucceeded")],
    )))
}

pub fn progressing(descriptor: &ReleaseDescriptor) -> FetchResult {
    Ok(Some(remote(
        descriptor,
        vec![condition(CONDITION_TYPE_READY, CONDITION_STATUS_FALSE, "Progressing")],
    )))
}

pub fn stalled(descriptor: &ReleaseDescriptor) -> FetchResult {
    Ok(Some(remote(
        descriptor,
        vec![
            condition(CONDITION_TYPE_READY, CONDITION_STATUS_FALSE, "InstallFailed"),
            condition(CONDITION_TYPE_STALLED, CONDITION_STATUS_TRUE, "RetriesExceeded"),
        ],
    )))
}

/// Ready, but running an older chart version
pub fn stale(descriptor: &ReleaseDescriptor) -> FetchResult {
    let mut state = remote(
        descriptor,
        vec![condition(CONDITION_TYPE_READY, CONDITION_STATUS_TRUE, "UpgradeSucceeded")],
    );
    state.spec.chart.spec.version = Some("0.9.0".to_string());
    Ok(Some(state))
}

pub fn deleting(descriptor: &ReleaseDescriptor) -> FetchResult {
    let mut state = remote(descriptor, vec![]);
    state.deleting = true;
    Ok(Some(state))
}

pub fn transient() -> ClientError {
    ClientError::Transient("connection refused".to_string())
}

pub fn forbidden() -> ClientError {
    ClientError::Permanent(
        "Forbidden (403): helmreleases is forbidden for system:serviceaccount:argo:executor"
            .to_string(),
    )
}
