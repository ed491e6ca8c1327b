//! Error types for the executor

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid command-line input, detected before any remote call
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Payload bytes could not be parsed as a HelmRelease manifest
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Payload parsed but is missing required fields
    #[error("Invalid release descriptor: {0}")]
    InvalidDescriptor(String),

    /// Kubernetes client setup error
    #[error("Kubernetes error: {0}")]
    KubeError(#[from] kube::Error),

    /// The reconciler hit a permanent error
    #[error("Reconciliation failed: {0}")]
    ReconcileFailed(String),

    /// The deadline elapsed before the release reached a terminal state
    #[error("Reconciliation timed out after {0:?}")]
    TimedOut(Duration),
}

impl Error {
    /// Process exit code reported to the workflow engine
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::ConfigError(_) | Error::MalformedPayload(_) | Error::InvalidDescriptor(_) => 2,
            Error::TimedOut(_) => 3,
            Error::KubeError(_) | Error::ReconcileFailed(_) => 1,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
