//! Custom Resource Definitions used by the executor
//!
//! The executor does not own these CRDs; it mirrors the fields it needs.

mod helm_release;
pub mod types;

#[cfg(test)]
mod tests;

pub use helm_release::{HelmRelease, HelmReleaseSpec, HelmReleaseStatus};
pub use types::*;
