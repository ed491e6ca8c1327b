//! helmrelease-executor: workflow executor for Flux HelmRelease objects
//!
//! This crate installs or deletes a single HelmRelease described by an
//! opaque payload and waits, under a deadline, for the helm-controller to
//! converge it.

pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod payload;

pub use crate::error::{Error, Result};
