//! Shared types for the HelmRelease CRD mirror
//!
//! These mirror the subset of the Flux helm-controller API the executor
//! reads and writes. Unknown fields returned by the API server are ignored.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Template for the HelmChart the helm-controller creates for a release
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartTemplate {
    #[serde(default)]
    pub spec: HelmChartTemplateSpec,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartTemplateSpec {
    /// Name or path of the chart inside the source
    #[serde(default)]
    pub chart: String,

    /// Semver version or range, defaults to latest when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Source the chart is pulled from (HelmRepository, GitRepository, Bucket)
    #[serde(default)]
    pub source_ref: CrossNamespaceObjectReference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    /// ChartVersion or Revision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconcile_strategy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_files: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrossNamespaceObjectReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Standard Kubernetes-style condition as written by the helm-controller
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (e.g., "Ready", "Released", "Stalled")
    #[serde(rename = "type")]
    pub type_: String,
    /// Status of the condition: "True", "False", or "Unknown"
    pub status: String,
    #[serde(default)]
    pub last_transition_time: String,
    /// Machine-readable reason for the condition
    #[serde(default)]
    pub reason: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}
