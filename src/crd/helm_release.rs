//! HelmRelease Custom Resource Definition
//!
//! Client-side mirror of the Flux `helm.toolkit.fluxcd.io/v2beta1`
//! HelmRelease. The CRD itself is installed by Flux; this type is only used
//! to read, apply and delete release objects.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{Condition, HelmChartTemplate};

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "helm.toolkit.fluxcd.io",
    version = "v2beta1",
    kind = "HelmRelease",
    namespaced,
    status = "HelmReleaseStatus",
    shortname = "hr"
)]
#[serde(rename_all = "camelCase")]
pub struct HelmReleaseSpec {
    #[serde(default)]
    pub chart: HelmChartTemplate,

    /// How often the helm-controller reconciles the release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_history: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub depends_on: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub install: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub upgrade: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub uninstall: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub values_from: Option<serde_json::Value>,

    /// Inline Helm values
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub values: Option<serde_json::Value>,
}

/// Status written by the helm-controller
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelmReleaseStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(default)]
    pub conditions: Vec<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_applied_revision: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempted_revision: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempted_values_checksum: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_release_revision: Option<i64>,

    /// Namespaced name of the HelmChart object backing this release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helm_chart: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failures: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_failures: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_failures: Option<i64>,
}
