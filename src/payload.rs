//! Payload decoding
//!
//! The workflow engine hands the executor a base64-encoded HelmRelease
//! manifest. Decoding is split in two: [`decode_base64`] strips the
//! transport encoding and [`decode`] turns the manifest bytes into a
//! [`ReleaseDescriptor`]. Both are pure.

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kube::api::ObjectMeta;
use kube::Resource;
use serde_yaml::{Mapping, Value};

use crate::crd::{HelmRelease, HelmReleaseSpec};
use crate::error::{Error, Result};

const EXPECTED_KIND: &str = "HelmRelease";

/// Namespaced name of a release
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReleaseIdentity {
    pub name: String,
    pub namespace: String,
}

impl fmt::Display for ReleaseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Chart name plus optional pinned version, rendered as `chart:version`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartReference {
    pub chart: String,
    pub version: Option<String>,
}

impl fmt::Display for ChartReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}", self.chart, version),
            None => f.write_str(&self.chart),
        }
    }
}

/// Desired state of a release, decoded from the payload
#[derive(Clone, Debug, PartialEq)]
pub struct ReleaseDescriptor {
    pub identity: ReleaseIdentity,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub spec: HelmReleaseSpec,
}

impl ReleaseDescriptor {
    pub fn chart_reference(&self) -> ChartReference {
        let chart = &self.spec.chart.spec;
        ChartReference {
            chart: chart.chart.clone(),
            version: chart.version.clone(),
        }
    }

    /// Build the object sent to the API server on apply
    pub fn to_resource(&self) -> HelmRelease {
        let mut release = HelmRelease::new(&self.identity.name, self.spec.clone());
        release.metadata = ObjectMeta {
            name: Some(self.identity.name.clone()),
            namespace: Some(self.identity.namespace.clone()),
            labels: (!self.labels.is_empty()).then(|| self.labels.clone()),
            annotations: (!self.annotations.is_empty()).then(|| self.annotations.clone()),
            ..Default::default()
        };
        release
    }
}

/// Strip the base64 transport encoding from the `--data` argument
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let data = data.trim();
    if data.is_empty() {
        return Err(Error::ConfigError(
            "Data string to the executor cannot be empty".to_string(),
        ));
    }
    STANDARD
        .decode(data)
        .map_err(|e| Error::MalformedPayload(format!("data is not valid base64: {e}")))
}

/// Decode a HelmRelease manifest (YAML or JSON) into a release descriptor
pub fn decode(bytes: &[u8]) -> Result<ReleaseDescriptor> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::MalformedPayload(format!("payload is not UTF-8: {e}")))?;

    let mut manifest: Value = serde_yaml::from_str(text)
        .map_err(|e| Error::MalformedPayload(format!("payload is not a valid manifest: {e}")))?;
    let Some(object) = manifest.as_mapping_mut() else {
        return Err(Error::MalformedPayload(
            "payload must be a single HelmRelease object".to_string(),
        ));
    };
    check_type_meta(object)?;

    // Missing spec fields are reported as descriptor errors below
    if object.get("spec").map_or(true, Value::is_null) {
        object.insert(Value::from("spec"), Value::Mapping(Mapping::new()));
    }

    let release: HelmRelease = serde_yaml::from_value(manifest)
        .map_err(|e| Error::MalformedPayload(format!("payload is not a HelmRelease: {e}")))?;

    into_descriptor(release)
}

fn check_type_meta(object: &Mapping) -> Result<()> {
    if let Some(kind) = object.get("kind").and_then(Value::as_str) {
        if kind != EXPECTED_KIND {
            return Err(Error::MalformedPayload(format!(
                "expected kind {EXPECTED_KIND}, got {kind}"
            )));
        }
    }
    if let Some(api_version) = object.get("apiVersion").and_then(Value::as_str) {
        let group = api_version
            .split_once('/')
            .map_or("", |(group, _)| group);
        let expected = HelmRelease::group(&());
        if group != expected {
            return Err(Error::MalformedPayload(format!(
                "expected apiVersion in group {expected}, got {api_version}"
            )));
        }
    }
    Ok(())
}

fn into_descriptor(release: HelmRelease) -> Result<ReleaseDescriptor> {
    let name = required(release.metadata.name, "metadata.name")?;
    let namespace = required(release.metadata.namespace, "metadata.namespace")?;

    let chart = &release.spec.chart.spec;
    if chart.chart.trim().is_empty() {
        return Err(missing("spec.chart.spec.chart"));
    }
    if chart.source_ref.name.trim().is_empty() {
        return Err(missing("spec.chart.spec.sourceRef.name"));
    }

    Ok(ReleaseDescriptor {
        identity: ReleaseIdentity { name, namespace },
        labels: release.metadata.labels.unwrap_or_default(),
        annotations: release.metadata.annotations.unwrap_or_default(),
        spec: release.spec,
    })
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing(field))
}

fn missing(field: &str) -> Error {
    Error::InvalidDescriptor(format!("required field {field} is missing"))
}
