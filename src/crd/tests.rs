//! Unit tests for the HelmRelease CRD mirror
//!
//! Verifies that manifests and live objects written by the helm-controller
//! deserialize into the mirror types, and that applied objects serialize
//! without status or unset optional fields.

#[cfg(test)]
mod helm_release_serde {
    use crate::crd::{HelmRelease, HelmReleaseSpec};
    use kube::Resource;

    const LIVE_OBJECT: &str = r#"{
        "apiVersion": "helm.toolkit.fluxcd.io/v2beta1",
        "kind": "HelmRelease",
        "metadata": {
            "name": "podinfo",
            "namespace": "apps",
            "generation": 3,
            "resourceVersion": "12345"
        },
        "spec": {
            "interval": "5m",
            "chart": {
                "spec": {
                    "chart": "podinfo",
                    "version": "6.5.4",
                    "sourceRef": {"kind": "HelmRepository", "name": "podinfo", "namespace": "flux-system"},
                    "reconcileStrategy": "ChartVersion"
                }
            },
            "values": {"replicaCount": 2}
        },
        "status": {
            "observedGeneration": 3,
            "lastAppliedRevision": "6.5.4",
            "helmChart": "flux-system/apps-podinfo",
            "conditions": [
                {
                    "type": "Ready",
                    "status": "True",
                    "lastTransitionTime": "2024-01-01T00:00:00Z",
                    "reason": "ReconciliationSucceeded",
                    "message": "Release reconciliation succeeded"
                },
                {
                    "type": "Released",
                    "status": "True",
                    "lastTransitionTime": "2024-01-01T00:00:00Z",
                    "reason": "InstallSucceeded",
                    "message": "Helm install succeeded"
                }
            ]
        }
    }"#;

    #[test]
    fn test_live_object_deserializes() {
        let hr: HelmRelease = serde_json::from_str(LIVE_OBJECT).unwrap();
        assert_eq!(hr.metadata.name.as_deref(), Some("podinfo"));
        assert_eq!(hr.metadata.generation, Some(3));
        assert_eq!(hr.spec.chart.spec.chart, "podinfo");
        assert_eq!(hr.spec.chart.spec.version.as_deref(), Some("6.5.4"));
        assert_eq!(hr.spec.chart.spec.source_ref.kind, "HelmRepository");
        assert_eq!(
            hr.spec.chart.spec.source_ref.namespace.as_deref(),
            Some("flux-system")
        );
        assert_eq!(hr.spec.values, Some(serde_json::json!({"replicaCount": 2})));

        let status = hr.status.unwrap();
        assert_eq!(status.observed_generation, Some(3));
        assert_eq!(status.conditions.len(), 2);
        assert_eq!(status.conditions[0].type_, "Ready");
        assert_eq!(status.helm_chart.as_deref(), Some("flux-system/apps-podinfo"));
    }

    #[test]
    fn test_condition_without_message_defaults() {
        let json = r#"{"type": "Ready", "status": "Unknown"}"#;
        let condition: crate::crd::Condition = serde_json::from_str(json).unwrap();
        assert_eq!(condition.status, "Unknown");
        assert!(condition.message.is_empty());
        assert!(condition.observed_generation.is_none());
    }

    #[test]
    fn test_unset_optional_fields_are_not_serialized() {
        let mut spec = HelmReleaseSpec::default();
        spec.chart.spec.chart = "podinfo".to_string();
        spec.chart.spec.source_ref.kind = "HelmRepository".to_string();
        spec.chart.spec.source_ref.name = "podinfo".to_string();

        let value = serde_json::to_value(&spec).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1, "only chart should be present: {value}");
        assert!(value["chart"]["spec"].get("version").is_none());
    }

    #[test]
    fn test_api_resource_coordinates() {
        assert_eq!(HelmRelease::group(&()), "helm.toolkit.fluxcd.io");
        assert_eq!(HelmRelease::version(&()), "v2beta1");
        assert_eq!(HelmRelease::kind(&()), "HelmRelease");
        assert_eq!(HelmRelease::plural(&()), "helmreleases");
    }
}
