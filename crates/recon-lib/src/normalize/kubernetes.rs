//! Kubernetes node classification
//!
//! AWS nodes are recognized by the `eks:cluster-name` tag, GCP nodes by
//! the `goog-gke-node` label marker. No Azure node marker is implemented;
//! Azure records always classify as non-kubernetes, an explicit limitation
//! rather than a guessed detection rule.

use serde_json::Value;

use crate::cache::RunCaches;
use crate::models::Provider;

/// Tag key marking an EKS worker node (case-sensitive)
pub const AWS_EKS_CLUSTER_TAG: &str = "eks:cluster-name";

/// Label fragment marking a GKE node
pub const GKE_NODE_MARKER: &str = "goog-gke-node";

/// Whether the record is a cluster node.
///
/// Pure predicate with one side effect: a positive AWS match records the
/// cluster name keyed by the instance id, because the name is only
/// available here, not at resolution time.
pub fn classify(provider: Provider, id: &str, record: &Value, caches: &mut RunCaches) -> bool {
    match provider {
        Provider::Aws => classify_aws(id, record, caches),
        Provider::Gcp => classify_gcp(record),
        Provider::Azure => false,
    }
}

fn classify_aws(id: &str, record: &Value, caches: &mut RunCaches) -> bool {
    let Some(tags) = record.get("resourceConfig").and_then(|c| c.get("Tags")) else {
        return false;
    };
    // Tags arrive either as a list of {Key, Value} pairs or as a flat map.
    match tags {
        Value::Array(entries) => {
            for entry in entries {
                if entry.get("Key").and_then(Value::as_str) == Some(AWS_EKS_CLUSTER_TAG) {
                    if let Some(cluster) = entry.get("Value").and_then(Value::as_str) {
                        caches.record_cluster(id, cluster);
                    }
                    return true;
                }
            }
            false
        }
        Value::Object(map) => match map.get(AWS_EKS_CLUSTER_TAG) {
            Some(value) => {
                if let Some(cluster) = value.as_str() {
                    caches.record_cluster(id, cluster);
                }
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn classify_gcp(record: &Value) -> bool {
    let Some(labels) = record
        .get("resourceConfig")
        .and_then(|c| c.get("labels"))
        .and_then(Value::as_object)
    else {
        return false;
    };
    labels.iter().any(|(key, value)| {
        key.contains(GKE_NODE_MARKER)
            || value.as_str().is_some_and(|v| v.contains(GKE_NODE_MARKER))
    })
}
