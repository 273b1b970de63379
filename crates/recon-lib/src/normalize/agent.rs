//! Agent record classification
//!
//! Agent search results carry their provider identity in tags. The
//! `VmProvider` tag selects the id scheme; the raw hostname is the
//! last-resort identity (and the task identity for Fargate agents, which
//! report no instance id).

use serde_json::Value;

use crate::cache::RunCaches;
use crate::error::{Error, Result};
use crate::models::RecordSource;

pub(super) const TAG_VM_PROVIDER: &str = "VmProvider";
pub(super) const TAG_INSTANCE_ID: &str = "InstanceId";
const TAG_ACCOUNT: &str = "Account";
const TAG_PROJECT_ID: &str = "ProjectId";
const TAG_SUBSCRIPTION_ID: &str = "SubscriptionId";

/// Classify one agent record into its canonical id.
///
/// When the record carries enough tags, a best-effort composite label
/// (`provider/account-or-project/hostname`) is recorded for later display
/// of agents that never match inventory.
pub(super) fn classify(record: &Value, caches: &mut RunCaches) -> Result<String> {
    let tags = record.get("tags").and_then(Value::as_object);
    let hostname = record.get("hostname").and_then(Value::as_str);
    let tag = |key: &str| tags.and_then(|t| t.get(key)).and_then(Value::as_str);
    let vm_provider = tag(TAG_VM_PROVIDER);

    let id = match vm_provider {
        Some("GCE") => tag(TAG_INSTANCE_ID).or(hostname),
        // An AWS agent without an instance id tag is a Fargate task; its
        // hostname carries the task identity.
        Some("AWS") => tag(TAG_INSTANCE_ID).or(hostname),
        Some("Microsoft.Compute") => tag(TAG_INSTANCE_ID).or(hostname),
        _ => hostname,
    };
    let id = id
        .ok_or_else(|| Error::UnclassifiedIdentity {
            origin: RecordSource::Agent,
            detail: "record carries neither a usable id tag nor a hostname".to_string(),
        })?
        .to_string();

    if let (Some(provider), Some(host)) = (vm_provider, hostname) {
        let account = match provider {
            "AWS" => tag(TAG_ACCOUNT),
            "GCE" => tag(TAG_PROJECT_ID),
            "Microsoft.Compute" => tag(TAG_SUBSCRIPTION_ID),
            _ => None,
        };
        if let Some(account) = account {
            caches.record_agent_label(id.as_str(), format!("{provider}/{account}/{host}"));
        }
    }

    Ok(id)
}
