//! Normalization tests over synthetic API records
//!
//! Fixtures mirror the record shapes the inventory/agent search API
//! returns, one page per case unless pagination matters.

use serde_json::json;

use crate::cache::RunCaches;
use crate::error::Error;
use crate::models::{OsImage, Provider, RawPage, RecordSource};
use crate::normalize::normalize_pages;

fn page(records: Vec<serde_json::Value>) -> Vec<RawPage> {
    vec![RawPage::new(records)]
}

#[test]
fn test_empty_page_collection_is_a_hard_stop() {
    let mut caches = RunCaches::new();
    let err = normalize_pages(RecordSource::Agent, &[], &mut caches).unwrap_err();
    assert!(matches!(err, Error::EmptyInput { .. }));
}

#[test]
fn test_pages_with_zero_records_are_a_hard_stop() {
    let mut caches = RunCaches::new();
    let pages = vec![RawPage::default(), RawPage::default()];
    let err = normalize_pages(
        RecordSource::Inventory(Provider::Aws),
        &pages,
        &mut caches,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::EmptyInput {
            origin: RecordSource::Inventory(Provider::Aws)
        }
    ));
}

#[test]
fn test_agent_gce_uses_instance_id_tag() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "hostname": "gke-node-1",
        "tags": {"VmProvider": "GCE", "InstanceId": "5123456789", "ProjectId": "my-project"}
    })]);

    let ids = normalize_pages(RecordSource::Agent, &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["5123456789"]);
    assert_eq!(
        caches.agent_label("5123456789"),
        Some("GCE/my-project/gke-node-1")
    );
}

#[test]
fn test_agent_aws_uses_instance_id_tag() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "hostname": "ip-10-0-0-1",
        "tags": {"VmProvider": "AWS", "InstanceId": "i-aaa", "Account": "123456789012"}
    })]);

    let ids = normalize_pages(RecordSource::Agent, &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["i-aaa"]);
    assert_eq!(caches.agent_label("i-aaa"), Some("AWS/123456789012/ip-10-0-0-1"));
}

#[test]
fn test_agent_aws_without_instance_id_falls_back_to_task_hostname() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "hostname": "fargate-task-abc123",
        "tags": {"VmProvider": "AWS", "Account": "123456789012"}
    })]);

    let ids = normalize_pages(RecordSource::Agent, &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["fargate-task-abc123"]);
}

#[test]
fn test_agent_azure_uses_instance_id_tag() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "hostname": "azvm-1",
        "tags": {
            "VmProvider": "Microsoft.Compute",
            "InstanceId": "0ae2bfd8-2222-4444-8888-5f9fb2a1c911",
            "SubscriptionId": "sub-42"
        }
    })]);

    let ids = normalize_pages(RecordSource::Agent, &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["0ae2bfd8-2222-4444-8888-5f9fb2a1c911"]);
    assert_eq!(
        caches.agent_label("0ae2bfd8-2222-4444-8888-5f9fb2a1c911"),
        Some("Microsoft.Compute/sub-42/azvm-1")
    );
}

#[test]
fn test_agent_unknown_provider_falls_back_to_hostname() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "hostname": "bare-metal-7",
        "tags": {"VmProvider": "OpenStack"}
    })]);

    let ids = normalize_pages(RecordSource::Agent, &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["bare-metal-7"]);
    // No composite label for providers the classifier does not know.
    assert!(caches.agent_label("bare-metal-7").is_none());
}

#[test]
fn test_agent_without_any_identity_is_unclassifiable() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({"tags": {}})]);

    let err = normalize_pages(RecordSource::Agent, &pages, &mut caches).unwrap_err();
    assert!(matches!(err, Error::UnclassifiedIdentity { .. }));
}

#[test]
fn test_aws_inventory_populates_cache_and_cluster() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "urn": "arn:aws:ec2:us-east-1:123456789012:instance/i-aaa",
        "resourceId": "i-aaa",
        "resourceConfig": {
            "InstanceId": "i-aaa",
            "LaunchTime": "2024-03-01T12:00:00Z",
            "ImageId": "ami-0abcdef",
            "Tags": [
                {"Key": "Name", "Value": "worker-1"},
                {"Key": "eks:cluster-name", "Value": "prod-cluster"}
            ]
        }
    })]);

    let ids =
        normalize_pages(RecordSource::Inventory(Provider::Aws), &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["i-aaa"]);

    let entry = caches.provider(Provider::Aws).get("i-aaa").unwrap();
    assert_eq!(entry.urn, "arn:aws:ec2:us-east-1:123456789012:instance/i-aaa");
    assert!(entry.is_kubernetes);
    assert!(entry.creation_time.is_some());
    assert_eq!(entry.os_image, OsImage::ImageRef("ami-0abcdef".to_string()));
    assert_eq!(caches.cluster("i-aaa"), Some("prod-cluster"));
}

#[test]
fn test_aws_inventory_without_eks_tag_is_not_kubernetes() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "urn": "arn:aws:ec2:us-east-1:123456789012:instance/i-bbb",
        "resourceConfig": {
            "InstanceId": "i-bbb",
            "Tags": [{"Key": "Name", "Value": "standalone"}]
        }
    })]);

    normalize_pages(RecordSource::Inventory(Provider::Aws), &pages, &mut caches).unwrap();
    let entry = caches.provider(Provider::Aws).get("i-bbb").unwrap();
    assert!(!entry.is_kubernetes);
    assert!(caches.cluster("i-bbb").is_none());
}

#[test]
fn test_gcp_inventory_prefers_disk_license() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "urn": "projects/my-project/zones/us-central1-a/instances/vm-1",
        "resourceConfig": {
            "id": 5123456789u64,
            "creationTimestamp": "2024-02-10T08:30:00Z",
            "disks": [
                {"initializeParams": {"sourceImage": "projects/debian-cloud/global/images/debian-12"}},
                {"licenses": ["projects/debian-cloud/global/licenses/debian-12"]}
            ]
        }
    })]);

    let ids =
        normalize_pages(RecordSource::Inventory(Provider::Gcp), &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["5123456789"]);

    let entry = caches.provider(Provider::Gcp).get("5123456789").unwrap();
    assert_eq!(
        entry.os_image,
        OsImage::Licensed("projects/debian-cloud/global/licenses/debian-12".to_string())
    );
}

#[test]
fn test_gcp_inventory_falls_back_to_first_disk_image() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "urn": "projects/my-project/zones/us-central1-a/instances/vm-2",
        "resourceConfig": {
            "id": "777",
            "disks": [
                {"initializeParams": {"sourceImage": "projects/ubuntu-os-cloud/global/images/ubuntu-2204"}}
            ]
        }
    })]);

    normalize_pages(RecordSource::Inventory(Provider::Gcp), &pages, &mut caches).unwrap();
    let entry = caches.provider(Provider::Gcp).get("777").unwrap();
    assert_eq!(
        entry.os_image,
        OsImage::ImageRef("projects/ubuntu-os-cloud/global/images/ubuntu-2204".to_string())
    );
}

#[test]
fn test_gcp_malformed_disks_keep_the_id_with_unknown_image() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "urn": "projects/my-project/zones/us-central1-a/instances/vm-3",
        "resourceConfig": {"id": "888", "disks": "not-a-list"}
    })]);

    let ids =
        normalize_pages(RecordSource::Inventory(Provider::Gcp), &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["888"]);
    let entry = caches.provider(Provider::Gcp).get("888").unwrap();
    assert_eq!(entry.os_image, OsImage::Unknown);
}

#[test]
fn test_gcp_node_label_marks_kubernetes() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "urn": "projects/my-project/zones/us-central1-a/instances/gke-vm",
        "resourceConfig": {
            "id": "999",
            "labels": {"goog-gke-node": ""}
        }
    })]);

    normalize_pages(RecordSource::Inventory(Provider::Gcp), &pages, &mut caches).unwrap();
    assert!(caches.provider(Provider::Gcp).get("999").unwrap().is_kubernetes);
}

#[test]
fn test_azure_inventory_is_never_kubernetes() {
    let mut caches = RunCaches::new();
    let pages = page(vec![json!({
        "urn": "/subscriptions/sub-42/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/azvm-1",
        "resourceConfig": {
            "vmId": "0ae2bfd8-2222-4444-8888-5f9fb2a1c911",
            "timeCreated": "2024-01-05T00:00:00Z",
            "storageProfile": {
                "imageReference": {"publisher": "Canonical", "offer": "ubuntu-24_04-lts", "sku": "server"}
            }
        }
    })]);

    let ids =
        normalize_pages(RecordSource::Inventory(Provider::Azure), &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["0ae2bfd8-2222-4444-8888-5f9fb2a1c911"]);

    let entry = caches
        .provider(Provider::Azure)
        .get("0ae2bfd8-2222-4444-8888-5f9fb2a1c911")
        .unwrap();
    assert!(!entry.is_kubernetes);
    assert_eq!(
        entry.os_image,
        OsImage::ImageRef("Canonical/ubuntu-24_04-lts/server".to_string())
    );
}

#[test]
fn test_record_without_id_is_dropped_not_fatal() {
    let mut caches = RunCaches::new();
    let pages = page(vec![
        json!({"urn": "arn:aws:ec2:us-east-1:123456789012:instance/i-good", "resourceConfig": {"InstanceId": "i-good"}}),
        json!({"resourceConfig": {"note": "no id, no urn"}}),
    ]);

    let ids =
        normalize_pages(RecordSource::Inventory(Provider::Aws), &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["i-good"]);
}

#[test]
fn test_records_spread_across_pages_all_normalize() {
    let mut caches = RunCaches::new();
    let pages = vec![
        RawPage::new(vec![json!({
            "urn": "arn:aws:ec2:us-east-1:123456789012:instance/i-page1",
            "resourceConfig": {"InstanceId": "i-page1"}
        })]),
        RawPage::new(vec![json!({
            "urn": "arn:aws:ec2:us-east-1:123456789012:instance/i-page2",
            "resourceConfig": {"InstanceId": "i-page2"}
        })]),
    ];

    let ids =
        normalize_pages(RecordSource::Inventory(Provider::Aws), &pages, &mut caches).unwrap();
    assert_eq!(ids, vec!["i-page1", "i-page2"]);
    assert_eq!(caches.provider(Provider::Aws).len(), 2);
}
