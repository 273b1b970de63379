//! Fargate task agent detection
//!
//! Fargate tasks have no instance id, so agent presence is decided by
//! container composition: a task runs the agent iff any of its containers
//! uses the monitoring-agent image. This path is independent of the
//! tag-based identity normalizer.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

use crate::models::{OsImage, OutputRecord, RawPage};
use crate::normalize::parse_time;

/// Image name fragment identifying the monitoring-agent container
pub const DEFAULT_AGENT_IMAGE: &str = "datacollector";

/// Container tasks split by agent presence, each list sorted by urn
#[derive(Debug, Clone, Default, Serialize)]
pub struct FargatePartition {
    pub with_agent: Vec<OutputRecord>,
    pub without_agent: Vec<OutputRecord>,
}

/// Partition container tasks by whether any container runs the agent image.
pub fn partition_tasks(pages: &[RawPage], subaccount: &str, agent_image: &str) -> FargatePartition {
    let mut with_agent: BTreeSet<OutputRecord> = BTreeSet::new();
    let mut without_agent: BTreeSet<OutputRecord> = BTreeSet::new();

    for page in pages {
        for record in &page.data {
            let config = record.get("resourceConfig");
            let Some(task_arn) = config
                .and_then(|c| c.get("taskArn"))
                .and_then(Value::as_str)
                .or_else(|| record.get("urn").and_then(Value::as_str))
            else {
                warn!("dropping container task without a task ARN");
                continue;
            };

            let has_agent = config
                .and_then(|c| c.get("containers"))
                .and_then(Value::as_array)
                .map(|containers| {
                    containers.iter().any(|container| {
                        container
                            .get("image")
                            .and_then(Value::as_str)
                            .is_some_and(|image| image.contains(agent_image))
                    })
                })
                .unwrap_or(false);

            let task = OutputRecord {
                urn: task_arn.to_string(),
                creation_time: config
                    .and_then(|c| c.get("createdAt"))
                    .and_then(Value::as_str)
                    .and_then(parse_time),
                is_kubernetes: false,
                cluster: None,
                subaccount: Some(subaccount.to_string()),
                os_image: OsImage::Unknown,
            };
            if has_agent {
                with_agent.insert(task);
            } else {
                without_agent.insert(task);
            }
        }
    }

    FargatePartition {
        with_agent: with_agent.into_iter().collect(),
        without_agent: without_agent.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partition_splits_by_agent_container() {
        let pages = vec![RawPage::new(vec![
            json!({
                "resourceConfig": {
                    "tags": {"a": "apple"},
                    "containers": [{"image": "datacollector", "taskArn": "abcd"}],
                    "taskArn": "abcd"
                }
            }),
            json!({
                "resourceConfig": {
                    "tags": {"b": "banana"},
                    "containers": [{"image": "not-what-we-want", "taskArn": "vxyz"}],
                    "taskArn": "vxyz"
                }
            }),
        ])];

        let partition = partition_tasks(&pages, "test", DEFAULT_AGENT_IMAGE);
        assert_eq!(partition.with_agent.len(), 1);
        assert_eq!(partition.without_agent.len(), 1);
        assert_eq!(partition.with_agent[0].urn, "abcd");
        assert_eq!(partition.without_agent[0].urn, "vxyz");
        assert_eq!(partition.with_agent[0].subaccount.as_deref(), Some("test"));
    }

    #[test]
    fn test_image_match_is_a_fragment_match() {
        let pages = vec![RawPage::new(vec![json!({
            "resourceConfig": {
                "containers": [
                    {"image": "registry.example.com/monitoring/datacollector:6.10"}
                ],
                "taskArn": "arn:aws:ecs:us-east-1:123456789012:task/cluster/1"
            }
        })])];

        let partition = partition_tasks(&pages, "test", DEFAULT_AGENT_IMAGE);
        assert_eq!(partition.with_agent.len(), 1);
        assert!(partition.without_agent.is_empty());
    }

    #[test]
    fn test_task_without_containers_has_no_agent() {
        let pages = vec![RawPage::new(vec![json!({
            "resourceConfig": {"taskArn": "arn:aws:ecs:us-east-1:123456789012:task/cluster/2"}
        })])];

        let partition = partition_tasks(&pages, "test", DEFAULT_AGENT_IMAGE);
        assert!(partition.with_agent.is_empty());
        assert_eq!(partition.without_agent.len(), 1);
    }

    #[test]
    fn test_task_without_arn_is_dropped() {
        let pages = vec![RawPage::new(vec![json!({
            "resourceConfig": {"containers": [{"image": "datacollector"}]}
        })])];

        let partition = partition_tasks(&pages, "test", DEFAULT_AGENT_IMAGE);
        assert!(partition.with_agent.is_empty());
        assert!(partition.without_agent.is_empty());
    }

    #[test]
    fn test_duplicate_tasks_deduplicate_and_sort() {
        let task = json!({
            "resourceConfig": {
                "containers": [{"image": "other"}],
                "taskArn": "arn:b"
            }
        });
        let pages = vec![RawPage::new(vec![
            task.clone(),
            task,
            json!({"resourceConfig": {"containers": [{"image": "other"}], "taskArn": "arn:a"}}),
        ])];

        let partition = partition_tasks(&pages, "test", DEFAULT_AGENT_IMAGE);
        let urns: Vec<&str> = partition
            .without_agent
            .iter()
            .map(|r| r.urn.as_str())
            .collect();
        assert_eq!(urns, vec!["arn:a", "arn:b"]);
    }
}
