//! Three-way reconciliation of agent identities against inventory
//!
//! Classifies every inventory id into matched / without-agent and every
//! leftover agent id into agents-without-inventory. Matching is exact
//! equality on canonical ids. The caches must hold every inventory id or
//! the run aborts: a missing entry is a normalizer bug, not a data
//! condition.

use std::collections::BTreeSet;

use crate::cache::{CachedInstance, RunCaches};
use crate::error::{Error, Result};
use crate::models::{InstanceResult, OutputRecord, Provider, UnmatchedAgent};

/// Per-provider canonical id lists produced by normalization
#[derive(Debug, Clone, Default)]
pub struct NormalizedInventory {
    pub aws: Vec<String>,
    pub gcp: Vec<String>,
    pub azure: Vec<String>,
}

impl NormalizedInventory {
    pub fn set(&mut self, provider: Provider, ids: Vec<String>) {
        match provider {
            Provider::Aws => self.aws = ids,
            Provider::Gcp => self.gcp = ids,
            Provider::Azure => self.azure = ids,
        }
    }

    /// All ids across providers, in provider order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.aws
            .iter()
            .chain(&self.gcp)
            .chain(&self.azure)
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aws.len() + self.gcp.len() + self.azure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Knobs for a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Restrict the inventory side to kubernetes-flagged instances
    pub kubernetes_only: bool,
    /// Subaccount stamped onto inventory-derived records
    pub subaccount: Option<String>,
}

/// Partition inventory and agent ids into the three result sets.
pub fn reconcile(
    agent_ids: &[String],
    inventory: &NormalizedInventory,
    caches: &RunCaches,
    options: &ReconcileOptions,
) -> Result<InstanceResult> {
    let all_inventory: BTreeSet<&str> = inventory.ids().collect();
    let agent_set: BTreeSet<&str> = agent_ids.iter().map(String::as_str).collect();

    let mut without_agent: BTreeSet<OutputRecord> = BTreeSet::new();
    let mut with_agent: BTreeSet<OutputRecord> = BTreeSet::new();
    let mut matched_ids: BTreeSet<&str> = BTreeSet::new();

    for id in all_inventory {
        let (provider, entry) = caches
            .resolve(id)
            .ok_or_else(|| Error::UnresolvedIdentity { id: id.to_string() })?;
        if options.kubernetes_only && !entry.is_kubernetes {
            continue;
        }
        let record = enriched_record(id, provider, entry, caches, options);
        if agent_set.contains(id) {
            matched_ids.insert(id);
            with_agent.insert(record);
        } else {
            without_agent.insert(record);
        }
    }

    let mut unmatched: BTreeSet<UnmatchedAgent> = BTreeSet::new();
    for id in agent_set {
        if matched_ids.contains(id) {
            continue;
        }
        unmatched.insert(match caches.agent_label(id) {
            Some(label) => UnmatchedAgent::Known(OutputRecord::bare(label)),
            None => UnmatchedAgent::Raw(id.to_string()),
        });
    }

    // BTreeSet iteration order is the urn order the output contract wants.
    Ok(InstanceResult {
        instances_without_agents: without_agent.into_iter().collect(),
        instances_with_agents: with_agent.into_iter().collect(),
        agents_without_inventory: unmatched.into_iter().collect(),
    })
}

fn enriched_record(
    id: &str,
    provider: Provider,
    entry: &CachedInstance,
    caches: &RunCaches,
    options: &ReconcileOptions,
) -> OutputRecord {
    OutputRecord {
        urn: entry.urn.clone(),
        creation_time: entry.creation_time,
        is_kubernetes: entry.is_kubernetes,
        cluster: match provider {
            Provider::Aws => caches.cluster(id).map(str::to_string),
            _ => None,
        },
        subaccount: options.subaccount.clone(),
        os_image: entry.os_image.clone(),
    }
}
