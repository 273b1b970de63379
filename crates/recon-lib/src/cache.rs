//! Per-run identity caches
//!
//! All caches live for exactly one reconciliation run: constructed empty,
//! populated by the normalization pass, then read-only during
//! reconciliation. There is a single writer and no cross-thread sharing,
//! so plain maps suffice.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{OsImage, Provider};

/// Enriched inventory metadata keyed by canonical id
#[derive(Debug, Clone)]
pub struct CachedInstance {
    pub urn: String,
    pub is_kubernetes: bool,
    pub creation_time: Option<DateTime<Utc>>,
    pub os_image: OsImage,
}

/// Canonical id to enriched metadata for one provider
#[derive(Debug, Default)]
pub struct ProviderCache {
    entries: HashMap<String, CachedInstance>,
}

impl ProviderCache {
    /// Insert an entry. A duplicate id overwrites the earlier entry;
    /// providers guarantee id uniqueness within an account+region window.
    pub fn insert(&mut self, id: impl Into<String>, instance: CachedInstance) {
        self.entries.insert(id.into(), instance);
    }

    pub fn get(&self, id: &str) -> Option<&CachedInstance> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All caches for a single reconciliation run
#[derive(Debug, Default)]
pub struct RunCaches {
    aws: ProviderCache,
    gcp: ProviderCache,
    azure: ProviderCache,
    /// Agent canonical id -> best-effort composite label
    agent_labels: HashMap<String, String>,
    /// AWS instance id -> cluster name, recorded at classification time
    clusters: HashMap<String, String>,
}

impl RunCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(&self, provider: Provider) -> &ProviderCache {
        match provider {
            Provider::Aws => &self.aws,
            Provider::Gcp => &self.gcp,
            Provider::Azure => &self.azure,
        }
    }

    pub fn provider_mut(&mut self, provider: Provider) -> &mut ProviderCache {
        match provider {
            Provider::Aws => &mut self.aws,
            Provider::Gcp => &mut self.gcp,
            Provider::Azure => &mut self.azure,
        }
    }

    /// Resolve an inventory id against the provider caches.
    /// Lookup order is AWS, GCP, Azure; first match wins.
    pub fn resolve(&self, id: &str) -> Option<(Provider, &CachedInstance)> {
        Provider::ALL
            .iter()
            .find_map(|provider| self.provider(*provider).get(id).map(|entry| (*provider, entry)))
    }

    pub fn record_agent_label(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.agent_labels.insert(id.into(), label.into());
    }

    pub fn agent_label(&self, id: &str) -> Option<&str> {
        self.agent_labels.get(id).map(String::as_str)
    }

    pub fn record_cluster(&mut self, instance_id: impl Into<String>, cluster: impl Into<String>) {
        self.clusters.insert(instance_id.into(), cluster.into());
    }

    pub fn cluster(&self, instance_id: &str) -> Option<&str> {
        self.clusters.get(instance_id).map(String::as_str)
    }
}
