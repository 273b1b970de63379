//! Core data models for the coverage reconciler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Cloud provider whose inventory participates in reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    Aws,
    Gcp,
    Azure,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Gcp, Provider::Azure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "Aws",
            Provider::Gcp => "Gcp",
            Provider::Azure => "Azure",
        }
    }

    /// Resource type filter passed to the inventory search API
    pub fn resource_type(&self) -> &'static str {
        match self {
            Provider::Aws => "ec2:instance",
            Provider::Gcp => "compute.googleapis.com/Instance",
            Provider::Azure => "microsoft.compute/virtualmachines",
        }
    }

    /// Compliance dataset holding this provider's inventory
    pub fn dataset(&self) -> &'static str {
        match self {
            Provider::Aws => "AwsCompliance",
            Provider::Gcp => "GcpCompliance",
            Provider::Azure => "AzureCompliance",
        }
    }

    /// Parse a provider name, case-insensitively
    pub fn from_name(name: &str) -> Option<Provider> {
        match name.trim().to_ascii_lowercase().as_str() {
            "aws" => Some(Provider::Aws),
            "gcp" => Some(Provider::Gcp),
            "azure" => Some(Provider::Azure),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which search produced a batch of raw records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Agent,
    Inventory(Provider),
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::Agent => f.write_str("agent"),
            RecordSource::Inventory(provider) => write!(f, "{} inventory", provider),
        }
    }
}

/// One page of search results as returned by the inventory/agent API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

impl RawPage {
    pub fn new(data: Vec<serde_json::Value>) -> Self {
        Self { data }
    }
}

/// OS image descriptor for an inventory instance
///
/// `Licensed` carries a disk license identifier, `ImageRef` the image
/// reference fallback, `Unknown` means enrichment failed or nothing was
/// available (logged at normalization time, never fatal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum OsImage {
    Licensed(String),
    ImageRef(String),
    Unknown,
}

impl OsImage {
    pub fn is_known(&self) -> bool {
        !matches!(self, OsImage::Unknown)
    }
}

impl fmt::Display for OsImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsImage::Licensed(license) => f.write_str(license),
            OsImage::ImageRef(image) => f.write_str(image),
            OsImage::Unknown => f.write_str("-"),
        }
    }
}

/// Canonical enriched identity of one compute resource
///
/// Equality, ordering, and hashing are defined solely by the urn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRecord {
    pub urn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    pub is_kubernetes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaccount: Option<String>,
    pub os_image: OsImage,
}

impl OutputRecord {
    /// Record carrying nothing but an identity
    pub fn bare(urn: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            creation_time: None,
            is_kubernetes: false,
            cluster: None,
            subaccount: None,
            os_image: OsImage::Unknown,
        }
    }
}

impl PartialEq for OutputRecord {
    fn eq(&self, other: &Self) -> bool {
        self.urn == other.urn
    }
}

impl Eq for OutputRecord {}

impl Hash for OutputRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.urn.hash(state);
    }
}

impl PartialOrd for OutputRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OutputRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.urn.cmp(&other.urn)
    }
}

/// An agent with no corresponding inventory record
///
/// `Known` agents resolved a composite identity from the agent cache;
/// `Raw` agents are reported by their bare canonical id. Like
/// [`OutputRecord`], identity is the urn alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnmatchedAgent {
    Known(OutputRecord),
    Raw(String),
}

impl UnmatchedAgent {
    pub fn urn(&self) -> &str {
        match self {
            UnmatchedAgent::Known(record) => &record.urn,
            UnmatchedAgent::Raw(id) => id,
        }
    }
}

impl PartialEq for UnmatchedAgent {
    fn eq(&self, other: &Self) -> bool {
        self.urn() == other.urn()
    }
}

impl Eq for UnmatchedAgent {}

impl PartialOrd for UnmatchedAgent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnmatchedAgent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.urn().cmp(other.urn())
    }
}

/// The three disjoint reconciliation sets, each sorted by urn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceResult {
    pub instances_without_agents: Vec<OutputRecord>,
    pub instances_with_agents: Vec<OutputRecord>,
    pub agents_without_inventory: Vec<UnmatchedAgent>,
}

impl InstanceResult {
    /// Distinct hosts seen on the inventory side
    pub fn total_hosts(&self) -> usize {
        self.instances_without_agents.len() + self.instances_with_agents.len()
    }
}
