//! Identity normalization for agent and inventory search results
//!
//! Converts provider-specific raw records into canonical identity keys and
//! populates the per-run caches as a side effect. Inventory parse failures
//! are isolated at record granularity; an empty search result is a hard
//! stop because it usually signals an upstream query or auth failure
//! rather than a truly empty account.

mod agent;
mod aws;
mod azure;
mod gcp;
pub mod kubernetes;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::cache::RunCaches;
use crate::error::{Error, Result};
use crate::models::{Provider, RawPage, RecordSource};

/// Normalize every record in `pages` into canonical ids, in input order.
///
/// Inventory records additionally populate the provider cache with their
/// enriched metadata; agent records populate the agent label cache.
pub fn normalize_pages(
    source: RecordSource,
    pages: &[RawPage],
    caches: &mut RunCaches,
) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for page in pages {
        for record in &page.data {
            match source {
                RecordSource::Agent => ids.push(agent::classify(record, caches)?),
                RecordSource::Inventory(provider) => {
                    match normalize_inventory(provider, record, caches) {
                        Ok(id) => ids.push(id),
                        // Parse failures drop the record, not the run.
                        Err(err @ Error::RecordParse { .. }) => {
                            warn!(source = %source, error = %err, "dropping unparseable inventory record");
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        }
    }
    if ids.is_empty() {
        return Err(Error::EmptyInput { origin: source });
    }
    Ok(ids)
}

fn normalize_inventory(
    provider: Provider,
    record: &Value,
    caches: &mut RunCaches,
) -> Result<String> {
    match provider {
        Provider::Aws => aws::normalize(record, caches),
        Provider::Gcp => gcp::normalize(record, caches),
        Provider::Azure => azure::normalize(record, caches),
    }
}

/// Parse an RFC 3339 timestamp, normalizing to UTC
pub(crate) fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// RecordParse error naming the record as best we can identify it
pub(crate) fn parse_error(record: &Value, field: &'static str) -> Error {
    let id = record
        .get("resourceId")
        .and_then(Value::as_str)
        .or_else(|| record.get("urn").and_then(Value::as_str))
        .unwrap_or("<unidentified>")
        .to_string();
    Error::RecordParse {
        id,
        field,
        reason: "missing or malformed".to_string(),
    }
}
