//! GCP Compute Engine inventory normalization
//!
//! OS image discovery walks the attached disks: the first disk exposing a
//! license identifier wins, otherwise the image reference from the first
//! disk's initialization parameters. A malformed disk list degrades that
//! one record to an unknown image, never the batch.

use serde_json::Value;
use tracing::warn;

use crate::cache::{CachedInstance, RunCaches};
use crate::error::{Error, Result};
use crate::models::{OsImage, Provider};
use crate::normalize::{kubernetes, parse_error, parse_time};

/// Extract the numeric instance id and cache the enriched record under it.
pub(super) fn normalize(record: &Value, caches: &mut RunCaches) -> Result<String> {
    let config = record.get("resourceConfig");
    let id = config
        .and_then(|c| c.get("id"))
        .and_then(id_string)
        .or_else(|| {
            record
                .get("resourceId")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .ok_or_else(|| parse_error(record, "resourceConfig.id"))?;
    let urn = record
        .get("urn")
        .and_then(Value::as_str)
        .ok_or_else(|| parse_error(record, "urn"))?
        .to_string();

    let is_kubernetes = kubernetes::classify(Provider::Gcp, &id, record, caches);
    let creation_time = config
        .and_then(|c| c.get("creationTimestamp"))
        .and_then(Value::as_str)
        .and_then(parse_time);
    let os_image = match os_image_from_disks(config) {
        Ok(image) => image,
        Err(err) => {
            warn!(id = %id, error = %err, "failed to parse GCP disk list, leaving OS image unknown");
            OsImage::Unknown
        }
    };

    caches.provider_mut(Provider::Gcp).insert(
        id.as_str(),
        CachedInstance {
            urn,
            is_kubernetes,
            creation_time,
            os_image,
        },
    );
    Ok(id)
}

/// The numeric id arrives as either a JSON string or a bare number.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn os_image_from_disks(config: Option<&Value>) -> std::result::Result<OsImage, Error> {
    let Some(disks) = config.and_then(|c| c.get("disks")) else {
        return Ok(OsImage::Unknown);
    };
    let disks = disks.as_array().ok_or(Error::RecordParse {
        id: "<gcp disk walk>".to_string(),
        field: "resourceConfig.disks",
        reason: "expected an array of disks".to_string(),
    })?;

    for disk in disks {
        if let Some(license) = disk
            .get("licenses")
            .and_then(Value::as_array)
            .and_then(|licenses| licenses.first())
            .and_then(Value::as_str)
        {
            return Ok(OsImage::Licensed(license.to_string()));
        }
    }

    let fallback = disks
        .first()
        .and_then(|disk| disk.get("initializeParams"))
        .and_then(|params| params.get("sourceImage"))
        .and_then(Value::as_str);
    Ok(match fallback {
        Some(image) => OsImage::ImageRef(image.to_string()),
        None => OsImage::Unknown,
    })
}
