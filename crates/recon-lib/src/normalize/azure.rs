//! Azure virtual machine inventory normalization

use serde_json::Value;

use crate::cache::{CachedInstance, RunCaches};
use crate::error::Result;
use crate::models::{OsImage, Provider};
use crate::normalize::{kubernetes, parse_error, parse_time};

/// Extract the VM id and cache the enriched record under it.
pub(super) fn normalize(record: &Value, caches: &mut RunCaches) -> Result<String> {
    let config = record.get("resourceConfig");
    let id = config
        .and_then(|c| c.get("vmId"))
        .and_then(Value::as_str)
        .or_else(|| record.get("resourceId").and_then(Value::as_str))
        .ok_or_else(|| parse_error(record, "resourceConfig.vmId"))?
        .to_string();
    let urn = record
        .get("urn")
        .and_then(Value::as_str)
        .ok_or_else(|| parse_error(record, "urn"))?
        .to_string();

    // Always false today; no Azure node marker is implemented.
    let is_kubernetes = kubernetes::classify(Provider::Azure, &id, record, caches);
    let creation_time = config
        .and_then(|c| c.get("timeCreated"))
        .and_then(Value::as_str)
        .and_then(parse_time);
    let os_image = image_reference(config);

    caches.provider_mut(Provider::Azure).insert(
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

fn image_reference(config: Option<&Value>) -> OsImage {
    let Some(reference) = config
        .and_then(|c| c.get("storageProfile"))
        .and_then(|p| p.get("imageReference"))
    else {
        return OsImage::Unknown;
    };
    if let Some(image_id) = reference.get("id").and_then(Value::as_str) {
        return OsImage::ImageRef(image_id.to_string());
    }
    let field = |key: &str| reference.get(key).and_then(Value::as_str);
    match (field("publisher"), field("offer"), field("sku")) {
        (Some(publisher), Some(offer), Some(sku)) => {
            OsImage::ImageRef(format!("{publisher}/{offer}/{sku}"))
        }
        _ => OsImage::Unknown,
    }
}
