//! AWS EC2 inventory normalization

use serde_json::Value;

use crate::cache::{CachedInstance, RunCaches};
use crate::error::Result;
use crate::models::{OsImage, Provider};
use crate::normalize::{kubernetes, parse_error, parse_time};

/// Extract the instance id and cache the enriched record under it.
pub(super) fn normalize(record: &Value, caches: &mut RunCaches) -> Result<String> {
    let config = record.get("resourceConfig");
    let id = config
        .and_then(|c| c.get("InstanceId"))
        .and_then(Value::as_str)
        .or_else(|| record.get("resourceId").and_then(Value::as_str))
        .ok_or_else(|| parse_error(record, "resourceConfig.InstanceId"))?
        .to_string();
    let urn = record
        .get("urn")
        .and_then(Value::as_str)
        .ok_or_else(|| parse_error(record, "urn"))?
        .to_string();

    let is_kubernetes = kubernetes::classify(Provider::Aws, &id, record, caches);
    let creation_time = config
        .and_then(|c| c.get("LaunchTime"))
        .and_then(Value::as_str)
        .and_then(parse_time);
    let os_image = config
        .and_then(|c| c.get("ImageId"))
        .and_then(Value::as_str)
        .map(|ami| OsImage::ImageRef(ami.to_string()))
        .unwrap_or(OsImage::Unknown);

    caches.provider_mut(Provider::Aws).insert(
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
