//! Search collaborator contract and time-window handling
//!
//! The reconciler never talks to the network itself; it consumes fully
//! materialized page vectors from an [`InventorySource`]. Each search is
//! bounded by a UTC time window derived from a configurable lookback.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::models::{Provider, RawPage};

/// Provider-side maximum result set size; reaching it means the view may
/// be incomplete and a truncation warning is logged.
pub const MAX_RESULT_SET: usize = 500_000;

pub const DEFAULT_LOOKBACK_HOURS: u64 = 24;
pub const MIN_LOOKBACK_HOURS: u64 = 1;
pub const MAX_LOOKBACK_HOURS: u64 = 7 * 24;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// UTC collection window for a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window ending now, starting `hours` ago. The lookback must be
    /// between 1 hour and 7 days.
    pub fn from_lookback_hours(hours: u64) -> Result<Self> {
        if !(MIN_LOOKBACK_HOURS..=MAX_LOOKBACK_HOURS).contains(&hours) {
            return Err(Error::InvalidLookback { hours });
        }
        let end = Utc::now();
        Ok(Self {
            start: end - Duration::hours(hours as i64),
            end,
        })
    }

    pub fn start_str(&self) -> String {
        self.start.format(TIME_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(TIME_FORMAT).to_string()
    }
}

/// True when a result list has hit the provider-side maximum.
pub fn is_truncated(len: usize) -> bool {
    len >= MAX_RESULT_SET
}

/// Paginated search interface the I/O layer provides.
///
/// Implementations drain provider-side pagination and return every page;
/// retry and backoff policy live behind this seam, never in the core.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Hosts reporting an installed monitoring agent within the window
    async fn search_agents(&self, window: TimeWindow) -> Result<Vec<RawPage>>;

    /// Compute instances discovered by one provider's resource inventory
    async fn search_inventory(&self, provider: Provider, window: TimeWindow)
        -> Result<Vec<RawPage>>;

    /// Container tasks for the Fargate matching path
    async fn search_container_tasks(&self, window: TimeWindow) -> Result<Vec<RawPage>>;

    /// Account names visible to the credentials, for reporting context
    async fn subaccounts(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_bounds() {
        assert!(TimeWindow::from_lookback_hours(MIN_LOOKBACK_HOURS).is_ok());
        assert!(TimeWindow::from_lookback_hours(MAX_LOOKBACK_HOURS).is_ok());
        assert!(matches!(
            TimeWindow::from_lookback_hours(0),
            Err(Error::InvalidLookback { hours: 0 })
        ));
        assert!(matches!(
            TimeWindow::from_lookback_hours(MAX_LOOKBACK_HOURS + 1),
            Err(Error::InvalidLookback { .. })
        ));
    }

    #[test]
    fn test_window_spans_the_lookback() {
        let window = TimeWindow::from_lookback_hours(24).unwrap();
        assert_eq!(window.end - window.start, Duration::hours(24));
        assert!(window.start < window.end);
    }

    #[test]
    fn test_window_formats_as_iso8601_utc() {
        let window = TimeWindow::from_lookback_hours(1).unwrap();
        let start = window.start_str();
        assert!(start.ends_with('Z'));
        assert_eq!(start.len(), "2024-01-01T00:00:00Z".len());
    }

    #[test]
    fn test_truncation_threshold() {
        assert!(is_truncated(MAX_RESULT_SET));
        assert!(is_truncated(MAX_RESULT_SET + 1));
        assert!(!is_truncated(100));
        assert!(!is_truncated(MAX_RESULT_SET - 1));
    }
}
