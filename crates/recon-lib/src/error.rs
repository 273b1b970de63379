//! Error taxonomy for the coverage reconciler
//!
//! Identity and classification errors abort a run; per-record enrichment
//! failures are isolated and logged where they occur. Truncation is a
//! logged warning, not an error.

use crate::models::RecordSource;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A search returned zero records. Far more likely an upstream query
    /// or auth failure than a genuinely empty account, so it is a hard stop.
    #[error("{origin} search returned no records; refusing to treat a likely failed query as empty inventory")]
    EmptyInput { origin: RecordSource },

    /// A record matched no classification branch and carries no usable
    /// fallback identity.
    #[error("unclassifiable {origin} record: {detail}")]
    UnclassifiedIdentity {
        origin: RecordSource,
        detail: String,
    },

    /// Reconciliation found an inventory id no provider cache holds.
    /// This is a normalizer invariant violation, not a data condition.
    #[error("inventory id {id} is missing from every provider cache")]
    UnresolvedIdentity { id: String },

    /// A single record could not be parsed. Handled at record granularity:
    /// the record is dropped or degraded, the run continues.
    #[error("failed to parse {field} for record {id}: {reason}")]
    RecordParse {
        id: String,
        field: &'static str,
        reason: String,
    },

    /// Lookback outside the supported window of 1 hour to 7 days.
    #[error("lookback of {hours} hours is outside the allowed range of 1 hour to 7 days")]
    InvalidLookback { hours: u64 },

    /// Transport failure from the inventory API. Not retried here; retry
    /// policy belongs to the transport layer.
    #[error("inventory API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid inventory API endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
