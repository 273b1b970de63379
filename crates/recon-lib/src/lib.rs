//! Core library for the instance coverage reconciler
//!
//! This crate provides the core functionality for:
//! - Identity normalization of agent and inventory records
//! - Per-run provider caches and kubernetes classification
//! - Fargate task matching by container composition
//! - Three-way reconciliation and coverage statistics
//! - Health checks and observability

pub mod cache;
pub mod client;
pub mod error;
pub mod fargate;
pub mod health;
pub mod models;
pub mod normalize;
pub mod observability;
pub mod reconcile;
pub mod run;
pub mod search;
pub mod stats;

pub use error::{Error, Result};
pub use models::*;
pub use observability::{ReconMetrics, RunLogger};
