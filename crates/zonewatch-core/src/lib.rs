//! zonewatch-core — shared types for the zonewatch crates.
//!
//! Holds the per-cycle snapshots of Auto Scaling groups and DB clusters,
//! the metric records built from them, the error taxonomy, the poll
//! configuration, and the traits the poll loop talks to the cloud through.

pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::PollConfig;
pub use error::*;
pub use source::{ClusterLister, GroupLister, InstanceDetailLookup, SourceFuture};
pub use types::*;
