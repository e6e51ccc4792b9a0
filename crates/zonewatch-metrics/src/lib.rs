//! zonewatch-metrics — turns resource snapshots into published metrics.
//!
//! # Architecture
//!
//! ```text
//! AutoScalingGroup ──► ZoneStateCount ──┬─► healthy_records()
//!                                       └─► state_records()
//! DbCluster ──► analyze_clusters() ──► ClusterZoneCounts ──► cluster_records()
//!
//! Vec<MetricRecord> ──► publish_batched() ──► MetricPublisher (≤ 20 per call)
//! ```

pub mod aggregate;
pub mod batch;
pub mod builder;
pub mod cluster;

pub use aggregate::{ClusterZoneCounts, RoleCounts, ZoneStateCount, ZoneTally};
pub use batch::{MAX_BATCH_SIZE, MetricPublisher, PublishFuture, batch_count, batches, publish_batched};
pub use builder::{cluster_records, healthy_records, state_records};
pub use cluster::{analyze_cluster, analyze_clusters};
