//! Metric record shaping.
//!
//! Turns aggregates into the flat record lists published to the
//! monitoring backend. Names and dimension keys are fixed; dashboards and
//! alarms outside this process depend on them.

use std::time::SystemTime;

use zonewatch_core::{Dimensions, MetricRecord, MetricResult};

use crate::aggregate::{ClusterZoneCounts, ZoneStateCount};

pub const GROUP_DIMENSION: &str = "AutoScalingGroupName";
pub const CLUSTER_DIMENSION: &str = "DBClusterIdentifier";
pub const ZONE_DIMENSION: &str = "AvailabilityZone";
pub const STATE_DIMENSION: &str = "EC2State";

pub const HEALTHY_IN_AZ: &str = "HealthyInstancesInAZ";
pub const TOTAL_HEALTHY: &str = "TotalHealthyInstances";
pub const TOTAL_INSTANCES: &str = "TotalInstances";
pub const WRITERS_IN_AZ: &str = "WriterInstancesInAZ";
pub const READERS_IN_AZ: &str = "ReaderInstancesInAZ";
pub const TOTAL_WRITERS: &str = "TotalWriterInstances";
pub const TOTAL_READERS: &str = "TotalReaderInstances";

fn dimensions(pairs: &[(&str, &str)]) -> MetricResult<Dimensions> {
    pairs
        .iter()
        .try_fold(Dimensions::new(), |dims, (name, value)| dims.with(*name, *value))
}

/// Healthy, in-service instances per zone plus a group total.
///
/// Returns nothing when the group has no zones at all.
pub fn healthy_records(
    group: &str,
    counts: &ZoneStateCount,
    timestamp: SystemTime,
) -> MetricResult<Vec<MetricRecord>> {
    let by_zone = counts.healthy_in_service();
    if by_zone.is_empty() {
        return Ok(Vec::new());
    }

    let mut records = Vec::with_capacity(by_zone.len() + 1);
    let mut total = 0;
    for (zone, count) in by_zone {
        total += count;
        records.push(MetricRecord::count(
            HEALTHY_IN_AZ,
            count,
            timestamp,
            dimensions(&[(GROUP_DIMENSION, group), (ZONE_DIMENSION, zone)])?,
        ));
    }
    records.push(MetricRecord::count(
        TOTAL_HEALTHY,
        total,
        timestamp,
        dimensions(&[(GROUP_DIMENSION, group)])?,
    ));

    Ok(records)
}

/// One record per (state, zone), a total per state, and a group total.
///
/// Per-zone records are named after the state itself (`InService`,
/// `Warmed:Stopped`, ...) and carry the state again as a dimension.
pub fn state_records(
    group: &str,
    counts: &ZoneStateCount,
    timestamp: SystemTime,
) -> MetricResult<Vec<MetricRecord>> {
    let mut records = Vec::new();

    for (state, by_zone) in counts.states() {
        let label = state.as_str();
        for (zone, tally) in by_zone {
            records.push(MetricRecord::count(
                label,
                tally.instances,
                timestamp,
                dimensions(&[
                    (GROUP_DIMENSION, group),
                    (ZONE_DIMENSION, zone.as_str()),
                    (STATE_DIMENSION, label),
                ])?,
            ));
        }
        records.push(MetricRecord::count(
            TOTAL_INSTANCES,
            counts.state_total(state),
            timestamp,
            dimensions(&[(GROUP_DIMENSION, group), (STATE_DIMENSION, label)])?,
        ));
    }

    records.push(MetricRecord::count(
        TOTAL_INSTANCES,
        counts.total(),
        timestamp,
        dimensions(&[(GROUP_DIMENSION, group)])?,
    ));

    Ok(records)
}

/// Writer and reader counts per zone, plus per-role and cluster totals.
pub fn cluster_records(
    counts: &ClusterZoneCounts,
    timestamp: SystemTime,
) -> MetricResult<Vec<MetricRecord>> {
    let cluster = counts.cluster_id();
    let mut records = Vec::new();

    for (zone, role_counts) in counts.zones() {
        let dims = dimensions(&[(CLUSTER_DIMENSION, cluster), (ZONE_DIMENSION, zone)])?;
        records.push(MetricRecord::count(
            WRITERS_IN_AZ,
            role_counts.writers,
            timestamp,
            dims.clone(),
        ));
        records.push(MetricRecord::count(
            READERS_IN_AZ,
            role_counts.readers,
            timestamp,
            dims,
        ));
    }

    let totals = counts.totals();
    let dims = dimensions(&[(CLUSTER_DIMENSION, cluster)])?;
    records.push(MetricRecord::count(TOTAL_WRITERS, totals.writers, timestamp, dims.clone()));
    records.push(MetricRecord::count(TOTAL_READERS, totals.readers, timestamp, dims.clone()));
    records.push(MetricRecord::count(TOTAL_INSTANCES, totals.total(), timestamp, dims));

    Ok(records)
}
