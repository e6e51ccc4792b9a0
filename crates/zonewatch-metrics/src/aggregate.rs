//! Zone/state aggregation.
//!
//! Tallies the instances of one resource group by lifecycle state (or
//! cluster role) and availability zone. Every known zone is zero-filled
//! into every state so a series never disappears from a dashboard just
//! because nothing is in that state right now.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use zonewatch_core::{AsgInstance, AutoScalingGroup, ClusterId, ClusterRole, LifecycleState, Zone};

/// Count of instances in one (state, zone) cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneTally {
    pub instances: u64,
    /// How many of `instances` reported a `Healthy` health status.
    pub healthy: u64,
}

/// Per-state, per-zone instance counts for one Auto Scaling group.
///
/// Every state in [`LifecycleState::ALL`] is present, and every known zone
/// (declared by the group, or observed on one of its instances) is present
/// under every state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneStateCount {
    counts: BTreeMap<LifecycleState, BTreeMap<Zone, ZoneTally>>,
    zones: BTreeSet<Zone>,
    skipped: usize,
}

impl ZoneStateCount {
    /// Aggregate the instances of `group`.
    pub fn from_group(group: &AutoScalingGroup) -> Self {
        Self::aggregate(&group.name, &group.availability_zones, &group.instances)
    }

    /// Aggregate `instances` over `declared_zones`.
    ///
    /// Instances without a zone or a known lifecycle state are skipped and
    /// logged; they show up in [`skipped`](Self::skipped) only.
    pub fn aggregate(group: &str, declared_zones: &[Zone], instances: &[AsgInstance]) -> Self {
        let mut counts: BTreeMap<LifecycleState, BTreeMap<Zone, ZoneTally>> = LifecycleState::ALL
            .into_iter()
            .map(|state| (state, BTreeMap::new()))
            .collect();
        let mut zones: BTreeSet<Zone> = declared_zones.iter().cloned().collect();
        let mut skipped = 0;

        for instance in instances {
            let Some(zone) = instance.availability_zone.as_deref() else {
                warn!(%group, instance = %instance.instance_id, "instance has no availability zone, skipping");
                skipped += 1;
                continue;
            };
            let Some(state) = instance.lifecycle_state else {
                warn!(%group, instance = %instance.instance_id, "instance has no known lifecycle state, skipping");
                skipped += 1;
                continue;
            };

            let tally = counts
                .entry(state)
                .or_default()
                .entry(zone.to_string())
                .or_default();
            tally.instances += 1;
            if instance.is_healthy() {
                tally.healthy += 1;
            }

            if !zones.contains(zone) {
                debug!(%group, %zone, "instance in undeclared zone");
                zones.insert(zone.to_string());
            }
        }

        for by_zone in counts.values_mut() {
            for zone in &zones {
                by_zone.entry(zone.clone()).or_default();
            }
        }

        Self {
            counts,
            zones,
            skipped,
        }
    }

    /// Instances in `state` and `zone`. Unknown zones count as 0.
    pub fn count(&self, state: LifecycleState, zone: &str) -> u64 {
        self.counts
            .get(&state)
            .and_then(|by_zone| by_zone.get(zone))
            .map_or(0, |tally| tally.instances)
    }

    /// Zone → instance count for one state, in zone order.
    pub fn zone_counts(&self, state: LifecycleState) -> BTreeMap<&str, u64> {
        self.counts
            .get(&state)
            .map(|by_zone| {
                by_zone
                    .iter()
                    .map(|(zone, tally)| (zone.as_str(), tally.instances))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All cells, state by state in reporting order.
    pub fn states(&self) -> impl Iterator<Item = (LifecycleState, &BTreeMap<Zone, ZoneTally>)> {
        self.counts.iter().map(|(state, by_zone)| (*state, by_zone))
    }

    /// Instances in `state` across all zones.
    pub fn state_total(&self, state: LifecycleState) -> u64 {
        self.counts
            .get(&state)
            .map_or(0, |by_zone| by_zone.values().map(|t| t.instances).sum())
    }

    /// Instances counted across all states and zones.
    pub fn total(&self) -> u64 {
        LifecycleState::ALL
            .into_iter()
            .map(|state| self.state_total(state))
            .sum()
    }

    /// Every known zone, sorted.
    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(String::as_str)
    }

    /// Instances left out because their zone or state was missing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Healthy, in-service instances per zone.
    ///
    /// Read straight off the `InService` cells, so it can never disagree
    /// with the state counts. Kept for consumers of the older
    /// `HealthyInstancesInAZ` metric.
    pub fn healthy_in_service(&self) -> BTreeMap<&str, u64> {
        self.counts
            .get(&LifecycleState::InService)
            .map(|by_zone| {
                by_zone
                    .iter()
                    .map(|(zone, tally)| (zone.as_str(), tally.healthy))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ── DB clusters ───────────────────────────────────────────────────

/// Writers and readers placed in one zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCounts {
    pub writers: u64,
    pub readers: u64,
}

impl RoleCounts {
    pub fn record(&mut self, role: ClusterRole) {
        match role {
            ClusterRole::Writer => self.writers += 1,
            ClusterRole::Reader => self.readers += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.writers + self.readers
    }
}

/// Per-zone role counts for one DB cluster. Declared zones are always
/// present, zero-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterZoneCounts {
    cluster_id: ClusterId,
    zones: BTreeMap<Zone, RoleCounts>,
    skipped: usize,
}

impl ClusterZoneCounts {
    pub fn new(cluster_id: impl Into<ClusterId>, declared_zones: &[Zone]) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            zones: declared_zones
                .iter()
                .map(|zone| (zone.clone(), RoleCounts::default()))
                .collect(),
            skipped: 0,
        }
    }

    /// Count one member in `zone`. Undeclared zones are added.
    pub fn record(&mut self, zone: &str, role: ClusterRole) {
        self.zones.entry(zone.to_string()).or_default().record(role);
    }

    /// Note a member that could not be placed.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    pub fn get(&self, zone: &str) -> Option<RoleCounts> {
        self.zones.get(zone).copied()
    }

    /// Zone → counts, in zone order.
    pub fn zones(&self) -> impl Iterator<Item = (&str, RoleCounts)> {
        self.zones.iter().map(|(zone, counts)| (zone.as_str(), *counts))
    }

    /// Counts summed across zones.
    pub fn totals(&self) -> RoleCounts {
        self.zones.values().fold(RoleCounts::default(), |acc, c| RoleCounts {
            writers: acc.writers + c.writers,
            readers: acc.readers + c.readers,
        })
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(zone: Option<&str>, state: Option<LifecycleState>, health: &str) -> AsgInstance {
        AsgInstance {
            instance_id: format!("i-{}", zone.unwrap_or("none")),
            availability_zone: zone.map(str::to_string),
            lifecycle_state: state,
            health_status: Some(health.to_string()),
        }
    }

    fn zones(names: &[&str]) -> Vec<Zone> {
        names.iter().map(|z| z.to_string()).collect()
    }

    fn web_asg(third_health: &str) -> AutoScalingGroup {
        AutoScalingGroup {
            name: "web-asg".to_string(),
            availability_zones: zones(&["a", "b"]),
            instances: vec![
                instance(Some("a"), Some(LifecycleState::InService), "Healthy"),
                instance(Some("a"), Some(LifecycleState::Pending), "Healthy"),
                instance(Some("b"), Some(LifecycleState::InService), third_health),
            ],
        }
    }

    #[test]
    fn web_asg_with_unhealthy_instance_in_b() {
        let counts = ZoneStateCount::from_group(&web_asg("Unhealthy"));

        let legacy = counts.healthy_in_service();
        assert_eq!(legacy, BTreeMap::from([("a", 1), ("b", 0)]));

        assert_eq!(
            counts.zone_counts(LifecycleState::InService),
            BTreeMap::from([("a", 1), ("b", 1)])
        );
        assert_eq!(
            counts.zone_counts(LifecycleState::Pending),
            BTreeMap::from([("a", 1), ("b", 0)])
        );
        for state in LifecycleState::ALL {
            if state == LifecycleState::InService || state == LifecycleState::Pending {
                continue;
            }
            assert_eq!(
                counts.zone_counts(state),
                BTreeMap::from([("a", 0), ("b", 0)]),
                "state {state}"
            );
        }
    }

    #[test]
    fn web_asg_with_all_healthy() {
        let counts = ZoneStateCount::from_group(&web_asg("Healthy"));
        assert_eq!(
            counts.healthy_in_service(),
            BTreeMap::from([("a", 1), ("b", 1)])
        );
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn every_state_present_for_empty_group() {
        let counts = ZoneStateCount::aggregate("empty", &zones(&["a", "b", "c"]), &[]);
        assert_eq!(counts.states().count(), LifecycleState::ALL.len());
        for (_, by_zone) in counts.states() {
            assert_eq!(by_zone.len(), 3);
            assert!(by_zone.values().all(|t| t.instances == 0));
        }
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn no_declared_zones_and_no_instances() {
        let counts = ZoneStateCount::aggregate("bare", &[], &[]);
        assert_eq!(counts.states().count(), LifecycleState::ALL.len());
        assert!(counts.healthy_in_service().is_empty());
        assert_eq!(counts.zones().count(), 0);
    }

    #[test]
    fn undeclared_zone_is_filled_into_every_state() {
        let instances = vec![instance(Some("c"), Some(LifecycleState::Standby), "Healthy")];
        let counts = ZoneStateCount::aggregate("g", &zones(&["a"]), &instances);

        assert_eq!(counts.zones().collect::<Vec<_>>(), ["a", "c"]);
        for (_, by_zone) in counts.states() {
            assert!(by_zone.contains_key("a"));
            assert!(by_zone.contains_key("c"));
        }
        assert_eq!(counts.count(LifecycleState::Standby, "c"), 1);
    }

    #[test]
    fn instances_missing_zone_or_state_are_skipped() {
        let instances = vec![
            instance(None, Some(LifecycleState::InService), "Healthy"),
            instance(Some("a"), None, "Healthy"),
            instance(Some("a"), Some(LifecycleState::InService), "Healthy"),
        ];
        let counts = ZoneStateCount::aggregate("g", &zones(&["a"]), &instances);
        assert_eq!(counts.skipped(), 2);
        assert_eq!(counts.total(), 1);
        assert_eq!(counts.healthy_in_service(), BTreeMap::from([("a", 1)]));
    }

    #[test]
    fn state_sums_match_instance_counts() {
        let states = [
            LifecycleState::InService,
            LifecycleState::InService,
            LifecycleState::Terminating,
            LifecycleState::WarmedStopped,
            LifecycleState::InService,
        ];
        let zone_names = ["a", "b", "c"];
        let instances: Vec<AsgInstance> = states
            .iter()
            .enumerate()
            .map(|(i, state)| instance(Some(zone_names[i % 3]), Some(*state), "Healthy"))
            .collect();

        let counts = ZoneStateCount::aggregate("g", &zones(&["a", "b"]), &instances);
        for state in LifecycleState::ALL {
            let expected = states.iter().filter(|s| **s == state).count() as u64;
            assert_eq!(counts.state_total(state), expected, "state {state}");
        }
    }

    #[test]
    fn aggregation_is_repeatable() {
        let group = web_asg("Healthy");
        assert_eq!(
            ZoneStateCount::from_group(&group),
            ZoneStateCount::from_group(&group)
        );
    }

    #[test]
    fn cluster_counts_by_zone_and_role() {
        let mut counts = ClusterZoneCounts::new("orders-db", &zones(&["a", "b"]));
        counts.record("a", ClusterRole::Writer);
        counts.record("b", ClusterRole::Reader);
        counts.record("b", ClusterRole::Reader);

        assert_eq!(counts.get("a"), Some(RoleCounts { writers: 1, readers: 0 }));
        assert_eq!(counts.get("b"), Some(RoleCounts { writers: 0, readers: 2 }));
        assert_eq!(counts.totals(), RoleCounts { writers: 1, readers: 2 });
    }

    #[test]
    fn cluster_declared_zones_are_zero_filled() {
        let counts = ClusterZoneCounts::new("idle-db", &zones(&["a", "b", "c"]));
        assert_eq!(counts.zones().count(), 3);
        assert!(counts.zones().all(|(_, c)| c.total() == 0));
    }
}
