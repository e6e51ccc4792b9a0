//! Poll loop: one fetch, aggregate, publish cycle per interval.
//!
//! A cycle handles every Auto Scaling group, then every DB cluster, and
//! only then sleeps. Failing to list Auto Scaling groups ends the loop;
//! every other failure is logged and the cycle moves on.

use std::time::SystemTime;

use tokio::sync::watch;
use tracing::{debug, error, info};

use zonewatch_core::{
    AutoScalingGroup, ClusterLister, CollectResult, GroupLister, InstanceDetailLookup,
    MetricRecord, MetricResult, PollConfig,
};
use zonewatch_metrics::{
    MetricPublisher, ZoneStateCount, analyze_clusters, cluster_records, healthy_records,
    publish_batched, state_records,
};

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Auto Scaling groups processed.
    pub groups: usize,
    /// DB clusters processed.
    pub clusters: usize,
    /// Publish calls that succeeded.
    pub batches: usize,
    /// Record sets that could not be built or fully published.
    pub failures: usize,
    /// Instances and cluster members left out for missing zone, state or role.
    pub members_skipped: usize,
    /// Cluster metrics were skipped because analysis failed.
    pub clusters_skipped: bool,
}

/// Drives the poll cycle against a set of collaborators.
pub struct Poller {
    config: PollConfig,
    groups: Box<dyn GroupLister>,
    clusters: Box<dyn ClusterLister>,
    lookup: Box<dyn InstanceDetailLookup>,
    publisher: Box<dyn MetricPublisher>,
}

impl Poller {
    pub fn new(
        config: PollConfig,
        groups: Box<dyn GroupLister>,
        clusters: Box<dyn ClusterLister>,
        lookup: Box<dyn InstanceDetailLookup>,
        publisher: Box<dyn MetricPublisher>,
    ) -> Self {
        Self {
            config,
            groups,
            clusters,
            lookup,
            publisher,
        }
    }

    /// Run one full cycle.
    ///
    /// Only a failure to list Auto Scaling groups is returned.
    pub async fn run_cycle(&self) -> CollectResult<CycleReport> {
        let groups = self.groups.list_groups().await?;
        let mut report = CycleReport::default();

        for group in &groups {
            self.publish_group(group, &mut report).await;
            report.groups += 1;
        }

        self.publish_clusters(&mut report).await;
        Ok(report)
    }

    async fn publish_group(&self, group: &AutoScalingGroup, report: &mut CycleReport) {
        let name = group.name.as_str();
        let counts = ZoneStateCount::from_group(group);
        let timestamp = SystemTime::now();

        for (zone, count) in counts.healthy_in_service() {
            debug!(group = %name, %zone, count, "healthy and in service");
        }
        let healthy = healthy_records(name, &counts, timestamp);
        if matches!(&healthy, Ok(records) if records.is_empty()) {
            info!(group = %name, "no healthy and in-service instances");
        } else {
            self.publish(name, healthy, report).await;
        }

        for (state, by_zone) in counts.states() {
            for (zone, tally) in by_zone.iter().filter(|(_, t)| t.instances > 0) {
                debug!(group = %name, %state, %zone, count = tally.instances, "instances in state");
            }
        }
        self.publish(name, state_records(name, &counts, timestamp), report)
            .await;

        report.members_skipped += counts.skipped();
        info!(
            group = %name,
            total = counts.total(),
            skipped = counts.skipped(),
            "Auto Scaling group processed"
        );
    }

    async fn publish_clusters(&self, report: &mut CycleReport) {
        let analyzed = match analyze_clusters(self.clusters.as_ref(), self.lookup.as_ref()).await {
            Ok(analyzed) => analyzed,
            Err(e) => {
                error!(error = %e, "DB cluster analysis failed, skipping cluster metrics");
                report.clusters_skipped = true;
                return;
            }
        };

        let timestamp = SystemTime::now();
        for counts in &analyzed {
            let cluster = counts.cluster_id();
            for (zone, roles) in counts.zones() {
                debug!(%cluster, %zone, writers = roles.writers, readers = roles.readers, "cluster placement");
            }
            self.publish(cluster, cluster_records(counts, timestamp), report)
                .await;
            report.clusters += 1;
            report.members_skipped += counts.skipped();

            let totals = counts.totals();
            info!(
                %cluster,
                writers = totals.writers,
                readers = totals.readers,
                skipped = counts.skipped(),
                "DB cluster processed"
            );
        }
    }

    /// Publish one record set, logging instead of propagating failures.
    async fn publish(
        &self,
        resource: &str,
        records: MetricResult<Vec<MetricRecord>>,
        report: &mut CycleReport,
    ) {
        let records = match records {
            Ok(records) => records,
            Err(e) => {
                error!(%resource, error = %e, "failed to build metrics");
                report.failures += 1;
                return;
            }
        };

        match publish_batched(self.publisher.as_ref(), &self.config.namespace, &records).await {
            Ok(batches) => report.batches += batches,
            Err(e) => {
                error!(%resource, error = %e, "error sending metrics");
                report.batches += e.accepted_batches().unwrap_or(0);
                report.failures += 1;
            }
        }
    }

    /// Run cycles until `shutdown` changes or group listing fails.
    ///
    /// The shutdown signal is only observed between cycles.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> CollectResult<()> {
        let interval = self.config.polling_interval();
        info!(
            interval_secs = interval.as_secs(),
            namespace = %self.config.namespace,
            "poller started"
        );

        loop {
            let report = self.run_cycle().await.inspect_err(|e| {
                error!(error = %e, "unable to describe Auto Scaling groups");
            })?;
            debug!(?report, "cycle complete");

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {
                    info!("poller shutting down");
                    return Ok(());
                }
            }
        }
    }
}
