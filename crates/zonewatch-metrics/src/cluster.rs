//! DB cluster analysis: places each cluster member in a zone by looking
//! up its instance, then tallies writers and readers per zone.

use tracing::{debug, warn};

use zonewatch_core::{ClusterLister, CollectResult, DbCluster, InstanceDetailLookup};

use crate::aggregate::ClusterZoneCounts;

/// List every cluster and count its members per zone and role.
///
/// Any listing or lookup failure aborts the whole analysis; the caller
/// decides whether that is fatal.
pub async fn analyze_clusters(
    lister: &dyn ClusterLister,
    lookup: &dyn InstanceDetailLookup,
) -> CollectResult<Vec<ClusterZoneCounts>> {
    let clusters = lister.list_clusters().await?;
    debug!(clusters = clusters.len(), "listed DB clusters");

    let mut analyzed = Vec::with_capacity(clusters.len());
    for cluster in &clusters {
        analyzed.push(analyze_cluster(cluster, lookup).await?);
    }
    Ok(analyzed)
}

/// Count the members of a single cluster. One lookup per member.
pub async fn analyze_cluster(
    cluster: &DbCluster,
    lookup: &dyn InstanceDetailLookup,
) -> CollectResult<ClusterZoneCounts> {
    let cluster_id = cluster.identifier.as_str();
    let mut counts = ClusterZoneCounts::new(cluster_id, &cluster.availability_zones);

    for member in &cluster.members {
        let Some(instance_id) = member.instance_identifier.as_deref() else {
            debug!(cluster = %cluster_id, "member without instance identifier, skipping");
            counts.skip();
            continue;
        };
        let Some(role) = member.role else {
            warn!(cluster = %cluster_id, instance = %instance_id, "member has no writer flag, skipping");
            counts.skip();
            continue;
        };

        let detail = lookup.describe_instance(instance_id).await?;
        match detail.availability_zone {
            Some(zone) => counts.record(&zone, role),
            None => {
                warn!(cluster = %cluster_id, instance = %instance_id, "instance has no availability zone, skipping");
                counts.skip();
            }
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use zonewatch_core::{
        ClusterRole, CollectError, DbClusterMember, InstanceDetail, SourceFuture,
    };

    use crate::aggregate::RoleCounts;

    struct FixedClusters(Vec<DbCluster>);

    impl ClusterLister for FixedClusters {
        fn list_clusters(&self) -> SourceFuture<'_, Vec<DbCluster>> {
            let clusters = self.0.clone();
            Box::pin(async move { Ok(clusters) })
        }
    }

    struct FailingClusters;

    impl ClusterLister for FailingClusters {
        fn list_clusters(&self) -> SourceFuture<'_, Vec<DbCluster>> {
            Box::pin(async {
                Err(CollectError::Api {
                    service: "rds",
                    operation: "DescribeDBClusters",
                    message: "throttled".to_string(),
                })
            })
        }
    }

    /// id → zone; `None` zone means the instance exists without a zone.
    struct ZoneTable {
        zones: HashMap<&'static str, Option<&'static str>>,
        calls: AtomicUsize,
    }

    impl ZoneTable {
        fn new(entries: &[(&'static str, Option<&'static str>)]) -> Self {
            Self {
                zones: entries.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl InstanceDetailLookup for ZoneTable {
        fn describe_instance<'a>(
            &'a self,
            instance_identifier: &'a str,
        ) -> SourceFuture<'a, InstanceDetail> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Box::pin(async move {
                match self.zones.get(instance_identifier) {
                    Some(zone) => Ok(InstanceDetail {
                        availability_zone: zone.map(str::to_string),
                    }),
                    None => Err(CollectError::NotFound(instance_identifier.to_string())),
                }
            })
        }
    }

    fn member(id: &str, writer: Option<bool>) -> DbClusterMember {
        DbClusterMember {
            instance_identifier: Some(id.to_string()),
            role: writer.map(ClusterRole::from_writer_flag),
        }
    }

    fn orders_db() -> DbCluster {
        DbCluster {
            identifier: "orders-db".to_string(),
            availability_zones: vec!["a".to_string(), "b".to_string()],
            members: vec![
                member("orders-1", Some(true)),
                member("orders-2", Some(false)),
                member("orders-3", Some(false)),
            ],
        }
    }

    #[tokio::test]
    async fn one_writer_two_readers() {
        let lookup = ZoneTable::new(&[
            ("orders-1", Some("a")),
            ("orders-2", Some("b")),
            ("orders-3", Some("b")),
        ]);

        let counts = analyze_cluster(&orders_db(), &lookup).await.unwrap();
        assert_eq!(counts.get("a"), Some(RoleCounts { writers: 1, readers: 0 }));
        assert_eq!(counts.get("b"), Some(RoleCounts { writers: 0, readers: 2 }));
        assert_eq!(lookup.calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn lookup_failure_aborts_analysis() {
        let lookup = ZoneTable::new(&[("orders-1", Some("a"))]);
        let lister = FixedClusters(vec![orders_db()]);

        let result = analyze_clusters(&lister, &lookup).await;
        assert!(matches!(result, Err(CollectError::NotFound(id)) if id == "orders-2"));
    }

    #[tokio::test]
    async fn listing_failure_propagates() {
        let lookup = ZoneTable::new(&[]);
        let result = analyze_clusters(&FailingClusters, &lookup).await;
        assert!(matches!(result, Err(CollectError::Api { service: "rds", .. })));
    }

    #[tokio::test]
    async fn unplaceable_members_are_skipped() {
        let cluster = DbCluster {
            identifier: "reports-db".to_string(),
            availability_zones: vec!["a".to_string()],
            members: vec![
                DbClusterMember {
                    instance_identifier: None,
                    role: Some(ClusterRole::Reader),
                },
                member("reports-1", None),
                member("reports-2", Some(false)),
                member("reports-3", Some(true)),
            ],
        };
        let lookup = ZoneTable::new(&[("reports-2", None), ("reports-3", Some("a"))]);

        let counts = analyze_cluster(&cluster, &lookup).await.unwrap();
        assert_eq!(counts.skipped(), 3);
        assert_eq!(counts.totals(), RoleCounts { writers: 1, readers: 0 });
        // Members without an identifier or role never reach the lookup.
        assert_eq!(lookup.calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn no_clusters_yields_nothing() {
        let lookup = ZoneTable::new(&[]);
        let analyzed = analyze_clusters(&FixedClusters(Vec::new()), &lookup)
            .await
            .unwrap();
        assert!(analyzed.is_empty());
    }
}
