//! DB cluster lister and instance placement lookup.

use aws_config::SdkConfig;
use aws_sdk_rds::Client;
use aws_sdk_rds::error::DisplayErrorContext;
use aws_sdk_rds::types as sdk;
use tracing::debug;

use zonewatch_core::{
    ClusterLister, ClusterRole, CollectError, DbCluster, DbClusterMember, InstanceDetail,
    InstanceDetailLookup, SourceFuture,
};

const SERVICE: &str = "rds";

fn api_error(operation: &'static str, err: impl std::error::Error) -> CollectError {
    CollectError::Api {
        service: SERVICE,
        operation,
        message: DisplayErrorContext(&err).to_string(),
    }
}

/// Lists DB clusters through `DescribeDBClusters` and places members
/// through `DescribeDBInstances`.
#[derive(Debug, Clone)]
pub struct RdsClusters {
    client: Client,
}

impl RdsClusters {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl ClusterLister for RdsClusters {
    fn list_clusters(&self) -> SourceFuture<'_, Vec<DbCluster>> {
        Box::pin(async move {
            let mut pages = self.client.describe_db_clusters().into_paginator().send();

            let mut clusters = Vec::new();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|e| api_error("DescribeDBClusters", e))?;
                clusters.extend(page.db_clusters().iter().map(convert_cluster));
            }
            Ok(clusters)
        })
    }
}

impl InstanceDetailLookup for RdsClusters {
    fn describe_instance<'a>(
        &'a self,
        instance_identifier: &'a str,
    ) -> SourceFuture<'a, InstanceDetail> {
        Box::pin(async move {
            let output = self
                .client
                .describe_db_instances()
                .db_instance_identifier(instance_identifier)
                .send()
                .await
                .map_err(|e| api_error("DescribeDBInstances", e))?;

            let instance = output
                .db_instances()
                .first()
                .ok_or_else(|| CollectError::NotFound(instance_identifier.to_string()))?;

            let detail = InstanceDetail {
                availability_zone: instance.availability_zone().map(str::to_string),
            };
            debug!(instance = %instance_identifier, zone = ?detail.availability_zone, "instance placed");
            Ok(detail)
        })
    }
}

fn convert_cluster(cluster: &sdk::DbCluster) -> DbCluster {
    DbCluster {
        identifier: cluster
            .db_cluster_identifier()
            .unwrap_or_default()
            .to_string(),
        availability_zones: cluster.availability_zones().to_vec(),
        members: cluster.db_cluster_members().iter().map(convert_member).collect(),
    }
}

fn convert_member(member: &sdk::DbClusterMember) -> DbClusterMember {
    DbClusterMember {
        instance_identifier: member.db_instance_identifier().map(str::to_string),
        role: member.is_cluster_writer().map(ClusterRole::from_writer_flag),
    }
}
