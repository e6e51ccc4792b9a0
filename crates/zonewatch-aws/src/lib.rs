//! zonewatch-aws — AWS SDK adapters for the zonewatch collaborator traits.
//!
//! # Architecture
//!
//! ```text
//! load_sdk_config() ── SdkConfig ──┬─► AutoScalingGroups  (GroupLister)
//!                                  ├─► RdsClusters        (ClusterLister + InstanceDetailLookup)
//!                                  └─► CloudWatchPublisher (MetricPublisher)
//! ```
//!
//! Listing calls follow every page. Nothing here retries; errors are
//! mapped to the `zonewatch-core` taxonomy and handed back to the poller.

pub mod autoscaling;
pub mod cloudwatch;
pub mod rds;

pub use autoscaling::AutoScalingGroups;
pub use cloudwatch::CloudWatchPublisher;
pub use rds::RdsClusters;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use tracing::{debug, info};

use zonewatch_core::{SetupError, SetupResult};

/// Load the default AWS configuration and resolve credentials once.
///
/// Fails when no region is configured or the default credential chain
/// cannot produce credentials, so a misconfigured process stops before
/// its first cycle.
pub async fn load_sdk_config() -> SetupResult<SdkConfig> {
    let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

    let region = config.region().ok_or(SetupError::MissingRegion)?;
    let provider = config
        .credentials_provider()
        .ok_or(SetupError::MissingCredentials)?;

    let credentials = provider
        .provide_credentials()
        .await
        .map_err(|e| SetupError::Credentials(e.to_string()))?;
    debug!(expiry = ?credentials.expiry(), "credentials resolved");

    info!(%region, "AWS configuration loaded");
    Ok(config)
}
