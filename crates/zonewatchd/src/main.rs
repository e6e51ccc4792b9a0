//! zonewatchd — the zonewatch daemon.
//!
//! Every polling interval it:
//! - lists Auto Scaling groups and counts instances per zone and state
//! - lists DB clusters and counts writers and readers per zone
//! - publishes the counts to CloudWatch in batches of at most 20
//!
//! # Usage
//!
//! ```text
//! POLLING_INTERVAL=30 AWS_REGION=us-east-1 zonewatchd
//! ```

mod poller;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{info, warn};

use zonewatch_aws::{AutoScalingGroups, CloudWatchPublisher, RdsClusters, load_sdk_config};
use zonewatch_core::PollConfig;

use crate::poller::Poller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,zonewatchd=debug,zonewatch=debug")),
        )
        .init();

    let config = PollConfig::from_env();
    let sdk_config = load_sdk_config()
        .await
        .context("unable to load AWS configuration")?;

    let clusters = RdsClusters::new(&sdk_config);
    let poller = Poller::new(
        config,
        Box::new(AutoScalingGroups::new(&sdk_config)),
        Box::new(clusters.clone()),
        Box::new(clusters),
        Box::new(CloudWatchPublisher::new(&sdk_config)),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Graceful shutdown on Ctrl-C.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "unable to listen for Ctrl-C");
                // Dropping the sender would read as a shutdown.
                let _tx = shutdown_tx;
                std::future::pending::<()>().await;
            }
        }
    });

    poller
        .run(shutdown_rx)
        .await
        .context("unable to describe Auto Scaling groups")?;

    info!("zonewatchd stopped");
    Ok(())
}
