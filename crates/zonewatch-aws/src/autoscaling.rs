//! Auto Scaling group lister.

use aws_config::SdkConfig;
use aws_sdk_autoscaling::Client;
use aws_sdk_autoscaling::error::DisplayErrorContext;
use aws_sdk_autoscaling::types as sdk;
use tracing::{debug, warn};

use zonewatch_core::{
    AsgInstance, AutoScalingGroup, CollectError, GroupLister, LifecycleState, SourceFuture,
};

const SERVICE: &str = "autoscaling";

/// Lists Auto Scaling groups through `DescribeAutoScalingGroups`.
#[derive(Debug, Clone)]
pub struct AutoScalingGroups {
    client: Client,
}

impl AutoScalingGroups {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl GroupLister for AutoScalingGroups {
    fn list_groups(&self) -> SourceFuture<'_, Vec<AutoScalingGroup>> {
        Box::pin(async move {
            let mut pages = self
                .client
                .describe_auto_scaling_groups()
                .into_paginator()
                .send();

            let mut groups = Vec::new();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|e| CollectError::Api {
                    service: SERVICE,
                    operation: "DescribeAutoScalingGroups",
                    message: DisplayErrorContext(&e).to_string(),
                })?;
                groups.extend(page.auto_scaling_groups().iter().map(convert_group));
            }

            debug!(groups = groups.len(), "listed Auto Scaling groups");
            Ok(groups)
        })
    }
}

fn convert_group(group: &sdk::AutoScalingGroup) -> AutoScalingGroup {
    let name = group
        .auto_scaling_group_name()
        .unwrap_or_default()
        .to_string();

    AutoScalingGroup {
        availability_zones: group.availability_zones().to_vec(),
        instances: group
            .instances()
            .iter()
            .map(|instance| convert_instance(&name, instance))
            .collect(),
        name,
    }
}

fn convert_instance(group: &str, instance: &sdk::Instance) -> AsgInstance {
    let instance_id = instance.instance_id().unwrap_or_default().to_string();

    let lifecycle_state = instance.lifecycle_state().and_then(|state| {
        let label = state.as_str();
        let parsed = LifecycleState::from_label(label);
        if parsed.is_none() {
            warn!(%group, instance = %instance_id, state = %label, "unrecognized lifecycle state");
        }
        parsed
    });

    AsgInstance {
        availability_zone: instance.availability_zone().map(str::to_string),
        health_status: instance.health_status().map(str::to_string),
        lifecycle_state,
        instance_id,
    }
}
