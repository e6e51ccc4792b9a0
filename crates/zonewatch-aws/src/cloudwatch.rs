//! CloudWatch metric publisher.

use aws_config::SdkConfig;
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};

use zonewatch_core::{MetricRecord, PublishError, Unit};
use zonewatch_metrics::{MAX_BATCH_SIZE, MetricPublisher, PublishFuture};

/// Publishes record batches through `PutMetricData`.
#[derive(Debug, Clone)]
pub struct CloudWatchPublisher {
    client: Client,
}

impl CloudWatchPublisher {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl MetricPublisher for CloudWatchPublisher {
    fn publish<'a>(&'a self, namespace: &'a str, batch: &'a [MetricRecord]) -> PublishFuture<'a> {
        Box::pin(async move {
            if batch.len() > MAX_BATCH_SIZE {
                return Err(PublishError::BatchTooLarge {
                    size: batch.len(),
                    max: MAX_BATCH_SIZE,
                });
            }

            self.client
                .put_metric_data()
                .namespace(namespace)
                .set_metric_data(Some(batch.iter().map(to_datum).collect()))
                .send()
                .await
                .map_err(|e| PublishError::Rejected {
                    namespace: namespace.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            Ok(())
        })
    }
}

fn to_unit(unit: Unit) -> StandardUnit {
    match unit {
        Unit::Count => StandardUnit::Count,
    }
}

fn to_datum(record: &MetricRecord) -> MetricDatum {
    let dimensions = record
        .dimensions()
        .iter()
        .map(|d| {
            Dimension::builder()
                .name(d.name.as_str())
                .value(d.value.as_str())
                .build()
        })
        .collect();

    MetricDatum::builder()
        .metric_name(record.name())
        .value(record.value())
        .timestamp(DateTime::from(record.timestamp()))
        .unit(to_unit(record.unit()))
        .set_dimensions(Some(dimensions))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use zonewatch_core::Dimensions;

    #[test]
    fn datum_carries_name_value_unit_and_dimensions() {
        let at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let dims = Dimensions::new()
            .with("AutoScalingGroupName", "web-asg")
            .unwrap()
            .with("AvailabilityZone", "us-east-1a")
            .unwrap();
        let record = MetricRecord::count("HealthyInstancesInAZ", 3, at, dims);

        let datum = to_datum(&record);
        assert_eq!(datum.metric_name(), Some("HealthyInstancesInAZ"));
        assert_eq!(datum.value(), Some(3.0));
        assert_eq!(datum.unit(), Some(&StandardUnit::Count));
        assert_eq!(datum.timestamp().map(|t| t.secs()), Some(1_700_000_000));

        let names: Vec<_> = datum.dimensions().iter().map(|d| d.name()).collect();
        assert_eq!(names, [Some("AutoScalingGroupName"), Some("AvailabilityZone")]);
    }

    #[tokio::test]
    async fn oversized_batch_is_refused_before_any_call() {
        let config = aws_sdk_cloudwatch::Config::builder()
            .behavior_version(aws_sdk_cloudwatch::config::BehaviorVersion::latest())
            .region(aws_sdk_cloudwatch::config::Region::new("us-east-1"))
            .build();
        let publisher = CloudWatchPublisher::from_client(Client::from_conf(config));

        let now = SystemTime::now();
        let records: Vec<MetricRecord> = (0..MAX_BATCH_SIZE + 1)
            .map(|i| MetricRecord::count(format!("m{i}"), 1, now, Dimensions::new()))
            .collect();

        let err = publisher.publish("CustomAZMetrics", &records).await.unwrap_err();
        assert!(matches!(err, PublishError::BatchTooLarge { size: 21, max: 20 }));
    }
}
