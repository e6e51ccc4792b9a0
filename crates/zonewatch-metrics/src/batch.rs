//! Batching and publishing of metric records.
//!
//! The monitoring backend accepts at most [`MAX_BATCH_SIZE`] records per
//! call, so record lists go out as consecutive chunks. Publishing stops at
//! the first rejected chunk.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use zonewatch_core::{MetricRecord, PublishError, PublishResult};

/// Records accepted per publish call.
pub const MAX_BATCH_SIZE: usize = 20;

/// Boxed future alias for publish results.
pub type PublishFuture<'a> = Pin<Box<dyn Future<Output = PublishResult<()>> + Send + 'a>>;

/// Sink for metric records.
pub trait MetricPublisher: Send + Sync {
    /// Publish one batch of at most [`MAX_BATCH_SIZE`] records. The batch
    /// is accepted or rejected as a whole.
    fn publish<'a>(&'a self, namespace: &'a str, batch: &'a [MetricRecord]) -> PublishFuture<'a>;
}

/// Split `items` into order-preserving chunks of at most
/// [`MAX_BATCH_SIZE`]. Empty input yields no chunks.
pub fn batches<T>(items: &[T]) -> std::slice::Chunks<'_, T> {
    items.chunks(MAX_BATCH_SIZE)
}

/// Number of chunks [`batches`] yields for `len` items.
pub fn batch_count(len: usize) -> usize {
    len.div_ceil(MAX_BATCH_SIZE)
}

/// Publish `records` batch by batch, stopping at the first failure.
///
/// Returns the number of batches published. An empty list makes no call.
pub async fn publish_batched(
    publisher: &dyn MetricPublisher,
    namespace: &str,
    records: &[MetricRecord],
) -> PublishResult<usize> {
    let total = batch_count(records.len());

    for (index, batch) in batches(records).enumerate() {
        publisher
            .publish(namespace, batch)
            .await
            .map_err(|e| PublishError::Batch {
                batch: index + 1,
                batches: total,
                source: Box::new(e),
            })?;
        debug!(%namespace, batch = index + 1, batches = total, records = batch.len(), "batch published");
    }

    Ok(total)
}
