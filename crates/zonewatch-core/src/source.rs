//! Traits the poll loop reads cloud resource state through.
//!
//! The AWS adapters in `zonewatch-aws` implement these against the SDK
//! clients; tests inject in-memory fakes. Methods return boxed futures so
//! the traits stay object-safe.

use std::future::Future;
use std::pin::Pin;

use crate::error::CollectResult;
use crate::types::{AutoScalingGroup, DbCluster, InstanceDetail};

/// Boxed future alias for collaborator results.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = CollectResult<T>> + Send + 'a>>;

/// Lists every Auto Scaling group visible to the caller.
pub trait GroupLister: Send + Sync {
    fn list_groups(&self) -> SourceFuture<'_, Vec<AutoScalingGroup>>;
}

/// Lists every DB cluster visible to the caller, with members.
pub trait ClusterLister: Send + Sync {
    fn list_clusters(&self) -> SourceFuture<'_, Vec<DbCluster>>;
}

/// Resolves the current placement of a single DB instance.
pub trait InstanceDetailLookup: Send + Sync {
    /// Look up `instance_identifier`. An instance the API does not return
    /// is [`CollectError::NotFound`](crate::CollectError::NotFound).
    fn describe_instance<'a>(&'a self, instance_identifier: &'a str)
    -> SourceFuture<'a, InstanceDetail>;
}
