//! Error types for zonewatch.

use thiserror::Error;

/// Result type alias for fetching groups, clusters, and instance details.
pub type CollectResult<T> = Result<T, CollectError>;

/// Result type alias for publishing metric batches.
pub type PublishResult<T> = Result<T, PublishError>;

/// Result type alias for building metric records.
pub type MetricResult<T> = Result<T, MetricError>;

/// Result type alias for process startup.
pub type SetupResult<T> = Result<T, SetupError>;

/// Errors raised while reading resource state from the cloud APIs.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("{service} {operation} failed: {message}")]
    Api {
        service: &'static str,
        operation: &'static str,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),
}

/// Errors raised while publishing metric records.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("batch of {size} records exceeds the per-call limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("publish to namespace {namespace} rejected: {message}")]
    Rejected { namespace: String, message: String },

    #[error("batch {batch} of {batches} failed: {source}")]
    Batch {
        /// 1-based index of the failing batch.
        batch: usize,
        batches: usize,
        #[source]
        source: Box<PublishError>,
    },
}

impl PublishError {
    /// Number of batches accepted before this error, if known.
    pub fn accepted_batches(&self) -> Option<usize> {
        match self {
            PublishError::Batch { batch, .. } => Some(batch - 1),
            _ => None,
        }
    }
}

/// Errors raised while shaping metric records.
#[derive(Debug, Error, PartialEq)]
pub enum MetricError {
    #[error("duplicate dimension: {0}")]
    DuplicateDimension(String),
}

/// Errors that abort the process before the poll loop starts.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no AWS region configured")]
    MissingRegion,

    #[error("no AWS credentials provider configured")]
    MissingCredentials,

    #[error("failed to resolve AWS credentials: {0}")]
    Credentials(String),
}
