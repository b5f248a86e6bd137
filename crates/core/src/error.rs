//! Error taxonomy for the emulated backend.
//!
//! Keep this focused on the failures a real client of the simulated API
//! would see. `ServiceUnavailable` is the only retryable kind and the only
//! one the optimistic coordinator treats as rollback-triggering; everything
//! else is surfaced to the caller immediately.

use thiserror::Error;

/// Result type used across the backend and client layers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Request-level error, mirroring what the emulated REST surface returns.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad input (e.g. blank job title). Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced id absent. Never retried.
    #[error("not found")]
    NotFound,

    /// Injected transient failure from the network simulator. The store is
    /// guaranteed unchanged when this is returned for a write.
    #[error("service unavailable: simulated network failure")]
    ServiceUnavailable,

    /// A precondition went stale (e.g. a reorder's `fromOrder` no longer
    /// matches the job's stored order).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An optimistic mutation is already pending on the target entity.
    #[error("busy: {0}")]
    Busy(String),

    /// Storage or serialization fault surfaced from the persistence layer.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether the failure is transient and safe to retry after rollback.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable)
    }
}
