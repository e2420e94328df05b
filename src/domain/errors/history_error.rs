//! Archive history error types.

use thiserror::Error;

/// Errors raised while fetching archived history.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum HistoryError {
    #[error("network error while fetching history: {message}")]
    Network { message: String },

    #[error("archive rejected the request: {message}")]
    Unauthorized { message: String },

    #[error("group {group_id} not found in archive")]
    GroupNotFound { group_id: String },

    #[error("rate limited by archive, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("archive is temporarily unavailable: {message}")]
    Unavailable { message: String },

    #[error("malformed history response: {reason}")]
    MalformedResponse { reason: String },

    #[error("unexpected history error: {message}")]
    Unexpected { message: String },
}

impl HistoryError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates group not found error.
    #[must_use]
    pub fn group_not_found(group_id: impl Into<String>) -> Self {
        Self::GroupNotFound {
            group_id: group_id.into(),
        }
    }

    /// Creates unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates malformed response error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::RateLimited { .. } | Self::Unavailable { .. }
        )
    }

    /// Returns whether the archive answered with something unusable rather
    /// than failing to answer.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }
}
