//! Paginated archive history port.

use async_trait::async_trait;

use crate::domain::entities::{ArchivedMessage, GroupId, PageRequest};
use crate::domain::errors::HistoryError;

/// Port for reading archived history one page at a time.
///
/// Pages are returned newest-first: `skip = 0` is the most recent message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageHistoryPort: Send + Sync {
    /// Fetches up to `request.limit` messages, skipping the `request.skip`
    /// most recent ones.
    async fn fetch_page(
        &self,
        group_id: &GroupId,
        request: PageRequest,
    ) -> Result<Vec<ArchivedMessage>, HistoryError>;
}
