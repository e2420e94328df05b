//! Initial history load for a freshly opened group.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::{ArchivedMessage, GroupId, PageRequest};
use crate::domain::errors::HistoryError;
use crate::domain::ports::MessageHistoryPort;

/// Loads the newest page of a group, oldest message first.
pub struct LoadRecentMessagesUseCase {
    history: Arc<dyn MessageHistoryPort>,
    page_size: usize,
}

impl LoadRecentMessagesUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(history: Arc<dyn MessageHistoryPort>, page_size: usize) -> Self {
        Self { history, page_size }
    }

    /// Fetches the newest page.
    ///
    /// # Errors
    /// Returns error if the archive request fails or its response is malformed.
    pub async fn execute(&self, group_id: &GroupId) -> Result<Vec<ArchivedMessage>, HistoryError> {
        debug!(group_id = %group_id, limit = self.page_size, "Loading recent messages");

        let mut messages = self
            .history
            .fetch_page(group_id, PageRequest::first(self.page_size))
            .await?;
        messages.reverse();

        info!(group_id = %group_id, count = messages.len(), "Recent messages loaded");
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockMessageHistoryPort;
    use crate::domain::ports::mocks::page_of;

    #[test]
    fn test_returns_newest_page_oldest_first() {
        let mut mock = MockMessageHistoryPort::new();
        mock.expect_fetch_page()
            .withf(|_, request| *request == PageRequest { skip: 0, limit: 30 })
            .times(1)
            .returning(|group_id, request| Ok(page_of(group_id, 500, request.skip, request.limit)));

        let use_case = LoadRecentMessagesUseCase::new(Arc::new(mock), 30);
        let messages = tokio_test::block_on(use_case.execute(&GroupId::from("-100"))).unwrap();

        assert_eq!(messages.len(), 30);
        assert_eq!(messages.first().unwrap().id().as_u64(), 471);
        assert_eq!(messages.last().unwrap().id().as_u64(), 500);
    }

    #[test]
    fn test_propagates_archive_errors() {
        let mut mock = MockMessageHistoryPort::new();
        mock.expect_fetch_page()
            .returning(|group_id, _| Err(HistoryError::group_not_found(group_id.as_str())));

        let use_case = LoadRecentMessagesUseCase::new(Arc::new(mock), 30);
        let result = tokio_test::block_on(use_case.execute(&GroupId::from("missing")));

        assert!(matches!(result, Err(HistoryError::GroupNotFound { .. })));
    }
}
