//! Pagination state of one scrolled conversation.

use super::GroupId;
use crate::domain::errors::HistoryError;

/// Window of history requested from the archive.
///
/// `skip` counts back from the newest message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct PageRequest {
    pub skip: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Request for the given zero-based page.
    #[must_use]
    pub const fn for_page(page: u32, page_size: usize) -> Self {
        Self {
            skip: page as usize * page_size,
            limit: page_size,
        }
    }

    /// Request for the newest page.
    #[must_use]
    pub const fn first(page_size: usize) -> Self {
        Self::for_page(0, page_size)
    }
}

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for the next page.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// No further pages will be requested until reset.
    Exhausted,
}

/// Pagination counters for the selected group.
///
/// Page 1 is the first page of *older* history: the newest page (page 0)
/// is loaded by the host when the group is opened.
#[derive(Debug)]
pub struct ScrollSession {
    group_id: GroupId,
    current_page: u32,
    has_more: bool,
    total_loaded: usize,
    is_loading_more: bool,
    last_error: Option<HistoryError>,
}

#[allow(missing_docs)]
impl ScrollSession {
    #[must_use]
    pub const fn new(group_id: GroupId) -> Self {
        Self {
            group_id,
            current_page: 1,
            has_more: true,
            total_loaded: 0,
            is_loading_more: false,
            last_error: None,
        }
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
        self.has_more = true;
        self.total_loaded = 0;
        self.is_loading_more = false;
        self.last_error = None;
    }

    #[must_use]
    pub const fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub const fn total_loaded(&self) -> usize {
        self.total_loaded
    }

    #[must_use]
    pub const fn is_loading_more(&self) -> bool {
        self.is_loading_more
    }

    /// Error that exhausted the session, if it ended by failure rather than
    /// by reaching the start of history.
    #[must_use]
    pub const fn last_error(&self) -> Option<&HistoryError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub const fn can_load(&self, max_pages: u32) -> bool {
        !self.is_loading_more && self.has_more && self.current_page < max_pages
    }

    #[must_use]
    pub const fn state(&self, max_pages: u32) -> SessionState {
        if self.is_loading_more {
            SessionState::Loading
        } else if !self.has_more || self.current_page >= max_pages {
            SessionState::Exhausted
        } else {
            SessionState::Idle
        }
    }

    /// Marks a fetch as in flight and returns the page to request, or `None`
    /// when the preconditions for loading do not hold.
    pub fn begin_load(&mut self, page_size: usize, max_pages: u32) -> Option<PageRequest> {
        if !self.can_load(max_pages) {
            return None;
        }
        self.is_loading_more = true;
        Some(PageRequest::for_page(self.current_page, page_size))
    }

    /// Records a successful fetch of `received` messages.
    pub fn complete_load(&mut self, received: usize, page_size: usize, max_pages: u32) {
        self.is_loading_more = false;

        if received == 0 {
            self.has_more = false;
            return;
        }

        self.current_page += 1;
        self.total_loaded += received;
        self.has_more = received == page_size && self.current_page < max_pages;
    }

    /// Records a failed fetch. The session stays exhausted until reset.
    pub fn fail_load(&mut self, error: HistoryError) {
        self.is_loading_more = false;
        self.has_more = false;
        self.last_error = Some(error);
    }
}
