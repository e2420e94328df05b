//! Infinite-scroll loader for older archive history.
//!
//! The loader watches a [`ScrollContainer`] and fetches older pages as the
//! reader nears the top. Fetches run on spawned tasks; their results come
//! back through [`HistoryLoader::next_outcome`] and are merged with
//! [`HistoryLoader::apply_outcome`]. Everything time based (ready delay,
//! debounce, cooldown, deferred scroll correction) is evaluated in
//! [`HistoryLoader::on_frame`], which the host calls once per render tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::scroll_anchor::{ScrollAnchor, maintain_scroll_position};
use super::scroll_zones::{ScrollZone, ZoneBounds};
use crate::domain::entities::{
    ArchivedMessage, GroupId, PageRequest, ScrollSession, SessionState,
};
use crate::domain::errors::HistoryError;
use crate::domain::ports::{MessageHistoryPort, ScrollBehavior, ScrollContainer};

/// Tuning for [`HistoryLoader`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLoaderConfig {
    /// Distance from the top that triggers an immediate load.
    pub threshold: u32,
    /// Delay before a load scheduled from the debounce zone fires.
    pub debounce_delay: Duration,
    /// Messages requested per fetch.
    pub page_size: usize,
    /// Pages kept per session, counting the newest page the host loads.
    pub max_pages: u32,
    /// Debounce zone height as a fraction of the content height.
    pub debounce_zone_fraction: f64,
    /// Upper bound of the debounce zone.
    pub debounce_zone_cap: u32,
    /// Scroll events this soon after an adjustment or a trigger are ignored.
    pub cooldown: Duration,
    /// Scroll events are ignored for this long after a reset.
    pub ready_delay: Duration,
    /// Delay before `auto_scroll_to_bottom` scrolls.
    pub auto_scroll_delay: Duration,
}

impl Default for HistoryLoaderConfig {
    fn default() -> Self {
        Self {
            threshold: 50,
            debounce_delay: Duration::from_millis(500),
            page_size: 30,
            max_pages: 20,
            debounce_zone_fraction: 0.2,
            debounce_zone_cap: 300,
            cooldown: Duration::from_millis(1000),
            ready_delay: Duration::from_millis(2000),
            auto_scroll_delay: Duration::from_millis(100),
        }
    }
}

impl HistoryLoaderConfig {
    /// Defaults with distances measured in terminal rows instead of pixels.
    ///
    /// A pixel threshold of 50 would cover every viewport a terminal can
    /// show and leave the debounce zone empty.
    #[must_use]
    pub fn terminal_rows() -> Self {
        Self {
            threshold: 3,
            debounce_zone_cap: 15,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn zone_bounds(&self) -> ZoneBounds {
        ZoneBounds {
            threshold: self.threshold,
            debounce_fraction: self.debounce_zone_fraction,
            debounce_cap: self.debounce_zone_cap,
        }
    }
}

/// Result of one history fetch, tagged with the session it belongs to.
#[derive(Debug)]
pub struct PageOutcome {
    generation: u64,
    group_id: GroupId,
    request: PageRequest,
    result: Result<Vec<ArchivedMessage>, HistoryError>,
}

impl PageOutcome {
    #[must_use]
    pub const fn group_id(&self) -> &GroupId {
        &self.group_id
    }
}

/// Scroll-driven pagination over one selected group at a time.
pub struct HistoryLoader {
    history: Arc<dyn MessageHistoryPort>,
    config: HistoryLoaderConfig,
    zones: ZoneBounds,
    session: Option<ScrollSession>,
    generation: u64,
    ready_at: Option<Instant>,
    last_adjustment: Option<Instant>,
    last_trigger: Option<Instant>,
    debounce_deadline: Option<Instant>,
    anchor: Option<ScrollAnchor>,
    pending_restore: Option<ScrollAnchor>,
    auto_scroll_at: Option<Instant>,
    scroll_pending: bool,
    outcome_tx: mpsc::UnboundedSender<PageOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<PageOutcome>,
}

impl HistoryLoader {
    #[must_use]
    pub fn new(history: Arc<dyn MessageHistoryPort>, config: HistoryLoaderConfig) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let zones = config.zone_bounds();

        Self {
            history,
            config,
            zones,
            session: None,
            generation: 0,
            ready_at: None,
            last_adjustment: None,
            last_trigger: None,
            debounce_deadline: None,
            anchor: None,
            pending_restore: None,
            auto_scroll_at: None,
            scroll_pending: false,
            outcome_tx,
            outcome_rx,
        }
    }

    #[must_use]
    pub fn group_id(&self) -> Option<&GroupId> {
        self.session.as_ref().map(ScrollSession::group_id)
    }

    #[must_use]
    pub fn is_loading_more(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(ScrollSession::is_loading_more)
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.session.as_ref().is_some_and(ScrollSession::has_more)
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.session.as_ref().map_or(1, ScrollSession::current_page)
    }

    #[must_use]
    pub fn total_loaded(&self) -> usize {
        self.session.as_ref().map_or(0, ScrollSession::total_loaded)
    }

    /// Error that ended the current session, if it did not simply run out
    /// of history.
    #[must_use]
    pub fn last_error(&self) -> Option<&HistoryError> {
        self.session.as_ref().and_then(ScrollSession::last_error)
    }

    /// State of the current session; `None` when no group is selected.
    #[must_use]
    pub fn state(&self) -> Option<SessionState> {
        self.session
            .as_ref()
            .map(|session| session.state(self.config.max_pages))
    }

    /// Tracks the selected group, resetting whenever it changes.
    pub fn sync_group(&mut self, group_id: Option<&GroupId>) {
        match (group_id, self.session.as_ref()) {
            (Some(id), Some(session)) if session.group_id() == id => {}
            (Some(id), _) => {
                info!(group_id = %id, "Starting history session");
                self.session = Some(ScrollSession::new(id.clone()));
                self.reset();
            }
            (None, Some(session)) => {
                debug!(group_id = %session.group_id(), "Closing history session");
                self.teardown();
            }
            (None, None) => {}
        }
    }

    /// Restarts pagination for the current group.
    ///
    /// A fetch still in flight completes but its result is discarded.
    pub fn reset(&mut self) {
        self.generation += 1;
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
        self.clear_schedule();
        self.ready_at = Some(Instant::now() + self.config.ready_delay);
    }

    fn teardown(&mut self) {
        self.generation += 1;
        self.session = None;
        self.clear_schedule();
        self.ready_at = None;
        self.auto_scroll_at = None;
    }

    fn clear_schedule(&mut self) {
        self.last_trigger = None;
        self.debounce_deadline = None;
        self.anchor = None;
        self.pending_restore = None;
        self.scroll_pending = false;
    }

    /// Requests the next page of older history.
    ///
    /// Returns `false` without side effects when no group is selected, a
    /// fetch is already in flight, or the session is exhausted.
    pub fn load_more<C: ScrollContainer + ?Sized>(&mut self, container: &C) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(request) = session.begin_load(self.config.page_size, self.config.max_pages)
        else {
            return false;
        };

        self.anchor = Some(ScrollAnchor::capture(container));

        let group_id = session.group_id().clone();
        let generation = self.generation;
        let history = Arc::clone(&self.history);
        let outcome_tx = self.outcome_tx.clone();

        debug!(
            group_id = %group_id,
            skip = request.skip,
            limit = request.limit,
            "Loading older messages"
        );

        tokio::spawn(async move {
            let fetch_group = group_id.clone();
            let fetch =
                tokio::spawn(async move { history.fetch_page(&fetch_group, request).await });
            // A fetch that panics still has to release the in-flight guard.
            let result = fetch.await.unwrap_or_else(|e| {
                Err(HistoryError::unexpected(format!("history fetch aborted: {e}")))
            });
            let _ = outcome_tx.send(PageOutcome {
                generation,
                group_id,
                request,
                result,
            });
        });

        true
    }

    /// Waits for the next fetch to finish.
    pub async fn next_outcome(&mut self) -> Option<PageOutcome> {
        self.outcome_rx.recv().await
    }

    /// Returns a finished fetch without waiting.
    pub fn try_next_outcome(&mut self) -> Option<PageOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    /// Merges a finished fetch into `messages`.
    ///
    /// On a non-empty page, `on_update` receives the page (oldest first)
    /// followed by `messages`, and scroll correction is scheduled for the
    /// next frame. Outcomes from an earlier session are dropped.
    pub fn apply_outcome<F>(&mut self, outcome: PageOutcome, messages: &[ArchivedMessage], on_update: F)
    where
        F: FnOnce(Vec<ArchivedMessage>),
    {
        if outcome.generation != self.generation {
            debug!(
                group_id = %outcome.group_id,
                skip = outcome.request.skip,
                "Discarding history page from a previous session"
            );
            return;
        }

        let anchor = self.anchor.take();
        let page_size = self.config.page_size;
        let max_pages = self.config.max_pages;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match outcome.result {
            Ok(batch) if batch.is_empty() => {
                session.complete_load(0, page_size, max_pages);
                info!(group_id = %outcome.group_id, "Reached start of history");
            }
            Ok(mut batch) => {
                let received = batch.len();
                batch.reverse();
                batch.extend_from_slice(messages);
                on_update(batch);

                session.complete_load(received, page_size, max_pages);
                self.pending_restore = anchor;

                debug!(
                    group_id = %outcome.group_id,
                    received,
                    page = session.current_page(),
                    has_more = session.has_more(),
                    "Prepended older messages"
                );
            }
            Err(e) => {
                warn!(
                    group_id = %outcome.group_id,
                    skip = outcome.request.skip,
                    error = %e,
                    "Failed to load older messages"
                );
                session.fail_load(e);
            }
        }
    }

    /// Records that the container scrolled. Handled on the next frame.
    pub fn notify_scroll(&mut self) {
        self.scroll_pending = true;
    }

    /// Runs deferred work: scroll correction, auto-scroll, at most one
    /// scroll event and a due debounced load.
    pub fn on_frame<C: ScrollContainer + ?Sized>(&mut self, container: &mut C) {
        let now = Instant::now();

        if let Some(anchor) = self.pending_restore.take() {
            self.maintain_scroll_position(container, anchor);
        }

        if self.auto_scroll_at.is_some_and(|at| now >= at) {
            self.auto_scroll_at = None;
            self.scroll_to_bottom(container);
        }

        if std::mem::take(&mut self.scroll_pending) {
            self.handle_scroll(container, now);
        }

        if self.debounce_deadline.is_some_and(|at| now >= at) {
            self.debounce_deadline = None;
            self.fire_debounced(container, now);
        }
    }

    /// Restores the reader's position after a prepend and marks the
    /// adjustment so the scroll it causes is not mistaken for the reader's.
    pub fn maintain_scroll_position<C: ScrollContainer + ?Sized>(
        &mut self,
        container: &mut C,
        anchor: ScrollAnchor,
    ) -> u32 {
        let top = maintain_scroll_position(container, anchor);
        self.last_adjustment = Some(Instant::now());
        debug!(
            previous_top = anchor.scroll_top,
            scroll_top = top,
            "Restored scroll position"
        );
        top
    }

    pub fn scroll_to_top<C: ScrollContainer + ?Sized>(&self, container: &mut C) {
        container.scroll_to(0, ScrollBehavior::Smooth);
    }

    pub fn scroll_to_bottom<C: ScrollContainer + ?Sized>(&self, container: &mut C) {
        let bottom = container.max_scroll_top();
        container.scroll_to(bottom, ScrollBehavior::Smooth);
    }

    /// Scrolls to the bottom once layout has had time to settle.
    pub fn auto_scroll_to_bottom(&mut self) {
        self.auto_scroll_at = Some(Instant::now() + self.config.auto_scroll_delay);
    }

    fn is_ready(&self, now: Instant) -> bool {
        self.ready_at.is_some_and(|at| now >= at)
    }

    fn in_cooldown(&self, now: Instant) -> bool {
        [self.last_adjustment, self.last_trigger]
            .into_iter()
            .flatten()
            .any(|at| now.duration_since(at) < self.config.cooldown)
    }

    fn can_load(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.can_load(self.config.max_pages))
    }

    fn handle_scroll<C: ScrollContainer + ?Sized>(&mut self, container: &C, now: Instant) {
        // The viewport has not reached the newest message yet.
        if self.auto_scroll_at.is_some() {
            return;
        }
        if !self.is_ready(now) || self.in_cooldown(now) || !self.can_load() {
            return;
        }

        match self
            .zones
            .classify(container.scroll_top(), container.scroll_height())
        {
            ScrollZone::Immediate => {
                self.debounce_deadline = None;
                self.trigger_load(container, now);
            }
            ScrollZone::Debounce => {
                self.debounce_deadline = Some(now + self.config.debounce_delay);
            }
            ScrollZone::Outside => {}
        }
    }

    fn fire_debounced<C: ScrollContainer + ?Sized>(&mut self, container: &C, now: Instant) {
        if !self.is_ready(now) || self.in_cooldown(now) || !self.can_load() {
            return;
        }

        let zone = self
            .zones
            .classify(container.scroll_top(), container.scroll_height());
        if zone != ScrollZone::Outside {
            self.trigger_load(container, now);
        }
    }

    fn trigger_load<C: ScrollContainer + ?Sized>(&mut self, container: &C, now: Instant) {
        if self.load_more(container) {
            self.last_trigger = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MessageId;
    use crate::domain::ports::MockMessageHistoryPort;
    use crate::domain::ports::mocks::{FakeContainer, GatedHistory, page_of};

    const NEWEST_ID: u64 = 100_000;

    fn group() -> GroupId {
        GroupId::from("-1001")
    }

    fn full_pages(times: usize) -> MockMessageHistoryPort {
        let mut mock = MockMessageHistoryPort::new();
        mock.expect_fetch_page()
            .times(times)
            .returning(|group_id, request| {
                Ok(page_of(group_id, NEWEST_ID, request.skip, request.limit))
            });
        mock
    }

    fn loader_with(history: Arc<dyn MessageHistoryPort>) -> HistoryLoader {
        let mut loader = HistoryLoader::new(history, HistoryLoaderConfig::default());
        loader.sync_group(Some(&group()));
        loader
    }

    fn newest_page() -> Vec<ArchivedMessage> {
        let mut page = page_of(&group(), NEWEST_ID, 0, 30);
        page.reverse();
        page
    }

    async fn complete(loader: &mut HistoryLoader, messages: &mut Vec<ArchivedMessage>) {
        let outcome = loader.next_outcome().await.expect("fetch outcome");
        let current = messages.clone();
        loader.apply_outcome(outcome, &current, |merged| *messages = merged);
    }

    async fn wait_until_ready() {
        tokio::time::advance(HistoryLoaderConfig::default().ready_delay).await;
    }

    fn is_ascending(messages: &[ArchivedMessage]) -> bool {
        messages.windows(2).all(|pair| pair[0].id() < pair[1].id())
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_page_advances_and_prepends_in_order() {
        let mut loader = loader_with(Arc::new(full_pages(1)));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        assert!(loader.load_more(&container));
        assert!(loader.is_loading_more());
        complete(&mut loader, &mut messages).await;

        assert!(!loader.is_loading_more());
        assert!(loader.has_more());
        assert_eq!(loader.current_page(), 2);
        assert_eq!(loader.total_loaded(), 30);
        assert_eq!(messages.len(), 60);
        assert!(is_ascending(&messages));
        assert_eq!(messages.last().map(ArchivedMessage::id), Some(MessageId(NEWEST_ID)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_skip_by_current_page() {
        let mut mock = MockMessageHistoryPort::new();
        mock.expect_fetch_page()
            .withf(|_, request| *request == PageRequest { skip: 30, limit: 30 })
            .times(1)
            .returning(|group_id, request| {
                Ok(page_of(group_id, NEWEST_ID, request.skip, request.limit))
            });
        mock.expect_fetch_page()
            .withf(|_, request| *request == PageRequest { skip: 60, limit: 30 })
            .times(1)
            .returning(|group_id, request| {
                Ok(page_of(group_id, NEWEST_ID, request.skip, request.limit))
            });

        let mut loader = loader_with(Arc::new(mock));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        assert!(loader.load_more(&container));
        complete(&mut loader, &mut messages).await;
        assert!(loader.load_more(&container));
        complete(&mut loader, &mut messages).await;

        assert_eq!(loader.current_page(), 3);
        assert_eq!(messages.len(), 90);
        assert!(is_ascending(&messages));
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_page_exhausts_session() {
        let mut mock = MockMessageHistoryPort::new();
        mock.expect_fetch_page()
            .times(1)
            .returning(|group_id, request| Ok(page_of(group_id, NEWEST_ID, request.skip, 7)));

        let mut loader = loader_with(Arc::new(mock));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        assert!(loader.load_more(&container));
        complete(&mut loader, &mut messages).await;

        assert!(!loader.has_more());
        assert_eq!(loader.current_page(), 2);
        assert_eq!(loader.total_loaded(), 7);
        assert_eq!(loader.state(), Some(SessionState::Exhausted));

        assert!(!loader.load_more(&container));
        assert!(!loader.is_loading_more());
        assert_eq!(messages.len(), 37);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_page_keeps_current_page() {
        let mut mock = MockMessageHistoryPort::new();
        mock.expect_fetch_page()
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let mut loader = loader_with(Arc::new(mock));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();
        let mut updated = false;

        assert!(loader.load_more(&container));
        let outcome = loader.next_outcome().await.unwrap();
        loader.apply_outcome(outcome, &messages.clone(), |merged| {
            updated = true;
            messages = merged;
        });

        assert!(!updated);
        assert!(!loader.has_more());
        assert_eq!(loader.current_page(), 1);
        assert_eq!(loader.total_loaded(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_releases_guard_and_exhausts() {
        let mut mock = MockMessageHistoryPort::new();
        mock.expect_fetch_page()
            .times(1)
            .returning(|_, _| Err(HistoryError::network("connection refused")));

        let mut loader = loader_with(Arc::new(mock));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        assert!(loader.load_more(&container));
        complete(&mut loader, &mut messages).await;

        assert!(!loader.is_loading_more());
        assert!(!loader.has_more());
        assert_eq!(loader.current_page(), 1);
        assert!(loader.last_error().is_some_and(HistoryError::is_network_error));
        assert_eq!(messages.len(), 30);
        assert!(!loader.load_more(&container));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_response_exhausts_session() {
        let mut mock = MockMessageHistoryPort::new();
        mock.expect_fetch_page()
            .times(1)
            .returning(|_, _| Err(HistoryError::malformed("expected an array")));

        let mut loader = loader_with(Arc::new(mock));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        loader.load_more(&container);
        complete(&mut loader, &mut messages).await;

        assert!(!loader.has_more());
        assert!(loader.last_error().is_some_and(HistoryError::is_malformed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_one_fetch_in_flight() {
        let history = Arc::new(GatedHistory::new(vec![Ok(page_of(
            &group(),
            NEWEST_ID,
            30,
            30,
        ))]));
        let mut loader = loader_with(history.clone());
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        assert!(loader.load_more(&container));
        assert!(!loader.load_more(&container));
        assert!(!loader.load_more(&container));
        tokio::task::yield_now().await;
        assert!(loader.try_next_outcome().is_none());

        history.release();
        complete(&mut loader, &mut messages).await;

        assert_eq!(history.requests().len(), 1);
        assert!(!loader.is_loading_more());
        assert_eq!(loader.current_page(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restores_defaults_and_drops_stale_page() {
        let history = Arc::new(GatedHistory::new(vec![Ok(page_of(
            &group(),
            NEWEST_ID,
            30,
            30,
        ))]));
        let mut loader = loader_with(history.clone());
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        assert!(loader.load_more(&container));
        loader.reset();

        assert_eq!(loader.current_page(), 1);
        assert!(loader.has_more());
        assert!(!loader.is_loading_more());
        assert_eq!(loader.total_loaded(), 0);

        history.release();
        complete(&mut loader, &mut messages).await;

        assert_eq!(messages.len(), 30);
        assert_eq!(loader.current_page(), 1);
        assert_eq!(loader.state(), Some(SessionState::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_after_exhaustion_allows_loading_again() {
        let mut mock = MockMessageHistoryPort::new();
        let mut calls = 0;
        mock.expect_fetch_page().times(2).returning(move |group_id, request| {
            calls += 1;
            if calls == 1 {
                Err(HistoryError::unavailable("502"))
            } else {
                Ok(page_of(group_id, NEWEST_ID, request.skip, request.limit))
            }
        });

        let mut loader = loader_with(Arc::new(mock));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        loader.load_more(&container);
        complete(&mut loader, &mut messages).await;
        assert!(!loader.has_more());

        loader.reset();
        assert!(loader.last_error().is_none());
        assert!(loader.load_more(&container));
        complete(&mut loader, &mut messages).await;
        assert_eq!(loader.current_page(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_pages_bounds_the_session() {
        let mut loader = loader_with(Arc::new(full_pages(19)));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();
        let mut dispatched = 0;

        for _ in 0..21 {
            if loader.load_more(&container) {
                dispatched += 1;
                complete(&mut loader, &mut messages).await;
            }
        }

        assert_eq!(dispatched, 19);
        assert_eq!(loader.current_page(), 20);
        assert!(!loader.has_more());
        assert_eq!(messages.len(), 20 * 30);
        assert!(!loader.load_more(&container));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restores_scroll_position_on_next_frame() {
        let mut loader = loader_with(Arc::new(full_pages(1)));
        let mut container = FakeContainer::new(1100, 1000, 400).smooth();
        let mut messages = newest_page();

        assert!(loader.load_more(&container));
        complete(&mut loader, &mut messages).await;

        container.scroll_height = 1400;
        loader.on_frame(&mut container);

        assert_eq!(container.scroll_top, 1500);
        assert_eq!(container.writes, vec![(1500, ScrollBehavior::Instant)]);
        assert_eq!(container.behavior, ScrollBehavior::Smooth);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_ignored_until_ready() {
        let mut loader = loader_with(Arc::new(full_pages(1)));
        let mut container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        loader.notify_scroll();
        loader.on_frame(&mut container);
        assert!(!loader.is_loading_more());

        wait_until_ready().await;
        loader.on_frame(&mut container);
        assert!(!loader.is_loading_more());

        loader.notify_scroll();
        loader.on_frame(&mut container);
        assert!(loader.is_loading_more());
        complete(&mut loader, &mut messages).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_zone_then_cooldown_ignores_second_event() {
        let mut loader = loader_with(Arc::new(full_pages(2)));
        let mut container = FakeContainer::new(10, 1000, 400);
        let mut messages = newest_page();
        wait_until_ready().await;

        loader.notify_scroll();
        loader.on_frame(&mut container);
        assert!(loader.is_loading_more());
        complete(&mut loader, &mut messages).await;

        container.scroll_height = 1400;
        loader.on_frame(&mut container);
        assert_eq!(container.scroll_top, 410);

        tokio::time::advance(Duration::from_millis(300)).await;
        container.scroll_top = 0;
        loader.notify_scroll();
        loader.on_frame(&mut container);
        assert!(!loader.is_loading_more());

        tokio::time::advance(Duration::from_millis(1000)).await;
        loader.notify_scroll();
        loader.on_frame(&mut container);
        assert!(loader.is_loading_more());
        complete(&mut loader, &mut messages).await;
        assert_eq!(loader.current_page(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_adjustment_cooldown_ignores_events() {
        let mut loader = loader_with(Arc::new(full_pages(0)));
        let mut container = FakeContainer::new(1100, 1000, 400);
        wait_until_ready().await;

        loader.maintain_scroll_position(
            &mut container,
            ScrollAnchor {
                scroll_height: 1000,
                scroll_top: 0,
            },
        );

        for _ in 0..2 {
            tokio::time::advance(Duration::from_millis(200)).await;
            loader.notify_scroll();
            loader.on_frame(&mut container);
            assert!(!loader.is_loading_more());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_zone_waits_and_reschedules() {
        let mut loader = loader_with(Arc::new(full_pages(1)));
        let mut container = FakeContainer::new(150, 1000, 400);
        let mut messages = newest_page();
        wait_until_ready().await;

        loader.notify_scroll();
        loader.on_frame(&mut container);
        assert!(!loader.is_loading_more());

        tokio::time::advance(Duration::from_millis(300)).await;
        container.scroll_top = 120;
        loader.notify_scroll();
        loader.on_frame(&mut container);

        tokio::time::advance(Duration::from_millis(300)).await;
        loader.on_frame(&mut container);
        assert!(!loader.is_loading_more());

        tokio::time::advance(Duration::from_millis(200)).await;
        loader.on_frame(&mut container);
        assert!(loader.is_loading_more());
        complete(&mut loader, &mut messages).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_load_revalidates_position() {
        let mut loader = loader_with(Arc::new(full_pages(0)));
        let mut container = FakeContainer::new(150, 1000, 400);
        wait_until_ready().await;

        loader.notify_scroll();
        loader.on_frame(&mut container);

        container.scroll_top = 600;
        tokio::time::advance(Duration::from_millis(600)).await;
        loader.on_frame(&mut container);

        assert!(!loader.is_loading_more());
    }

    #[tokio::test(start_paused = true)]
    async fn test_outside_zones_does_nothing() {
        let mut loader = loader_with(Arc::new(full_pages(0)));
        let mut container = FakeContainer::new(700, 1000, 400);
        wait_until_ready().await;

        loader.notify_scroll();
        loader.on_frame(&mut container);
        tokio::time::advance(Duration::from_secs(1)).await;
        loader.on_frame(&mut container);

        assert!(!loader.is_loading_more());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_events_wait_for_frame() {
        let history = Arc::new(GatedHistory::new(vec![Ok(page_of(
            &group(),
            NEWEST_ID,
            30,
            30,
        ))]));
        let mut loader = loader_with(history.clone());
        let mut container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();
        wait_until_ready().await;

        for _ in 0..5 {
            loader.notify_scroll();
        }
        assert!(!loader.is_loading_more());

        loader.on_frame(&mut container);
        assert!(loader.is_loading_more());
        loader.on_frame(&mut container);

        history.release();
        complete(&mut loader, &mut messages).await;
        assert_eq!(history.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_scroll_to_bottom_waits_for_layout() {
        let mut loader = loader_with(Arc::new(full_pages(0)));
        let mut container = FakeContainer::new(0, 1000, 400);

        loader.auto_scroll_to_bottom();
        loader.on_frame(&mut container);
        assert!(container.writes.is_empty());

        tokio::time::advance(Duration::from_millis(100)).await;
        loader.on_frame(&mut container);
        assert_eq!(container.writes, vec![(600, ScrollBehavior::Smooth)]);

        loader.on_frame(&mut container);
        assert_eq!(container.writes.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_top_scroll_ignored_while_auto_scroll_pending() {
        let mut loader = loader_with(Arc::new(full_pages(0)));
        let mut container = FakeContainer::new(0, 1000, 400);
        wait_until_ready().await;

        loader.auto_scroll_to_bottom();
        loader.notify_scroll();
        loader.on_frame(&mut container);
        assert!(!loader.is_loading_more());

        tokio::time::advance(Duration::from_millis(100)).await;
        loader.on_frame(&mut container);
        assert_eq!(container.writes, vec![(600, ScrollBehavior::Smooth)]);
        assert!(!loader.is_loading_more());
    }

    struct PanickingHistory;

    #[async_trait::async_trait]
    impl MessageHistoryPort for PanickingHistory {
        async fn fetch_page(
            &self,
            _group_id: &GroupId,
            _request: PageRequest,
        ) -> Result<Vec<ArchivedMessage>, HistoryError> {
            panic!("archive adapter bug")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_fetch_releases_guard() {
        let mut loader = loader_with(Arc::new(PanickingHistory));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        assert!(loader.load_more(&container));
        complete(&mut loader, &mut messages).await;

        assert!(!loader.is_loading_more());
        assert!(!loader.has_more());
        assert_eq!(loader.current_page(), 1);
        assert!(loader.last_error().is_some());
        assert_eq!(messages.len(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_to_extremes_is_smooth() {
        let loader = loader_with(Arc::new(full_pages(0)));
        let mut container = FakeContainer::new(300, 1000, 400);

        loader.scroll_to_top(&mut container);
        loader.scroll_to_bottom(&mut container);

        assert_eq!(
            container.writes,
            vec![(0, ScrollBehavior::Smooth), (600, ScrollBehavior::Smooth)]
        );
        assert_eq!(loader.current_page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_group_resets_only_on_change() {
        let mut loader = loader_with(Arc::new(full_pages(1)));
        let container = FakeContainer::new(0, 1000, 400);
        let mut messages = newest_page();

        loader.load_more(&container);
        complete(&mut loader, &mut messages).await;
        assert_eq!(loader.current_page(), 2);

        loader.sync_group(Some(&group()));
        assert_eq!(loader.current_page(), 2);

        let other = GroupId::from("-1002");
        loader.sync_group(Some(&other));
        assert_eq!(loader.group_id(), Some(&other));
        assert_eq!(loader.current_page(), 1);
        assert_eq!(loader.total_loaded(), 0);

        loader.sync_group(None);
        assert_eq!(loader.state(), None);
        assert!(!loader.load_more(&container));
    }
}
