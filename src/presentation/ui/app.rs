//! Main application orchestrator.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::layout::{Constraint, Layout};
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::application::{
    HistoryLoader, HistoryLoaderConfig, LoadRecentMessagesUseCase, PageOutcome,
};
use crate::domain::entities::{ArchivedMessage, GroupId};
use crate::domain::errors::HistoryError;
use crate::domain::ports::MessageHistoryPort;
use crate::infrastructure::config::{StateConfig, StorageManager};
use crate::presentation::events::{EventHandler, EventResult, ViewerAction};
use crate::presentation::widgets::{MessagePane, MessagePaneData, MessagePaneState, StatusBar};

const FRAME_RATE: Duration = Duration::from_millis(33);

#[derive(Debug)]
enum Action {
    RecentLoaded {
        group_id: GroupId,
        result: Result<Vec<ArchivedMessage>, HistoryError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppState {
    Running,
    Exiting,
}

pub struct App {
    state: AppState,
    groups: Vec<GroupId>,
    selected: Option<usize>,
    loader: HistoryLoader,
    load_recent: Arc<LoadRecentMessagesUseCase>,
    pane_data: MessagePaneData,
    pane_state: MessagePaneState,
    timestamp_format: String,
    storage: Option<StorageManager>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    #[must_use]
    pub fn new(
        history: Arc<dyn MessageHistoryPort>,
        loader_config: HistoryLoaderConfig,
        groups: Vec<GroupId>,
        timestamp_format: impl Into<String>,
    ) -> Self {
        let load_recent = Arc::new(LoadRecentMessagesUseCase::new(
            Arc::clone(&history),
            loader_config.page_size,
        ));
        let loader = HistoryLoader::new(history, loader_config);
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            state: AppState::Running,
            groups,
            selected: None,
            loader,
            load_recent,
            pane_data: MessagePaneData::new(),
            pane_state: MessagePaneState::new(),
            timestamp_format: timestamp_format.into(),
            storage: None,
            action_tx,
            action_rx,
        }
    }

    /// Remembers the selected group across runs.
    #[must_use]
    pub fn with_storage(mut self, storage: StorageManager) -> Self {
        self.storage = Some(storage);
        self
    }

    /// # Errors
    /// Returns error if drawing to the terminal or reading its events fails.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        if let Some(index) = self.initial_group_index() {
            self.select_group(index);
        } else {
            warn!("No groups configured");
        }

        self.run_event_loop(terminal).await?;

        info!("Application exiting normally");
        Ok(())
    }

    async fn run_event_loop(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let mut terminal_events = EventStream::new();
        let mut frame_interval = interval(FRAME_RATE);
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        terminal.draw(|frame| self.render(frame))?;

        while self.state != AppState::Exiting {
            let terminal_event = terminal_events.next();

            tokio::select! {
                Some(outcome) = self.loader.next_outcome() => {
                    self.handle_outcome(outcome);
                }

                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action);
                }

                _ = frame_interval.tick() => {
                    self.on_frame();
                    terminal.draw(|frame| self.render(frame))?;
                }

                maybe_event = terminal_event => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            if self.handle_terminal_event(&event) == EventResult::Exit {
                                self.state = AppState::Exiting;
                            }
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => self.state = AppState::Exiting,
                    }
                }
            }
        }

        Ok(())
    }

    fn initial_group_index(&self) -> Option<usize> {
        if self.groups.is_empty() {
            return None;
        }

        let last_group = self
            .storage
            .as_ref()
            .and_then(|storage| match storage.load_state() {
                Ok(state) => state.last_group_id,
                Err(e) => {
                    warn!(error = %e, "Failed to load state");
                    None
                }
            })
            .map(GroupId::from);

        Some(
            last_group
                .and_then(|id| self.groups.iter().position(|group| *group == id))
                .unwrap_or(0),
        )
    }

    fn current_group(&self) -> Option<&GroupId> {
        self.selected.and_then(|index| self.groups.get(index))
    }

    /// Once per frame: advance smooth scrolling, forward any movement to
    /// the loader and let it run its deferred work.
    ///
    /// Steps of a smooth scroll are reported once, when it lands.
    fn on_frame(&mut self) {
        self.pane_state.tick();
        let scrolled = self.pane_state.take_scrolled();
        if scrolled && !self.pane_state.is_animating() {
            self.loader.notify_scroll();
        }
        self.loader.on_frame(&mut self.pane_state);
    }

    fn render(&mut self, frame: &mut Frame) {
        let [main, status] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

        frame.render_stateful_widget(
            MessagePane::new(&self.pane_data, &self.timestamp_format),
            main,
            &mut self.pane_state,
        );

        let status_bar = StatusBar::history(&self.loader);
        frame.render_widget(&status_bar, status);
    }

    fn handle_terminal_event(&mut self, event: &Event) -> EventResult {
        let action = match event {
            Event::Key(key) => EventHandler::key_action(key),
            Event::Mouse(mouse) => EventHandler::mouse_action(mouse),
            _ => None,
        };

        match action {
            Some(action) => self.handle_viewer_action(action),
            None => EventResult::Continue,
        }
    }

    fn handle_viewer_action(&mut self, action: ViewerAction) -> EventResult {
        match action {
            ViewerAction::Quit => return EventResult::Exit,
            ViewerAction::ScrollUp(rows) => self.pane_state.scroll_up(rows),
            ViewerAction::ScrollDown(rows) => self.pane_state.scroll_down(rows),
            ViewerAction::PageUp => {
                let rows = self.pane_state.page_rows();
                self.pane_state.scroll_up(rows);
            }
            ViewerAction::PageDown => {
                let rows = self.pane_state.page_rows();
                self.pane_state.scroll_down(rows);
            }
            ViewerAction::Top => self.loader.scroll_to_top(&mut self.pane_state),
            ViewerAction::Bottom => self.loader.scroll_to_bottom(&mut self.pane_state),
            ViewerAction::NextGroup => self.cycle_group(true),
            ViewerAction::PreviousGroup => self.cycle_group(false),
            ViewerAction::Reload => self.reload(),
        }
        EventResult::Continue
    }

    fn cycle_group(&mut self, forward: bool) {
        let len = self.groups.len();
        if len < 2 {
            return;
        }

        let current = self.selected.unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.select_group(next);
    }

    fn select_group(&mut self, index: usize) {
        let Some(group_id) = self.groups.get(index).cloned() else {
            return;
        };

        info!(group_id = %group_id, "Opening group");
        self.selected = Some(index);
        self.pane_data.set_group(group_id.to_string());
        self.pane_state.reset();
        self.loader.sync_group(Some(&group_id));
        self.persist_group(&group_id);
        self.spawn_recent_load(group_id);
    }

    fn reload(&mut self) {
        let Some(group_id) = self.current_group().cloned() else {
            return;
        };

        info!(group_id = %group_id, "Reloading group");
        self.pane_data.set_loading();
        self.pane_state.reset();
        self.loader.reset();
        self.spawn_recent_load(group_id);
    }

    fn spawn_recent_load(&self, group_id: GroupId) {
        let use_case = Arc::clone(&self.load_recent);
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let result = use_case.execute(&group_id).await;
            let _ = tx.send(Action::RecentLoaded { group_id, result });
        });
    }

    fn persist_group(&self, group_id: &GroupId) {
        let Some(storage) = &self.storage else {
            return;
        };

        let state = StateConfig {
            last_group_id: Some(group_id.to_string()),
        };
        if let Err(e) = storage.save_state(&state) {
            warn!(error = %e, "Failed to save state");
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::RecentLoaded { group_id, result } => {
                if self.current_group() != Some(&group_id) {
                    debug!(group_id = %group_id, "Discarding recent messages for a closed group");
                    return;
                }

                match result {
                    Ok(messages) => {
                        self.pane_data.set_messages(messages);
                        self.pane_state.relayout(&self.pane_data);
                        self.loader.auto_scroll_to_bottom();
                    }
                    Err(e) => {
                        warn!(group_id = %group_id, error = %e, "Failed to load recent messages");
                        self.pane_data.set_error(e.to_string());
                    }
                }
            }
        }
    }

    fn handle_outcome(&mut self, outcome: PageOutcome) {
        let mut merged = None;
        self.loader
            .apply_outcome(outcome, self.pane_data.messages(), |messages| {
                merged = Some(messages);
            });

        if let Some(messages) = merged {
            self.pane_data.set_messages(messages);
            self.pane_state.relayout(&self.pane_data);
        }
    }
}
