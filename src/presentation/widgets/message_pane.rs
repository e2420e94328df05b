//! Message pane widget for displaying archived group history.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget,
    },
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::entities::ArchivedMessage;
use crate::domain::ports::{ScrollBehavior, ScrollContainer};

const MESSAGE_CONTENT_PADDING: u16 = 2;
/// Header line plus the blank separator after each message.
const MESSAGE_FRAME_ROWS: u32 = 2;
/// Fraction of the remaining distance covered per smooth scroll frame.
const SMOOTH_SCROLL_DIVISOR: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    Idle,
    Loading,
    Loaded,
    Error,
}

pub struct MessagePaneData {
    title: Option<String>,
    messages: Vec<ArchivedMessage>,
    loading_state: LoadingState,
    error_message: Option<String>,
}

impl MessagePaneData {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            messages: Vec::new(),
            loading_state: LoadingState::Idle,
            error_message: None,
        }
    }

    /// Switches to a new group and waits for its first page.
    pub fn set_group(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
        self.messages.clear();
        self.loading_state = LoadingState::Loading;
        self.error_message = None;
    }

    pub fn set_loading(&mut self) {
        self.messages.clear();
        self.loading_state = LoadingState::Loading;
        self.error_message = None;
    }

    pub fn set_messages(&mut self, messages: Vec<ArchivedMessage>) {
        self.messages = messages;
        self.loading_state = LoadingState::Loaded;
        self.error_message = None;
    }

    pub fn set_error(&mut self, error: String) {
        self.loading_state = LoadingState::Error;
        self.error_message = Some(error);
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn messages(&self) -> &[ArchivedMessage] {
        &self.messages
    }

    #[must_use]
    pub const fn loading_state(&self) -> LoadingState {
        self.loading_state
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Rows the loaded messages occupy at `width` columns.
    #[must_use]
    pub fn content_height(&self, width: u16) -> u32 {
        if self.loading_state != LoadingState::Loaded {
            return 0;
        }
        self.messages
            .iter()
            .map(|message| message_height(message, width))
            .sum()
    }
}

impl Default for MessagePaneData {
    fn default() -> Self {
        Self::new()
    }
}

/// Scroll state of the pane, measured in terminal rows.
///
/// Writes through [`ScrollContainer`] are clamped to the scrollable range.
/// Smooth scrolls set a target that [`MessagePaneState::tick`] approaches
/// one frame at a time.
#[derive(Debug, Default)]
pub struct MessagePaneState {
    scroll_top: u32,
    content_height: u32,
    viewport_height: u32,
    width: u16,
    behavior: ScrollBehavior,
    smooth_target: Option<u32>,
    scrolled: bool,
}

impl MessagePaneState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns to the top with no animation, for a freshly selected group.
    pub fn reset(&mut self) {
        self.smooth_target = None;
        self.content_height = 0;
        self.move_to(0);
    }

    /// Re-measures the content at the last rendered width.
    pub fn relayout(&mut self, data: &MessagePaneData) {
        self.content_height = data.content_height(self.width);
        self.clamp();
    }

    /// Updates the viewport size, re-measuring when the width changed.
    pub fn resize(&mut self, width: u16, height: u16, data: &MessagePaneData) {
        self.viewport_height = u32::from(height);
        if width != self.width {
            self.width = width;
            self.content_height = data.content_height(width);
        }
        self.clamp();
    }

    /// Scrolls up by `rows`, cancelling any running animation.
    pub fn scroll_up(&mut self, rows: u32) {
        self.smooth_target = None;
        self.move_to(self.scroll_top.saturating_sub(rows));
    }

    /// Scrolls down by `rows`, cancelling any running animation.
    pub fn scroll_down(&mut self, rows: u32) {
        self.smooth_target = None;
        self.move_to(self.scroll_top.saturating_add(rows));
    }

    /// Rows moved by a page key.
    #[must_use]
    pub fn page_rows(&self) -> u32 {
        self.viewport_height.saturating_sub(1).max(1)
    }

    /// Advances a smooth scroll by one frame. Returns whether it moved.
    pub fn tick(&mut self) -> bool {
        let Some(target) = self.smooth_target else {
            return false;
        };

        let distance = target.abs_diff(self.scroll_top);
        let step = distance.div_ceil(SMOOTH_SCROLL_DIVISOR).max(1);
        let next = if target > self.scroll_top {
            self.scroll_top + step.min(distance)
        } else {
            self.scroll_top - step.min(distance)
        };

        if next == target {
            self.smooth_target = None;
        }
        let before = self.scroll_top;
        self.move_to(next);
        self.scroll_top != before
    }

    /// Returns whether the viewport moved since the last call.
    pub fn take_scrolled(&mut self) -> bool {
        std::mem::take(&mut self.scrolled)
    }

    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.smooth_target.is_some()
    }

    fn move_to(&mut self, top: u32) {
        let top = top.min(self.max_scroll_top());
        if top != self.scroll_top {
            self.scroll_top = top;
            self.scrolled = true;
        }
    }

    fn clamp(&mut self) {
        let max = self.max_scroll_top();
        if let Some(target) = self.smooth_target.as_mut() {
            *target = (*target).min(max);
        }
        self.move_to(self.scroll_top);
    }
}

impl ScrollContainer for MessagePaneState {
    fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    fn scroll_height(&self) -> u32 {
        self.content_height
    }

    fn client_height(&self) -> u32 {
        self.viewport_height
    }

    fn scroll_behavior(&self) -> ScrollBehavior {
        self.behavior
    }

    fn set_scroll_behavior(&mut self, behavior: ScrollBehavior) {
        self.behavior = behavior;
    }

    fn set_scroll_top(&mut self, top: u32) {
        self.scroll_to(top, self.behavior);
    }

    fn scroll_to(&mut self, top: u32, behavior: ScrollBehavior) {
        match behavior {
            ScrollBehavior::Instant => {
                self.smooth_target = None;
                self.move_to(top);
            }
            ScrollBehavior::Smooth => {
                let target = top.min(self.max_scroll_top());
                self.smooth_target = (target != self.scroll_top).then_some(target);
            }
        }
    }
}

struct MessagePaneStyle {
    border_style: Style,
    title_style: Style,
    sender_style: Style,
    timestamp_style: Style,
    content_style: Style,
    reply_style: Style,
    media_style: Style,
    loading_style: Style,
    error_style: Style,
    empty_style: Style,
}

impl Default for MessagePaneStyle {
    fn default() -> Self {
        Self {
            border_style: Style::default().fg(Color::Cyan),
            title_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            sender_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            timestamp_style: Style::default().fg(Color::DarkGray),
            content_style: Style::default().fg(Color::White),
            reply_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            media_style: Style::default().fg(Color::Blue),
            loading_style: Style::default().fg(Color::Yellow),
            error_style: Style::default().fg(Color::Red),
            empty_style: Style::default().fg(Color::DarkGray),
        }
    }
}

/// Widget for displaying archived messages.
#[allow(missing_docs)]
pub struct MessagePane<'a> {
    data: &'a MessagePaneData,
    timestamp_format: &'a str,
    style: MessagePaneStyle,
}

impl<'a> MessagePane<'a> {
    #[must_use]
    pub fn new(data: &'a MessagePaneData, timestamp_format: &'a str) -> Self {
        Self {
            data,
            timestamp_format,
            style: MessagePaneStyle::default(),
        }
    }

    /// Lines for one message; their count always equals [`message_height`].
    fn message_lines(&self, message: &ArchivedMessage, width: u16) -> Vec<Line<'a>> {
        let mut lines = Vec::new();

        let mut header = vec![
            Span::styled(
                message.formatted_date(self.timestamp_format),
                self.style.timestamp_style,
            ),
            Span::raw(" "),
            Span::styled(message.display_sender().to_string(), self.style.sender_style),
        ];
        if let Some(kind) = message.media_kind() {
            header.push(Span::raw(" "));
            header.push(Span::styled(format!("[{kind}]"), self.style.media_style));
        }
        lines.push(Line::from(header));

        if let Some(reply_to) = message.reply_to() {
            lines.push(Line::from(Span::styled(
                format!("  ↳ reply to #{reply_to}"),
                self.style.reply_style,
            )));
        }

        let indent = " ".repeat(MESSAGE_CONTENT_PADDING as usize);
        for text in wrap_text(message.text(), content_width(width)) {
            lines.push(Line::from(Span::styled(
                format!("{indent}{text}"),
                self.style.content_style,
            )));
        }

        lines.push(Line::default());
        lines
    }

    fn render_placeholder(&self, area: Rect, buf: &mut Buffer) -> bool {
        let (text, style) = match self.data.loading_state() {
            LoadingState::Idle => (
                "No group selected. Pass --group ID or list groups in config.toml".to_string(),
                self.style.empty_style,
            ),
            LoadingState::Loading => ("Loading messages...".to_string(), self.style.loading_style),
            LoadingState::Error => (
                format!(
                    "Error: {}",
                    self.data.error_message.as_deref().unwrap_or("Unknown error")
                ),
                self.style.error_style,
            ),
            LoadingState::Loaded if self.data.is_empty() => (
                "No messages in this group".to_string(),
                self.style.empty_style,
            ),
            LoadingState::Loaded => return false,
        };

        Paragraph::new(text).style(style).render(area, buf);
        true
    }
}

impl StatefulWidget for MessagePane<'_> {
    type State = MessagePaneState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let title = match self.data.title() {
            Some(name) => format!(" {name} "),
            None => " History ".to_string(),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.style.border_style)
            .title(Span::styled(title, self.style.title_style));

        let inner_area = block.inner(area);
        block.render(area, buf);

        // Leave the last column for the scrollbar.
        let text_width = inner_area.width.saturating_sub(1);
        state.resize(text_width, inner_area.height, self.data);

        if self.render_placeholder(inner_area, buf) {
            return;
        }

        let skip = state.scroll_top as usize;
        let take = inner_area.height as usize;
        let mut visible = Vec::with_capacity(take);
        let mut row = 0usize;

        for message in self.data.messages() {
            let height = message_height(message, text_width) as usize;
            if row + height <= skip {
                row += height;
                continue;
            }
            for line in self.message_lines(message, text_width) {
                if row >= skip && visible.len() < take {
                    visible.push(line);
                }
                row += 1;
            }
            if visible.len() >= take {
                break;
            }
        }

        let text_area = Rect {
            width: text_width,
            ..inner_area
        };
        Paragraph::new(visible).render(text_area, buf);

        if state.content_height > state.viewport_height {
            let mut scrollbar_state =
                ScrollbarState::new(state.max_scroll_top() as usize).position(skip);
            Scrollbar::new(ScrollbarOrientation::VerticalRight).render(
                inner_area,
                buf,
                &mut scrollbar_state,
            );
        }
    }
}

fn content_width(width: u16) -> usize {
    width.saturating_sub(MESSAGE_CONTENT_PADDING) as usize
}

/// Rows one message occupies at `width` columns.
#[must_use]
pub fn message_height(message: &ArchivedMessage, width: u16) -> u32 {
    let text_rows = u32::try_from(wrap_text(message.text(), content_width(width)).len())
        .unwrap_or(u32::MAX);
    let reply_rows = u32::from(message.reply_to().is_some());
    MESSAGE_FRAME_ROWS + reply_rows + text_rows
}

/// Wraps on whitespace by display width, hard-breaking words that do not
/// fit on a line of their own.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    if width == 0 {
        return text.lines().map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let line_width = current_line.width();

            if current_line.is_empty() && word_width <= width {
                current_line.push_str(word);
            } else if !current_line.is_empty() && line_width + 1 + word_width <= width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                if !current_line.is_empty() {
                    lines.push(std::mem::take(&mut current_line));
                }
                for ch in word.chars() {
                    let ch_width = ch.width().unwrap_or(0);
                    if current_line.width() + ch_width > width && !current_line.is_empty() {
                        lines.push(std::mem::take(&mut current_line));
                    }
                    current_line.push(ch);
                }
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
