//! Status bar widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::application::HistoryLoader;
use crate::domain::entities::SessionState;

/// Status bar severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// Informational.
    Info,
    /// Success.
    Success,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

impl StatusLevel {
    /// Returns color for level.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Success => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// One-line summary under the message pane: left, centered and
/// right-aligned sections sharing a severity color.
#[derive(Debug, Clone)]
pub struct StatusBar {
    left: String,
    center: String,
    right: String,
    level: StatusLevel,
}

impl StatusBar {
    #[must_use]
    pub fn new(left: impl Into<String>, level: StatusLevel) -> Self {
        Self {
            left: left.into(),
            center: String::new(),
            right: String::new(),
            level,
        }
    }

    #[must_use]
    pub fn with_center(self, center: impl Into<String>) -> Self {
        Self {
            center: center.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_right(self, right: impl Into<String>, level: StatusLevel) -> Self {
        Self {
            right: right.into(),
            level,
            ..self
        }
    }

    /// Summarizes the loader: group on the left, progress in the center and
    /// the session state on the right. A failed fetch is reported apart
    /// from reaching the start of history.
    #[must_use]
    pub fn history(loader: &HistoryLoader) -> Self {
        let Some(group_id) = loader.group_id() else {
            return Self::new("no group", StatusLevel::Warning)
                .with_right("q quit", StatusLevel::Warning);
        };

        let bar = Self::new(format!("group {group_id}"), StatusLevel::Info).with_center(format!(
            "page {} · {} older loaded",
            loader.current_page(),
            loader.total_loaded()
        ));

        if let Some(error) = loader.last_error() {
            return bar.with_right(
                format!("load failed: {error} (r to retry)"),
                StatusLevel::Error,
            );
        }

        match loader.state() {
            Some(SessionState::Loading) => bar.with_right("loading older…", StatusLevel::Info),
            Some(SessionState::Exhausted) => {
                bar.with_right("start of history", StatusLevel::Success)
            }
            Some(SessionState::Idle) | None => {
                bar.with_right("scroll up for more", StatusLevel::Info)
            }
        }
    }

    #[must_use]
    pub const fn current_level(&self) -> StatusLevel {
        self.level
    }

    #[must_use]
    pub fn right_text(&self) -> &str {
        &self.right
    }
}

impl Widget for &StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.level.color())
            .add_modifier(Modifier::BOLD);

        let width = area.width as usize;

        let left_len = self.left.width();
        let center_len = self.center.width();
        let right_len = self.right.width();

        let center_start = width.saturating_sub(center_len) / 2;
        let right_start = width.saturating_sub(right_len);

        let mut spans = vec![Span::styled(self.left.as_str(), style)];

        let left_padding = center_start.saturating_sub(left_len);
        if left_padding > 0 {
            spans.push(Span::raw(" ".repeat(left_padding)));
        }

        if !self.center.is_empty() {
            spans.push(Span::styled(self.center.as_str(), Style::default().fg(Color::Gray)));
        }

        let current_len = left_len + left_padding + center_len;
        let right_padding = right_start.saturating_sub(current_len);
        if right_padding > 0 {
            spans.push(Span::raw(" ".repeat(right_padding)));
        }

        if !self.right.is_empty() {
            spans.push(Span::styled(self.right.as_str(), style));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
