//! Scrollable message container port.

/// How a programmatic scroll reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Jump straight to the target.
    #[default]
    Instant,
    /// Animate toward the target over several frames.
    Smooth,
}

/// A vertically scrollable view over the message list.
///
/// Units are whatever the host lays content out in (terminal rows, pixels).
/// `scroll_height` is the full content height and `scroll_top` the offset of
/// the first visible unit.
pub trait ScrollContainer {
    /// Offset of the viewport from the top of the content.
    fn scroll_top(&self) -> u32;

    /// Total height of the laid out content.
    fn scroll_height(&self) -> u32;

    /// Height of the viewport.
    fn client_height(&self) -> u32;

    /// Behavior used by `set_scroll_top`.
    fn scroll_behavior(&self) -> ScrollBehavior;

    /// Changes the behavior used by `set_scroll_top`.
    fn set_scroll_behavior(&mut self, behavior: ScrollBehavior);

    /// Moves the viewport using the current scroll behavior.
    fn set_scroll_top(&mut self, top: u32);

    /// Moves the viewport with an explicit behavior.
    fn scroll_to(&mut self, top: u32, behavior: ScrollBehavior);

    /// Largest meaningful `scroll_top`.
    fn max_scroll_top(&self) -> u32 {
        self.scroll_height().saturating_sub(self.client_height())
    }
}
