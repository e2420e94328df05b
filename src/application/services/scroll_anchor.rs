//! Keeps the viewed message in place when content is prepended above it.

use crate::domain::ports::{ScrollBehavior, ScrollContainer};

/// Container geometry captured before a history fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    pub scroll_height: u32,
    pub scroll_top: u32,
}

impl ScrollAnchor {
    #[must_use]
    pub fn capture<C: ScrollContainer + ?Sized>(container: &C) -> Self {
        Self {
            scroll_height: container.scroll_height(),
            scroll_top: container.scroll_top(),
        }
    }

    /// `scroll_top` that keeps the anchored content stationary once the
    /// container has grown to `new_height`.
    #[must_use]
    pub fn restored_top(&self, new_height: u32) -> u32 {
        let scroll_diff = i64::from(new_height) - i64::from(self.scroll_height);
        let top = (i64::from(self.scroll_top) + scroll_diff).max(0);
        u32::try_from(top).unwrap_or(u32::MAX)
    }
}

/// Applies `anchor` to `container` without animation and returns the new
/// `scroll_top`. The container's scroll behavior is restored afterwards.
pub fn maintain_scroll_position<C: ScrollContainer + ?Sized>(
    container: &mut C,
    anchor: ScrollAnchor,
) -> u32 {
    let target = anchor.restored_top(container.scroll_height());
    let previous = container.scroll_behavior();

    container.set_scroll_behavior(ScrollBehavior::Instant);
    container.set_scroll_top(target);
    container.set_scroll_behavior(previous);

    target
}
