//! Scroll zones that decide how eagerly older history is requested.

/// Region of the container the viewport's top edge is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollZone {
    /// Close enough to the top that a load fires right away.
    Immediate,
    /// Near the top; a load is scheduled and may be cancelled by scrolling.
    Debounce,
    /// Far from the top.
    Outside,
}

/// Boundaries of the two trigger zones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBounds {
    /// `scroll_top` at or below this is in the immediate zone.
    pub threshold: u32,
    /// Debounce zone as a fraction of `scroll_height`.
    pub debounce_fraction: f64,
    /// Upper bound of the debounce zone regardless of content height.
    pub debounce_cap: u32,
}

impl ZoneBounds {
    /// Largest `scroll_top` that still counts as the debounce zone.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn debounce_limit(&self, scroll_height: u32) -> u32 {
        let scaled = (f64::from(scroll_height) * self.debounce_fraction.max(0.0)).floor();
        (scaled as u32).min(self.debounce_cap)
    }

    #[must_use]
    pub fn classify(&self, scroll_top: u32, scroll_height: u32) -> ScrollZone {
        if scroll_top <= self.threshold {
            ScrollZone::Immediate
        } else if scroll_top <= self.debounce_limit(scroll_height) {
            ScrollZone::Debounce
        } else {
            ScrollZone::Outside
        }
    }
}
