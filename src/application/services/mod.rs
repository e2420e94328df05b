pub mod history_loader;
pub mod scroll_anchor;
pub mod scroll_zones;

pub use history_loader::{HistoryLoader, HistoryLoaderConfig, PageOutcome};
pub use scroll_anchor::{ScrollAnchor, maintain_scroll_position};
pub use scroll_zones::{ScrollZone, ZoneBounds};
