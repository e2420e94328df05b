//! Application layer with the history loader and use cases.

/// Scroll and pagination services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use services::{HistoryLoader, HistoryLoaderConfig, PageOutcome};
pub use use_cases::LoadRecentMessagesUseCase;
