//! Teleview - a terminal viewer for Telegram chat archives.
//!
//! Opens an archived group at its newest messages and pulls older history
//! in as the reader scrolls toward the top, keeping the viewport anchored
//! while pages are prepended.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the history loader and use cases.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing UI components and event handling.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "teleview";
