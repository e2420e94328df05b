//! Infrastructure layer with external service adapters.

/// Archive HTTP API client.
pub mod archive;
/// Application configuration.
pub mod config;

pub use archive::ArchiveClient;
pub use config::{AppConfig, CliArgs, LogLevel, StateConfig, StorageManager};
