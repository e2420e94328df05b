//! Archive API client.

mod client;
mod dto;

pub use client::ArchiveClient;
pub use dto::{flatten_text, parse_page};
