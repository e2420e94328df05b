//! Use case implementations.

mod load_recent_messages_use_case;

pub use load_recent_messages_use_case::LoadRecentMessagesUseCase;
