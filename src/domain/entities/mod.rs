//! Domain entity definitions.

mod group;
mod message;
mod scroll_session;

pub use group::GroupId;
pub use message::{ArchivedMessage, MessageId};
pub use scroll_session::{PageRequest, ScrollSession, SessionState};
