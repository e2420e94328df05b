mod message_history_port;
mod scroll_container_port;

pub use message_history_port::MessageHistoryPort;
pub use scroll_container_port::{ScrollBehavior, ScrollContainer};

#[cfg(test)]
pub use message_history_port::MockMessageHistoryPort;

#[cfg(test)]
pub mod mocks {
    pub use super::message_history_port::mock::{GatedHistory, page_of};
    pub use super::scroll_container_port::mock::FakeContainer;
}
