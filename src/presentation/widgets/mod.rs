mod message_pane;
mod status_bar;

pub use message_pane::{
    LoadingState, MessagePane, MessagePaneData, MessagePaneState, message_height,
};
pub use status_bar::{StatusBar, StatusLevel};
