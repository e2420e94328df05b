use chrono::{DateTime, Local, Utc};

use super::GroupId;

/// Unique identifier of a message within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A message as stored by the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedMessage {
    id: MessageId,
    group_id: GroupId,
    sender: Option<String>,
    text: String,
    date: DateTime<Utc>,
    reply_to: Option<MessageId>,
    media_kind: Option<String>,
}

#[allow(missing_docs)]
impl ArchivedMessage {
    #[must_use]
    pub fn new(
        id: MessageId,
        group_id: GroupId,
        text: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            group_id,
            sender: None,
            text: text.into(),
            date,
            reply_to: None,
            media_kind: None,
        }
    }

    #[must_use]
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    #[must_use]
    pub const fn with_reply_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    #[must_use]
    pub fn with_media_kind(mut self, kind: impl Into<String>) -> Self {
        self.media_kind = Some(kind.into());
        self
    }

    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    #[must_use]
    pub const fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Sender name, or a placeholder for anonymous channel posts.
    #[must_use]
    pub fn display_sender(&self) -> &str {
        self.sender.as_deref().unwrap_or("Channel")
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub const fn reply_to(&self) -> Option<MessageId> {
        self.reply_to
    }

    #[must_use]
    pub fn media_kind(&self) -> Option<&str> {
        self.media_kind.as_deref()
    }

    #[must_use]
    pub fn has_media(&self) -> bool {
        self.media_kind.is_some()
    }

    /// Formats the message date in local time with a chrono format string.
    #[must_use]
    pub fn formatted_date(&self, format: &str) -> String {
        self.date.with_timezone(&Local).format(format).to_string()
    }
}
