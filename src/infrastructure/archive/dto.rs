//! Archive API payloads.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::entities::{ArchivedMessage, GroupId, MessageId};
use crate::domain::errors::HistoryError;
use crate::domain::serde_utils::string_to_u64;

const NAIVE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One message as served by the archive.
///
/// Mirrors the Telegram export layout: `text` is either a string or a list
/// of plain strings and `{ "type": ..., "text": ... }` entities.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(deserialize_with = "string_to_u64::deserialize")]
    pub id: u64,
    #[serde(default, alias = "sender")]
    pub from: Option<String>,
    #[serde(default)]
    pub text: Value,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_unixtime: Option<Value>,
    #[serde(default, deserialize_with = "string_to_u64::option::deserialize")]
    pub reply_to_message_id: Option<u64>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Archive API error body.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(alias = "error", alias = "detail")]
    pub message: String,
}

impl MessageResponse {
    /// Converts into a domain message.
    ///
    /// # Errors
    /// Returns `MalformedResponse` when the message carries no usable date.
    pub fn into_message(self, group_id: &GroupId) -> Result<ArchivedMessage, HistoryError> {
        let date = self.parse_date().ok_or_else(|| {
            HistoryError::malformed(format!("message {} has no valid date", self.id))
        })?;

        let mut message =
            ArchivedMessage::new(MessageId(self.id), group_id.clone(), flatten_text(&self.text), date);

        if let Some(from) = self.from.filter(|name| !name.trim().is_empty()) {
            message = message.with_sender(from);
        }
        if let Some(reply_to) = self.reply_to_message_id {
            message = message.with_reply_to(MessageId(reply_to));
        }
        if let Some(kind) = self.media_type.or_else(|| self.photo.map(|_| "photo".to_string())) {
            message = message.with_media_kind(kind);
        }

        Ok(message)
    }

    fn parse_date(&self) -> Option<DateTime<Utc>> {
        let unix = match &self.date_unixtime {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if let Some(timestamp) = unix.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
            return Some(timestamp);
        }

        let raw = self.date.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, NAIVE_DATE_FORMAT)
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}

/// Joins Telegram rich text into plain text.
#[must_use]
pub fn flatten_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.as_str(),
                Value::Object(entity) => entity.get("text").and_then(Value::as_str).unwrap_or(""),
                _ => "",
            })
            .collect(),
        _ => String::new(),
    }
}

/// Parses a history page body: a bare array or `{ "messages": [...] }`.
///
/// # Errors
/// Returns `MalformedResponse` for any other shape or an unreadable message.
pub fn parse_page(body: Value, group_id: &GroupId) -> Result<Vec<ArchivedMessage>, HistoryError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("messages") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(HistoryError::malformed(
                    "response object has no `messages` array",
                ));
            }
        },
        other => {
            return Err(HistoryError::malformed(format!(
                "expected an array of messages, got {}",
                value_kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<MessageResponse>(item)
                .map_err(|e| HistoryError::malformed(format!("invalid message: {e}")))?
                .into_message(group_id)
        })
        .collect()
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
