//! Archive API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header};
use serde_json::Value;
use tracing::{debug, warn};

use super::dto::{ErrorResponse, parse_page};
use crate::domain::entities::{ArchivedMessage, GroupId, PageRequest};
use crate::domain::errors::HistoryError;
use crate::domain::ports::MessageHistoryPort;

const USER_AGENT: &str = concat!("teleview/", env!("CARGO_PKG_VERSION"));
const DEFAULT_RETRY_AFTER_MS: u64 = 5000;

/// Archive REST client serving paginated group history.
pub struct ArchiveClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ArchiveClient {
    /// Creates a client for the archive at `base_url`.
    ///
    /// # Errors
    /// Returns error if the URL is invalid or HTTP client creation fails.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, HistoryError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| HistoryError::unexpected(format!("invalid archive URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(HistoryError::unexpected(format!(
                "archive URL {base_url} cannot carry a path"
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| HistoryError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn messages_url(&self, group_id: &GroupId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "groups", group_id.as_str(), "messages"]);
        }
        url
    }

    async fn handle_error_response(
        status: StatusCode,
        response: reqwest::Response,
        group_id: &GroupId,
    ) -> HistoryError {
        let retry_after_ms = retry_after_ms(response.headers());

        let message = match response.json::<ErrorResponse>().await {
            Ok(error) => error.message,
            Err(_) => format!("HTTP {status}"),
        };

        error_for_status(status, message, group_id, retry_after_ms)
    }
}

/// `Retry-After` in milliseconds. Only the delay-seconds form is read.
fn retry_after_ms(headers: &header::HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000))
}

/// Maps a failed archive response to a history error.
fn error_for_status(
    status: StatusCode,
    message: String,
    group_id: &GroupId,
    retry_after_ms: Option<u64>,
) -> HistoryError {
    match status {
        StatusCode::UNAUTHORIZED => HistoryError::unauthorized("invalid or missing API token"),
        StatusCode::FORBIDDEN => HistoryError::unauthorized(format!("access denied: {message}")),
        StatusCode::NOT_FOUND => HistoryError::group_not_found(group_id.as_str()),
        StatusCode::TOO_MANY_REQUESTS => HistoryError::RateLimited {
            retry_after_ms: retry_after_ms.unwrap_or(DEFAULT_RETRY_AFTER_MS),
        },
        s if s.is_server_error() => HistoryError::unavailable(format!("{status}: {message}")),
        _ => HistoryError::unexpected(format!("unexpected response: {status} - {message}")),
    }
}

fn map_send_error(e: &reqwest::Error) -> HistoryError {
    if e.is_timeout() {
        HistoryError::network("request timed out")
    } else if e.is_connect() {
        HistoryError::network("failed to connect to archive")
    } else {
        HistoryError::network(e.to_string())
    }
}

#[async_trait]
impl MessageHistoryPort for ArchiveClient {
    async fn fetch_page(
        &self,
        group_id: &GroupId,
        request: PageRequest,
    ) -> Result<Vec<ArchivedMessage>, HistoryError> {
        let url = self.messages_url(group_id);

        debug!(
            group_id = %group_id,
            skip = request.skip,
            limit = request.limit,
            "Fetching history page"
        );

        let mut builder = self
            .client
            .get(url)
            .query(&[("skip", request.skip), ("limit", request.limit)]);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Failed to reach archive");
            map_send_error(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response, group_id).await);
        }

        let body: Value = response.json().await.map_err(|e| {
            warn!(error = %e, "Archive returned a non-JSON body");
            HistoryError::malformed(format!("failed to parse response: {e}"))
        })?;

        let messages = parse_page(body, group_id)?;
        debug!(group_id = %group_id, count = messages.len(), "History page fetched");
        Ok(messages)
    }
}
