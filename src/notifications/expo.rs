// ABOUTME: Expo push API client: token shape validation, chunked submission, tickets
// ABOUTME: One POST per chunk of at most 100 messages against the push endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::errors::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://exp.host/--/api/v2/push";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider limit on messages per request
pub const PUSH_CHUNK_SIZE: usize = 100;

/// Whether a token has the shape Expo issues. Anything else is filtered out
/// before submission.
#[must_use]
pub fn is_expo_push_token(token: &str) -> bool {
    (token.starts_with("ExponentPushToken[") || token.starts_with("ExpoPushToken["))
        && token.ends_with(']')
}

/// One push message addressed to a single device token
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    /// Destination device token
    pub to: String,
    /// Notification sound
    pub sound: &'static str,
    /// Notification title
    pub title: String,
    /// Notification body
    pub body: String,
    /// Arbitrary payload delivered to the app
    pub data: serde_json::Value,
}

impl PushMessage {
    /// Message with the default sound
    #[must_use]
    pub fn new(to: String, title: &str, body: &str, data: serde_json::Value) -> Self {
        Self {
            to,
            sound: "default",
            title: title.to_owned(),
            body: body.to_owned(),
            data,
        }
    }
}

/// Per-message delivery ticket returned by the push endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct PushTicket {
    /// `ok` or `error`
    pub status: String,
    /// Receipt id, present on success
    #[serde(default)]
    pub id: Option<String>,
    /// Human-readable error, present on failure
    #[serde(default)]
    pub message: Option<String>,
    /// Structured error details
    #[serde(default)]
    pub details: Option<TicketDetails>,
}

/// Structured error details on a failed ticket
#[derive(Debug, Clone, Deserialize)]
pub struct TicketDetails {
    /// Provider error code, e.g. `DeviceNotRegistered`
    #[serde(default)]
    pub error: Option<String>,
}

impl PushTicket {
    /// Whether delivery was accepted
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Whether the destination token is dead and its row should be removed
    #[must_use]
    pub fn is_dead_token(&self) -> bool {
        matches!(
            self.details.as_ref().and_then(|d| d.error.as_deref()),
            Some("DeviceNotRegistered" | "InvalidCredentials")
        )
    }
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    data: Vec<PushTicket>,
}

/// Client for the Expo push HTTP API
#[derive(Debug, Clone)]
pub struct ExpoPushClient {
    http: Client,
    base_url: String,
}

impl ExpoPushClient {
    /// Client against the public Expo endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> AppResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against a non-default endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_base_url(base_url: &str) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Submit one chunk of at most [`PUSH_CHUNK_SIZE`] messages and return a
    /// ticket per message, in request order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn send_chunk(&self, messages: &[PushMessage]) -> AppResult<Vec<PushTicket>> {
        let response = self
            .http
            .post(format!("{}/send", self.base_url))
            .json(messages)
            .send()
            .await
            .map_err(|e| AppError::external_service("Push API", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                "Push API",
                format!("returned {status}: {body}"),
            ));
        }

        let parsed: PushResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service("Push API", format!("invalid response: {e}")))?;
        Ok(parsed.data)
    }
}
