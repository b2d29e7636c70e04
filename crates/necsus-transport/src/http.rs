// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the room action API.
//!
//! Provides [`HttpActionSubmitter`], the reqwest-backed
//! [`ActionSubmitter`], plus [`HttpActionSubmitter::fetch_bots`] for reading
//! a room's roster without opening a stream.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use necsus_core::{
    ActionSubmitter, FormSubmission, Message, NecsusError, OutgoingMessage, Participant,
    ParticipantId,
};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body returned by the server: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    message: String,
}

#[derive(Debug, Clone)]
pub struct HttpActionSubmitter {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpActionSubmitter {
    /// Creates a submitter for the server at `server_url` (http or https).
    pub fn new(server_url: &str) -> Result<Self, NecsusError> {
        let mut base_url = Url::parse(server_url).map_err(|e| NecsusError::InvalidUrl {
            url: server_url.to_string(),
            reason: e.to_string(),
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NecsusError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Lists the bots registered in `room`.
    pub async fn fetch_bots(&self, room: &str) -> Result<Vec<Participant>, NecsusError> {
        let mut url = self.endpoint("api/bots")?;
        url.query_pairs_mut().append_pair("room", room);
        self.request(Method::GET, url, None).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, NecsusError> {
        self.base_url
            .join(path)
            .map_err(|e| NecsusError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// Sends one request and decodes the JSON response.
    ///
    /// Non-2xx responses become [`NecsusError::Submission`] carrying the
    /// status and the server's `message`, when it sent one.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<T, NecsusError> {
        let mut builder = self.client.request(method.clone(), url.clone());
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| NecsusError::Submission {
            message: format!("HTTP request failed: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(method = %method, path = url.path(), status = %status, "action response received");

        let text = response.text().await.map_err(|e| NecsusError::Submission {
            message: format!("failed to read response body: {e}"),
            status: Some(status.as_u16()),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.message)
                .unwrap_or_else(|_| format!("server returned {status}"));
            return Err(NecsusError::Submission {
                message,
                status: Some(status.as_u16()),
                source: None,
            });
        }

        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(body).map_err(|e| NecsusError::Submission {
            message: format!("failed to parse response from {}: {e}", url.path()),
            status: Some(status.as_u16()),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl ActionSubmitter for HttpActionSubmitter {
    async fn post_message(&self, message: OutgoingMessage) -> Result<Message, NecsusError> {
        let url = self.endpoint("api/actions/message")?;
        let body = serde_json::to_value(&message)
            .map_err(|e| NecsusError::Internal(format!("failed to encode message: {e}")))?;
        self.request(Method::POST, url, Some(body)).await
    }

    async fn submit_form(&self, form: FormSubmission) -> Result<(), NecsusError> {
        let url = self.endpoint("api/actions/message-form")?;
        let body = serde_json::to_value(&form)
            .map_err(|e| NecsusError::Internal(format!("failed to encode form: {e}")))?;
        let _: serde_json::Value = self.request(Method::POST, url, Some(body)).await?;
        Ok(())
    }

    async fn put_bot(&self, room: &str, bot: Participant) -> Result<Participant, NecsusError> {
        let url = self.endpoint("api/actions/bot")?;
        let body = json!({
            "id": bot.id,
            "room": room,
            "name": bot.name,
            "url": bot.url,
            "responds_to": bot.responds_to,
        });
        self.request(Method::POST, url, Some(body)).await
    }

    async fn delete_bot(&self, id: ParticipantId) -> Result<Participant, NecsusError> {
        let url = self.endpoint("api/actions/bot")?;
        self.request(Method::DELETE, url, Some(json!({ "id": id })))
            .await
    }

    async fn clear_room_messages(&self, room: &str) -> Result<(), NecsusError> {
        let url = self.endpoint("api/actions/clear-room-messages")?;
        let _: serde_json::Value = self
            .request(Method::POST, url, Some(json!({ "room": room })))
            .await?;
        Ok(())
    }

    async fn clear_room_state(&self, room: &str) -> Result<(), NecsusError> {
        let url = self.endpoint("api/actions/clear-room-state")?;
        let _: serde_json::Value = self
            .request(Method::POST, url, Some(json!({ "room": room })))
            .await?;
        Ok(())
    }
}
