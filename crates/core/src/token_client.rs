//! Client for the token provider's HTTP contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures while requesting an access credential.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The room is at its occupancy cap; surfaced before any connect attempt.
    #[error("the room is full, try again later")]
    RoomFull,
    #[error("token request rejected: {0}")]
    BadRequest(String),
    #[error("token service error: {0}")]
    Server(String),
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    identity: &'a str,
    room_name: &'a str,
}

/// A minted credential for joining one room.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub token: String,
    pub room_name: String,
}

/// Mints room credentials for a given identity.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn request_token(&self, identity: &str, room_name: &str)
    -> Result<TokenGrant, TokenError>;
}

/// HTTP implementation against the token service's `POST /token` endpoint.
#[derive(Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TokenClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for TokenClient {
    async fn request_token(
        &self,
        identity: &str,
        room_name: &str,
    ) -> Result<TokenGrant, TokenError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&TokenRequest { identity, room_name })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            403 => Err(TokenError::RoomFull),
            400 => Err(TokenError::BadRequest(body)),
            _ => Err(TokenError::Server(format!("{}: {}", status, body))),
        }
    }
}
