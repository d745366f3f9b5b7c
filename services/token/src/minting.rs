//! Short-lived room credential minting.
//!
//! Tokens are HMAC-SHA256 JWTs carrying the client identity as subject and a
//! room grant, signed with the shared secret the room service validates
//! against.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

/// Permissions granted within the named room.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomGrant {
    pub room: String,
    pub room_join: bool,
    pub can_publish: bool,
    pub can_subscribe: bool,
    pub can_publish_data: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    /// The API key the room service knows the issuer by.
    pub iss: String,
    /// The participant identity.
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub video: RoomGrant,
}

/// Mints an access token authorizing `identity` to join `room` for
/// `ttl_secs` seconds.
pub fn mint_token(
    api_key: &str,
    api_secret: &str,
    identity: &str,
    room: &str,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        iss: api_key.to_string(),
        sub: identity.to_string(),
        iat: now.timestamp(),
        nbf: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        video: RoomGrant {
            room: room.to_string(),
            room_join: true,
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
        },
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )
}
