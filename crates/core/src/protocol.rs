//! The data-channel protocol spoken with the remote agent.
//!
//! Control messages travel as UTF-8 JSON over the room's reliable data
//! channel, tagged by a `type` discriminator. Decoding is deliberately
//! permissive: the agent sometimes emits unstructured text, so any payload
//! that fails to parse as the tagged union degrades to a plain-text
//! assistant message instead of an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An image attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatImage {
    pub url: String,
    #[serde(default)]
    pub alt_text: String,
}

/// A decoded control message from (or for) the data channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// A command the user wants the agent to interpret.
    UserCommand { text: String, ts: i64 },
    /// Chat content from the agent, possibly with images.
    AssistantMessage {
        text: String,
        images: Vec<ChatImage>,
    },
    /// Instructs the client to open the email compose form.
    EmailPopupTrigger,
}

/// Wire representation of the tagged union.
///
/// The agent is inconsistent about whether assistant text arrives under
/// `message` or `text`, so both are accepted.
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireMessage {
    UserCommand {
        text: String,
        #[serde(default)]
        ts: i64,
    },
    AssistantMessage {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        images: Vec<ChatImage>,
    },
    EmailPopupTrigger {},
}

/// Serializes a user command for the reliable data channel.
pub fn encode_user_command(text: &str, ts: i64) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&WireMessage::UserCommand {
        text: text.to_string(),
        ts,
    })
}

/// Decodes a raw data-channel payload.
///
/// Never fails: payloads that are not valid JSON, or valid JSON of an
/// unknown shape, come back as an `AssistantMessage` holding the payload
/// as lossy UTF-8 text.
pub fn decode(payload: &[u8]) -> ControlMessage {
    match serde_json::from_slice::<WireMessage>(payload) {
        Ok(WireMessage::UserCommand { text, ts }) => ControlMessage::UserCommand { text, ts },
        Ok(WireMessage::AssistantMessage {
            message,
            text,
            images,
        }) => ControlMessage::AssistantMessage {
            text: message.or(text).unwrap_or_default(),
            images,
        },
        Ok(WireMessage::EmailPopupTrigger {}) => ControlMessage::EmailPopupTrigger,
        Err(_) => ControlMessage::AssistantMessage {
            text: String::from_utf8_lossy(payload).into_owned(),
            images: Vec::new(),
        },
    }
}

/// Who authored a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Assistant,
}

/// One rendered line of the conversation. Append-only, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatEntry {
    pub id: Uuid,
    pub sender: ChatSender,
    pub text: String,
    pub images: Vec<ChatImage>,
    pub timestamp: DateTime<Utc>,
}

impl ChatEntry {
    pub fn user(text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: ChatSender::User,
            text,
            images: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: String, images: Vec<ChatImage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: ChatSender::Assistant,
            text,
            images,
            timestamp: Utc::now(),
        }
    }
}
