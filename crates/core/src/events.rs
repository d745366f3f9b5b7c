//! Remote events emitted by the room transport.
//!
//! These are the asynchronous notifications the session controller reconciles
//! into UI state. The transport guarantees emission order on the channel it
//! hands back from `RoomService::connect`.

use serde::{Deserialize, Serialize};

/// The media kind of a published or subscribed track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// Coarse connection quality reported by the room service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Excellent,
    Good,
    Poor,
    #[default]
    Unknown,
}

/// Everything the room transport can tell the controller after connecting.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// A remote participant's track became available for playback.
    TrackSubscribed {
        participant: String,
        kind: TrackKind,
    },
    /// The local microphone track finished publishing.
    LocalTrackPublished { kind: TrackKind },
    ParticipantConnected { identity: String },
    ParticipantDisconnected { identity: String },
    /// The full set of identities currently detected as speaking.
    ActiveSpeakersChanged { identities: Vec<String> },
    ConnectionQualityChanged {
        identity: String,
        quality: ConnectionQuality,
    },
    /// Raw bytes from the reliable data channel.
    DataReceived {
        payload: Vec<u8>,
        participant: Option<String>,
    },
    /// The server closed the connection; the controller must clean up.
    Disconnected { reason: String },
}
