//! Seam between the session controller and the external real-time room
//! service.
//!
//! The media transport itself (packetization, congestion control, routing)
//! belongs to the room service; the controller only consumes this surface.

use crate::events::RoomEvent;
use crate::meter::SampleSource;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Capture options applied when the local microphone is enabled.
#[derive(Debug, Clone, Copy)]
pub struct MicrophoneOptions {
    pub noise_suppression: bool,
    pub echo_cancellation: bool,
    pub auto_gain_control: bool,
}

impl Default for MicrophoneOptions {
    fn default() -> Self {
        Self {
            noise_suppression: true,
            echo_cancellation: true,
            auto_gain_control: true,
        }
    }
}

/// A live connection to one room.
#[async_trait]
pub trait RoomHandle: Send + Sync {
    /// Sends bytes over the reliable, ordered data channel.
    async fn publish_data(&self, payload: Vec<u8>) -> Result<()>;

    /// Enables or disables publishing from the local microphone.
    async fn set_microphone_enabled(&self, enabled: bool) -> Result<()>;

    /// Resumes a suspended audio playback context. Platforms with autoplay
    /// restrictions may refuse; callers treat failure as non-fatal.
    async fn resume_playback(&self) -> Result<()>;

    /// The room's current remote membership view.
    fn remote_identities(&self) -> Vec<String>;

    /// A tap on the locally published audio track, when one exists.
    fn local_audio_source(&self) -> Option<Box<dyn SampleSource>>;

    /// Tears the connection down. Safe to call once; the handle is dropped
    /// afterwards.
    async fn close(&self);
}

/// Connects to rooms. Implemented over the external room service's SDK;
/// mocked in tests.
#[async_trait]
pub trait RoomService: Send + Sync {
    /// Opens a connection with the minted credential and enables the local
    /// microphone with `microphone` options.
    ///
    /// The returned receiver yields [`RoomEvent`]s in emission order and
    /// closes when the connection dies.
    async fn connect(
        &self,
        url: &str,
        token: &str,
        microphone: MicrophoneOptions,
    ) -> Result<(Box<dyn RoomHandle>, mpsc::Receiver<RoomEvent>)>;
}
