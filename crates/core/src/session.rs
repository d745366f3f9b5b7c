//! Room session controller.
//!
//! Owns the lifecycle of one real-time connection: token fetch, room
//! connect, event reconciliation, metering and teardown. The controller is
//! an actor: public operations arrive as [`ControllerCommand`]s on a channel
//! and room events arrive on the receiver handed back by the transport, so
//! exactly one handler runs at a time and handlers see events in emission
//! order. External layers observe state through [`ControllerState`]
//! snapshots on a watch channel and can never mutate it directly.

use crate::{
    events::{ConnectionQuality, RoomEvent, TrackKind},
    logbuf::{EventLog, LogEntry},
    meter::MeterHandle,
    participant::{Participant, ParticipantRole, classify_role, participant_set},
    protocol::{self, ChatEntry, ControlMessage},
    room::{MicrophoneOptions, RoomHandle, RoomService},
    token_client::TokenProvider,
};
use anyhow::{Result, anyhow};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::{mpsc, watch},
    time::Instant,
};
use tracing::{debug, info, warn};

/// How long the "agent speaking" flag stays up after an agent audio track
/// arrives. A plain timer standing in for voice activity detection.
const AGENT_SPEAKING_WINDOW: Duration = Duration::from_secs(3);

/// Lifecycle of the single session a controller instance owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// The active session's identity within the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub identity: String,
    pub room_name: String,
    pub quality: ConnectionQuality,
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub connection: ConnectionState,
    pub session: Option<SessionInfo>,
    pub participants: Vec<Participant>,
    pub chat: Vec<ChatEntry>,
    pub log: Vec<LogEntry>,
    pub mic_muted: bool,
    pub local_speaking: bool,
    pub agent_speaking: bool,
    pub email_popup_open: bool,
    /// The single current user-facing error; overwritten by the next action.
    pub last_error: Option<String>,
}

/// Operations accepted by the controller task.
#[derive(Debug)]
pub enum ControllerCommand {
    Connect,
    Disconnect,
    ToggleMute,
    TriggerTool(crate::tools::AssistantTool),
    SendCommand(String),
    DismissEmailPopup,
    Shutdown,
}

/// Static connection parameters for one controller instance.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The room service's connect URL.
    pub room_url: String,
    pub room_name: String,
    pub microphone: MicrophoneOptions,
}

/// Cloneable handle for issuing commands and observing controller state.
#[derive(Clone)]
pub struct ControllerClient {
    commands: mpsc::Sender<ControllerCommand>,
    state: watch::Receiver<ControllerState>,
    audio_level: watch::Receiver<f32>,
}

impl ControllerClient {
    pub async fn connect(&self) -> Result<()> {
        self.send(ControllerCommand::Connect).await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.send(ControllerCommand::Disconnect).await
    }

    pub async fn toggle_mute(&self) -> Result<()> {
        self.send(ControllerCommand::ToggleMute).await
    }

    pub async fn trigger_tool(&self, tool: crate::tools::AssistantTool) -> Result<()> {
        self.send(ControllerCommand::TriggerTool(tool)).await
    }

    pub async fn send_command(&self, text: impl Into<String>) -> Result<()> {
        self.send(ControllerCommand::SendCommand(text.into())).await
    }

    pub async fn dismiss_email_popup(&self) -> Result<()> {
        self.send(ControllerCommand::DismissEmailPopup).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(ControllerCommand::Shutdown).await
    }

    /// The latest published state snapshot.
    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    /// A watch receiver for reacting to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.clone()
    }

    /// Current microphone loudness in [0, 100].
    pub fn audio_level(&self) -> f32 {
        *self.audio_level.borrow()
    }

    pub fn audio_level_watch(&self) -> watch::Receiver<f32> {
        self.audio_level.clone()
    }

    async fn send(&self, command: ControllerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("session controller is not running"))
    }
}

/// The controller task's owned state.
pub struct SessionController {
    config: SessionConfig,
    room_service: Arc<dyn RoomService>,
    tokens: Arc<dyn TokenProvider>,
    state: ControllerState,
    state_tx: watch::Sender<ControllerState>,
    level_tx: Arc<watch::Sender<f32>>,
    log: EventLog,
    handle: Option<Box<dyn RoomHandle>>,
    meter: Option<MeterHandle>,
    agent_speaking_until: Option<Instant>,
}

impl SessionController {
    /// Spawns the controller task and returns its client handle.
    pub fn spawn(
        config: SessionConfig,
        room_service: Arc<dyn RoomService>,
        tokens: Arc<dyn TokenProvider>,
    ) -> ControllerClient {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(ControllerState::default());
        let (level_tx, level_rx) = watch::channel(0.0f32);

        let controller = Self {
            config,
            room_service,
            tokens,
            state: ControllerState::default(),
            state_tx,
            level_tx: Arc::new(level_tx),
            log: EventLog::default(),
            handle: None,
            meter: None,
            agent_speaking_until: None,
        };
        tokio::spawn(controller.run(command_rx));

        ControllerClient {
            commands: command_tx,
            state: state_rx,
            audio_level: level_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<ControllerCommand>) {
        let mut events: Option<mpsc::Receiver<RoomEvent>> = None;

        loop {
            let agent_deadline = self.agent_speaking_until;
            tokio::select! {
                maybe_cmd = commands.recv() => {
                    match maybe_cmd {
                        Some(ControllerCommand::Connect) => {
                            if let Some(rx) = self.handle_connect().await {
                                events = Some(rx);
                            }
                        }
                        Some(ControllerCommand::Disconnect) => {
                            self.teardown("disconnect requested").await;
                            events = None;
                        }
                        Some(ControllerCommand::ToggleMute) => self.handle_toggle_mute().await,
                        Some(ControllerCommand::TriggerTool(tool)) => self.handle_tool(tool).await,
                        Some(ControllerCommand::SendCommand(text)) => {
                            self.send_user_command(&text).await;
                        }
                        Some(ControllerCommand::DismissEmailPopup) => {
                            self.state.email_popup_open = false;
                            self.publish();
                        }
                        Some(ControllerCommand::Shutdown) | None => {
                            self.teardown("controller shut down").await;
                            break;
                        }
                    }
                }
                maybe_event = next_room_event(&mut events) => {
                    match maybe_event {
                        Some(event) => {
                            if self.handle_room_event(event).await {
                                events = None;
                            }
                        }
                        None => {
                            // Transport died without a disconnect event.
                            self.teardown("room event stream closed").await;
                            events = None;
                        }
                    }
                }
                _ = agent_window_elapsed(agent_deadline), if agent_deadline.is_some() => {
                    self.agent_speaking_until = None;
                    self.state.agent_speaking = false;
                    self.publish();
                }
            }
        }
        info!("Session controller task finished.");
    }

    /// Runs the full connect sequence. Returns the room event receiver on
    /// success; `None` when the attempt failed or was ignored.
    async fn handle_connect(&mut self) -> Option<mpsc::Receiver<RoomEvent>> {
        if self.state.connection != ConnectionState::Disconnected {
            debug!(state = ?self.state.connection, "Connect ignored: session already active");
            return None;
        }

        let identity = generate_identity();
        self.state.connection = ConnectionState::Connecting;
        self.state.last_error = None;
        self.state.session = Some(SessionInfo {
            identity: identity.clone(),
            room_name: self.config.room_name.clone(),
            quality: ConnectionQuality::Unknown,
        });
        self.push_log(format!(
            "Connecting to '{}' as {}",
            self.config.room_name, identity
        ));
        self.publish();

        let grant = match self
            .tokens
            .request_token(&identity, &self.config.room_name)
            .await
        {
            Ok(grant) => grant,
            Err(e) => {
                warn!(identity = %identity, error = %e, "Token request failed");
                self.fail_connect(e.to_string());
                return None;
            }
        };

        match self
            .room_service
            .connect(&self.config.room_url, &grant.token, self.config.microphone)
            .await
        {
            Ok((handle, events)) => {
                if let Err(e) = handle.resume_playback().await {
                    // Autoplay restrictions; playback resumes on user gesture.
                    warn!(error = %e, "Audio playback resume failed");
                }
                self.handle = Some(handle);
                self.restart_meter();
                self.state.connection = ConnectionState::Connected;
                self.state.mic_muted = false;
                self.rebuild_participants();
                self.push_log("Connected".to_string());
                self.publish();
                info!(identity = %identity, room = %self.config.room_name, "Session connected");
                Some(events)
            }
            Err(e) => {
                warn!(error = %e, "Room connect failed");
                self.fail_connect(format!("Could not join room: {}", e));
                None
            }
        }
    }

    /// Records a connect failure and returns to the idle, retryable state.
    fn fail_connect(&mut self, message: String) {
        self.push_log(format!("Connection failed: {}", message));
        self.state.last_error = Some(message);
        self.state.session = None;
        self.state.connection = ConnectionState::Disconnected;
        self.publish();
    }

    async fn handle_toggle_mute(&mut self) {
        if self.state.connection != ConnectionState::Connected {
            debug!("Mute toggle ignored while not connected");
            return;
        }
        let Some(handle) = &self.handle else { return };

        let muted = !self.state.mic_muted;
        match handle.set_microphone_enabled(!muted).await {
            Ok(()) => {
                self.state.mic_muted = muted;
                self.push_log(if muted { "Microphone muted" } else { "Microphone unmuted" });
                self.publish();
            }
            Err(e) => warn!(error = %e, "Failed to toggle microphone"),
        }
    }

    async fn handle_tool(&mut self, tool: crate::tools::AssistantTool) {
        match tool.action() {
            crate::tools::ToolAction::OpenEmailComposer => {
                self.state.email_popup_open = true;
                self.publish();
            }
            crate::tools::ToolAction::SendCommand(text) => self.send_user_command(text).await,
        }
    }

    /// Sends `text` as a user command on the reliable data channel and
    /// appends the matching chat entry.
    async fn send_user_command(&mut self, text: &str) {
        if self.state.connection != ConnectionState::Connected {
            debug!(command = %text, "Command dropped while not connected");
            return;
        }
        let Some(handle) = &self.handle else { return };

        let payload = match protocol::encode_user_command(text, Utc::now().timestamp_millis()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to encode user command");
                return;
            }
        };
        match handle.publish_data(payload).await {
            Ok(()) => {
                self.state.chat.push(ChatEntry::user(text.to_string()));
                self.publish();
            }
            Err(e) => {
                warn!(error = %e, "Failed to send user command");
                self.state.last_error = Some(format!("Failed to send command: {}", e));
                self.publish();
            }
        }
    }

    /// Applies one room event. Returns `true` when the room ended and the
    /// event receiver should be dropped.
    async fn handle_room_event(&mut self, event: RoomEvent) -> bool {
        match event {
            RoomEvent::TrackSubscribed { participant, kind } => {
                self.push_log(format!("Subscribed to {:?} track from {}", kind, participant));
                if kind == TrackKind::Audio
                    && classify_role(&participant) == ParticipantRole::RemoteAgent
                {
                    self.agent_speaking_until = Some(Instant::now() + AGENT_SPEAKING_WINDOW);
                    self.state.agent_speaking = true;
                }
                self.publish();
                false
            }
            RoomEvent::LocalTrackPublished { kind } => {
                if kind == TrackKind::Audio {
                    // The meter may have been wired before the track existed.
                    self.restart_meter();
                }
                false
            }
            RoomEvent::ParticipantConnected { identity } => {
                self.push_log(format!("{} joined the room", identity));
                self.rebuild_participants();
                self.publish();
                false
            }
            RoomEvent::ParticipantDisconnected { identity } => {
                self.push_log(format!("{} left the room", identity));
                self.rebuild_participants();
                self.publish();
                false
            }
            RoomEvent::ActiveSpeakersChanged { identities } => {
                let local = self.state.session.as_ref().map(|s| s.identity.clone());
                self.state.local_speaking =
                    local.is_some_and(|id| identities.iter().any(|i| *i == id));
                self.publish();
                false
            }
            RoomEvent::ConnectionQualityChanged { identity, quality } => {
                let is_local = self
                    .state
                    .session
                    .as_ref()
                    .is_some_and(|s| s.identity == identity);
                if is_local {
                    if let Some(session) = &mut self.state.session {
                        session.quality = quality;
                    }
                    self.publish();
                }
                false
            }
            RoomEvent::DataReceived { payload, .. } => {
                self.apply_control_message(protocol::decode(&payload));
                false
            }
            RoomEvent::Disconnected { reason } => {
                info!(reason = %reason, "Room disconnected us");
                self.teardown(&format!("remote disconnect: {}", reason)).await;
                true
            }
        }
    }

    fn apply_control_message(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::EmailPopupTrigger => {
                self.state.email_popup_open = true;
            }
            ControlMessage::AssistantMessage { text, images } => {
                self.state.chat.push(ChatEntry::assistant(text, images));
            }
            ControlMessage::UserCommand { text, .. } => {
                // The agent echoes commands on some flows; keep them in chat.
                self.state.chat.push(ChatEntry::user(text));
            }
        }
        self.publish();
    }

    /// Replaces the sampling loop against the current local audio track.
    /// Runs without a meter when no tap is available.
    fn restart_meter(&mut self) {
        if let Some(meter) = self.meter.take() {
            meter.stop();
        }
        let source = self.handle.as_ref().and_then(|h| h.local_audio_source());
        match source {
            Some(source) => {
                self.meter = Some(MeterHandle::start(source, self.level_tx.clone()));
            }
            None => {
                warn!("No local audio source; level meter disabled");
                let _ = self.level_tx.send(0.0);
            }
        }
    }

    fn rebuild_participants(&mut self) {
        let local = self.state.session.as_ref().map(|s| s.identity.clone());
        let remote = self
            .handle
            .as_ref()
            .map(|h| h.remote_identities())
            .unwrap_or_default();
        self.state.participants = participant_set(local.as_deref(), &remote);
    }

    /// Shared cleanup for explicit disconnects, remote disconnects and
    /// shutdown. Idempotent: a second call with nothing to tear down only
    /// republishes the idle state.
    async fn teardown(&mut self, reason: &str) {
        if let Some(meter) = self.meter.take() {
            meter.stop();
        }
        let _ = self.level_tx.send(0.0);

        if let Some(handle) = self.handle.take() {
            handle.close().await;
            self.push_log(format!("Disconnected ({})", reason));
            info!(reason = %reason, "Room connection closed");
        }

        self.state.connection = ConnectionState::Disconnected;
        self.state.session = None;
        self.state.participants.clear();
        self.state.local_speaking = false;
        self.state.agent_speaking = false;
        self.state.mic_muted = false;
        self.agent_speaking_until = None;
        self.publish();
    }

    fn push_log(&mut self, message: impl Into<String>) {
        self.log.push(message);
        self.state.log = self.log.snapshot();
    }

    fn publish(&self) {
        // Fails only when every client is gone; the task winds down via the
        // closed command channel shortly after.
        let _ = self.state_tx.send(self.state.clone());
    }
}

/// Locally-unique client identity. A random suffix is enough: uniqueness
/// only needs to avoid likely collisions within one room's lifetime.
fn generate_identity() -> String {
    format!("user-{:05}", rand::random::<u32>() % 100_000)
}

async fn next_room_event(events: &mut Option<mpsc::Receiver<RoomEvent>>) -> Option<RoomEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn agent_window_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_identity_shape() {
        let identity = generate_identity();
        assert!(identity.starts_with("user-"));
        assert_eq!(identity.len(), "user-".len() + 5);
        assert!(identity["user-".len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_identities_are_unlikely_to_collide_back_to_back() {
        let a: Vec<String> = (0..20).map(|_| generate_identity()).collect();
        let unique: std::collections::HashSet<_> = a.iter().collect();
        // Not a safety property; just catch a broken RNG hookup.
        assert!(unique.len() > 1);
    }
}
