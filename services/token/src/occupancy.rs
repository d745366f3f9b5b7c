//! Room occupancy lookup against the room service.

use async_trait::async_trait;
use serde::Deserialize;

/// Queries the room service's current membership view.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Number of participants currently in `room`.
    async fn participant_count(&self, room: &str) -> anyhow::Result<usize>;
}

#[derive(Deserialize, Debug)]
struct ParticipantRecord {
    #[allow(dead_code)]
    identity: String,
}

/// HTTP implementation over the room service's participant listing.
pub struct HttpRoomDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRoomDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RoomDirectory for HttpRoomDirectory {
    async fn participant_count(&self, room: &str) -> anyhow::Result<usize> {
        let url = format!(
            "{}/rooms/{}/participants",
            self.base_url.trim_end_matches('/'),
            room
        );
        let response = self.http.get(&url).send().await?.error_for_status()?;
        let participants: Vec<ParticipantRecord> = response.json().await?;
        Ok(participants.len())
    }
}

/// Used when no room service URL is configured; every room reads as empty,
/// which matches how a provider treats a room that does not exist yet.
pub struct EmptyRoomDirectory;

#[async_trait]
impl RoomDirectory for EmptyRoomDirectory {
    async fn participant_count(&self, _room: &str) -> anyhow::Result<usize> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_directory_always_reports_zero() {
        let directory = EmptyRoomDirectory;
        assert_eq!(directory.participant_count("any-room").await.unwrap(), 0);
    }

    #[test]
    fn test_participant_record_parses_listing_entry() {
        let record: ParticipantRecord =
            serde_json::from_str(r#"{"identity":"agent-nevira"}"#).unwrap();
        assert_eq!(record.identity, "agent-nevira");
    }
}
