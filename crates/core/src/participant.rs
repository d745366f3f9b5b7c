//! Participant modelling and role classification.

use serde::Serialize;

/// How a participant relates to this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Local,
    RemoteUser,
    RemoteAgent,
}

/// One endpoint attached to the room, keyed by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub identity: String,
    pub role: ParticipantRole,
}

/// Classifies a remote identity into its role.
///
/// The agent advertises no structured role, so this is a substring match on
/// the identities the agent process is known to join with. Kept in one place
/// so a token-minted role claim can replace it without touching callers.
pub fn classify_role(identity: &str) -> ParticipantRole {
    let lowered = identity.to_lowercase();
    if lowered.contains("agent") || lowered.contains("nevira") {
        ParticipantRole::RemoteAgent
    } else {
        ParticipantRole::RemoteUser
    }
}

/// Rebuilds the participant set from the room's current membership view.
///
/// The local participant is listed first; the set is rebuilt wholesale on
/// every membership change, so no participant outlives its removal event.
pub fn participant_set(local: Option<&str>, remote: &[String]) -> Vec<Participant> {
    let mut participants = Vec::with_capacity(remote.len() + 1);
    if let Some(identity) = local {
        participants.push(Participant {
            identity: identity.to_string(),
            role: ParticipantRole::Local,
        });
    }
    for identity in remote {
        participants.push(Participant {
            identity: identity.clone(),
            role: classify_role(identity),
        });
    }
    participants
}
