use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{now, party::PartyInfoResponse},
    state::registry::RelocationReport,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
///
/// Party payloads carry the registry `revision` of the change so clients can
/// restore the order in which changes were applied.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the proxy is currently unreachable.
    pub degraded: bool,
    /// Number of live parties at subscription time.
    pub parties: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a party has been registered.
pub struct PartyCreatedEvent {
    pub party: PartyInfoResponse,
    pub revision: u64,
    pub at: String,
}

impl PartyCreatedEvent {
    pub fn new(party: PartyInfoResponse, revision: u64) -> Self {
        Self {
            party,
            revision,
            at: now(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player joined a party.
pub struct PartyJoinedEvent {
    pub party_id: Uuid,
    pub player_id: Uuid,
    pub revision: u64,
    pub at: String,
}

impl PartyJoinedEvent {
    pub fn new(party_id: Uuid, player_id: Uuid, revision: u64) -> Self {
        Self {
            party_id,
            player_id,
            revision,
            at: now(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player left a party that lives on.
pub struct PartyLeftEvent {
    pub party_id: Uuid,
    pub player_id: Uuid,
    /// Set when the departing player was the leader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_leader: Option<Uuid>,
    pub revision: u64,
    pub at: String,
}

impl PartyLeftEvent {
    pub fn new(party_id: Uuid, player_id: Uuid, new_leader: Option<Uuid>, revision: u64) -> Self {
        Self {
            party_id,
            player_id,
            new_leader,
            revision,
            at: now(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when leadership moved to another member.
pub struct LeaderChangedEvent {
    pub party_id: Uuid,
    pub leader: Uuid,
    pub revision: u64,
    pub at: String,
}

impl LeaderChangedEvent {
    pub fn new(party_id: Uuid, leader: Uuid, revision: u64) -> Self {
        Self {
            party_id,
            leader,
            revision,
            at: now(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the display name of a party changed.
pub struct PartyRenamedEvent {
    pub party_id: Uuid,
    pub name: Option<String>,
    pub revision: u64,
    pub at: String,
}

impl PartyRenamedEvent {
    pub fn new(party_id: Uuid, name: Option<String>, revision: u64) -> Self {
        Self {
            party_id,
            name,
            revision,
            at: now(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a party no longer exists.
pub struct PartyDissolvedEvent {
    pub party_id: Uuid,
    pub revision: u64,
    pub at: String,
}

impl PartyDissolvedEvent {
    pub fn new(party_id: Uuid, revision: u64) -> Self {
        Self {
            party_id,
            revision,
            at: now(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after the members of a party were sent to another server.
pub struct PartyRelocatedEvent {
    pub party_id: Uuid,
    pub server: String,
    pub requested: usize,
    pub skipped: usize,
    /// Registry revision the member list was read at.
    pub revision: u64,
    pub at: String,
}

impl From<&RelocationReport> for PartyRelocatedEvent {
    fn from(report: &RelocationReport) -> Self {
        Self {
            party_id: report.party_id,
            server: report.server.clone(),
            requested: report.requested,
            skipped: report.skipped,
            revision: report.revision,
            at: now(),
        }
    }
}
