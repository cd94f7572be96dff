use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        party::PartyInfoResponse,
        sse::{
            LeaderChangedEvent, PartyCreatedEvent, PartyDissolvedEvent, PartyJoinedEvent,
            PartyLeftEvent, PartyRelocatedEvent, PartyRenamedEvent, ServerEvent, SystemStatus,
        },
    },
    state::{SharedState, registry::RelocationReport},
};

const EVENT_PARTY_CREATED: &str = "party.created";
const EVENT_PARTY_JOINED: &str = "party.joined";
const EVENT_PARTY_LEFT: &str = "party.left";
const EVENT_LEADER_CHANGED: &str = "party.leader_changed";
const EVENT_PARTY_RENAMED: &str = "party.renamed";
const EVENT_PARTY_DISSOLVED: &str = "party.dissolved";
const EVENT_PARTY_RELOCATED: &str = "party.relocated";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the creation of a new party.
pub fn broadcast_party_created(state: &SharedState, party: PartyInfoResponse, revision: u64) {
    send_event(
        state,
        EVENT_PARTY_CREATED,
        &PartyCreatedEvent::new(party, revision),
    );
}

/// Broadcast that a player joined a party.
pub fn broadcast_party_joined(state: &SharedState, party_id: Uuid, player_id: Uuid, revision: u64) {
    send_event(
        state,
        EVENT_PARTY_JOINED,
        &PartyJoinedEvent::new(party_id, player_id, revision),
    );
}

/// Broadcast that a player left a party that still exists.
pub fn broadcast_party_left(
    state: &SharedState,
    party_id: Uuid,
    player_id: Uuid,
    new_leader: Option<Uuid>,
    revision: u64,
) {
    send_event(
        state,
        EVENT_PARTY_LEFT,
        &PartyLeftEvent::new(party_id, player_id, new_leader, revision),
    );
}

/// Broadcast a leadership handover.
pub fn broadcast_leader_changed(state: &SharedState, party_id: Uuid, leader: Uuid, revision: u64) {
    send_event(
        state,
        EVENT_LEADER_CHANGED,
        &LeaderChangedEvent::new(party_id, leader, revision),
    );
}

/// Broadcast a party name change; `None` means the name was cleared.
pub fn broadcast_party_renamed(
    state: &SharedState,
    party_id: Uuid,
    name: Option<String>,
    revision: u64,
) {
    send_event(
        state,
        EVENT_PARTY_RENAMED,
        &PartyRenamedEvent::new(party_id, name, revision),
    );
}

/// Broadcast that a party no longer exists, either unregistered or emptied.
pub fn broadcast_party_dissolved(state: &SharedState, party_id: Uuid, revision: u64) {
    send_event(
        state,
        EVENT_PARTY_DISSOLVED,
        &PartyDissolvedEvent::new(party_id, revision),
    );
}

/// Broadcast that connection requests were issued for a whole party.
pub fn broadcast_party_relocated(state: &SharedState, report: &RelocationReport) {
    send_event(
        state,
        EVENT_PARTY_RELOCATED,
        &PartyRelocatedEvent::from(report),
    );
}

/// Broadcast the degraded flag after it changed.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize party SSE payload"),
    }
}
