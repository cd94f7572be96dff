//! Party operations exposed over HTTP: registry calls, logging and event fan-out.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::party::{MessageResponse, PartyInfoResponse, RegisterResponse},
    error::ServiceError,
    services::sse_events,
    state::{SharedState, registry::LeaveOutcome},
};

/// Register a new party led by `leader`.
pub async fn register_party(
    state: &SharedState,
    leader: Uuid,
) -> Result<RegisterResponse, ServiceError> {
    let committed = state
        .registry()
        .register_party(leader)
        .await
        .inspect_err(|err| debug!(leader_id = %leader, error = %err, "party registration rejected"))?;
    let party_id = committed.value.id;
    info!(%party_id, leader_id = %leader, revision = committed.revision, "party registered");

    sse_events::broadcast_party_created(state, committed.value.into(), committed.revision);

    Ok(RegisterResponse {
        party_uuid: party_id,
    })
}

/// Add `player` to an existing party.
pub async fn join_party(
    state: &SharedState,
    party_id: Uuid,
    player: Uuid,
) -> Result<MessageResponse, ServiceError> {
    let committed = state
        .registry()
        .join_party(party_id, player)
        .await
        .inspect_err(|err| debug!(%party_id, player_id = %player, error = %err, "join rejected"))?;
    info!(%party_id, player_id = %player, "player joined party");

    sse_events::broadcast_party_joined(state, party_id, player, committed.revision);
    Ok(MessageResponse::new("Joined party successfully"))
}

/// Remove `player` from their party; the last member leaving dissolves it.
pub async fn leave_party(
    state: &SharedState,
    player: Uuid,
) -> Result<MessageResponse, ServiceError> {
    let committed = state
        .registry()
        .leave_party(player)
        .await
        .inspect_err(|err| debug!(player_id = %player, error = %err, "leave rejected"))?;
    let revision = committed.revision;

    match committed.value {
        LeaveOutcome::Left {
            party_id,
            new_leader,
        } => {
            info!(%party_id, player_id = %player, new_leader = ?new_leader, "player left party");
            sse_events::broadcast_party_left(state, party_id, player, new_leader, revision);
            if let Some(leader) = new_leader {
                sse_events::broadcast_leader_changed(state, party_id, leader, revision);
            }
        }
        LeaveOutcome::Dissolved { party_id } => {
            info!(%party_id, player_id = %player, "last member left; party dissolved");
            sse_events::broadcast_party_dissolved(state, party_id, revision);
        }
    }

    Ok(MessageResponse::new("Left party successfully"))
}

/// Dissolve the party led by `caller`.
pub async fn unregister_party(
    state: &SharedState,
    caller: Uuid,
) -> Result<MessageResponse, ServiceError> {
    let committed = state
        .registry()
        .unregister_party(caller)
        .await
        .inspect_err(|err| debug!(player_id = %caller, error = %err, "unregister rejected"))?;
    let party = committed.value;
    info!(
        party_id = %party.id,
        leader_id = %caller,
        members = party.members.len(),
        "party unregistered"
    );

    sse_events::broadcast_party_dissolved(state, party.id, committed.revision);
    Ok(MessageResponse::new("Party unregistered successfully"))
}

/// Hand leadership of the caller's party to another member.
pub async fn transfer_leadership(
    state: &SharedState,
    caller: Uuid,
    new_leader: Uuid,
) -> Result<MessageResponse, ServiceError> {
    let committed = state
        .registry()
        .transfer_leadership(caller, new_leader)
        .await
        .inspect_err(|err| {
            debug!(
                player_id = %caller,
                new_leader_id = %new_leader,
                error = %err,
                "leadership transfer rejected"
            )
        })?;
    let party_id = committed.value;
    info!(%party_id, from = %caller, to = %new_leader, "party leadership transferred");

    sse_events::broadcast_leader_changed(state, party_id, new_leader, committed.revision);
    Ok(MessageResponse::new("Party leader transferred successfully"))
}

/// Set the display name of the caller's party; a blank name clears it.
pub async fn rename_party(
    state: &SharedState,
    caller: Uuid,
    name: Option<String>,
) -> Result<MessageResponse, ServiceError> {
    let name = name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let committed = state
        .registry()
        .rename_party(caller, name.clone())
        .await
        .inspect_err(|err| debug!(player_id = %caller, error = %err, "rename rejected"))?;
    let party_id = committed.value;
    info!(%party_id, name = ?name, "party renamed");

    sse_events::broadcast_party_renamed(state, party_id, name, committed.revision);
    Ok(MessageResponse::new("Party renamed successfully"))
}

/// Snapshot of the party `player` belongs to.
pub async fn party_info(
    state: &SharedState,
    player: Uuid,
) -> Result<PartyInfoResponse, ServiceError> {
    let snapshot = state.registry().party_info(player).await?;
    Ok(snapshot.into())
}

/// Every live party, oldest first.
pub async fn list_parties(state: &SharedState) -> Vec<PartyInfoResponse> {
    state
        .registry()
        .list_parties()
        .await
        .into_iter()
        .map(Into::into)
        .collect()
}

/// Send the connected members of the caller's party to `server_alias`, or to
/// the configured default server when no alias is given.
pub async fn relocate_party(
    state: &SharedState,
    caller: Uuid,
    server_alias: Option<String>,
) -> Result<MessageResponse, ServiceError> {
    let alias = server_alias
        .or_else(|| state.config().default_server().map(str::to_string))
        .ok_or_else(|| ServiceError::InvalidInput("Missing parameter: serverAlias".into()))?;

    let report = state
        .registry()
        .relocate_party(caller, &alias, state.proxy())
        .await
        .inspect_err(|err| {
            debug!(player_id = %caller, server = %alias, error = %err, "relocation rejected")
        })?;
    info!(
        party_id = %report.party_id,
        server = %report.server,
        requested = report.requested,
        skipped = report.skipped,
        "party relocation requested"
    );

    sse_events::broadcast_party_relocated(state, &report);
    Ok(MessageResponse::new("Party transfer initiated"))
}
