use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        party::{
            JoinQuery, MessageResponse, PartyInfoResponse, PlayerQuery, RegisterQuery,
            RegisterResponse, RelocateQuery, RenameQuery, TransferLeaderQuery,
        },
        validation::required_uuid,
    },
    error::AppError,
    services::party_service,
    state::SharedState,
};

/// Party lifecycle endpoints; every parameter travels in the query string.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/party/register", post(register_party))
        .route("/party/join", post(join_party))
        .route("/party/leave", post(leave_party))
        .route("/party/unregister", post(unregister_party))
        .route("/party/transferLeader", post(transfer_leader))
        .route("/party/transfer", post(relocate_party))
        .route("/party/rename", post(rename_party))
        .route("/party/info", get(party_info))
        .route("/party/list", get(list_parties))
}

#[utoipa::path(
    post,
    path = "/party/register",
    tag = "party",
    params(RegisterQuery),
    responses(
        (status = 201, description = "Party registered", body = RegisterResponse),
        (status = 400, description = "Invalid leader or leader already in a party")
    )
)]
/// Create a party led by `leaderUuid`.
pub async fn register_party(
    State(state): State<SharedState>,
    query: Result<Query<RegisterQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Query(query) = query?;
    let leader = required_uuid("leaderUuid", query.leader_uuid.as_deref())?;

    let response = party_service::register_party(&state, leader).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/party/join",
    tag = "party",
    params(JoinQuery),
    responses(
        (status = 200, description = "Player joined the party", body = MessageResponse),
        (status = 400, description = "Unknown party or player already in a party")
    )
)]
/// Add `playerUUID` to the party `partyUUID`.
pub async fn join_party(
    State(state): State<SharedState>,
    query: Result<Query<JoinQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Query(query) = query?;
    let party_id = required_uuid("partyUUID", query.party_uuid.as_deref())?;
    let player = required_uuid("playerUUID", query.player_uuid.as_deref())?;

    Ok(Json(
        party_service::join_party(&state, party_id, player).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/party/leave",
    tag = "party",
    params(PlayerQuery),
    responses(
        (status = 200, description = "Player left the party", body = MessageResponse),
        (status = 400, description = "Player not in any party")
    )
)]
/// Leave the current party; the last member leaving dissolves it.
pub async fn leave_party(
    State(state): State<SharedState>,
    query: Result<Query<PlayerQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Query(query) = query?;
    let player = required_uuid("playerUUID", query.player_uuid.as_deref())?;

    Ok(Json(party_service::leave_party(&state, player).await?))
}

#[utoipa::path(
    post,
    path = "/party/unregister",
    tag = "party",
    params(PlayerQuery),
    responses(
        (status = 200, description = "Party dissolved", body = MessageResponse),
        (status = 400, description = "Caller is not a party leader")
    )
)]
/// Dissolve the party led by `playerUUID`.
pub async fn unregister_party(
    State(state): State<SharedState>,
    query: Result<Query<PlayerQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Query(query) = query?;
    let caller = required_uuid("playerUUID", query.player_uuid.as_deref())?;

    Ok(Json(party_service::unregister_party(&state, caller).await?))
}

#[utoipa::path(
    post,
    path = "/party/transferLeader",
    tag = "party",
    params(TransferLeaderQuery),
    responses(
        (status = 200, description = "Leadership transferred", body = MessageResponse),
        (status = 400, description = "Caller is not the leader or target is not a member")
    )
)]
/// Hand leadership to `newLeaderUUID`; only the current leader may call it.
pub async fn transfer_leader(
    State(state): State<SharedState>,
    query: Result<Query<TransferLeaderQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Query(query) = query?;
    let caller = required_uuid("playerUUID", query.player_uuid.as_deref())?;
    let new_leader = required_uuid("newLeaderUUID", query.new_leader_uuid.as_deref())?;

    Ok(Json(
        party_service::transfer_leadership(&state, caller, new_leader).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/party/transfer",
    tag = "party",
    params(RelocateQuery),
    responses(
        (status = 200, description = "Connection requests issued", body = MessageResponse),
        (status = 400, description = "Caller is not the leader or server is unknown"),
        (status = 503, description = "Proxy unreachable")
    )
)]
/// Send every connected member of the caller's party to another server.
pub async fn relocate_party(
    State(state): State<SharedState>,
    query: Result<Query<RelocateQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Query(query) = query?;
    let caller = required_uuid("playerUUID", query.player_uuid.as_deref())?;
    query.validate()?;

    Ok(Json(
        party_service::relocate_party(&state, caller, query.server_alias).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/party/rename",
    tag = "party",
    params(RenameQuery),
    responses(
        (status = 200, description = "Party renamed", body = MessageResponse),
        (status = 400, description = "Invalid name or caller is not the leader")
    )
)]
/// Set or clear the name of the caller's party.
pub async fn rename_party(
    State(state): State<SharedState>,
    query: Result<Query<RenameQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Query(query) = query?;
    let caller = required_uuid("playerUUID", query.player_uuid.as_deref())?;
    query.validate()?;

    Ok(Json(
        party_service::rename_party(&state, caller, query.name).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/party/info",
    tag = "party",
    params(PlayerQuery),
    responses(
        (status = 200, description = "Party of the player", body = PartyInfoResponse),
        (status = 400, description = "Player not in any party")
    )
)]
/// Return the party `playerUUID` belongs to.
pub async fn party_info(
    State(state): State<SharedState>,
    query: Result<Query<PlayerQuery>, QueryRejection>,
) -> Result<Json<PartyInfoResponse>, AppError> {
    let Query(query) = query?;
    let player = required_uuid("playerUUID", query.player_uuid.as_deref())?;

    Ok(Json(party_service::party_info(&state, player).await?))
}

#[utoipa::path(
    get,
    path = "/party/list",
    tag = "party",
    responses((status = 200, description = "All live parties, oldest first", body = [PartyInfoResponse]))
)]
/// List every live party, oldest first.
pub async fn list_parties(State(state): State<SharedState>) -> Json<Vec<PartyInfoResponse>> {
    Json(party_service::list_parties(&state).await)
}
