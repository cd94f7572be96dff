use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the party manager.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::party::register_party,
        crate::routes::party::join_party,
        crate::routes::party::leave_party,
        crate::routes::party::unregister_party,
        crate::routes::party::transfer_leader,
        crate::routes::party::relocate_party,
        crate::routes::party::rename_party,
        crate::routes::party::party_info,
        crate::routes::party::list_parties,
        crate::routes::sse::party_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::party::RegisterResponse,
            crate::dto::party::MessageResponse,
            crate::dto::party::PartyInfoResponse,
            crate::dto::phase::VisiblePartyPhase,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::PartyCreatedEvent,
            crate::dto::sse::PartyJoinedEvent,
            crate::dto::sse::PartyLeftEvent,
            crate::dto::sse::LeaderChangedEvent,
            crate::dto::sse::PartyRenamedEvent,
            crate::dto::sse::PartyDissolvedEvent,
            crate::dto::sse::PartyRelocatedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "party", description = "Party lifecycle and membership"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
