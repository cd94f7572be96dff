//! Query parameters and response bodies of the party REST API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        phase::VisiblePartyPhase,
        validation::{validate_party_name, validate_server_alias},
    },
    state::party::PartySnapshot,
};

/// Parameters of `POST /party/register`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegisterQuery {
    /// UUID of the player founding and leading the party (required).
    #[serde(rename = "leaderUuid")]
    pub leader_uuid: Option<String>,
}

/// Parameters of `POST /party/join`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JoinQuery {
    /// UUID of the party to join (required).
    #[serde(rename = "partyUUID")]
    pub party_uuid: Option<String>,
    /// UUID of the joining player (required).
    #[serde(rename = "playerUUID")]
    pub player_uuid: Option<String>,
}

/// Parameters of the endpoints acting on a single player.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlayerQuery {
    /// UUID of the player issuing the request (required).
    #[serde(rename = "playerUUID")]
    pub player_uuid: Option<String>,
}

/// Parameters of `POST /party/transferLeader`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransferLeaderQuery {
    /// UUID of the current leader (required).
    #[serde(rename = "playerUUID")]
    pub player_uuid: Option<String>,
    /// UUID of the member taking over (required).
    #[serde(rename = "newLeaderUUID")]
    pub new_leader_uuid: Option<String>,
}

/// Parameters of `POST /party/transfer`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RelocateQuery {
    /// UUID of the party leader (required).
    #[serde(rename = "playerUUID")]
    pub player_uuid: Option<String>,
    /// Target server alias; the configured default server is used when omitted.
    #[serde(rename = "serverAlias")]
    pub server_alias: Option<String>,
}

impl Validate for RelocateQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref alias) = self.server_alias {
            if let Err(e) = validate_server_alias(alias) {
                errors.add("serverAlias", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Parameters of `POST /party/rename`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RenameQuery {
    /// UUID of the party leader (required).
    #[serde(rename = "playerUUID")]
    pub player_uuid: Option<String>,
    /// New display name; omit or leave blank to clear it.
    pub name: Option<String>,
}

impl Validate for RenameQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = self.name.as_deref().map(str::trim) {
            if !name.is_empty() {
                if let Err(e) = validate_party_name(name) {
                    errors.add("name", e);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Returned when a party has been registered.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    #[serde(rename = "partyUUID")]
    pub party_uuid: Uuid,
}

/// Generic acknowledgement used by the mutating party endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public projection of a party.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartyInfoResponse {
    pub uuid: Uuid,
    pub leader: Uuid,
    pub name: Option<String>,
    /// Members in join order.
    pub members: Vec<Uuid>,
    pub state: VisiblePartyPhase,
}

impl From<PartySnapshot> for PartyInfoResponse {
    fn from(snapshot: PartySnapshot) -> Self {
        Self {
            uuid: snapshot.id,
            leader: snapshot.leader,
            name: snapshot.name,
            members: snapshot.members,
            state: snapshot.phase.into(),
        }
    }
}
