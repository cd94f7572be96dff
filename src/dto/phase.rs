use serde::Serialize;
use utoipa::ToSchema;

use crate::state::party::PartyPhase;

/// Party lifecycle phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePartyPhase {
    /// Only the leader is in the party.
    Forming,
    /// Other players have joined.
    Active,
    /// The party no longer exists.
    Dissolved,
}

impl From<PartyPhase> for VisiblePartyPhase {
    fn from(value: PartyPhase) -> Self {
        match value {
            PartyPhase::Forming => VisiblePartyPhase::Forming,
            PartyPhase::Active => VisiblePartyPhase::Active,
            PartyPhase::Dissolved => VisiblePartyPhase::Dissolved,
        }
    }
}
