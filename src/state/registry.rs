use std::collections::HashMap;

use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    proxy::{ProxyError, ProxyHost},
    state::party::{Party, PartyError, PartyId, PartySnapshot, PlayerId},
};

/// Cross-party rule violations reported by [`PartyRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No party has this identifier.
    #[error("Party {0} does not exist")]
    PartyNotFound(PartyId),
    /// The player is already a member of some party.
    #[error("Player {0} already in a party")]
    AlreadyInParty(PlayerId),
    /// The player already leads a party.
    #[error("Leader {0} already registered a party")]
    AlreadyLeads(PlayerId),
    /// The player is not a member of any party.
    #[error("Player {0} not in any Party")]
    NotInParty(PlayerId),
    /// The caller does not lead their party.
    #[error("Player {0} is not the Leader")]
    NotLeader(PlayerId),
    /// The proxy does not know the target server.
    #[error("Server {0} doesn't exist")]
    ServerNotFound(String),
    /// A membership rule of the party itself was violated.
    #[error(transparent)]
    Membership(#[from] PartyError),
}

/// Failure of a party relocation: either a registry rule or the proxy lookup itself.
#[derive(Debug, Error)]
pub enum RelocationError {
    /// A registry rule rejected the relocation.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The proxy could not answer the server lookup.
    #[error("server lookup failed")]
    Proxy(#[from] ProxyError),
}

/// What happened to the party after a member left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The party lives on; `new_leader` is set when the leaving player led it.
    Left {
        /// Party the player left.
        party_id: PartyId,
        /// Member promoted to leader, if any.
        new_leader: Option<PlayerId>,
    },
    /// The player was the last member and the party was removed.
    Dissolved {
        /// Party that was removed.
        party_id: PartyId,
    },
}

/// Result of a mutation together with the registry revision it produced.
///
/// Revisions grow by one per applied mutation and are assigned while the
/// write lock is held, so they follow the order in which changes happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    /// Revision reached by applying the mutation.
    pub revision: u64,
    /// What the mutation returned.
    pub value: T,
}

/// Summary of a relocation fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationReport {
    /// Relocated party.
    pub party_id: PartyId,
    /// Alias of the target server.
    pub server: String,
    /// Registry revision the member list was read at.
    pub revision: u64,
    /// Members for which a connection request was issued.
    pub requested: usize,
    /// Members that were offline or could not be looked up.
    pub skipped: usize,
}

/// Parties plus the player-to-party index, always mutated together.
#[derive(Debug, Default)]
struct Roster {
    parties: IndexMap<PartyId, Party>,
    member_of: HashMap<PlayerId, PartyId>,
    revision: u64,
}

impl Roster {
    fn commit<T>(&mut self, value: T) -> Committed<T> {
        self.revision += 1;
        Committed {
            revision: self.revision,
            value,
        }
    }

    fn party_of(&self, player: PlayerId) -> Result<&Party, RegistryError> {
        self.member_of
            .get(&player)
            .and_then(|party_id| self.parties.get(party_id))
            .ok_or(RegistryError::NotInParty(player))
    }

    /// Resolve the caller's party and make sure the caller leads it.
    fn led_party(&self, caller: PlayerId) -> Result<&Party, RegistryError> {
        let party = self.party_of(caller)?;
        if party.leader() != caller {
            return Err(RegistryError::NotLeader(caller));
        }
        Ok(party)
    }

    fn led_party_mut(&mut self, caller: PlayerId) -> Result<&mut Party, RegistryError> {
        let party_id = self.led_party(caller)?.id();
        self.parties
            .get_mut(&party_id)
            .ok_or(RegistryError::NotInParty(caller))
    }

    fn register(&mut self, leader: PlayerId) -> Result<PartySnapshot, RegistryError> {
        if self.member_of.contains_key(&leader) {
            return Err(RegistryError::AlreadyInParty(leader));
        }
        if self.parties.values().any(|party| party.leader() == leader) {
            return Err(RegistryError::AlreadyLeads(leader));
        }

        let party = Party::new(leader);
        let snapshot = party.snapshot();
        self.member_of.insert(leader, party.id());
        self.parties.insert(party.id(), party);
        Ok(snapshot)
    }

    fn join(&mut self, party_id: PartyId, player: PlayerId) -> Result<(), RegistryError> {
        let party = self
            .parties
            .get_mut(&party_id)
            .ok_or(RegistryError::PartyNotFound(party_id))?;
        if self.member_of.contains_key(&player) {
            return Err(RegistryError::AlreadyInParty(player));
        }

        party.add_member(player)?;
        self.member_of.insert(player, party_id);
        Ok(())
    }

    fn leave(&mut self, player: PlayerId) -> Result<LeaveOutcome, RegistryError> {
        let party_id = self.party_of(player)?.id();
        let party = self
            .parties
            .get_mut(&party_id)
            .ok_or(RegistryError::NotInParty(player))?;
        let was_leader = party.leader() == player;

        party.remove_member(player)?;
        let successor = party.leader();
        let dissolved = party.is_empty();
        self.member_of.remove(&player);

        if dissolved {
            self.parties.shift_remove(&party_id);
            return Ok(LeaveOutcome::Dissolved { party_id });
        }

        Ok(LeaveOutcome::Left {
            party_id,
            new_leader: was_leader.then_some(successor),
        })
    }

    fn unregister(&mut self, caller: PlayerId) -> Result<Party, RegistryError> {
        let party_id = self.led_party(caller)?.id();
        let party = self
            .parties
            .shift_remove(&party_id)
            .ok_or(RegistryError::NotInParty(caller))?;
        for member in party.members() {
            self.member_of.remove(member);
        }
        Ok(party)
    }

    fn transfer_leadership(
        &mut self,
        caller: PlayerId,
        new_leader: PlayerId,
    ) -> Result<PartyId, RegistryError> {
        let party = self.led_party_mut(caller)?;
        party.set_leader(new_leader)?;
        Ok(party.id())
    }

    fn rename(&mut self, caller: PlayerId, name: Option<String>) -> Result<PartyId, RegistryError> {
        let party = self.led_party_mut(caller)?;
        party.set_name(name);
        Ok(party.id())
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        for (party_id, party) in &self.parties {
            assert_eq!(*party_id, party.id());
            assert!(!party.is_empty(), "party {party_id} kept without members");
            assert!(party.contains(party.leader()), "leader outside of party");
            let mut seen = std::collections::HashSet::new();
            for member in party.members() {
                assert!(seen.insert(*member), "duplicate member {member}");
                assert_eq!(self.member_of.get(member), Some(party_id));
            }
        }
        for (player, party_id) in &self.member_of {
            let party = self
                .parties
                .get(party_id)
                .unwrap_or_else(|| panic!("{player} indexed to missing party"));
            assert!(party.contains(*player));
        }
    }
}

/// Registry of every live party and the single place allowed to change them.
///
/// All operations run under one lock over both the parties and the membership
/// index: mutations take it exclusively, lookups share it. Callers only ever
/// receive [`PartySnapshot`] copies.
#[derive(Debug, Default)]
pub struct PartyRegistry {
    roster: RwLock<Roster>,
}

impl PartyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a party led by `leader`, who becomes its first member.
    pub async fn register_party(
        &self,
        leader: PlayerId,
    ) -> Result<Committed<PartySnapshot>, RegistryError> {
        let mut roster = self.roster.write().await;
        let party = roster.register(leader)?;
        Ok(roster.commit(party))
    }

    /// Add `player` to an existing party.
    pub async fn join_party(
        &self,
        party_id: PartyId,
        player: PlayerId,
    ) -> Result<Committed<()>, RegistryError> {
        let mut roster = self.roster.write().await;
        roster.join(party_id, player)?;
        Ok(roster.commit(()))
    }

    /// Remove `player` from their party, dissolving it when nobody is left.
    pub async fn leave_party(
        &self,
        player: PlayerId,
    ) -> Result<Committed<LeaveOutcome>, RegistryError> {
        let mut roster = self.roster.write().await;
        let outcome = roster.leave(player)?;
        Ok(roster.commit(outcome))
    }

    /// Dissolve the party led by `caller`, returning its final state.
    pub async fn unregister_party(
        &self,
        caller: PlayerId,
    ) -> Result<Committed<PartySnapshot>, RegistryError> {
        let mut roster = self.roster.write().await;
        let party = roster.unregister(caller)?;
        Ok(roster.commit(party.snapshot()))
    }

    /// Let the leader hand leadership to another member of the same party.
    pub async fn transfer_leadership(
        &self,
        caller: PlayerId,
        new_leader: PlayerId,
    ) -> Result<Committed<PartyId>, RegistryError> {
        let mut roster = self.roster.write().await;
        let party_id = roster.transfer_leadership(caller, new_leader)?;
        Ok(roster.commit(party_id))
    }

    /// Let the leader set or clear the party display name.
    pub async fn rename_party(
        &self,
        caller: PlayerId,
        name: Option<String>,
    ) -> Result<Committed<PartyId>, RegistryError> {
        let mut roster = self.roster.write().await;
        let party_id = roster.rename(caller, name)?;
        Ok(roster.commit(party_id))
    }

    /// Snapshot of the party `player` belongs to.
    pub async fn party_info(&self, player: PlayerId) -> Result<PartySnapshot, RegistryError> {
        let roster = self.roster.read().await;
        roster.party_of(player).map(Party::snapshot)
    }

    /// Every live party, oldest first.
    pub async fn list_parties(&self) -> Vec<PartySnapshot> {
        let roster = self.roster.read().await;
        roster.parties.values().map(Party::snapshot).collect()
    }

    /// Number of live parties.
    pub async fn party_count(&self) -> usize {
        self.roster.read().await.parties.len()
    }

    /// Send every connected member of the caller's party to `server_alias`.
    ///
    /// The lock is only held to authorise the caller and copy the member list;
    /// proxy calls happen afterwards. Offline members and failed lookups are
    /// skipped.
    pub async fn relocate_party(
        &self,
        caller: PlayerId,
        server_alias: &str,
        host: &dyn ProxyHost,
    ) -> Result<RelocationReport, RelocationError> {
        let (party_id, members, revision) = {
            let roster = self.roster.read().await;
            let party = roster.led_party(caller)?;
            (party.id(), party.members().to_vec(), roster.revision)
        };

        let server = host
            .find_server(server_alias)
            .await?
            .ok_or_else(|| RegistryError::ServerNotFound(server_alias.to_string()))?;

        let mut report = RelocationReport {
            party_id,
            server: server.alias.clone(),
            revision,
            requested: 0,
            skipped: 0,
        };
        for member in members {
            match host.find_connected_player(member).await {
                Ok(Some(player)) => {
                    host.request_connection(&player, &server);
                    report.requested += 1;
                }
                Ok(None) => {
                    debug!(%party_id, player_id = %member, "member offline; not relocated");
                    report.skipped += 1;
                }
                Err(err) => {
                    warn!(%party_id, player_id = %member, error = %err, "member lookup failed; not relocated");
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }

    #[cfg(test)]
    async fn assert_consistent(&self) {
        self.roster.read().await.assert_consistent();
    }
}
