use thiserror::Error;
use uuid::Uuid;

/// Identifier of a player as reported by the proxy.
pub type PlayerId = Uuid;
/// Identifier of a party, assigned at registration.
pub type PartyId = Uuid;

/// Membership violations detected by a single [`Party`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartyError {
    /// The player is not a member, so it cannot lead the party.
    #[error("UUID {0} of leader does not exist in member list")]
    InvalidMember(PlayerId),
    /// The player is already listed as a member.
    #[error("UUID {0} does already exist in member list")]
    DuplicateMember(PlayerId),
    /// The player cannot be removed because it is not a member.
    #[error("UUID {0} does not exist in member list")]
    UnknownMember(PlayerId),
}

/// Lifecycle phase of a party, derived from its membership.
///
/// `Dissolved` is never observed on a live [`Party`]: the registry drops the
/// party instead of keeping it around empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyPhase {
    /// Only the founding leader is in the party.
    Forming,
    /// At least one other player has joined at some point.
    Active,
    /// The last member left.
    Dissolved,
}

/// One group of players with an ordered member list and a single leader.
///
/// The leader is always one of the members and members are unique. Access is
/// not synchronised here; the owning registry serialises every call.
#[derive(Debug, Clone)]
pub struct Party {
    id: PartyId,
    name: Option<String>,
    members: Vec<PlayerId>,
    leader: PlayerId,
    grown: bool,
}

impl Party {
    /// Create a party whose sole member and leader is `leader`.
    pub fn new(leader: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            members: vec![leader],
            leader,
            grown: false,
        }
    }

    /// Identifier assigned at registration.
    pub fn id(&self) -> PartyId {
        self.id
    }

    /// Display name, if one was set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current leader.
    pub fn leader(&self) -> PlayerId {
        self.leader
    }

    /// Members in join order, the founding leader first.
    pub fn members(&self) -> &[PlayerId] {
        &self.members
    }

    /// Whether `player` is a member.
    pub fn contains(&self, player: PlayerId) -> bool {
        self.members.contains(&player)
    }

    /// Whether no member is left.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Phase derived from the current membership.
    pub fn phase(&self) -> PartyPhase {
        match (self.members.len(), self.grown) {
            (0, _) => PartyPhase::Dissolved,
            (_, false) => PartyPhase::Forming,
            (_, true) => PartyPhase::Active,
        }
    }

    /// Replace the display name; `None` clears it.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Hand leadership to an existing member.
    pub fn set_leader(&mut self, player: PlayerId) -> Result<(), PartyError> {
        if !self.contains(player) {
            return Err(PartyError::InvalidMember(player));
        }
        self.leader = player;
        Ok(())
    }

    /// Append a new member at the end of the join order.
    pub fn add_member(&mut self, player: PlayerId) -> Result<(), PartyError> {
        if self.contains(player) {
            return Err(PartyError::DuplicateMember(player));
        }
        self.members.push(player);
        self.grown = true;
        Ok(())
    }

    /// Remove a member, promoting the earliest remaining joiner when the leader leaves.
    ///
    /// When the last member is removed the leader field keeps the departed id; the
    /// caller is expected to discard the party at that point.
    pub fn remove_member(&mut self, player: PlayerId) -> Result<(), PartyError> {
        let position = self
            .members
            .iter()
            .position(|member| *member == player)
            .ok_or(PartyError::UnknownMember(player))?;
        self.members.remove(position);

        if self.leader == player {
            if let Some(successor) = self.members.first() {
                self.leader = *successor;
            }
        }
        Ok(())
    }

    /// Detached copy of the party that callers may keep or serialise.
    pub fn snapshot(&self) -> PartySnapshot {
        PartySnapshot {
            id: self.id,
            name: self.name.clone(),
            leader: self.leader,
            members: self.members.clone(),
            phase: self.phase(),
        }
    }
}

/// Immutable view of a party handed out by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartySnapshot {
    /// Party identifier.
    pub id: PartyId,
    /// Display name, if any.
    pub name: Option<String>,
    /// Leader at the time of the snapshot.
    pub leader: PlayerId,
    /// Members in join order.
    pub members: Vec<PlayerId>,
    /// Phase at the time of the snapshot.
    pub phase: PartyPhase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_party_has_leader_as_sole_member() {
        let leader = Uuid::new_v4();
        let party = Party::new(leader);

        assert_eq!(party.leader(), leader);
        assert_eq!(party.members(), &[leader]);
        assert_eq!(party.phase(), PartyPhase::Forming);
        assert!(party.name().is_none());
    }

    #[test]
    fn add_member_appends_in_join_order() {
        let leader = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut party = Party::new(leader);

        party.add_member(first).unwrap();
        party.add_member(second).unwrap();

        assert_eq!(party.members(), &[leader, first, second]);
        assert_eq!(party.phase(), PartyPhase::Active);
    }

    #[test]
    fn add_member_rejects_duplicates() {
        let leader = Uuid::new_v4();
        let mut party = Party::new(leader);

        let err = party.add_member(leader).unwrap_err();
        assert_eq!(err, PartyError::DuplicateMember(leader));
        assert!(err.to_string().contains("does already exist"));
        assert_eq!(party.members().len(), 1);
    }

    #[test]
    fn removing_regular_member_keeps_leader() {
        let leader = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut party = Party::new(leader);
        party.add_member(member).unwrap();

        party.remove_member(member).unwrap();

        assert!(!party.contains(member));
        assert_eq!(party.leader(), leader);
    }

    #[test]
    fn remove_unknown_member_fails_without_change() {
        let leader = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let mut party = Party::new(leader);

        let err = party.remove_member(stranger).unwrap_err();
        assert_eq!(err, PartyError::UnknownMember(stranger));
        assert!(err.to_string().contains("does not exist"));
        assert_eq!(party.members(), &[leader]);
    }

    #[test]
    fn set_leader_requires_membership() {
        let leader = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let mut party = Party::new(leader);

        assert_eq!(
            party.set_leader(outsider),
            Err(PartyError::InvalidMember(outsider))
        );
        assert_eq!(party.leader(), leader);

        party.add_member(outsider).unwrap();
        party.set_leader(outsider).unwrap();
        assert_eq!(party.leader(), outsider);
    }

    #[test]
    fn leader_leaving_promotes_earliest_joiner() {
        let leader = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut party = Party::new(leader);
        party.add_member(first).unwrap();
        party.add_member(second).unwrap();

        party.remove_member(leader).unwrap();

        assert_eq!(party.leader(), first);
        assert_eq!(party.members(), &[first, second]);
    }

    #[test]
    fn leader_leaving_pair_promotes_remaining_member() {
        let leader = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut party = Party::new(leader);
        party.add_member(member).unwrap();

        party.remove_member(leader).unwrap();

        assert_eq!(party.leader(), member);
        assert_eq!(party.members(), &[member]);
    }

    #[test]
    fn promotion_follows_join_order_after_leader_change() {
        let founder = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut party = Party::new(founder);
        party.add_member(first).unwrap();
        party.add_member(second).unwrap();
        party.set_leader(second).unwrap();

        party.remove_member(second).unwrap();

        assert_eq!(party.leader(), founder);
    }

    #[test]
    fn last_member_leaving_empties_party() {
        let leader = Uuid::new_v4();
        let mut party = Party::new(leader);

        party.remove_member(leader).unwrap();

        assert!(party.is_empty());
        assert_eq!(party.phase(), PartyPhase::Dissolved);
        assert_eq!(party.leader(), leader);
    }

    #[test]
    fn snapshot_is_detached_copy() {
        let leader = Uuid::new_v4();
        let mut party = Party::new(leader);
        party.set_name(Some("raid".into()));
        let snapshot = party.snapshot();

        party.add_member(Uuid::new_v4()).unwrap();
        party.set_name(None);

        assert_eq!(snapshot.id, party.id());
        assert_eq!(snapshot.name.as_deref(), Some("raid"));
        assert_eq!(snapshot.members, vec![leader]);
        assert_eq!(snapshot.phase, PartyPhase::Forming);
    }
}
