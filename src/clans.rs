//! Clan ledger operations.
//!
//! Every operation validates its preconditions, then mutates; the command
//! boundary persists the whole document afterwards. Membership is stored
//! only in the `clan_members` map; member lists are always derived from it.

use crate::error::{ClanwardenError, Result};
use crate::store::{Clan, StoreData};
use chrono::Utc;

/// Result of deleting a clan: how many members were removed and how many
/// escrowed bounty points were forfeited (not refunded).
#[derive(Debug, PartialEq, Eq)]
pub struct DeletedClan {
    pub members_removed: usize,
    pub forfeited_points: u32,
}

impl StoreData {
    /// Create a clan with `leader` as its first member.
    pub fn create_clan(&mut self, name: &str, leader: &str) -> Result<()> {
        if let Some(current) = self.clan_of(leader) {
            return Err(ClanwardenError::Validation(format!(
                "{} is already in clan {}",
                leader, current
            )));
        }
        if self.clans.contains_key(name) {
            return Err(ClanwardenError::Validation(
                "A clan with that name already exists".to_string(),
            ));
        }
        if name.len() > self.config.max_clan_name_length {
            return Err(ClanwardenError::Validation(format!(
                "Clan names are capped at {} characters",
                self.config.max_clan_name_length
            )));
        }
        self.clans.insert(
            name.to_string(),
            Clan {
                leader: Some(leader.to_string()),
                created: Utc::now(),
                points: 0,
            },
        );
        self.clan_members
            .insert(leader.to_string(), name.to_string());
        Ok(())
    }

    /// Join an existing clan. Returns the clan's member count afterwards.
    pub fn join_clan(&mut self, player: &str, name: &str) -> Result<usize> {
        if let Some(current) = self.clan_of(player) {
            return Err(ClanwardenError::Validation(format!(
                "{} is already in clan {}",
                player, current
            )));
        }
        if !self.clans.contains_key(name) {
            return Err(ClanwardenError::NotFound(format!(
                "Clan {} does not exist",
                name
            )));
        }
        self.clan_members
            .insert(player.to_string(), name.to_string());
        Ok(self.members_of(name).len())
    }

    /// Remove a player from their clan. When the removed player was the
    /// leader, leadership passes to the lexicographically smallest remaining
    /// member name, or the clan is left leaderless if nobody remains.
    /// Returns the clan the player left.
    pub fn remove_member(&mut self, player: &str) -> Result<String> {
        let clan_name = self.clan_members.remove(player).ok_or_else(|| {
            ClanwardenError::NotFound(format!("{} is not in any clan", player))
        })?;
        if self.is_clan_leader(player, &clan_name) {
            let successor = self.members_of(&clan_name).into_iter().next();
            if let Some(clan) = self.clans.get_mut(&clan_name) {
                clan.leader = successor;
            }
        }
        Ok(clan_name)
    }

    /// Reassign a clan's leadership. A clanless `new_leader` is also added
    /// as a member; one belonging to a *different* clan is rejected.
    /// Returns the previous leader, if there was one.
    pub fn set_leader(&mut self, clan: &str, new_leader: &str) -> Result<Option<String>> {
        if !self.clans.contains_key(clan) {
            return Err(ClanwardenError::NotFound(format!(
                "Clan {} does not exist",
                clan
            )));
        }
        if self.clan_of(new_leader).is_some_and(|c| c != clan) {
            return Err(ClanwardenError::Validation(format!(
                "{} belongs to another clan; remove them first",
                new_leader
            )));
        }
        let previous = match self.clans.get_mut(clan) {
            Some(entry) => entry.leader.replace(new_leader.to_string()),
            None => None,
        };
        self.clan_members
            .entry(new_leader.to_string())
            .or_insert_with(|| clan.to_string());
        Ok(previous)
    }

    /// Leader-initiated handover within the leader's own clan.
    pub fn transfer_leader(&mut self, leader: &str, successor: &str) -> Result<String> {
        let clan = self
            .clan_of(leader)
            .ok_or_else(|| {
                ClanwardenError::Validation(format!("{} is not in any clan", leader))
            })?
            .to_string();
        if !self.is_clan_leader(leader, &clan) {
            return Err(ClanwardenError::Validation(
                "Only the clan leader can transfer leadership".to_string(),
            ));
        }
        self.set_leader(&clan, successor)?;
        Ok(clan)
    }

    /// Delete a clan: all memberships pointing to it are removed and every
    /// bounty it proposed is forfeited (the escrow is *not* refunded).
    pub fn delete_clan(&mut self, name: &str) -> Result<DeletedClan> {
        if !self.clans.contains_key(name) {
            return Err(ClanwardenError::NotFound(format!(
                "Clan {} does not exist",
                name
            )));
        }
        let mut forfeited_points = 0;
        self.bounties.retain(|_, bounty| {
            if bounty.proposer_clan == name {
                forfeited_points += bounty.points;
                false
            } else {
                true
            }
        });
        let before = self.clan_members.len();
        self.clan_members.retain(|_, clan| clan != name);
        let members_removed = before - self.clan_members.len();
        self.clans.remove(name);
        Ok(DeletedClan {
            members_removed,
            forfeited_points,
        })
    }

    /// Re-key a clan, rewriting memberships and bounty proposer references.
    pub fn rename_clan(&mut self, old: &str, new: &str) -> Result<()> {
        if !self.clans.contains_key(old) {
            return Err(ClanwardenError::NotFound(format!(
                "Clan {} does not exist",
                old
            )));
        }
        if self.clans.contains_key(new) {
            return Err(ClanwardenError::Validation(
                "A clan with that name already exists".to_string(),
            ));
        }
        if new.len() > self.config.max_clan_name_length {
            return Err(ClanwardenError::Validation(format!(
                "Clan names are capped at {} characters",
                self.config.max_clan_name_length
            )));
        }
        if let Some(clan) = self.clans.remove(old) {
            self.clans.insert(new.to_string(), clan);
        }
        for clan in self.clan_members.values_mut() {
            if clan == old {
                *clan = new.to_string();
            }
        }
        for bounty in self.bounties.values_mut() {
            if bounty.proposer_clan == old {
                bounty.proposer_clan = new.to_string();
            }
        }
        Ok(())
    }

    /// Admin bulk creation: clan, leader and members in one step. The leader
    /// is prepended to the member list when absent; player records are
    /// lazily created for everyone. Returns the members added, leader first.
    pub fn setup_clan(&mut self, name: &str, leader: &str, members: &[String]) -> Result<Vec<String>> {
        if self.clans.contains_key(name) {
            return Err(ClanwardenError::Validation(format!(
                "Clan {} already exists",
                name
            )));
        }
        if name.len() > self.config.max_clan_name_length {
            return Err(ClanwardenError::Validation(format!(
                "Clan names are capped at {} characters",
                self.config.max_clan_name_length
            )));
        }
        let mut roster: Vec<String> = Vec::new();
        if !members.iter().any(|m| m == leader) {
            roster.push(leader.to_string());
        }
        roster.extend(members.iter().cloned());
        if roster.is_empty() {
            return Err(ClanwardenError::Validation(
                "No valid members provided".to_string(),
            ));
        }

        let conflicts: Vec<String> = roster
            .iter()
            .filter(|m| self.clan_members.contains_key(*m))
            .map(|m| format!("{} (in {})", m, self.clan_members[m]))
            .collect();
        if !conflicts.is_empty() {
            return Err(ClanwardenError::Validation(format!(
                "These players are already in a clan: {}",
                conflicts.join(", ")
            )));
        }

        self.clans.insert(
            name.to_string(),
            Clan {
                leader: Some(leader.to_string()),
                created: Utc::now(),
                points: 0,
            },
        );
        for member in &roster {
            self.player_mut(member);
            self.clan_members
                .insert(member.clone(), name.to_string());
        }
        Ok(roster)
    }

    /// Admin membership override, bypassing the self-service checks other
    /// than "one clan per player".
    pub fn add_to_clan(&mut self, player: &str, clan: &str) -> Result<()> {
        if !self.clans.contains_key(clan) {
            return Err(ClanwardenError::NotFound(format!(
                "Clan {} does not exist",
                clan
            )));
        }
        if let Some(current) = self.clan_of(player) {
            return Err(ClanwardenError::Validation(format!(
                "{} is already in clan {}",
                player, current
            )));
        }
        self.clan_members
            .insert(player.to_string(), clan.to_string());
        Ok(())
    }

    /// Admin force-grant/revoke. The balance is clamped to the `u32` range:
    /// negative results floor at zero, oversized deltas cap at `u32::MAX`.
    /// Returns the new balance.
    pub fn adjust_points(&mut self, clan: &str, delta: i64) -> Result<u32> {
        let entry = self.clans.get_mut(clan).ok_or_else(|| {
            ClanwardenError::NotFound(format!("Clan {} does not exist", clan))
        })?;
        let balance = i64::from(entry.points).saturating_add(delta);
        entry.points = balance.clamp(0, i64::from(u32::MAX)) as u32;
        Ok(entry.points)
    }

    /// Admin override: set the balance exactly.
    pub fn set_points(&mut self, clan: &str, points: u32) -> Result<()> {
        let entry = self.clans.get_mut(clan).ok_or_else(|| {
            ClanwardenError::NotFound(format!("Clan {} does not exist", clan))
        })?;
        entry.points = points;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_clan_preconditions() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        assert_eq!(data.clan_of("Steve"), Some("Red"));
        assert_eq!(data.clans["Red"].leader.as_deref(), Some("Steve"));
        assert_eq!(data.clans["Red"].points, 0);

        // Duplicate name, member-of-another-clan, and over-long names fail.
        assert!(data.create_clan("Red", "Alex").is_err());
        assert!(data.create_clan("Blue", "Steve").is_err());
        assert!(data
            .create_clan("ThisClanNameIsFarTooLongToBeValid", "Alex")
            .is_err());
        assert_eq!(data.clans.len(), 1);
    }

    #[test]
    fn test_join_clan() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        assert_eq!(data.join_clan("Alex", "Red").unwrap(), 2);
        assert!(data.join_clan("Alex", "Red").is_err());
        assert!(data.join_clan("Bob", "Blue").is_err());
    }

    #[test]
    fn test_remove_member_leader_succession() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        data.join_clan("Zoe", "Red").unwrap();
        data.join_clan("Alex", "Red").unwrap();

        // The departing leader is succeeded by the lexicographically
        // smallest remaining member.
        assert_eq!(data.remove_member("Steve").unwrap(), "Red");
        assert_eq!(data.clans["Red"].leader.as_deref(), Some("Alex"));

        // A non-leader leaving changes nothing about leadership.
        data.remove_member("Zoe").unwrap();
        assert_eq!(data.clans["Red"].leader.as_deref(), Some("Alex"));

        // The last member leaving leaves the clan leaderless.
        data.remove_member("Alex").unwrap();
        assert_eq!(data.clans["Red"].leader, None);

        assert!(data.remove_member("Steve").is_err());
    }

    #[test]
    fn test_set_leader() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        data.create_clan("Blue", "Alex").unwrap();

        // A member of a different clan cannot lead.
        assert!(data.set_leader("Red", "Alex").is_err());
        assert!(data.set_leader("Gray", "Bob").is_err());

        // A clanless new leader is added as a member.
        let previous = data.set_leader("Red", "Bob").unwrap();
        assert_eq!(previous.as_deref(), Some("Steve"));
        assert_eq!(data.clan_of("Bob"), Some("Red"));
        assert_eq!(data.clans["Red"].leader.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_transfer_leader() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        data.join_clan("Alex", "Red").unwrap();

        assert!(data.transfer_leader("Alex", "Steve").is_err());
        assert_eq!(data.transfer_leader("Steve", "Alex").unwrap(), "Red");
        assert_eq!(data.clans["Red"].leader.as_deref(), Some("Alex"));
    }

    #[test]
    fn test_delete_clan_forfeits_bounties() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        data.join_clan("Alex", "Red").unwrap();
        data.set_points("Red", 300).unwrap();
        data.player_mut("Target");
        data.post_bounty("Steve", "Target", 120).unwrap();

        let deleted = data.delete_clan("Red").unwrap();
        assert_eq!(
            deleted,
            DeletedClan {
                members_removed: 2,
                forfeited_points: 120
            }
        );
        assert!(data.clans.get("Red").is_none());
        assert!(data.bounties.is_empty());
        assert_eq!(data.clan_of("Steve"), None);
        assert_eq!(data.clan_of("Alex"), None);

        assert!(data.delete_clan("Red").is_err());
    }

    #[test]
    fn test_rename_clan_rewrites_references() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        data.set_points("Red", 200).unwrap();
        data.player_mut("Target");
        data.post_bounty("Steve", "Target", 50).unwrap();

        data.rename_clan("Red", "Crimson").unwrap();
        assert!(data.clans.get("Red").is_none());
        assert_eq!(data.clans["Crimson"].points, 150);
        assert_eq!(data.clan_of("Steve"), Some("Crimson"));
        assert_eq!(data.bounties["Target"].proposer_clan, "Crimson");

        assert!(data.rename_clan("Red", "Other").is_err());
        data.create_clan("Blue", "Alex").unwrap();
        assert!(data.rename_clan("Blue", "Crimson").is_err());
    }

    #[test]
    fn test_setup_clan() {
        let mut data = StoreData::default();
        let added = data
            .setup_clan(
                "Warriors",
                "Steve",
                &["Alex".to_string(), "Bob".to_string()],
            )
            .unwrap();
        assert_eq!(added, vec!["Steve", "Alex", "Bob"]);
        assert_eq!(data.clans["Warriors"].leader.as_deref(), Some("Steve"));
        assert!(data.players.contains_key("Bob"));
        assert_eq!(data.clan_of("Alex"), Some("Warriors"));

        // Conflicting memberships reject the whole roster.
        let err = data.setup_clan("Others", "Zoe", &["Bob".to_string()]);
        assert!(err.is_err());
        assert!(data.clans.get("Others").is_none());
        assert_eq!(data.clan_of("Zoe"), None);
    }

    #[test]
    fn test_adjust_points_floors_at_zero() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        assert_eq!(data.adjust_points("Red", 40).unwrap(), 40);
        assert_eq!(data.adjust_points("Red", -100).unwrap(), 0);
        assert!(data.adjust_points("Blue", 5).is_err());
    }

    #[test]
    fn test_adjust_points_clamps_oversized_deltas() {
        let mut data = StoreData::default();
        data.create_clan("Red", "Steve").unwrap();
        assert_eq!(data.adjust_points("Red", i64::MAX).unwrap(), u32::MAX);
        assert_eq!(data.adjust_points("Red", 10).unwrap(), u32::MAX);
        assert_eq!(data.adjust_points("Red", i64::MIN).unwrap(), 0);
    }
}
