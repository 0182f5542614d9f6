//! Bounty ledger operations.
//!
//! Points are debited from the proposer clan the moment a bounty is posted
//! (escrow) and credited back to exactly one clan when it resolves: the
//! killer's clan on payout (see `events::process_kill`), the proposer's on
//! cancellation, or nobody on an unrefunded force-cancel.

use crate::error::{ClanwardenError, Result};
use crate::store::{Bounty, StoreData};
use chrono::Utc;

impl StoreData {
    /// Post a bounty on `target`, escrowing `points` from the proposer's
    /// clan. The proposer must be their clan's leader; the target must have
    /// a player record, must not be in the proposer's clan, and must not
    /// already carry a bounty.
    pub fn post_bounty(&mut self, proposer: &str, target: &str, points: u32) -> Result<()> {
        let clan_name = self
            .clan_of(proposer)
            .ok_or_else(|| {
                ClanwardenError::Validation(
                    "You must belong to a clan to post a bounty".to_string(),
                )
            })?
            .to_string();
        if !self.is_clan_leader(proposer, &clan_name) {
            return Err(ClanwardenError::Validation(
                "Only the clan leader can post a bounty".to_string(),
            ));
        }
        if points == 0 {
            return Err(ClanwardenError::Validation(
                "Bounty points must be positive".to_string(),
            ));
        }
        if points > self.config.max_bounty_points {
            return Err(ClanwardenError::Validation(format!(
                "Bounties are capped at {} points",
                self.config.max_bounty_points
            )));
        }
        let balance = self.clans.get(&clan_name).map_or(0, |c| c.points);
        if balance < points {
            return Err(ClanwardenError::Validation(format!(
                "Clan {} only has {} points, not enough for this bounty",
                clan_name, balance
            )));
        }
        if !self.players.contains_key(target) {
            return Err(ClanwardenError::NotFound(format!(
                "{} has never played on the server",
                target
            )));
        }
        if self.clan_of(target) == Some(clan_name.as_str()) {
            return Err(ClanwardenError::Validation(
                "You cannot post a bounty on a member of your own clan".to_string(),
            ));
        }
        if let Some(existing) = self.bounties.get(target) {
            return Err(ClanwardenError::Validation(format!(
                "{} already has an active bounty ({} pts)",
                target, existing.points
            )));
        }

        if let Some(clan) = self.clans.get_mut(&clan_name) {
            clan.points -= points;
        }
        self.bounties.insert(
            target.to_string(),
            Bounty {
                proposer_clan: clan_name,
                proposed_by: proposer.to_string(),
                points,
                created: Utc::now(),
            },
        );
        Ok(())
    }

    /// Cancel an active bounty, refunding the escrow to the proposer clan.
    /// Only the administrator or the proposer clan's leader may cancel.
    /// Returns the refunded clan and amount.
    pub fn cancel_bounty(
        &mut self,
        actor: &str,
        actor_is_admin: bool,
        target: &str,
    ) -> Result<(String, u32)> {
        let bounty = self.bounties.get(target).cloned().ok_or_else(|| {
            ClanwardenError::NotFound(format!("No active bounty on {}", target))
        })?;
        let is_proposer_leader = self.clan_of(actor) == Some(bounty.proposer_clan.as_str())
            && self.is_clan_leader(actor, &bounty.proposer_clan);
        if !actor_is_admin && !is_proposer_leader {
            return Err(ClanwardenError::Validation(
                "Only the proposer clan's leader or the administrator can cancel this bounty"
                    .to_string(),
            ));
        }
        if let Some(clan) = self.clans.get_mut(&bounty.proposer_clan) {
            clan.points += bounty.points;
        }
        self.bounties.remove(target);
        Ok((bounty.proposer_clan, bounty.points))
    }

    /// Administrator force-cancel with a conditional refund. Returns the
    /// removed bounty and whether the escrow actually went back to a clan.
    pub fn force_cancel_bounty(&mut self, target: &str, refund: bool) -> Result<(Bounty, bool)> {
        let bounty = self.bounties.remove(target).ok_or_else(|| {
            ClanwardenError::NotFound(format!("No active bounty on {}", target))
        })?;
        let mut refunded = false;
        if refund {
            if let Some(clan) = self.clans.get_mut(&bounty.proposer_clan) {
                clan.points += bounty.points;
                refunded = true;
            }
        }
        Ok((bounty, refunded))
    }
}
