//! Achievement engine.
//!
//! Pure predicate evaluation over a player record plus an optional context
//! value (the opposing player for rivalry-based achievements). At most one
//! achievement is unlocked per call, each at most once per player, ever.
//! Persistence happens at the enclosing operation's boundary.

use crate::store::StoreData;
use serde::{Deserialize, Serialize};

/// Identifier of an unlockable achievement.
///
/// The serde names are the wire format stored in each player's unlock list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementId {
    /// First PvP kill
    #[serde(rename = "first_blood")]
    FirstBlood,
    /// Cumulative playtime past the active-role threshold
    #[serde(rename = "survivor_10h")]
    Survivor10h,
    /// 100 zombie encounters
    #[serde(rename = "zombie_hunter")]
    ZombieHunter,
    /// 50 PvP kills
    #[serde(rename = "pvp_master")]
    PvpMaster,
    /// 10 inter-clan kills
    #[serde(rename = "clan_warrior")]
    ClanWarrior,
    /// 5 kills against the same player
    #[serde(rename = "nemesis")]
    Nemesis,
    /// Killed someone who had killed you 3+ times
    #[serde(rename = "comeback")]
    Comeback,
    /// Collected a bounty
    #[serde(rename = "bounty_hunter")]
    BountyHunter,
}

/// Static metadata for one achievement.
#[derive(Debug)]
pub struct AchievementInfo {
    pub id: AchievementId,
    pub name: &'static str,
    pub desc: &'static str,
    /// Points credited to the player's clan on unlock
    pub points: u32,
}

static ACHIEVEMENTS: &[AchievementInfo] = &[
    AchievementInfo {
        id: AchievementId::FirstBlood,
        name: "🩸 First Blood",
        desc: "First PvP kill",
        points: 50,
    },
    AchievementInfo {
        id: AchievementId::Survivor10h,
        name: "🏆 Survivor",
        desc: "10h of cumulative playtime",
        points: 100,
    },
    AchievementInfo {
        id: AchievementId::ZombieHunter,
        name: "🧟 Zombie Hunter",
        desc: "100 zombie encounters",
        points: 200,
    },
    AchievementInfo {
        id: AchievementId::PvpMaster,
        name: "⚔️ PvP Master",
        desc: "50 PvP kills",
        points: 300,
    },
    AchievementInfo {
        id: AchievementId::ClanWarrior,
        name: "🛡️ Clan Warrior",
        desc: "10 inter-clan kills",
        points: 150,
    },
    AchievementInfo {
        id: AchievementId::Nemesis,
        name: "😈 Nemesis",
        desc: "Kill the same player 5 times",
        points: 100,
    },
    AchievementInfo {
        id: AchievementId::Comeback,
        name: "🔥 Comeback",
        desc: "Kill someone who had killed you 3+ times",
        points: 125,
    },
    AchievementInfo {
        id: AchievementId::BountyHunter,
        name: "💰 Bounty Hunter",
        desc: "Collect a bounty",
        points: 75,
    },
];

impl AchievementId {
    /// Static metadata for this achievement.
    pub fn info(self) -> &'static AchievementInfo {
        ACHIEVEMENTS
            .iter()
            .find(|a| a.id == self)
            .unwrap_or(&ACHIEVEMENTS[0])
    }

    /// All defined achievements, in display order.
    pub fn all() -> &'static [AchievementInfo] {
        ACHIEVEMENTS
    }
}

impl StoreData {
    /// Evaluate one achievement for a player and unlock it if earned.
    ///
    /// Returns the achievement metadata when newly unlocked, `None` when the
    /// player has no record, the achievement is already unlocked, or its
    /// predicate does not hold. On unlock the id is appended to the player's
    /// list (order = unlock order, permanent) and the point value is credited
    /// to the player's clan, if any.
    pub fn check_achievement(
        &mut self,
        player: &str,
        id: AchievementId,
        context: Option<&str>,
    ) -> Option<&'static AchievementInfo> {
        let record = self.players.get(player)?;
        if record.achievements.contains(&id) {
            return None;
        }

        let rival = |name: Option<&str>| name.and_then(|n| record.rivals.get(n));
        let earned = match id {
            AchievementId::FirstBlood => record.kills >= 1,
            AchievementId::Survivor10h => {
                record.total_minutes >= self.config.hours_for_active_role as f64 * 60.0
            }
            AchievementId::ZombieHunter => record.zombie_kills >= 100,
            AchievementId::PvpMaster => record.kills >= 50,
            AchievementId::ClanWarrior => record.clan_kills >= 10,
            AchievementId::Nemesis => rival(context).is_some_and(|r| r.kills >= 5),
            AchievementId::Comeback => rival(context).is_some_and(|r| r.deaths >= 3),
            AchievementId::BountyHunter => true,
        };
        if !earned {
            return None;
        }

        let info = id.info();
        if let Some(record) = self.players.get_mut(player) {
            record.achievements.push(id);
        }
        if let Some(clan_name) = self.clan_members.get(player).cloned() {
            if let Some(clan) = self.clans.get_mut(&clan_name) {
                clan.points += info.points;
            }
        }
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Clan, StoreData};
    use chrono::Utc;

    fn store_with_player(name: &str) -> StoreData {
        let mut data = StoreData::default();
        data.player_mut(name);
        data
    }

    #[test]
    fn test_unknown_player_is_not_earned() {
        let mut data = StoreData::default();
        assert!(data
            .check_achievement("Ghost", AchievementId::FirstBlood, None)
            .is_none());
    }

    #[test]
    fn test_predicate_must_hold() {
        let mut data = store_with_player("Steve");
        assert!(data
            .check_achievement("Steve", AchievementId::FirstBlood, None)
            .is_none());

        data.player_mut("Steve").kills = 1;
        let info = data
            .check_achievement("Steve", AchievementId::FirstBlood, None)
            .expect("one kill earns first blood");
        assert_eq!(info.points, 50);
    }

    #[test]
    fn test_monotonicity() {
        // An achievement unlocks at most once per (player, id) pair.
        let mut data = store_with_player("Steve");
        data.player_mut("Steve").kills = 60;

        assert!(data
            .check_achievement("Steve", AchievementId::PvpMaster, None)
            .is_some());
        for _ in 0..3 {
            assert!(data
                .check_achievement("Steve", AchievementId::PvpMaster, None)
                .is_none());
        }
        assert_eq!(
            data.players["Steve"]
                .achievements
                .iter()
                .filter(|a| **a == AchievementId::PvpMaster)
                .count(),
            1
        );
    }

    #[test]
    fn test_rivalry_achievements_need_context() {
        let mut data = store_with_player("Steve");
        data.player_mut("Alex");
        for _ in 0..5 {
            data.player_mut("Steve").kills += 1;
            data.record_rivalry("Steve", "Alex");
        }

        assert!(data
            .check_achievement("Steve", AchievementId::Nemesis, None)
            .is_none());
        assert!(data
            .check_achievement("Steve", AchievementId::Nemesis, Some("Alex"))
            .is_some());
        // The victim's ledger shows deaths, not kills.
        assert!(data
            .check_achievement("Alex", AchievementId::Nemesis, Some("Steve"))
            .is_none());
        assert!(data
            .check_achievement("Alex", AchievementId::Comeback, Some("Steve"))
            .is_some());
    }

    #[test]
    fn test_unlock_credits_clan() {
        let mut data = store_with_player("Steve");
        data.clans.insert(
            "Red".to_string(),
            Clan {
                leader: Some("Steve".to_string()),
                created: Utc::now(),
                points: 0,
            },
        );
        data.clan_members
            .insert("Steve".to_string(), "Red".to_string());

        data.check_achievement("Steve", AchievementId::BountyHunter, None)
            .expect("bounty hunter has no counter predicate");
        assert_eq!(data.clans["Red"].points, 75);
    }

    #[test]
    fn test_survivor_threshold_follows_config() {
        let mut data = store_with_player("Steve");
        data.config.hours_for_active_role = 2;
        data.player_mut("Steve").total_minutes = 119.0;
        assert!(data
            .check_achievement("Steve", AchievementId::Survivor10h, None)
            .is_none());
        data.player_mut("Steve").total_minutes = 120.0;
        assert!(data
            .check_achievement("Steve", AchievementId::Survivor10h, None)
            .is_some());
    }

    #[test]
    fn test_wire_ids_are_stable() {
        let json = serde_json::to_string(&AchievementId::Survivor10h).unwrap();
        assert_eq!(json, "\"survivor_10h\"");
        let id: AchievementId = serde_json::from_str("\"first_blood\"").unwrap();
        assert_eq!(id, AchievementId::FirstBlood);
    }
}
