//! The player record store and its single-document persistence.
//!
//! The whole game state (players, clans, memberships, bounties, runtime
//! config) is one JSON document, loaded once at startup and rewritten in
//! full after every mutating operation. There is no partial write and no
//! versioning: every mutator ends with a full-document save.

use crate::achievements::AchievementId;
use crate::config::RuntimeConfig;
use crate::error::{ClanwardenError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

/// Kill/death tally against one specific opposing player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivalScore {
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
}

/// Cumulative statistics for one player, keyed by display name.
///
/// Records are lazily created zero-valued the first time any event references
/// the name, and never implicitly deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub total_minutes: f64,
    pub sessions: u32,
    pub kills: u32,
    pub deaths: u32,
    #[serde(default)]
    pub zombie_kills: u32,
    #[serde(default)]
    pub clan_kills: u32,
    pub last_seen: Option<DateTime<Utc>>,
    pub first_seen: DateTime<Utc>,
    /// Unlocked achievements, in unlock order, no duplicates
    #[serde(default)]
    pub achievements: Vec<AchievementId>,
    /// Rivalry ledger: opposing player name -> tally
    #[serde(default)]
    pub rivals: BTreeMap<String, RivalScore>,
}

impl PlayerRecord {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            total_minutes: 0.0,
            sessions: 0,
            kills: 0,
            deaths: 0,
            zombie_kills: 0,
            clan_kills: 0,
            last_seen: None,
            first_seen: now,
            achievements: Vec::new(),
            rivals: BTreeMap::new(),
        }
    }

    pub fn hours(&self) -> f64 {
        self.total_minutes / 60.0
    }

    /// Kill/death ratio; with zero deaths the kill count itself.
    pub fn kd_ratio(&self) -> f64 {
        if self.deaths > 0 {
            self.kills as f64 / self.deaths as f64
        } else {
            self.kills as f64
        }
    }
}

/// A clan's ledger entry. Membership is *not* stored here; it is always
/// derived from [`StoreData::clan_members`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clan {
    /// `None` when the last member left and nobody could succeed
    pub leader: Option<String>,
    pub created: DateTime<Utc>,
    pub points: u32,
}

/// An active bounty, keyed by target player. The points have already been
/// debited from the proposer clan (escrow) at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bounty {
    pub proposer_clan: String,
    pub proposed_by: String,
    pub points: u32,
    pub created: DateTime<Utc>,
}

/// The persisted document. All maps are `BTreeMap` so iteration and
/// serialization order are deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    pub players: BTreeMap<String, PlayerRecord>,
    pub clans: BTreeMap<String, Clan>,
    /// Player name -> clan name; the single source of truth for membership
    pub clan_members: BTreeMap<String, String>,
    pub bounties: BTreeMap<String, Bounty>,
    /// Reserved for future achievement definitions
    pub achievements: serde_json::Map<String, serde_json::Value>,
    /// Reserved for future missions
    pub missions: serde_json::Map<String, serde_json::Value>,
    pub config: RuntimeConfig,
}

impl StoreData {
    /// Get a player record, lazily creating a zero-valued one on first reference.
    pub fn player_mut(&mut self, name: &str) -> &mut PlayerRecord {
        self.players
            .entry(name.to_string())
            .or_insert_with(|| PlayerRecord::fresh(Utc::now()))
    }

    /// The clan the player currently belongs to, if any.
    pub fn clan_of(&self, player: &str) -> Option<&str> {
        self.clan_members.get(player).map(String::as_str)
    }

    /// Whether `player` is the leader of `clan`.
    pub fn is_clan_leader(&self, player: &str, clan: &str) -> bool {
        self.clans
            .get(clan)
            .is_some_and(|c| c.leader.as_deref() == Some(player))
    }

    /// Members of a clan, derived from the membership map (sorted by name).
    pub fn members_of(&self, clan: &str) -> Vec<String> {
        self.clan_members
            .iter()
            .filter(|(_, c)| c.as_str() == clan)
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Record one kill in the symmetric rivalry ledger: a kill by `killer` on
    /// `victim` increments the killer's `kills` against the victim and the
    /// victim's `deaths` against the killer, as one logical operation.
    pub fn record_rivalry(&mut self, killer: &str, victim: &str) {
        self.player_mut(killer)
            .rivals
            .entry(victim.to_string())
            .or_default()
            .kills += 1;
        self.player_mut(victim)
            .rivals
            .entry(killer.to_string())
            .or_default()
            .deaths += 1;
    }

    /// Flush one completed session: add the elapsed minutes, bump the session
    /// count, stamp `last_seen`, credit the player's clan one point batch per
    /// full hour played, and evaluate the survivor achievement.
    pub fn update_playtime(&mut self, name: &str, minutes: f64) {
        let record = self.player_mut(name);
        record.total_minutes += minutes;
        record.sessions += 1;
        record.last_seen = Some(Utc::now());

        if let Some(clan_name) = self.clan_members.get(name).cloned() {
            if let Some(clan) = self.clans.get_mut(&clan_name) {
                let pts = (minutes / 60.0) as u32 * self.config.points_per_hour;
                if pts > 0 {
                    clan.points += pts;
                }
            }
        }

        let threshold = self.config.hours_for_active_role as f64 * 60.0;
        if self
            .players
            .get(name)
            .is_some_and(|r| r.total_minutes >= threshold)
        {
            self.check_achievement(name, AchievementId::Survivor10h, None);
        }
    }

    /// Admin reset: replace the record with a fresh zero-valued one.
    /// Achievements and rivalry history are lost.
    pub fn reset_player(&mut self, name: &str) -> Result<()> {
        if !self.players.contains_key(name) {
            return Err(ClanwardenError::NotFound(format!(
                "No data for player {}",
                name
            )));
        }
        self.players
            .insert(name.to_string(), PlayerRecord::fresh(Utc::now()));
        Ok(())
    }
}

/// Owned handle over the document and its location on disk.
pub struct Store {
    path: PathBuf,
    pub data: StoreData,
}

impl Store {
    /// Load the document, starting empty when the file does not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) => {
                let data: StoreData = serde_json::from_str(&text).map_err(|e| {
                    ClanwardenError::Persistence(format!(
                        "corrupt store at {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                info!(
                    "loaded {} players, {} clans, {} active bounties",
                    data.players.len(),
                    data.clans.len(),
                    data.bounties.len()
                );
                data
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no store at {}, starting empty", path.display());
                StoreData::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, data })
    }

    /// Rewrite the whole document. The write goes to a sibling temp file
    /// first and is renamed into place, so a crash mid-write never leaves a
    /// truncated store behind.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ClanwardenError::Persistence(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let text = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|e| {
            ClanwardenError::Persistence(format!("write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            ClanwardenError::Persistence(format!("rename into {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }

    /// Save, logging instead of failing: the in-memory state has already
    /// changed, and the next successful write will include the missed update.
    pub fn persist(&self) {
        if let Err(e) = self.save() {
            error!("store write failed, keeping in-memory state: {}", e);
        }
    }
}
