//! In-memory session tracking.
//!
//! Maps each currently-online player name to their session-start timestamp,
//! reconciled once per poll tick against the freshly fetched live player
//! list. Never persisted: a process restart loses in-progress session start
//! times, which is an accepted limitation.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Names newly present in the live list
    pub joined: Vec<String>,
    /// Names no longer present, with their flushed session length in minutes
    pub departed: Vec<(String, f64)>,
}

/// Per-player Offline -> Online -> Offline state machine, keyed by name.
#[derive(Debug, Default)]
pub struct SessionTracker {
    online: BTreeMap<String, DateTime<Utc>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the live player list against the tracked set: names in the list
    /// but not tracked start a session now; tracked names missing from the
    /// list end theirs, yielding the elapsed minutes to accrue.
    pub fn reconcile(&mut self, live: &[String], now: DateTime<Utc>) -> Reconciliation {
        let mut outcome = Reconciliation::default();

        for name in live {
            if !self.online.contains_key(name) {
                self.online.insert(name.clone(), now);
                outcome.joined.push(name.clone());
            }
        }

        let gone: Vec<String> = self
            .online
            .keys()
            .filter(|name| !live.iter().any(|l| l == *name))
            .cloned()
            .collect();
        for name in gone {
            if let Some(start) = self.online.remove(&name) {
                outcome.departed.push((name, minutes_between(start, now)));
            }
        }

        outcome
    }

    /// End every tracked session at once. Used when the server is offline or
    /// the status query failed, so an outage cannot leave players "stuck
    /// online" accruing unbounded time.
    pub fn flush_all(&mut self, now: DateTime<Utc>) -> Vec<(String, f64)> {
        let flushed = std::mem::take(&mut self.online);
        flushed
            .into_iter()
            .map(|(name, start)| (name, minutes_between(start, now)))
            .collect()
    }

    pub fn is_tracking(&self, name: &str) -> bool {
        self.online.contains_key(name)
    }

    pub fn tracked_count(&self) -> usize {
        self.online.len()
    }
}

fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}
