//! Type definitions and aliases for the bot.
//!
//! This module contains shared types used throughout the command handlers.

use clanwarden::config::Config;
use clanwarden::store::Store;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Bot application data shared across all commands.
///
/// The single mutex around the store serializes every mutating operation's
/// read -> mutate -> persist cycle; contention is human-rate, so nothing
/// finer-grained is needed.
pub struct Data {
    /// Environment configuration (token, server address, owner)
    pub config: Config,
    /// The JSON-backed game state
    pub store: Arc<Mutex<Store>>,
}

/// Error type for bot commands (maintains compatibility with poise).
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Command context type alias for easier usage.
pub type Context<'a> = poise::Context<'a, Data, Error>;
