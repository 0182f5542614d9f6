//! Clanwarden library.
//!
//! Core bookkeeping engine for a Discord bot that monitors a single
//! Minecraft server: session tracking, log event parsing and application,
//! and the clan/bounty/achievement game layered on top, all backed by one
//! JSON store document.

pub mod achievements;
pub mod bounties;
pub mod clans;
pub mod config;
pub mod error;
pub mod events;
pub mod logparse;
pub mod mc_server;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{ClanwardenError, Result};
