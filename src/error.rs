//! Custom error types for clanwarden.
//!
//! This module provides a centralized error handling system with specific error types
//! for different parts of the application.

use std::fmt;

/// Main error type for clanwarden operations.
#[derive(Debug)]
pub enum ClanwardenError {
    /// Configuration errors (missing env vars, invalid values)
    Config(String),
    /// A precondition on a request failed; reported to the requester, no state change
    Validation(String),
    /// A named player, clan or bounty does not exist; reported, no state change
    NotFound(String),
    /// The Minecraft server status query failed or timed out
    ServerUnavailable(String),
    /// The store document could not be written or read back
    Persistence(String),
    /// Discord bot errors
    Discord(String),
    /// Generic I/O errors
    Io(std::io::Error),
}

impl fmt::Display for ClanwardenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Validation(msg) => write!(f, "{}", msg),
            Self::NotFound(msg) => write!(f, "{}", msg),
            Self::ServerUnavailable(msg) => write!(f, "Server unreachable: {}", msg),
            Self::Persistence(msg) => write!(f, "Store error: {}", msg),
            Self::Discord(msg) => write!(f, "Discord error: {}", msg),
            Self::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for ClanwardenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClanwardenError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClanwardenError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ClanwardenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(format!("JSON encoding error: {}", err))
    }
}

impl From<tokio::task::JoinError> for ClanwardenError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Discord(format!("Task join error: {}", err))
    }
}

/// Result type alias for clanwarden operations.
pub type Result<T> = std::result::Result<T, ClanwardenError>;
