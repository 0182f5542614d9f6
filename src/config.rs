//! Configuration management for clanwarden.
//!
//! Two layers of configuration exist: [`Config`] is loaded once from the
//! environment at startup (token, server address, store path, owner), while
//! [`RuntimeConfig`] holds the tunable game values that live inside the
//! persisted store document and can be changed at runtime with `/setconfig`.

use crate::error::{ClanwardenError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for the application, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,
    /// Minecraft server address (host:port)
    pub mc_server_address: String,
    /// Path to the JSON store document
    pub data_path: String,
    /// Discord user id of the bot administrator
    pub owner_id: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This will attempt to load a .env file if present using dotenv,
    /// then read required environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required environment variable is missing or invalid.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors - it's optional)
        dotenv::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN").map_err(|_| {
            ClanwardenError::Config(
                "Missing DISCORD_TOKEN environment variable. Set it in your environment or create a .env file (never commit this file).".to_string(),
            )
        })?;

        let mc_server_address = env::var("MC_SERVER_ADDRESS").map_err(|_| {
            ClanwardenError::Config(
                "Missing MC_SERVER_ADDRESS environment variable. Set it in your environment or .env file (e.g., MC_SERVER_ADDRESS=localhost:25565).".to_string(),
            )
        })?;
        Self::validate_server_address(&mc_server_address)?;

        let data_path = Self::get_data_path()?;

        let owner_id = env::var("OWNER_ID")
            .map_err(|_| {
                ClanwardenError::Config(
                    "Missing OWNER_ID environment variable (the Discord user id allowed to run admin commands).".to_string(),
                )
            })?
            .parse::<u64>()
            .map_err(|_| {
                ClanwardenError::Config("OWNER_ID must be a numeric Discord user id".to_string())
            })?;

        Ok(Self {
            discord_token,
            mc_server_address,
            data_path,
            owner_id,
        })
    }

    /// Get the store path from environment or use default.
    fn get_data_path() -> Result<String> {
        match env::var("DATA_PATH") {
            Ok(path) => Ok(path),
            Err(_) => {
                let mut path = env::current_dir().map_err(|e| {
                    ClanwardenError::Config(format!("Failed to determine current directory: {}", e))
                })?;

                path.push("data");
                path.push("clanwarden.json");

                path.into_os_string().into_string().map_err(|os_str| {
                    ClanwardenError::Config(format!(
                        "Store path contains invalid Unicode: {:?}",
                        os_str
                    ))
                })
            }
        }
    }

    /// Validate that the server address has a valid format.
    fn validate_server_address(address: &str) -> Result<()> {
        if !address.contains(':') {
            return Err(ClanwardenError::Config(format!(
                "Invalid MC_SERVER_ADDRESS format: '{}'. Expected 'host:port' format.",
                address
            )));
        }

        if let Some((_, port_str)) = address.rsplit_once(':') {
            port_str.parse::<u16>().map_err(|_| {
                ClanwardenError::Config(format!(
                    "Invalid port in MC_SERVER_ADDRESS: '{}'",
                    port_str
                ))
            })?;
        }

        Ok(())
    }
}

/// Tunable game values, persisted inside the store document.
///
/// Every field has a serde default so documents written by older revisions
/// keep loading when a key is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Channel receiving the online/offline announcement (0 = disabled)
    pub announcement_channel_id: u64,
    /// Channel receiving per-player connect/disconnect notices (0 = disabled)
    pub logs_channel_id: u64,
    /// Name of the role granted to players past the playtime threshold
    pub active_role_name: String,
    /// Cumulative hours required for the active role and the survivor achievement
    pub hours_for_active_role: u32,
    /// Points credited to the killer's clan on an inter-clan kill
    pub points_interclan_kill: u32,
    /// Points deducted (floored at zero) from the victim's clan on an inter-clan kill
    pub points_interclan_death: u32,
    /// Clan points credited per full hour of a member's session
    pub points_per_hour: u32,
    /// Maximum clan name length
    pub max_clan_name_length: usize,
    /// Maximum points a single bounty may escrow
    pub max_bounty_points: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            announcement_channel_id: 0,
            logs_channel_id: 0,
            active_role_name: "Active Player".to_string(),
            hours_for_active_role: 10,
            points_interclan_kill: 10,
            points_interclan_death: 5,
            points_per_hour: 1,
            max_clan_name_length: 20,
            max_bounty_points: 1000,
        }
    }
}

impl RuntimeConfig {
    /// Set a config key from its string representation, as `/setconfig` receives it.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value.parse().map_err(|_| {
                ClanwardenError::Validation(format!("'{}' is not a valid value for {}", value, key))
            })
        }

        match key {
            "announcement_channel_id" => self.announcement_channel_id = parse(key, value)?,
            "logs_channel_id" => self.logs_channel_id = parse(key, value)?,
            "active_role_name" => self.active_role_name = value.to_string(),
            "hours_for_active_role" => self.hours_for_active_role = parse(key, value)?,
            "points_interclan_kill" => self.points_interclan_kill = parse(key, value)?,
            "points_interclan_death" => self.points_interclan_death = parse(key, value)?,
            "points_per_hour" => self.points_per_hour = parse(key, value)?,
            "max_clan_name_length" => self.max_clan_name_length = parse(key, value)?,
            "max_bounty_points" => self.max_bounty_points = parse(key, value)?,
            _ => {
                return Err(ClanwardenError::NotFound(format!(
                    "Unknown config key '{}'",
                    key
                )))
            }
        }
        Ok(())
    }

    /// Key/value listing for the `/config` command.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "announcement_channel_id",
                self.announcement_channel_id.to_string(),
            ),
            ("logs_channel_id", self.logs_channel_id.to_string()),
            ("active_role_name", self.active_role_name.clone()),
            (
                "hours_for_active_role",
                self.hours_for_active_role.to_string(),
            ),
            (
                "points_interclan_kill",
                self.points_interclan_kill.to_string(),
            ),
            (
                "points_interclan_death",
                self.points_interclan_death.to_string(),
            ),
            ("points_per_hour", self.points_per_hour.to_string()),
            ("max_clan_name_length", self.max_clan_name_length.to_string()),
            ("max_bounty_points", self.max_bounty_points.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_server_address() {
        assert!(Config::validate_server_address("localhost:25565").is_ok());
        assert!(Config::validate_server_address("127.0.0.1:25565").is_ok());
        assert!(Config::validate_server_address("example.com:25565").is_ok());

        assert!(Config::validate_server_address("localhost").is_err());
        assert!(Config::validate_server_address("localhost:abc").is_err());
        assert!(Config::validate_server_address("localhost:99999").is_err());
    }

    #[test]
    fn test_runtime_config_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.hours_for_active_role, 10);
        assert_eq!(config.points_interclan_kill, 10);
        assert_eq!(config.points_interclan_death, 5);
        assert_eq!(config.max_clan_name_length, 20);
        assert_eq!(config.max_bounty_points, 1000);
    }

    #[test]
    fn test_runtime_config_partial_document() {
        // Older documents that miss keys must still load, keeping defaults.
        let config: RuntimeConfig =
            serde_json::from_str(r#"{"points_interclan_kill": 25}"#).unwrap();
        assert_eq!(config.points_interclan_kill, 25);
        assert_eq!(config.points_per_hour, 1);
    }

    #[test]
    fn test_set_key() {
        let mut config = RuntimeConfig::default();
        config.set_key("max_bounty_points", "500").unwrap();
        assert_eq!(config.max_bounty_points, 500);

        config.set_key("active_role_name", "Veteran").unwrap();
        assert_eq!(config.active_role_name, "Veteran");

        assert!(config.set_key("max_bounty_points", "lots").is_err());
        assert!(config.set_key("no_such_key", "1").is_err());
    }
}
