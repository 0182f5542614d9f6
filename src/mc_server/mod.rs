//! Minecraft server status querying.
//!
//! Implements the Server List Ping handshake over a plain `TcpStream` and
//! condenses the JSON status payload into the [`ServerSnapshot`] the poller
//! consumes. All calls block on network I/O; callers on the async path run
//! them through `spawn_blocking`.

mod protocol;

use crate::error::{ClanwardenError, Result};
use serde::Deserialize;
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::warn;

const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// The parts of the status payload this bot cares about.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub players: PlayersInfo,
}

#[derive(Debug, Deserialize)]
pub struct PlayersInfo {
    pub max: u32,
    pub online: u32,
    #[serde(default)]
    pub sample: Vec<PlayerSample>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSample {
    pub name: String,
}

/// One poll tick's view of the server. `Default` is the offline snapshot.
#[derive(Debug, Clone, Default)]
pub struct ServerSnapshot {
    pub online: bool,
    pub player_count: u32,
    pub max_players: u32,
    pub player_list: Vec<String>,
}

/// Query the server and degrade every failure to an offline snapshot.
///
/// A status query that fails or times out is treated identically to "server
/// offline" for that tick; the error is logged, never surfaced. A response
/// advertising `0` max players is also offline: idling hosting providers
/// answer the ping with an empty placeholder status.
pub fn check_server(address: &str) -> ServerSnapshot {
    match ping(address) {
        Ok(status) => snapshot_from(status),
        Err(e) => {
            warn!("server status query failed: {}", e);
            ServerSnapshot::default()
        }
    }
}

fn snapshot_from(status: StatusResponse) -> ServerSnapshot {
    if status.players.max == 0 {
        return ServerSnapshot::default();
    }
    ServerSnapshot {
        online: true,
        player_count: status.players.online,
        max_players: status.players.max,
        player_list: status
            .players
            .sample
            .into_iter()
            .map(|p| p.name)
            .collect(),
    }
}

/// Perform one Server List Ping exchange: handshake, status request, status
/// response.
pub fn ping(address: &str) -> Result<StatusResponse> {
    let addr = address
        .to_socket_addrs()
        .map_err(|e| ClanwardenError::ServerUnavailable(format!("failed to resolve address: {}", e)))?
        .next()
        .ok_or_else(|| {
            ClanwardenError::ServerUnavailable("address resolved to nothing".to_string())
        })?;

    let mut stream = TcpStream::connect_timeout(&addr, QUERY_TIMEOUT)
        .map_err(|e| ClanwardenError::ServerUnavailable(format!("connection failed: {}", e)))?;
    stream.set_read_timeout(Some(QUERY_TIMEOUT))?;
    stream.set_write_timeout(Some(QUERY_TIMEOUT))?;

    // Handshake: packet id 0, protocol -1 (auto-detect), host, port, next
    // state 1 (status).
    let mut handshake = Vec::new();
    protocol::put_varint(&mut handshake, 0);
    protocol::put_varint(&mut handshake, -1);
    protocol::put_string(&mut handshake, &addr.ip().to_string());
    handshake.write_all(&addr.port().to_be_bytes())?;
    protocol::put_varint(&mut handshake, 1);
    protocol::write_frame(&mut stream, &handshake)?;

    // Status request is an empty packet with id 0.
    protocol::write_frame(&mut stream, &[0x00])?;

    let frame = protocol::read_frame(&mut stream)?;
    let mut payload = frame.as_slice();
    let _packet_id = protocol::get_varint(&mut payload)?;
    let json = protocol::get_string(&mut payload)?;

    serde_json::from_str(&json).map_err(|e| {
        ClanwardenError::ServerUnavailable(format!("malformed status payload: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_payload_parsing() {
        let json = r#"{
            "version": {"name": "1.21", "protocol": 767},
            "players": {"max": 20, "online": 2, "sample": [
                {"name": "Steve", "id": "00000000-0000-0000-0000-000000000001"},
                {"name": "Alex", "id": "00000000-0000-0000-0000-000000000002"}
            ]},
            "description": {"text": "A Minecraft Server"}
        }"#;
        let status: StatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(status.players.online, 2);
        assert_eq!(status.players.max, 20);
        let names: Vec<&str> = status.players.sample.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Steve", "Alex"]);
    }

    #[test]
    fn test_missing_sample_defaults_empty() {
        let json = r#"{"players": {"max": 20, "online": 0}}"#;
        let status: StatusResponse = serde_json::from_str(json).unwrap();
        assert!(status.players.sample.is_empty());
    }

    #[test]
    fn test_idle_placeholder_status_is_offline() {
        // Hosting providers in standby answer with a 0/0 player block.
        let status: StatusResponse =
            serde_json::from_str(r#"{"players": {"max": 0, "online": 0}}"#).unwrap();
        let snapshot = snapshot_from(status);
        assert!(!snapshot.online);
        assert!(snapshot.player_list.is_empty());

        let status: StatusResponse =
            serde_json::from_str(r#"{"players": {"max": 20, "online": 1, "sample": [{"name": "Steve"}]}}"#)
                .unwrap();
        let snapshot = snapshot_from(status);
        assert!(snapshot.online);
        assert_eq!(snapshot.player_list, vec!["Steve"]);
    }

    #[test]
    fn test_ping_unreachable_address() {
        assert!(ping("invalid-address-without-port").is_err());
        // A port nothing listens on: connection refused or timeout.
        assert!(ping("127.0.0.1:1").is_err());
    }
}
