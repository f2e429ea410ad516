use crate::error::ConfigError;
use duet_core::IceServerConfig;
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_STUN: &str = "stun:stun.l.google.com:19302";

/// Coordinator server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// STUN urls handed to every participant in `ice-config`.
    pub stun_urls: Vec<String>,
    pub turn: Option<IceServerConfig>,
    /// Capacity of each room's command queue.
    pub room_command_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            stun_urls: vec![DEFAULT_STUN.to_owned()],
            turn: None,
            room_command_buffer: 100,
        }
    }
}

impl ServerConfig {
    /// Reads `DUET_BIND`, `DUET_STUN` (comma separated) and the `TURN_*`
    /// variables, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(bind) = env::var("DUET_BIND") {
            config.bind_addr = bind
                .parse()
                .map_err(|source| ConfigError::InvalidBindAddress {
                    value: bind.clone(),
                    source,
                })?;
        }

        if let Ok(stun) = env::var("DUET_STUN") {
            config.stun_urls = split_urls(&stun);
        }

        if let Ok(turn_url) = env::var("TURN_URL") {
            config.turn = Some(IceServerConfig {
                urls: split_urls(&turn_url),
                username: env::var("TURN_USERNAME").ok(),
                credential: env::var("TURN_CREDENTIAL").ok(),
            });
        }

        Ok(config)
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        let mut servers = Vec::new();
        if !self.stun_urls.is_empty() {
            servers.push(IceServerConfig {
                urls: self.stun_urls.clone(),
                username: None,
                credential: None,
            });
        }
        servers.extend(self.turn.clone());
        servers
    }
}

fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .collect()
}
