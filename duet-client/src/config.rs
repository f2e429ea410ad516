use duet_core::IceServerConfig;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:3000/ws";
pub const DEFAULT_SETTLE_WINDOW: Duration = Duration::from_secs(5);

/// Participant-side settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub display_name: String,
    /// How long inbound media may take to show up after the link is up
    /// before the receiving channels are inspected directly.
    pub settle_window: Duration,
    /// Used until the server sends its own `ice-config`.
    pub ice_servers: Vec<IceServerConfig>,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            display_name: display_name.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            display_name: String::new(),
            settle_window: DEFAULT_SETTLE_WINDOW,
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}
