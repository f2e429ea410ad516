use duet_core::SdpKind;
use std::time::Duration;
use thiserror::Error;

/// Ends a negotiation session. The participant sees "connection failed" and
/// has to join again; the peer only sees `lobby`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("could not create local {kind}: {reason}")]
    CreateDescription { kind: SdpKind, reason: String },

    #[error("could not set local {kind}: {reason}")]
    SetLocalDescription { kind: SdpKind, reason: String },

    #[error("could not apply remote {kind}: {reason}")]
    SetRemoteDescription { kind: SdpKind, reason: String },

    #[error("transport could not be opened: {0}")]
    TransportUnavailable(String),

    #[error("peer connection failed")]
    ConnectionFailed,
}

/// The settle window ran out before any inbound media was bound.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("no inbound media within {window:?}")]
pub struct TrackBindingTimeout {
    pub window: Duration,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("signaling connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("agent is no longer running")]
    AgentStopped,
}
