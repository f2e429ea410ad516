use crate::media::InboundTrack;
use crate::transport::transport_config::TransportConfig;
use anyhow::Result;
use async_trait::async_trait;
use duet_core::{IceCandidate, SdpKind, SessionDescription};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// What a transport reports on its own.
#[derive(Debug)]
pub enum TransportEvent<T> {
    NegotiationNeeded,
    LocalCandidate(IceCandidate),
    Track(T),
    LinkChanged(LinkState),
}

/// A peer connection as negotiation sees it.
#[async_trait]
pub trait TransportCapability: Send + Sync {
    type Track: InboundTrack + Clone + Send + Sync + 'static;

    async fn create_local_description(&self, kind: SdpKind) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: &SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: &SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<()>;

    /// Tracks of every receiving channel, in channel order.
    async fn receiving_tracks(&self) -> Vec<Self::Track>;

    async fn close(&self) -> Result<()>;
}

/// Opens a fresh transport for every session.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    type Transport: TransportCapability;

    async fn open(
        &self,
        config: TransportConfig,
        events: mpsc::Sender<TransportEvent<<Self::Transport as TransportCapability>::Track>>,
    ) -> Result<Self::Transport>;
}
