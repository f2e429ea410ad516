use crate::media::{InboundTrack, MediaKind};
use crate::transport::transport_capability::{
    LinkState, TransportCapability, TransportEvent, TransportFactory,
};
use crate::transport::transport_config::TransportConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use duet_core::{IceCandidate, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::track::track_remote::TrackRemote;

impl InboundTrack for Arc<TrackRemote> {
    fn declared_kind(&self) -> Option<MediaKind> {
        match self.kind() {
            RTPCodecType::Audio => Some(MediaKind::Audio),
            RTPCodecType::Video => Some(MediaKind::Video),
            _ => None,
        }
    }

    fn track_id(&self) -> String {
        self.id()
    }
}

/// webrtc-rs peer connection carrying one audio and one video channel in
/// both directions.
pub struct WebRtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcTransport {
    /// Builds the connection and wires its callbacks into `event_tx`.
    pub async fn new(
        config: TransportConfig,
        event_tx: mpsc::Sender<TransportEvent<Arc<TrackRemote>>>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .into_iter()
                .map(|server| RTCIceServer {
                    urls: server.urls,
                    username: server.username.unwrap_or_default(),
                    credential: server.credential.unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", s);
                    let link = match s {
                        RTCPeerConnectionState::New | RTCPeerConnectionState::Connecting => {
                            LinkState::Connecting
                        }
                        RTCPeerConnectionState::Connected => LinkState::Connected,
                        RTCPeerConnectionState::Disconnected => LinkState::Disconnected,
                        RTCPeerConnectionState::Failed => LinkState::Failed,
                        RTCPeerConnectionState::Closed => LinkState::Closed,
                        _ => return,
                    };
                    let _ = tx.send(TransportEvent::LinkChanged(link)).await;
                })
            },
        ));

        let nn_tx = event_tx.clone();
        peer_connection.on_negotiation_needed(Box::new(move || {
            let tx = nn_tx.clone();

            Box::pin(async move {
                debug!("Negotiation needed");
                let _ = tx.send(TransportEvent::NegotiationNeeded).await;
            })
        }));

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                };
                let _ = tx.send(TransportEvent::LocalCandidate(candidate)).await;
            })
        }));

        let track_tx = event_tx;
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _, _| {
            let tx = track_tx.clone();

            Box::pin(async move {
                debug!("Inbound {} track {}", track.kind(), track.id());
                let _ = tx.send(TransportEvent::Track(track)).await;
            })
        }));

        for kind in [RTPCodecType::Audio, RTPCodecType::Video] {
            peer_connection
                .add_transceiver_from_kind(
                    kind,
                    Some(RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Sendrecv,
                        send_encodings: vec![],
                    }),
                )
                .await
                .with_context(|| format!("Failed to add {} transceiver", kind))?;
        }

        Ok(Self { peer_connection })
    }

    fn to_rtc(desc: &SessionDescription) -> Result<RTCSessionDescription> {
        let rtc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp.clone()),
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp.clone()),
        };
        rtc.with_context(|| format!("Malformed {} SDP", desc.kind))
    }
}

#[async_trait]
impl TransportCapability for WebRtcTransport {
    type Track = Arc<TrackRemote>;

    async fn create_local_description(&self, kind: SdpKind) -> Result<SessionDescription> {
        let desc = match kind {
            SdpKind::Offer => self.peer_connection.create_offer(None).await?,
            SdpKind::Answer => self.peer_connection.create_answer(None).await?,
        };
        Ok(SessionDescription {
            kind,
            sdp: desc.sdp,
        })
    }

    async fn set_local_description(&self, desc: &SessionDescription) -> Result<()> {
        self.peer_connection
            .set_local_description(Self::to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: &SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(Self::to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate.clone(),
            sdp_mid: candidate.sdp_mid.clone(),
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment.clone(),
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn receiving_tracks(&self) -> Vec<Arc<TrackRemote>> {
        let mut tracks = Vec::new();
        for transceiver in self.peer_connection.get_transceivers().await {
            let receiver = transceiver.receiver().await;
            tracks.extend(receiver.tracks().await);
        }
        tracks
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Opens a [`WebRtcTransport`] per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebRtcTransportFactory;

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    type Transport = WebRtcTransport;

    async fn open(
        &self,
        config: TransportConfig,
        events: mpsc::Sender<TransportEvent<Arc<TrackRemote>>>,
    ) -> Result<WebRtcTransport> {
        WebRtcTransport::new(config, events).await
    }
}
