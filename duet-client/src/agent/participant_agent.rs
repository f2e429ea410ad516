use crate::agent::agent_event::{AgentCommand, AgentEvent};
use crate::agent::session::NegotiationSession;
use crate::config::ClientConfig;
use crate::error::NegotiationError;
use crate::negotiation::{Effect, NegotiationInput, SessionReport};
use crate::transport::{TransportCapability, TransportConfig, TransportEvent, TransportFactory};
use duet_core::{Role, RoomId, SignalMessage};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

type Session<F> = NegotiationSession<<F as TransportFactory>::Transport>;
type SessionEvent<F> =
    TransportEvent<<<F as TransportFactory>::Transport as TransportCapability>::Track>;

/// One participant's event loop. Signals, transport events, the settle timer
/// and commands are handled one at a time, in arrival order.
pub struct ParticipantAgent<F: TransportFactory> {
    config: ClientConfig,
    factory: F,
    transport_config: TransportConfig,
    session: Option<Session<F>>,
    outbound: mpsc::UnboundedSender<SignalMessage>,
    events: mpsc::UnboundedSender<AgentEvent>,
}

impl<F: TransportFactory> ParticipantAgent<F> {
    pub fn new(
        config: ClientConfig,
        factory: F,
        outbound: mpsc::UnboundedSender<SignalMessage>,
        events: mpsc::UnboundedSender<AgentEvent>,
    ) -> Self {
        let transport_config = TransportConfig {
            ice_servers: config.ice_servers.clone(),
        };

        Self {
            config,
            factory,
            transport_config,
            session: None,
            outbound,
            events,
        }
    }

    pub async fn run(
        mut self,
        mut inbound: mpsc::UnboundedReceiver<SignalMessage>,
        mut commands: mpsc::Receiver<AgentCommand>,
    ) {
        loop {
            let settle_at = self.session.as_ref().and_then(|s| s.settle_at);

            tokio::select! {
                msg = inbound.recv() => match msg {
                    Some(msg) => self.handle_signal(msg).await,
                    None => {
                        info!("Signaling channel closed");
                        break;
                    }
                },

                event = next_transport_event::<F>(&mut self.session) => {
                    self.handle_transport_event(event).await;
                }

                _ = settle_timer(settle_at) => self.settle().await,

                cmd = commands.recv() => match cmd {
                    Some(AgentCommand::Join) => self.join(),
                    Some(AgentCommand::Leave) => self.leave().await,
                    Some(AgentCommand::Shutdown) | None => break,
                },
            }
        }

        self.release().await;
        info!("Participant agent stopped");
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        debug!("<- {}", msg.op());

        match msg {
            SignalMessage::Welcome { participant_id } => {
                info!("Connected to signaling as {}", participant_id);
                self.emit(AgentEvent::Welcome { participant_id });
                self.join();
            }

            SignalMessage::IceConfig { ice_servers } => {
                if !ice_servers.is_empty() {
                    self.transport_config.ice_servers = ice_servers;
                }
            }

            SignalMessage::SendOffer { room_id } => self.start_session(room_id, Role::Offerer).await,
            SignalMessage::AwaitOffer { room_id } => {
                self.start_session(room_id, Role::Answerer).await
            }

            SignalMessage::Lobby if self.session.is_none() => self.emit(AgentEvent::Waiting),

            msg @ (SignalMessage::Lobby
            | SignalMessage::Offer { .. }
            | SignalMessage::Answer { .. }
            | SignalMessage::AddIceCandidate { .. }) => {
                if self.session.is_some() {
                    self.drive(NegotiationInput::Remote(msg)).await;
                } else {
                    warn!("Dropped '{}' outside of a room", msg.op());
                }
            }

            other => warn!("Unexpected '{}' from server", other.op()),
        }
    }

    async fn handle_transport_event(&mut self, event: SessionEvent<F>) {
        match event {
            TransportEvent::NegotiationNeeded => {
                self.drive(NegotiationInput::NegotiationNeeded).await
            }
            TransportEvent::LocalCandidate(candidate) => {
                self.drive(NegotiationInput::LocalCandidate(candidate)).await
            }
            TransportEvent::LinkChanged(link) => {
                self.drive(NegotiationInput::LinkChanged(link)).await
            }
            TransportEvent::Track(track) => {
                if let Some(session) = self.session.as_mut() {
                    session.binder.bind(track);
                }
                self.report_media_if_ready();
            }
        }
    }

    async fn start_session(&mut self, room_id: RoomId, role: Role) {
        if let Some(old) = &self.session {
            warn!("Room {} replaced by room {}", old.room_id(), room_id);
            self.release().await;
        }

        let (tx, rx) = mpsc::channel(64);
        let transport = match self.factory.open(self.transport_config.clone(), tx).await {
            Ok(transport) => transport,
            Err(e) => {
                error!("Room {}: failed to open transport: {:#}", room_id, e);
                self.send(SignalMessage::Leave);
                self.emit(AgentEvent::Failed {
                    room_id,
                    reason: NegotiationError::TransportUnavailable(e.to_string()),
                });
                return;
            }
        };

        info!("Paired into room {} as {}", room_id, role);
        self.session = Some(NegotiationSession::new(
            room_id,
            role,
            transport,
            rx,
            self.config.settle_window,
        ));
        self.emit(AgentEvent::Paired { room_id, role });
    }

    /// Feeds one input through the machine and runs the resulting effects.
    /// Transport results re-enter as inputs; a failed effect stops the rest of
    /// its batch.
    async fn drive(&mut self, input: NegotiationInput) {
        let mut queue = VecDeque::from([input]);

        while let Some(input) = queue.pop_front() {
            let Some(session) = self.session.as_mut() else {
                return;
            };
            let room_id = session.room_id();
            let effects = session.machine.step(input);

            for effect in effects {
                match self.execute(room_id, effect).await {
                    Ok(Some(next)) => queue.push_back(next),
                    Ok(None) => {}
                    Err(failure) => {
                        queue.push_back(NegotiationInput::Failed(failure));
                        break;
                    }
                }
            }
        }
    }

    async fn execute(
        &mut self,
        room_id: RoomId,
        effect: Effect,
    ) -> Result<Option<NegotiationInput>, NegotiationError> {
        match effect {
            Effect::Send(msg) => self.send(msg),
            Effect::Report(report) => self.report(room_id, report),
            Effect::Release => self.release().await,

            Effect::CreateLocalDescription(kind) => {
                let Some(session) = &self.session else {
                    return Ok(None);
                };
                let desc = session
                    .transport
                    .create_local_description(kind)
                    .await
                    .map_err(|e| NegotiationError::CreateDescription {
                        kind,
                        reason: format!("{:#}", e),
                    })?;
                return Ok(Some(NegotiationInput::LocalDescriptionCreated(desc)));
            }

            Effect::SetLocalDescription(desc) => {
                let Some(session) = &self.session else {
                    return Ok(None);
                };
                session
                    .transport
                    .set_local_description(&desc)
                    .await
                    .map_err(|e| NegotiationError::SetLocalDescription {
                        kind: desc.kind,
                        reason: format!("{:#}", e),
                    })?;
                return Ok(Some(NegotiationInput::LocalDescriptionSet(desc)));
            }

            Effect::SetRemoteDescription(desc) => {
                let Some(session) = &self.session else {
                    return Ok(None);
                };
                session
                    .transport
                    .set_remote_description(&desc)
                    .await
                    .map_err(|e| NegotiationError::SetRemoteDescription {
                        kind: desc.kind,
                        reason: format!("{:#}", e),
                    })?;
                return Ok(Some(NegotiationInput::RemoteDescriptionSet(desc.kind)));
            }

            Effect::AddCandidate(candidate) => {
                if let Some(session) = &self.session
                    && let Err(e) = session.transport.add_ice_candidate(&candidate).await
                {
                    warn!("Room {}: candidate rejected: {:#}", room_id, e);
                }
            }
        }
        Ok(None)
    }

    fn report(&mut self, room_id: RoomId, report: SessionReport) {
        match report {
            SessionReport::LinkUp => {
                if let Some(session) = self.session.as_mut() {
                    session.start_settle_window();
                }
                self.report_media_if_ready();
            }
            SessionReport::PeerLeft => self.emit(AgentEvent::PeerLeft { room_id }),
            SessionReport::Failed(reason) => self.emit(AgentEvent::Failed { room_id, reason }),
        }
    }

    fn report_media_if_ready(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.media_ready() {
            return;
        }

        session.media_reported = true;
        session.settle_at = None;
        let event = AgentEvent::Connected {
            room_id: session.room_id(),
            media: session.binder.presence(),
        };
        self.emit(event);
    }

    /// The settle window ran out before both kinds were bound.
    async fn settle(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.settle_at = None;
        if session.media_reported {
            return;
        }

        let receiving = session.transport.receiving_tracks().await;
        session.media_reported = true;
        let room_id = session.room_id();
        let event = match session.binder.settle(receiving) {
            Ok(media) => AgentEvent::Connected { room_id, media },
            Err(timeout) => {
                warn!("Room {}: {}", room_id, timeout);
                AgentEvent::MediaTimedOut { room_id, timeout }
            }
        };
        self.emit(event);
    }

    fn join(&mut self) {
        let name = self.config.display_name.trim().to_owned();
        if name.is_empty() {
            warn!("Not joining without a display name");
            return;
        }
        self.send(SignalMessage::Join { name });
    }

    async fn leave(&mut self) {
        if self.session.is_some() {
            self.drive(NegotiationInput::Leave).await;
        } else {
            self.send(SignalMessage::Leave);
        }
        self.emit(AgentEvent::Left);
    }

    async fn release(&mut self) {
        if let Some(session) = self.session.take()
            && let Err(e) = session.transport.close().await
        {
            warn!("Room {}: transport close failed: {:#}", session.room_id(), e);
        }
    }

    fn send(&self, msg: SignalMessage) {
        debug!("-> {}", msg.op());
        if self.outbound.send(msg).is_err() {
            warn!("Signaling channel closed, message dropped");
        }
    }

    fn emit(&self, event: AgentEvent) {
        let _ = self.events.send(event);
    }
}

async fn next_transport_event<F: TransportFactory>(
    session: &mut Option<Session<F>>,
) -> SessionEvent<F> {
    match session {
        Some(session) => match session.events.recv().await {
            Some(event) => event,
            None => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

async fn settle_timer(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
