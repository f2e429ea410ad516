use crate::error::NegotiationError;
use crate::negotiation::ice_buffer::{Admission, IceCandidateBuffer};
use crate::negotiation::state::NegotiationState;
use crate::transport::LinkState;
use duet_core::{IceCandidate, Role, RoomId, SdpKind, SessionDescription, SignalMessage};
use tracing::{debug, error, info, warn};

/// Everything that can move a session forward. Transport results come back
/// in as inputs, so the machine itself never awaits.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationInput {
    NegotiationNeeded,
    LocalDescriptionCreated(SessionDescription),
    LocalDescriptionSet(SessionDescription),
    RemoteDescriptionSet(SdpKind),
    LocalCandidate(IceCandidate),
    /// A relayed message, or `lobby` when the peer is gone.
    Remote(SignalMessage),
    LinkChanged(LinkState),
    Failed(NegotiationError),
    Leave,
}

/// Work the driver performs against the transport and the signaling channel,
/// in the order given.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CreateLocalDescription(SdpKind),
    SetLocalDescription(SessionDescription),
    SetRemoteDescription(SessionDescription),
    AddCandidate(IceCandidate),
    Send(SignalMessage),
    Report(SessionReport),
    /// Close the transport and forget the session.
    Release,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionReport {
    LinkUp,
    PeerLeft,
    Failed(NegotiationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalProgress {
    Absent,
    Creating(SdpKind),
    Setting(SdpKind),
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteProgress {
    Absent,
    Applying(SdpKind),
    Applied,
}

/// Description and candidate exchange for one participant in one room.
#[derive(Debug)]
pub struct NegotiationMachine {
    room_id: RoomId,
    role: Role,
    state: NegotiationState,
    local: LocalProgress,
    remote: RemoteProgress,
    candidates: IceCandidateBuffer,
}

impl NegotiationMachine {
    pub fn new(room_id: RoomId, role: Role) -> Self {
        Self {
            room_id,
            role,
            state: NegotiationState::Idle,
            local: LocalProgress::Absent,
            remote: RemoteProgress::Absent,
            candidates: IceCandidateBuffer::new(),
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn has_remote_description(&self) -> bool {
        self.remote == RemoteProgress::Applied
    }

    pub fn buffered_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn step(&mut self, input: NegotiationInput) -> Vec<Effect> {
        if self.state.is_closed() {
            debug!("Room {}: session closed, ignoring {:?}", self.room_id, input);
            return Vec::new();
        }

        match input {
            NegotiationInput::NegotiationNeeded => self.on_negotiation_needed(),
            NegotiationInput::LocalDescriptionCreated(desc) => self.on_local_created(desc),
            NegotiationInput::LocalDescriptionSet(desc) => self.on_local_set(desc),
            NegotiationInput::RemoteDescriptionSet(kind) => self.on_remote_set(kind),
            NegotiationInput::LocalCandidate(candidate) => {
                vec![Effect::Send(SignalMessage::AddIceCandidate {
                    room_id: self.room_id,
                    candidate,
                    role: self.role,
                })]
            }
            NegotiationInput::Remote(msg) => self.on_remote(msg),
            NegotiationInput::LinkChanged(link) => self.on_link(link),
            NegotiationInput::Failed(err) => self.fail(err),
            NegotiationInput::Leave => {
                info!("Room {}: leaving", self.room_id);
                self.close();
                vec![Effect::Send(SignalMessage::Leave), Effect::Release]
            }
        }
    }

    fn on_negotiation_needed(&mut self) -> Vec<Effect> {
        if self.role != Role::Offerer || self.state != NegotiationState::Idle {
            debug!(
                "Room {}: negotiation-needed ignored as {} in {}",
                self.room_id, self.role, self.state
            );
            return Vec::new();
        }

        self.state = NegotiationState::LocalOfferPending;
        self.local = LocalProgress::Creating(SdpKind::Offer);
        vec![Effect::CreateLocalDescription(SdpKind::Offer)]
    }

    fn on_local_created(&mut self, desc: SessionDescription) -> Vec<Effect> {
        if self.local != LocalProgress::Creating(desc.kind) {
            warn!("Room {}: unexpected local {}", self.room_id, desc.kind);
            return Vec::new();
        }

        self.local = LocalProgress::Setting(desc.kind);
        vec![Effect::SetLocalDescription(desc)]
    }

    fn on_local_set(&mut self, desc: SessionDescription) -> Vec<Effect> {
        if self.local != LocalProgress::Setting(desc.kind) {
            warn!("Room {}: unexpected local {} set", self.room_id, desc.kind);
            return Vec::new();
        }

        self.local = LocalProgress::Published;
        let room_id = self.room_id;
        let msg = match desc.kind {
            SdpKind::Offer => {
                self.state = NegotiationState::LocalOfferSet;
                SignalMessage::Offer {
                    room_id,
                    sdp: desc.sdp,
                }
            }
            SdpKind::Answer => SignalMessage::Answer {
                room_id,
                sdp: desc.sdp,
            },
        };
        vec![Effect::Send(msg)]
    }

    fn on_remote(&mut self, msg: SignalMessage) -> Vec<Effect> {
        if msg == SignalMessage::Lobby {
            info!("Room {}: peer left", self.room_id);
            self.close();
            return vec![Effect::Release, Effect::Report(SessionReport::PeerLeft)];
        }

        if msg.room_id() != Some(self.room_id) {
            warn!(
                "Room {}: dropped stale '{}' tagged {:?}",
                self.room_id,
                msg.op(),
                msg.room_id()
            );
            return Vec::new();
        }

        match msg {
            SignalMessage::Offer { sdp, .. } => {
                self.accept_remote(Role::Answerer, SessionDescription::offer(sdp))
            }
            SignalMessage::Answer { sdp, .. } => {
                if self.state != NegotiationState::LocalOfferSet {
                    warn!("Room {}: answer arrived in {}", self.room_id, self.state);
                    return Vec::new();
                }
                self.accept_remote(Role::Offerer, SessionDescription::answer(sdp))
            }
            SignalMessage::AddIceCandidate { candidate, .. } => {
                match self.candidates.enqueue(candidate) {
                    Admission::ApplyNow(candidate) => vec![Effect::AddCandidate(candidate)],
                    Admission::Buffered { .. } => Vec::new(),
                }
            }
            other => {
                warn!("Room {}: '{}' is not negotiation traffic", self.room_id, other.op());
                Vec::new()
            }
        }
    }

    /// A remote description is applied at most once per session.
    fn accept_remote(&mut self, expected_role: Role, desc: SessionDescription) -> Vec<Effect> {
        if self.role != expected_role {
            warn!("Room {}: {} ignored remote {}", self.room_id, self.role, desc.kind);
            return Vec::new();
        }
        if self.remote != RemoteProgress::Absent {
            warn!(
                "Room {}: remote description already present, dropping {}",
                self.room_id, desc.kind
            );
            return Vec::new();
        }

        self.remote = RemoteProgress::Applying(desc.kind);
        vec![Effect::SetRemoteDescription(desc)]
    }

    fn on_remote_set(&mut self, kind: SdpKind) -> Vec<Effect> {
        if self.remote != RemoteProgress::Applying(kind) {
            warn!("Room {}: unexpected remote {} applied", self.room_id, kind);
            return Vec::new();
        }

        self.remote = RemoteProgress::Applied;
        self.state = NegotiationState::RemoteDescriptionApplied;

        let mut effects: Vec<Effect> = self
            .candidates
            .drain_if_ready(true)
            .into_iter()
            .map(Effect::AddCandidate)
            .collect();
        if !effects.is_empty() {
            debug!("Room {}: applying {} buffered candidates", self.room_id, effects.len());
        }

        if kind == SdpKind::Offer {
            self.local = LocalProgress::Creating(SdpKind::Answer);
            effects.push(Effect::CreateLocalDescription(SdpKind::Answer));
        }
        effects
    }

    fn on_link(&mut self, link: LinkState) -> Vec<Effect> {
        match link {
            LinkState::Connected if self.state == NegotiationState::RemoteDescriptionApplied => {
                info!("Room {}: connected as {}", self.room_id, self.role);
                self.state = NegotiationState::Connected;
                vec![Effect::Report(SessionReport::LinkUp)]
            }
            LinkState::Failed => self.fail(NegotiationError::ConnectionFailed),
            other => {
                debug!("Room {}: link {:?} in {}", self.room_id, other, self.state);
                Vec::new()
            }
        }
    }

    fn fail(&mut self, err: NegotiationError) -> Vec<Effect> {
        error!("Room {}: negotiation failed: {}", self.room_id, err);
        self.close();
        vec![
            Effect::Send(SignalMessage::Leave),
            Effect::Release,
            Effect::Report(SessionReport::Failed(err)),
        ]
    }

    fn close(&mut self) {
        self.state = NegotiationState::Closed;
        self.candidates.discard();
    }
}
