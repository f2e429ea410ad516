use crate::media::TrackBinder;
use crate::negotiation::{NegotiationMachine, NegotiationState};
use crate::transport::{TransportCapability, TransportEvent};
use duet_core::{Role, RoomId};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Everything one pairing owns on the participant side. Dropped as a whole
/// when the room ends.
pub(crate) struct NegotiationSession<T: TransportCapability> {
    pub machine: NegotiationMachine,
    pub transport: T,
    pub binder: TrackBinder<T::Track>,
    pub events: mpsc::Receiver<TransportEvent<T::Track>>,
    /// Set once the link is up and media has not been reported yet.
    pub settle_at: Option<Instant>,
    pub media_reported: bool,
}

impl<T: TransportCapability> NegotiationSession<T> {
    pub fn new(
        room_id: RoomId,
        role: Role,
        transport: T,
        events: mpsc::Receiver<TransportEvent<T::Track>>,
        settle_window: Duration,
    ) -> Self {
        Self {
            machine: NegotiationMachine::new(room_id, role),
            transport,
            binder: TrackBinder::new(settle_window),
            events,
            settle_at: None,
            media_reported: false,
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.machine.room_id()
    }

    pub fn start_settle_window(&mut self) {
        if !self.media_reported {
            self.settle_at = Some(Instant::now() + self.binder.window());
        }
    }

    /// Media is ready to report early: the link is up and both kinds are bound.
    pub fn media_ready(&self) -> bool {
        !self.media_reported
            && self.machine.state() == NegotiationState::Connected
            && self.binder.is_complete()
    }
}
