use crate::room::Participant;
use duet_core::{ParticipantId, SignalMessage};
use tokio::sync::oneshot;

/// Commands the coordinator feeds into a room's event loop.
#[derive(Debug)]
pub enum RoomCommand {
    /// Negotiation traffic to forward to the other member.
    Relay {
        from: ParticipantId,
        message: SignalMessage,
    },

    /// A member left or its channel closed. The room closes and replies with
    /// the surviving member.
    Leave {
        participant_id: ParticipantId,
        reply: oneshot::Sender<Option<Participant>>,
    },
}
