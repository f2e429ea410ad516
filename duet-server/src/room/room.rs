use crate::error::CoordinatorError;
use crate::room::participant::Participant;
use crate::room::room_command::RoomCommand;
use crate::signaling::SignalingOutput;
use chrono::{DateTime, Utc};
use duet_core::{ParticipantId, Role, RoomId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    /// Both members are known but roles have not been announced yet.
    Lobby,
    Paired,
    Closed,
}

/// Event loop of a single pairing. Every mutation of the room happens here,
/// one command at a time, so relays and leaves never interleave.
pub struct Room {
    id: RoomId,
    /// Offerer first, answerer second.
    members: [Participant; 2],
    state: RoomState,
    created_at: DateTime<Utc>,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Room {
    pub fn new(
        id: RoomId,
        offerer: Participant,
        answerer: Participant,
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            id,
            members: [
                Participant {
                    role: Role::Offerer,
                    ..offerer
                },
                Participant {
                    role: Role::Answerer,
                    ..answerer
                },
            ],
            state: RoomState::Lobby,
            created_at: Utc::now(),
            command_rx,
            signaling,
        }
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub async fn run(mut self) {
        info!(
            "Room {} opened at {}: {} ({}) offers to {} ({})",
            self.id,
            self.created_at,
            self.members[0].display_name,
            self.members[0].id,
            self.members[1].display_name,
            self.members[1].id
        );

        self.announce().await;

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
            if self.state == RoomState::Closed {
                break;
            }
        }

        info!("Room {} event loop finished", self.id);
    }

    /// Tells each member its role; the offerer starts negotiating on
    /// `send-offer`.
    async fn announce(&mut self) {
        let room_id = self.id;
        self.signaling
            .deliver(self.members[0].id, SignalMessage::SendOffer { room_id })
            .await;
        self.signaling
            .deliver(self.members[1].id, SignalMessage::AwaitOffer { room_id })
            .await;
        self.state = RoomState::Paired;
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Relay { from, message } => {
                if let Err(e) = self.relay(from, message).await {
                    warn!("Room {} dropped relay from {}: {}", self.id, from, e);
                }
            }

            RoomCommand::Leave {
                participant_id,
                reply,
            } => {
                let survivor = self.close(&participant_id).await;
                let _ = reply.send(survivor);
            }
        }
    }

    async fn relay(
        &mut self,
        from: ParticipantId,
        message: SignalMessage,
    ) -> Result<(), CoordinatorError> {
        if self.state != RoomState::Paired {
            return Err(CoordinatorError::RoomClosed { room_id: self.id });
        }
        if !message.is_relayable() {
            return Err(CoordinatorError::NotRelayable { op: message.op() });
        }
        if message.room_id() != Some(self.id) {
            return Err(CoordinatorError::StaleRoomMessage { room_id: self.id });
        }

        let target = self
            .other_member(&from)
            .ok_or(CoordinatorError::NotAMember {
                participant_id: from,
                room_id: self.id,
            })?
            .id;

        debug!("Room {}: {} {} -> {}", self.id, message.op(), from, target);
        self.signaling.deliver(target, message).await;
        Ok(())
    }

    /// Closes the room on behalf of `leaver` and sends the single `lobby` to
    /// the other member. Leaves from non-members are ignored.
    async fn close(&mut self, leaver: &ParticipantId) -> Option<Participant> {
        let survivor = self.other_member(leaver)?.clone();

        self.state = RoomState::Closed;
        info!(
            "Room {} closed: {} left, {} returns to lobby",
            self.id, leaver, survivor.id
        );

        self.signaling
            .deliver(survivor.id, SignalMessage::Lobby)
            .await;
        Some(survivor.into_waiting())
    }

    fn other_member(&self, participant_id: &ParticipantId) -> Option<&Participant> {
        match &self.members {
            [a, b] if &a.id == participant_id => Some(b),
            [a, b] if &b.id == participant_id => Some(a),
            _ => None,
        }
    }
}
