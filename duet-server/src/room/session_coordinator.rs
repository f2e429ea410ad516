use crate::error::CoordinatorError;
use crate::room::{Participant, Room, RoomCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use duet_core::{ParticipantId, Role, RoomId, SignalMessage};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Where a paired participant sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomAssignment {
    pub room_id: RoomId,
    pub role: Role,
    pub peer: ParticipantId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Paired(RoomAssignment),
    /// Nobody to pair with yet; the participant stays in the lobby.
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LobbyNotice {
    Send,
    AlreadySent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    pub rooms: usize,
    pub waiting: usize,
}

/// Pairs participants into rooms and routes negotiation traffic between
/// them. The only component that creates, closes or re-pairs anything.
///
/// `join` and `leave` serialize on the waiting slot; relays go straight to the
/// target room's event loop, so different rooms never block each other.
#[derive(Clone)]
pub struct SessionCoordinator {
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    memberships: Arc<DashMap<ParticipantId, RoomAssignment>>,
    waiting: Arc<Mutex<Option<Participant>>>,
    signaling: Arc<dyn SignalingOutput>,
    room_command_buffer: usize,
}

impl SessionCoordinator {
    pub fn new(signaling: Arc<dyn SignalingOutput>) -> Self {
        Self::with_buffer(signaling, 100)
    }

    pub fn with_buffer(signaling: Arc<dyn SignalingOutput>, room_command_buffer: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            memberships: Arc::new(DashMap::new()),
            waiting: Arc::new(Mutex::new(None)),
            signaling,
            room_command_buffer,
        }
    }

    /// Pairs the arrival with whoever is waiting, or parks it in the lobby and
    /// sends it `lobby`. A repeated join is answered with the participant's current standing.
    pub async fn join(
        &self,
        participant_id: ParticipantId,
        display_name: impl Into<String>,
    ) -> JoinOutcome {
        let mut waiting = self.waiting.lock().await;

        if let Some(assignment) = self.memberships.get(&participant_id) {
            warn!("{} joined again while in room {}", participant_id, assignment.room_id);
            return JoinOutcome::Paired(*assignment);
        }
        if waiting.as_ref().is_some_and(|w| w.id == participant_id) {
            return JoinOutcome::Waiting;
        }

        let arrival = Participant::new(participant_id, display_name);
        self.pair_or_wait(&mut waiting, arrival, LobbyNotice::Send)
            .await
    }

    /// Forwards negotiation traffic to the other member of `room_id`.
    /// Anything that cannot be delivered is logged and dropped; the sender is
    /// never told.
    pub async fn relay(&self, room_id: RoomId, from: ParticipantId, message: SignalMessage) {
        if let Err(e) = self.try_relay(room_id, from, message).await {
            warn!("Dropped relay from {}: {}", from, e);
        }
    }

    async fn try_relay(
        &self,
        room_id: RoomId,
        from: ParticipantId,
        message: SignalMessage,
    ) -> Result<(), CoordinatorError> {
        if !message.is_relayable() {
            return Err(CoordinatorError::NotRelayable { op: message.op() });
        }
        if message.room_id() != Some(room_id) {
            return Err(CoordinatorError::StaleRoomMessage { room_id });
        }

        let member_of = self.memberships.get(&from).map(|a| a.room_id);
        if member_of != Some(room_id) {
            // Rooms that already closed land here as well.
            return Err(if self.rooms.contains_key(&room_id) {
                CoordinatorError::NotAMember {
                    participant_id: from,
                    room_id,
                }
            } else {
                CoordinatorError::RoomClosed { room_id }
            });
        }

        // Clone the sender so no map guard is held across the await.
        let room_tx = self
            .rooms
            .get(&room_id)
            .map(|entry| entry.clone())
            .ok_or(CoordinatorError::RoomClosed { room_id })?;

        room_tx
            .send(RoomCommand::Relay { from, message })
            .await
            .map_err(|_| CoordinatorError::RoomClosed { room_id })
    }

    /// Removes a participant. A waiting participant simply leaves the lobby;
    /// a paired one closes its room and the survivor is re-pooled.
    pub async fn leave(&self, participant_id: &ParticipantId) {
        let mut waiting = self.waiting.lock().await;

        if waiting.as_ref().is_some_and(|w| &w.id == participant_id) {
            *waiting = None;
            info!("{} left the lobby", participant_id);
            return;
        }

        let Some((_, assignment)) = self.memberships.remove(participant_id) else {
            debug!("{} left without joining", participant_id);
            return;
        };
        self.memberships.remove(&assignment.peer);

        let Some((_, room_tx)) = self.rooms.remove(&assignment.room_id) else {
            return;
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let cmd = RoomCommand::Leave {
            participant_id: *participant_id,
            reply: reply_tx,
        };
        if let Err(e) = room_tx.send(cmd).await {
            error!("Room {} died before closing: {}", assignment.room_id, e);
            return;
        }

        match reply_rx.await {
            Ok(Some(survivor)) => {
                let survivor_id = survivor.id;
                // Room::close already told the survivor it is back in the lobby.
                match self
                    .pair_or_wait(&mut waiting, survivor, LobbyNotice::AlreadySent)
                    .await
                {
                    JoinOutcome::Paired(a) => {
                        info!("{} re-paired into room {}", survivor_id, a.room_id)
                    }
                    JoinOutcome::Waiting => info!("{} is waiting again", survivor_id),
                }
            }
            Ok(None) => warn!(
                "Room {} did not recognise {} as a member",
                assignment.room_id, participant_id
            ),
            Err(_) => error!("Room {} dropped the leave reply", assignment.room_id),
        }
    }

    pub fn assignment(&self, participant_id: &ParticipantId) -> Option<RoomAssignment> {
        self.memberships.get(participant_id).map(|a| *a)
    }

    pub async fn is_waiting(&self, participant_id: &ParticipantId) -> bool {
        self.waiting
            .lock()
            .await
            .as_ref()
            .is_some_and(|w| &w.id == participant_id)
    }

    pub async fn stats(&self) -> CoordinatorStats {
        let waiting = usize::from(self.waiting.lock().await.is_some());
        CoordinatorStats {
            rooms: self.rooms.len(),
            waiting,
        }
    }

    /// Must be called with the waiting slot locked. A parked participant hears
    /// `lobby` before the lock is released, so it can never arrive after the
    /// `send-offer` of the room the next joiner opens.
    async fn pair_or_wait(
        &self,
        waiting: &mut Option<Participant>,
        arrival: Participant,
        notice: LobbyNotice,
    ) -> JoinOutcome {
        match waiting.take() {
            None => {
                info!("{} ({}) is waiting for a peer", arrival.display_name, arrival.id);
                let arrival_id = arrival.id;
                *waiting = Some(arrival);
                if notice == LobbyNotice::Send {
                    self.signaling
                        .deliver(arrival_id, SignalMessage::Lobby)
                        .await;
                }
                JoinOutcome::Waiting
            }
            Some(offerer) => JoinOutcome::Paired(self.open_room(offerer, arrival)),
        }
    }

    /// Returns the answerer's assignment.
    fn open_room(&self, offerer: Participant, answerer: Participant) -> RoomAssignment {
        let room_id = RoomId::new();
        let offerer_id = offerer.id;
        let answerer_id = answerer.id;

        self.memberships.insert(
            offerer_id,
            RoomAssignment {
                room_id,
                role: Role::Offerer,
                peer: answerer_id,
            },
        );
        let assignment = RoomAssignment {
            room_id,
            role: Role::Answerer,
            peer: offerer_id,
        };
        self.memberships.insert(answerer_id, assignment);

        let (tx, rx) = mpsc::channel(self.room_command_buffer);
        let room = Room::new(room_id, offerer, answerer, rx, self.signaling.clone());
        self.rooms.insert(room_id, tx);
        tokio::spawn(room.run());

        assignment
    }
}
