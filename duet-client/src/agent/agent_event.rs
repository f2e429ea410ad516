use crate::error::{ClientError, NegotiationError, TrackBindingTimeout};
use crate::media::MediaPresence;
use duet_core::{ParticipantId, Role, RoomId};
use tokio::sync::mpsc;

/// Progress reported to whoever drives the participant.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Welcome {
        participant_id: ParticipantId,
    },
    /// In the lobby with nobody to pair with yet.
    Waiting,
    Paired {
        room_id: RoomId,
        role: Role,
    },
    Connected {
        room_id: RoomId,
        media: MediaPresence,
    },
    /// Linked, but no inbound media showed up within the settle window.
    MediaTimedOut {
        room_id: RoomId,
        timeout: TrackBindingTimeout,
    },
    /// The peer went away. The server keeps this participant in the pool.
    PeerLeft {
        room_id: RoomId,
    },
    /// The session is over and the participant has to join again.
    Failed {
        room_id: RoomId,
        reason: NegotiationError,
    },
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentCommand {
    Join,
    Leave,
    Shutdown,
}

/// Sends commands to a running agent.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    tx: mpsc::Sender<AgentCommand>,
}

impl AgentHandle {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<AgentCommand>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    pub async fn join(&self) -> Result<(), ClientError> {
        self.send(AgentCommand::Join).await
    }

    pub async fn leave(&self) -> Result<(), ClientError> {
        self.send(AgentCommand::Leave).await
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.send(AgentCommand::Shutdown).await
    }

    async fn send(&self, cmd: AgentCommand) -> Result<(), ClientError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| ClientError::AgentStopped)
    }
}
