use duet_core::{ParticipantId, RoomId};
use std::net::AddrParseError;
use thiserror::Error;

/// Reasons a relay is dropped. None of these reach the sender; they are
/// logged where they occur.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("message is tagged for a different room than {room_id}")]
    StaleRoomMessage { room_id: RoomId },

    #[error("room {room_id} is closed")]
    RoomClosed { room_id: RoomId },

    #[error("participant {participant_id} is not a member of room {room_id}")]
    NotAMember {
        participant_id: ParticipantId,
        room_id: RoomId,
    },

    #[error("'{op}' is not relayable")]
    NotRelayable { op: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddress {
        value: String,
        #[source]
        source: AddrParseError,
    },
}
