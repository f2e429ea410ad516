use crate::model::candidate::IceCandidate;
use crate::model::participant::{ParticipantId, Role};
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Everything that travels over the signaling channel, in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum SignalMessage {
    Welcome {
        participant_id: ParticipantId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Join {
        name: String,
    },
    Leave,
    SendOffer {
        room_id: RoomId,
    },
    AwaitOffer {
        room_id: RoomId,
    },
    Offer {
        room_id: RoomId,
        sdp: String,
    },
    Answer {
        room_id: RoomId,
        sdp: String,
    },
    AddIceCandidate {
        room_id: RoomId,
        candidate: IceCandidate,
        role: Role,
    },
    Lobby,
}

impl SignalMessage {
    /// Room the message was minted for, if it is room-scoped.
    pub fn room_id(&self) -> Option<RoomId> {
        match self {
            SignalMessage::SendOffer { room_id }
            | SignalMessage::AwaitOffer { room_id }
            | SignalMessage::Offer { room_id, .. }
            | SignalMessage::Answer { room_id, .. }
            | SignalMessage::AddIceCandidate { room_id, .. } => Some(*room_id),
            _ => None,
        }
    }

    /// Only peer-to-peer negotiation traffic may be relayed through a room.
    pub fn is_relayable(&self) -> bool {
        matches!(
            self,
            SignalMessage::Offer { .. }
                | SignalMessage::Answer { .. }
                | SignalMessage::AddIceCandidate { .. }
        )
    }

    pub fn op(&self) -> &'static str {
        match self {
            SignalMessage::Welcome { .. } => "welcome",
            SignalMessage::IceConfig { .. } => "ice-config",
            SignalMessage::Join { .. } => "join",
            SignalMessage::Leave => "leave",
            SignalMessage::SendOffer { .. } => "send-offer",
            SignalMessage::AwaitOffer { .. } => "await-offer",
            SignalMessage::Offer { .. } => "offer",
            SignalMessage::Answer { .. } => "answer",
            SignalMessage::AddIceCandidate { .. } => "add-ice-candidate",
            SignalMessage::Lobby => "lobby",
        }
    }
}
