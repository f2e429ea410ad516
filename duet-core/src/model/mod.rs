mod candidate;
mod description;
mod participant;
mod room;
mod signaling;

pub use candidate::IceCandidate;
pub use description::{SdpKind, SessionDescription};
pub use participant::{ParticipantId, Role};
pub use room::RoomId;
pub use signaling::{IceServerConfig, SignalMessage};
