use async_trait::async_trait;
use duet_core::{ParticipantId, SignalMessage};

/// Outbound half of the signaling channel, as seen by the coordinator and
/// its rooms. Delivery to one participant preserves call order.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Delivers a message to one participant. Unknown or disconnected
    /// participants are logged and skipped.
    async fn deliver(&self, participant_id: ParticipantId, msg: SignalMessage);
}
