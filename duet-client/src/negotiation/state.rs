use std::fmt;

/// Offerers walk the whole chain; answerers go from `Idle` straight to
/// `RemoteDescriptionApplied` when the offer arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegotiationState {
    #[default]
    Idle,
    LocalOfferPending,
    LocalOfferSet,
    RemoteDescriptionApplied,
    Connected,
    Closed,
}

impl NegotiationState {
    pub fn is_closed(self) -> bool {
        self == NegotiationState::Closed
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::Idle => "idle",
            NegotiationState::LocalOfferPending => "local-offer-pending",
            NegotiationState::LocalOfferSet => "local-offer-set",
            NegotiationState::RemoteDescriptionApplied => "remote-description-applied",
            NegotiationState::Connected => "connected",
            NegotiationState::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}
