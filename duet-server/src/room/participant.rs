use duet_core::{ParticipantId, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    pub role: Role,
}

impl Participant {
    pub fn new(id: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role: Role::Unassigned,
        }
    }

    /// Drops the role so the participant can wait for a new pairing.
    pub fn into_waiting(mut self) -> Self {
        self.role = Role::Unassigned;
        self
    }
}
