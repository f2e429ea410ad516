mod agent_event;
mod participant_agent;
mod session;

pub use agent_event::*;
pub use participant_agent::*;
