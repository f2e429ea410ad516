mod participant;
mod room;
mod room_command;
mod session_coordinator;

pub use participant::*;
pub use room::*;
pub use room_command::*;
pub use session_coordinator::*;
