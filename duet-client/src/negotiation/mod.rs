mod ice_buffer;
mod machine;
mod state;

pub use ice_buffer::*;
pub use machine::*;
pub use state::*;
