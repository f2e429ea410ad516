mod agent;
mod config;
mod error;
mod media;
mod negotiation;
mod signaling_client;
mod transport;

pub use agent::*;
pub use config::*;
pub use error::*;
pub use media::*;
pub use negotiation::*;
pub use signaling_client::*;
pub use transport::*;
