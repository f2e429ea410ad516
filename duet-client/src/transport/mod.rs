mod transport_capability;
mod transport_config;
mod webrtc_transport;

pub use transport_capability::*;
pub use transport_config::*;
pub use webrtc_transport::*;
