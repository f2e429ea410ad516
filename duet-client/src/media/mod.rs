mod media_kind;
mod track_binder;

pub use media_kind::*;
pub use track_binder::*;
