use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// A media track received from the peer.
pub trait InboundTrack {
    /// `None` when the transport did not say what the track carries.
    fn declared_kind(&self) -> Option<MediaKind>;

    fn track_id(&self) -> String;
}

/// Which kinds of inbound media a session ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaPresence {
    pub audio: bool,
    pub video: bool,
}

impl MediaPresence {
    pub fn is_complete(self) -> bool {
        self.audio && self.video
    }

    pub fn is_empty(self) -> bool {
        !self.audio && !self.video
    }
}

impl fmt::Display for MediaPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.audio, self.video) {
            (true, true) => write!(f, "audio+video"),
            (true, false) => write!(f, "audio only"),
            (false, true) => write!(f, "video only"),
            (false, false) => write!(f, "no media"),
        }
    }
}
