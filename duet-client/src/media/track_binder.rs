use crate::error::TrackBindingTimeout;
use crate::media::media_kind::{InboundTrack, MediaKind, MediaPresence};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Bound(MediaKind),
    /// The slot for this kind is taken; the track is ignored.
    AlreadyBound(MediaKind),
    /// The track has no declared kind. It can still be picked up by the
    /// settle fallback.
    Unclassified,
}

/// Sorts inbound tracks into one audio and one video slot.
pub struct TrackBinder<T> {
    audio: Option<T>,
    video: Option<T>,
    window: Duration,
}

impl<T: InboundTrack + Clone> TrackBinder<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            audio: None,
            video: None,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn bind(&mut self, track: T) -> Binding {
        let Some(kind) = track.declared_kind() else {
            debug!("Track {} has no declared kind", track.track_id());
            return Binding::Unclassified;
        };

        let slot = self.slot_mut(kind);
        if slot.is_some() {
            debug!("Ignoring extra {} track {}", kind, track.track_id());
            return Binding::AlreadyBound(kind);
        }

        info!("Bound {} track {}", kind, track.track_id());
        *slot = Some(track);
        Binding::Bound(kind)
    }

    /// Resolves the window. With nothing bound yet, the receiving channels
    /// are read in order: the first non-video one becomes audio and the next
    /// remaining one becomes video.
    pub fn settle(&mut self, receiving: Vec<T>) -> Result<MediaPresence, TrackBindingTimeout> {
        if self.audio.is_none() && self.video.is_none() {
            self.fallback(receiving);
        }

        let presence = self.presence();
        if presence.is_empty() {
            return Err(TrackBindingTimeout {
                window: self.window,
            });
        }
        if !presence.is_complete() {
            warn!("Settle window elapsed with {}", presence);
        }
        Ok(presence)
    }

    fn fallback(&mut self, receiving: Vec<T>) {
        let audio_index = receiving
            .iter()
            .position(|t| t.declared_kind() != Some(MediaKind::Video));

        for (index, track) in receiving.into_iter().enumerate() {
            if Some(index) == audio_index {
                debug!("Fallback bound {} as audio", track.track_id());
                self.audio = Some(track);
            } else if self.video.is_none() {
                debug!("Fallback bound {} as video", track.track_id());
                self.video = Some(track);
            }
        }
    }

    pub fn presence(&self) -> MediaPresence {
        MediaPresence {
            audio: self.audio.is_some(),
            video: self.video.is_some(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.presence().is_complete()
    }

    pub fn audio(&self) -> Option<&T> {
        self.audio.as_ref()
    }

    pub fn video(&self) -> Option<&T> {
        self.video.as_ref()
    }

    fn slot_mut(&mut self, kind: MediaKind) -> &mut Option<T> {
        match kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        }
    }
}
