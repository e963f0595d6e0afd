use serde::{Deserialize, Serialize};

use arstage_core::{ArResult, Duration};

/// Whether a source is rendered onto a surface or only heard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// A media file referenced by relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    pub path: String,
    pub kind: MediaKind,
    /// Muted sources are allowed to autoplay on most platforms.
    pub muted: bool,
}

impl MediaSource {
    /// Muted, non-looping inline video.
    pub fn video(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Video,
            muted: true,
        }
    }

    pub fn audio(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Audio,
            muted: false,
        }
    }
}

/// Reasons the platform refuses to start playback.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("playback rejected: {0}")]
    Rejected(String),
}

/// A decoded, playable element owned by a platform media stack.
pub trait PlaybackHandle: Send {
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    fn seek(&mut self, position: Duration);

    fn position(&self) -> Duration;

    /// Total length, if the platform knows it yet.
    fn duration(&self) -> Option<Duration>;

    /// Advance the element's own clock. Platform decoders that keep time
    /// themselves ignore this.
    fn tick(&mut self, _delta: Duration) {}
}

/// Opens playable handles for media sources.
pub trait MediaBackend {
    /// Fails with [`arstage_core::ArError::ResourceUnavailable`] when the
    /// source cannot be opened.
    fn open(&self, source: &MediaSource) -> ArResult<Box<dyn PlaybackHandle>>;
}
