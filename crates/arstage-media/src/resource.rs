use serde::{Deserialize, Serialize};

use arstage_core::{ArResult, Duration};

use crate::backend::{MediaBackend, MediaSource, PlaybackHandle};

/// Unique identifier for a media resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// The source could not be opened; every control is a no-op.
    Unavailable,
    /// Loaded and never started, or rewound after finishing.
    Stopped,
    Playing,
    Paused,
    /// Reached the natural end of the clip.
    Ended,
}

type CompletionCallback = Box<dyn FnOnce() + Send>;

/// A single video or audio element as a controllable playback resource.
pub struct MediaResource {
    id: MediaId,
    source: MediaSource,
    handle: Option<Box<dyn PlaybackHandle>>,
    status: PlaybackStatus,
    /// Number of times playback actually started.
    cycle: u64,
    completion: Vec<CompletionCallback>,
}

impl std::fmt::Debug for MediaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaResource")
            .field("id", &self.id)
            .field("source", &self.source.path)
            .field("status", &self.status)
            .field("cycle", &self.cycle)
            .field("pending_completions", &self.completion.len())
            .finish()
    }
}

impl MediaResource {
    /// Bind a playable handle to `source`.
    pub fn load(id: MediaId, source: MediaSource, backend: &dyn MediaBackend) -> ArResult<Self> {
        let handle = backend.open(&source)?;
        Ok(Self {
            id,
            source,
            handle: Some(handle),
            status: PlaybackStatus::Stopped,
            cycle: 0,
            completion: Vec::new(),
        })
    }

    /// Like [`MediaResource::load`], but a source that cannot be opened
    /// yields an unavailable resource instead of an error.
    pub fn load_or_unavailable(
        id: MediaId,
        source: MediaSource,
        backend: &dyn MediaBackend,
    ) -> Self {
        match Self::load(id.clone(), source.clone(), backend) {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!("Media '{}' unavailable, playback will not advance: {}", id, e);
                Self::unavailable(id, source)
            }
        }
    }

    pub fn unavailable(id: MediaId, source: MediaSource) -> Self {
        Self {
            id,
            source,
            handle: None,
            status: PlaybackStatus::Unavailable,
            cycle: 0,
            completion: Vec::new(),
        }
    }

    pub fn id(&self) -> &MediaId {
        &self.id
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn position(&self) -> Duration {
        self.handle
            .as_ref()
            .map(|h| h.position())
            .unwrap_or_default()
    }

    /// True once the clip has finished or its position sits at the end.
    pub fn is_at_end(&self) -> bool {
        if self.status == PlaybackStatus::Ended {
            return true;
        }
        match &self.handle {
            Some(h) => match h.duration() {
                Some(d) => h.position() >= d,
                None => false,
            },
            None => false,
        }
    }

    /// Start playback. Already-playing resources are left alone, and a
    /// finished clip starts again from the beginning.
    pub fn play(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            tracing::warn!("Cannot play '{}': resource unavailable", self.id);
            return;
        };
        if self.status == PlaybackStatus::Playing {
            return;
        }
        if self.status == PlaybackStatus::Ended {
            handle.seek(Duration::zero());
        }
        match handle.play() {
            Ok(()) => {
                self.status = PlaybackStatus::Playing;
                self.cycle += 1;
            }
            Err(e) => {
                tracing::warn!("Playback of '{}' failed: {}", self.id, e);
            }
        }
    }

    pub fn pause(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.pause();
            if self.status == PlaybackStatus::Playing {
                self.status = PlaybackStatus::Paused;
            }
        }
    }

    /// Seek to the start. A finished clip becomes stopped again.
    pub fn reset(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.seek(Duration::zero());
            if self.status == PlaybackStatus::Ended {
                self.status = PlaybackStatus::Stopped;
            }
        }
    }

    /// Register a one-shot callback for the natural end of playback. If the
    /// resource already sits at its end the callback runs immediately.
    pub fn on_completion<F>(&mut self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_at_end() {
            callback();
            return;
        }
        self.completion.push(Box::new(callback));
    }

    /// Drop every pending completion callback.
    pub fn clear_completion(&mut self) {
        self.completion.clear();
    }

    /// Record that playback reached its end and notify waiters once.
    pub fn notify_ended(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        self.status = PlaybackStatus::Ended;
        tracing::debug!("Media '{}' ended (cycle {})", self.id, self.cycle);
        for callback in self.completion.drain(..) {
            callback();
        }
    }

    /// Advance the handle clock and detect the end of the clip.
    pub fn tick(&mut self, delta: Duration) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        if let Some(handle) = self.handle.as_mut() {
            handle.tick(delta);
        }
        if self.is_at_end() {
            self.notify_ended();
        }
    }
}
