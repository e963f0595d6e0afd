//! Headless playback backend. Clips advance only when ticked, which makes
//! sessions reproducible on virtual time.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use arstage_core::{ArError, ArResult, Duration, MediaConfig};

use crate::backend::{MediaBackend, MediaSource, PlaybackError, PlaybackHandle};

#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    clips: HashMap<String, Duration>,
    default_duration: Option<Duration>,
    rejected: HashSet<String>,
    /// When set, a source must exist as a file under this directory.
    root: Option<PathBuf>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every source opens, with lengths taken from the media config.
    pub fn from_config(config: &MediaConfig) -> Self {
        let mut backend = Self::new()
            .with_default_duration(Duration::from_seconds(config.default_duration_secs));
        for (source, secs) in &config.durations {
            backend = backend.with_clip(source.clone(), Duration::from_seconds(*secs));
        }
        backend
    }

    pub fn with_clip(mut self, source: impl Into<String>, length: Duration) -> Self {
        self.clips.insert(source.into(), length);
        self
    }

    pub fn with_default_duration(mut self, length: Duration) -> Self {
        self.default_duration = Some(length);
        self
    }

    /// Opening succeeds but every `play()` is refused, as with a blocked
    /// autoplay.
    pub fn rejecting(mut self, source: impl Into<String>) -> Self {
        self.rejected.insert(source.into());
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }
}

impl MediaBackend for SimulatedBackend {
    fn open(&self, source: &MediaSource) -> ArResult<Box<dyn PlaybackHandle>> {
        if let Some(root) = &self.root {
            let path = root.join(&source.path);
            if !path.is_file() {
                return Err(ArError::unavailable(
                    &source.path,
                    format!("file not found: {}", path.display()),
                ));
            }
        }
        let length = self
            .clips
            .get(&source.path)
            .copied()
            .or(self.default_duration)
            .ok_or_else(|| ArError::unavailable(&source.path, "unknown source"))?;
        Ok(Box::new(SimulatedPlayback {
            position: Duration::zero(),
            length,
            playing: false,
            rejected: self.rejected.contains(&source.path),
        }))
    }
}

#[derive(Debug)]
struct SimulatedPlayback {
    position: Duration,
    length: Duration,
    playing: bool,
    rejected: bool,
}

impl PlaybackHandle for SimulatedPlayback {
    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.rejected {
            return Err(PlaybackError::Rejected(
                "play() request was denied by the platform".into(),
            ));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) {
        self.position = position.min(self.length);
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.length)
    }

    fn tick(&mut self, delta: Duration) {
        if self.playing {
            self.position = (self.position + delta).min(self.length);
            if self.position >= self.length {
                self.playing = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_source_is_unavailable() {
        let backend = SimulatedBackend::new();
        assert!(backend.open(&MediaSource::video("nope.mp4")).is_err());
    }

    #[test]
    fn test_from_config_uses_default_length() {
        let mut config = MediaConfig::default();
        config.durations.insert("short.mp4".into(), 1.5);
        let backend = SimulatedBackend::from_config(&config);
        let short = backend.open(&MediaSource::video("short.mp4")).unwrap();
        assert_eq!(short.duration(), Some(Duration::from_seconds(1.5)));
        let other = backend.open(&MediaSource::video("other.mp4")).unwrap();
        assert_eq!(other.duration(), Some(Duration::from_seconds(10.0)));
    }

    #[test]
    fn test_root_requires_existing_file() {
        let backend = SimulatedBackend::new()
            .with_default_duration(Duration::from_seconds(1.0))
            .with_root(std::env::temp_dir().join("arstage-no-such-dir"));
        let err = match backend.open(&MediaSource::audio("BezVO.mp3")) {
            Err(e) => e,
            Ok(_) => panic!("expected missing file"),
        };
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_clock_clamps_at_length() {
        let backend = SimulatedBackend::new().with_clip("a.mp4", Duration::from_seconds(1.0));
        let mut handle = backend.open(&MediaSource::video("a.mp4")).unwrap();
        handle.play().unwrap();
        handle.tick(Duration::from_seconds(3.0));
        assert_eq!(handle.position(), Duration::from_seconds(1.0));
    }
}
