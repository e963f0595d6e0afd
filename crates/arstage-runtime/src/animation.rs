use serde::{Deserialize, Serialize};

use arstage_core::Duration;

/// A named animation clip of the avatar model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: Duration,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// The loaded avatar model as far as the presentation cares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedModel {
    pub source: String,
    pub clips: Vec<AnimationClip>,
}

/// Drives the avatar's idle clip on the frame clock.
#[derive(Debug, Clone)]
pub struct AnimationMixer {
    clips: Vec<AnimationClip>,
    active: Option<usize>,
    playing: bool,
    time: Duration,
}

impl AnimationMixer {
    /// Select `preferred` by name, falling back to the first clip. A model
    /// without clips yields a mixer that never animates.
    pub fn new(model: &LoadedModel, preferred: &str) -> Self {
        tracing::info!("Available animations in {}:", model.source);
        for (i, clip) in model.clips.iter().enumerate() {
            tracing::info!("  {}: {} ({})", i, clip.name, clip.duration);
        }

        let active = match model.clips.iter().position(|c| c.name == preferred) {
            Some(i) => Some(i),
            None if !model.clips.is_empty() => {
                tracing::warn!(
                    "Animation '{}' not found, using first available clip '{}'",
                    preferred,
                    model.clips[0].name
                );
                Some(0)
            }
            None => {
                tracing::error!("No animation found in {}", model.source);
                None
            }
        };

        Self {
            clips: model.clips.clone(),
            active,
            playing: false,
            time: Duration::zero(),
        }
    }

    pub fn active_clip(&self) -> Option<&AnimationClip> {
        self.active.map(|i| &self.clips[i])
    }

    pub fn play(&mut self) {
        if self.active.is_some() {
            self.playing = true;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Position inside the active clip.
    pub fn local_time(&self) -> Duration {
        self.time
    }

    /// Advance the clock, looping the active clip.
    pub fn advance(&mut self, delta: Duration) {
        if !self.playing {
            return;
        }
        let Some(clip) = self.active_clip() else {
            return;
        };
        let length = clip.duration.as_seconds();
        let t = self.time.as_seconds() + delta.as_seconds();
        self.time = if length > 0.0 {
            Duration::from_seconds(t % length)
        } else {
            Duration::zero()
        };
    }
}
