//! # arstage-runtime
//!
//! The presentation state machine and everything that drives it: the
//! content sequence, the tracking lifecycle, the avatar animation mixer,
//! the render boundary and a tokio event-loop director.

pub mod animation;
pub mod assemble;
pub mod director;
pub mod navigation;
pub mod presentation;
pub mod render;
pub mod sequence;
pub mod tracking;
pub mod visibility;

pub use animation::{AnimationClip, AnimationMixer, LoadedModel};
pub use assemble::{AssetLoader, Experience, PlaceholderAssets, TextureInfo};
pub use director::{Director, DirectorHandle, Input, SessionReport};
pub use navigation::{Navigator, RecordingNavigator};
pub use presentation::{
    Directive, Presentation, PresentationSettings, PresentationState, Transition, Trigger,
    TriggerSink,
};
pub use render::{RecordingRenderer, RenderBackend, SceneSetup};
pub use sequence::{SequenceRun, SequenceStep};
pub use tracking::{TrackingEngine, TrackingEvent, TrackingLifecycle};
