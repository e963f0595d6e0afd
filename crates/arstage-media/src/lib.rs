//! # arstage-media
//!
//! Video and audio elements wrapped as playback resources the presentation
//! can start, pause, rewind and wait on. Decoding is owned by a
//! [`MediaBackend`]; this crate only tracks status and completion.

pub mod backend;
pub mod resource;
pub mod simulated;

pub use backend::{MediaBackend, MediaKind, MediaSource, PlaybackError, PlaybackHandle};
pub use resource::{MediaId, MediaResource, PlaybackStatus};
pub use simulated::SimulatedBackend;
