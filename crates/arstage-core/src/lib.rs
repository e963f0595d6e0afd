//! # arstage-core
//!
//! Core types and primitives for the arstage presentation runtime.
//! This crate contains foundational types shared across all arstage crates:
//! durations, spatial placements, camera rays, configuration, and error types.

pub mod config;
pub mod error;
pub mod math;
pub mod time;

pub use config::*;

pub use error::{ArError, ArResult};
pub use math::{Camera, Hit, Placement, Ray, Viewport};
pub use time::Duration;
