//! # arstage-scene
//!
//! Everything placed over the tracked image: the avatar, video surfaces,
//! labeled buttons and case-study cards, all attached to a single anchor
//! frame. Visibility is stored here but decided by the presentation.

pub mod anchor;
pub mod interaction;
pub mod object;
pub mod registry;

pub use anchor::AnchorFrame;
pub use interaction::{Action, InteractionBinding, InteractionRouter};
pub use object::{CardRegion, ContentId, ContentKind, ContentObject, LabelStyle};
pub use registry::{Collection, ContentRegistry};
