//! Bridge between the external image tracker and the presentation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use arstage_core::{ArResult, TrackingConfig};

use crate::director::DirectorHandle;
use crate::presentation::{Directive, Presentation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingEvent {
    Found,
    Lost,
}

/// Turns found/lost callbacks into presentation effects. The intro runs at
/// most once per process.
#[derive(Debug, Default)]
pub struct TrackingLifecycle {
    intro_started: bool,
}

impl TrackingLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intro_started(&self) -> bool {
        self.intro_started
    }

    pub fn on_found(&mut self, presentation: &mut Presentation) -> Vec<Directive> {
        if !self.intro_started {
            self.intro_started = true;
            tracing::info!("Target found, starting intro");
            return presentation.begin_intro();
        }
        tracing::debug!("Target found again in state {}", presentation.state());
        presentation.resume_after_found()
    }

    /// Always silences media; never changes the presentation state.
    pub fn on_lost(&mut self, presentation: &mut Presentation) {
        tracing::info!("Target lost in state {}, silencing media", presentation.state());
        presentation.silence_media();
    }

    pub fn handle(
        &mut self,
        event: TrackingEvent,
        presentation: &mut Presentation,
    ) -> Vec<Directive> {
        match event {
            TrackingEvent::Found => self.on_found(presentation),
            TrackingEvent::Lost => {
                self.on_lost(presentation);
                Vec::new()
            }
        }
    }
}

/// An external image-target tracker. Once started it reports found/lost
/// and anchor poses through the director handle.
#[async_trait]
pub trait TrackingEngine: Send {
    async fn start(&mut self, config: &TrackingConfig, events: DirectorHandle) -> ArResult<()>;

    async fn stop(&mut self) -> ArResult<()>;
}
