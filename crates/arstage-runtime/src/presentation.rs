//! The presentation state machine: which mode the experience is in, what
//! is visible in it, where the avatar stands and which media play.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use arstage_core::{Duration, ExperienceConfig};
use arstage_media::MediaResource;
use arstage_scene::{Action, ContentRegistry};

use crate::animation::AnimationMixer;
use crate::sequence::{SequenceRun, SequenceStep};
use crate::visibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PresentationState {
    Idle,
    Intro,
    Menu,
    ContentSequence,
    CaseStudy,
    AboutUs,
}

impl PresentationState {
    pub const ALL: [PresentationState; 6] = [
        PresentationState::Idle,
        PresentationState::Intro,
        PresentationState::Menu,
        PresentationState::ContentSequence,
        PresentationState::CaseStudy,
        PresentationState::AboutUs,
    ];
}

impl std::fmt::Display for PresentationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresentationState::Idle => write!(f, "idle"),
            PresentationState::Intro => write!(f, "intro"),
            PresentationState::Menu => write!(f, "menu"),
            PresentationState::ContentSequence => write!(f, "content-sequence"),
            PresentationState::CaseStudy => write!(f, "case-study"),
            PresentationState::AboutUs => write!(f, "about-us"),
        }
    }
}

/// Inputs the state machine reacts to, apart from tracking events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// The intro delay has passed.
    IntroElapsed,
    /// A button action, already gated by visibility.
    Action(Action),
    /// The video of `step` in sequence activation `run` ended.
    StepFinished { run: u64, step: usize },
    /// The video of `step` did not end within the step timeout.
    StepTimedOut { run: u64, step: usize },
}

/// Side effects the state machine asks its host to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Deliver `trigger` back after `after` has elapsed.
    Wake { after: Duration, trigger: Trigger },
    /// Open an external link in a new browsing context.
    Navigate(String),
}

/// Where media-completion notices are posted. Completion callbacks run
/// inside media code, so they never call back into the state machine
/// directly.
#[derive(Clone)]
pub struct TriggerSink(Arc<dyn Fn(Trigger) + Send + Sync>);

impl TriggerSink {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Trigger) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Sink feeding an unbounded channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Trigger>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self::new(move |trigger| {
            let _ = tx.send(trigger);
        });
        (sink, rx)
    }

    pub fn discard() -> Self {
        Self::new(|_| {})
    }

    pub fn emit(&self, trigger: Trigger) {
        (self.0)(trigger)
    }
}

impl std::fmt::Debug for TriggerSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TriggerSink")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: PresentationState,
    pub to: PresentationState,
    pub cause: String,
}

/// Fixed parameters of the experience.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationSettings {
    /// Avatar resting position.
    pub center: Vec3,
    pub intro_delay: Duration,
    pub step_timeout: Option<Duration>,
    pub website: String,
    pub contact: String,
}

impl PresentationSettings {
    pub fn from_config(config: &ExperienceConfig) -> Self {
        Self {
            center: Vec3::from_array(config.avatar.center),
            intro_delay: config.intro_delay(),
            step_timeout: config.step_timeout(),
            website: config.links.website.clone(),
            contact: config.links.contact.clone(),
        }
    }
}

/// Owns the active state, every content object and all media, and is the
/// only thing that changes visibility or starts playback.
pub struct Presentation {
    state: PresentationState,
    cards_revealed: bool,
    registry: ContentRegistry,
    narration: MediaResource,
    mixer: AnimationMixer,
    steps: Vec<SequenceStep>,
    settings: PresentationSettings,
    sink: TriggerSink,
    runs: u64,
    sequence: Option<SequenceRun>,
    history: Vec<Transition>,
}

impl Presentation {
    pub fn new(
        registry: ContentRegistry,
        narration: MediaResource,
        mixer: AnimationMixer,
        steps: Vec<SequenceStep>,
        settings: PresentationSettings,
    ) -> Self {
        let mut presentation = Self {
            state: PresentationState::Idle,
            cards_revealed: false,
            registry,
            narration,
            mixer,
            steps,
            settings,
            sink: TriggerSink::discard(),
            runs: 0,
            sequence: None,
            history: Vec::new(),
        };
        presentation.apply_visibility();
        presentation
    }

    /// Route completion notices to `sink`.
    pub fn set_sink(&mut self, sink: TriggerSink) {
        self.sink = sink;
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    pub fn cards_revealed(&self) -> bool {
        self.cards_revealed
    }

    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    pub fn narration(&self) -> &MediaResource {
        &self.narration
    }

    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    pub fn steps(&self) -> &[SequenceStep] {
        &self.steps
    }

    pub fn settings(&self) -> &PresentationSettings {
        &self.settings
    }

    pub fn sequence(&self) -> Option<&SequenceRun> {
        self.sequence.as_ref()
    }

    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    /// Number of media resources currently playing, narration included.
    pub fn playing_count(&self) -> usize {
        self.registry.videos().filter(|r| r.is_playing()).count()
            + usize::from(self.narration.is_playing())
    }

    fn transition(&mut self, to: PresentationState, cause: impl Into<String>) {
        let cause = cause.into();
        tracing::info!("Presentation {} -> {} ({})", self.state, to, cause);
        self.history.push(Transition {
            from: self.state,
            to,
            cause,
        });
        self.state = to;
        if to != PresentationState::CaseStudy {
            self.cards_revealed = false;
        }
        self.apply_visibility();
    }

    fn apply_visibility(&mut self) {
        visibility::apply(&mut self.registry, self.state, self.cards_revealed);
    }

    fn move_avatar(&mut self, position: Vec3) {
        if let Some(avatar) = self.registry.avatar().cloned() {
            self.registry.set_position(&avatar, position);
        }
    }

    /// Latest anchor pose from the tracker.
    pub fn update_anchor_pose(&mut self, pose: Mat4) {
        self.registry.anchor_mut().set_pose(pose);
    }

    /// Start the intro: avatar at center, idle animation, narration, and a
    /// wake-up after the intro delay. Only valid from `Idle`.
    pub fn begin_intro(&mut self) -> Vec<Directive> {
        if self.state != PresentationState::Idle {
            tracing::debug!("Intro requested in state {}, ignoring", self.state);
            return Vec::new();
        }
        let center = self.settings.center;
        self.move_avatar(center);
        self.transition(PresentationState::Intro, "target found");
        self.mixer.play();
        self.narration.play();
        vec![Directive::Wake {
            after: self.settings.intro_delay,
            trigger: Trigger::IntroElapsed,
        }]
    }

    pub fn handle(&mut self, trigger: Trigger) -> Vec<Directive> {
        match trigger {
            Trigger::IntroElapsed => {
                if self.state == PresentationState::Intro {
                    self.enter_menu("intro elapsed");
                } else {
                    tracing::debug!("Intro timer fired in state {}, ignoring", self.state);
                }
                Vec::new()
            }
            Trigger::Action(action) => self.perform(action),
            Trigger::StepFinished { run, step } => self.step_done(run, step, false),
            Trigger::StepTimedOut { run, step } => self.step_done(run, step, true),
        }
    }

    fn perform(&mut self, action: Action) -> Vec<Directive> {
        use PresentationState::*;
        match (self.state, action) {
            (_, Action::OpenWebsite) => vec![Directive::Navigate(self.settings.website.clone())],
            (_, Action::OpenContact) => vec![Directive::Navigate(self.settings.contact.clone())],
            (Menu, Action::OurContent) => self.enter_content_sequence(),
            (Menu, Action::CaseStudies) => {
                self.transition(CaseStudy, action.to_string());
                Vec::new()
            }
            (Menu, Action::AboutUs) => {
                let center = self.settings.center;
                self.move_avatar(center);
                self.transition(AboutUs, action.to_string());
                Vec::new()
            }
            (CaseStudy, Action::ShowCaseStudies) => {
                self.cards_revealed = true;
                self.apply_visibility();
                tracing::info!("Case studies revealed");
                Vec::new()
            }
            (CaseStudy | AboutUs | ContentSequence, Action::Back) => {
                self.enter_menu("back");
                Vec::new()
            }
            (state, action) => {
                tracing::debug!("Action {} has no effect in state {}", action, state);
                Vec::new()
            }
        }
    }

    /// Menu entry: avatar at center, every video paused, any in-flight
    /// sequence cancelled. Safe to run repeatedly.
    fn enter_menu(&mut self, cause: &str) {
        self.cancel_sequence();
        let center = self.settings.center;
        self.move_avatar(center);
        for video in self.registry.videos_mut() {
            video.pause();
        }
        if self.state != PresentationState::Menu {
            self.transition(PresentationState::Menu, cause);
        } else {
            self.cards_revealed = false;
            self.apply_visibility();
        }
    }

    fn cancel_sequence(&mut self) {
        if self.sequence.take().is_some() {
            for video in self.registry.videos_mut() {
                video.clear_completion();
            }
        }
    }

    fn enter_content_sequence(&mut self) -> Vec<Directive> {
        self.narration.pause();
        self.transition(PresentationState::ContentSequence, Action::OurContent.to_string());
        self.restart_sequence()
    }

    /// Start a fresh activation at step 0.
    fn restart_sequence(&mut self) -> Vec<Directive> {
        self.cancel_sequence();
        self.runs += 1;
        self.sequence = Some(SequenceRun::start(self.runs));
        tracing::info!("Content sequence run {} started", self.runs);
        self.start_step(0)
    }

    fn start_step(&mut self, index: usize) -> Vec<Directive> {
        let Some(run) = self.sequence.as_mut() else {
            return Vec::new();
        };
        run.step = index;
        let run_id = run.run;
        let Some(step) = self.steps.get(index).copied() else {
            return self.finish_sequence();
        };

        self.move_avatar(step.avatar_position);
        // Pause before starting so two clips never play at once.
        for (i, video) in self.registry.videos_mut().enumerate() {
            if i != step.video {
                video.pause();
            }
        }
        let sink = self.sink.clone();
        if let Some(video) = self.registry.video_mut(step.video) {
            video.reset();
            video.play();
            video.clear_completion();
            video.on_completion(move || {
                sink.emit(Trigger::StepFinished {
                    run: run_id,
                    step: index,
                })
            });
        } else {
            tracing::warn!("Sequence step {} has no video {}", index, step.video);
        }
        tracing::debug!("Sequence run {} step {}", run_id, index);

        match self.settings.step_timeout {
            Some(after) => vec![Directive::Wake {
                after,
                trigger: Trigger::StepTimedOut {
                    run: run_id,
                    step: index,
                },
            }],
            None => Vec::new(),
        }
    }

    fn step_done(&mut self, run: u64, step: usize, timed_out: bool) -> Vec<Directive> {
        if self.state != PresentationState::ContentSequence {
            return Vec::new();
        }
        let accepted = self
            .sequence
            .map(|s| s.accepts(run, step))
            .unwrap_or(false);
        if !accepted {
            tracing::debug!("Stale sequence notice for run {} step {}", run, step);
            return Vec::new();
        }
        if timed_out {
            tracing::warn!(
                "Sequence step {} did not finish within the timeout, advancing",
                step
            );
            if let Some(index) = self.steps.get(step).map(|s| s.video) {
                if let Some(video) = self.registry.video_mut(index) {
                    video.pause();
                    video.clear_completion();
                }
            }
        }
        if step + 1 < self.steps.len() {
            self.start_step(step + 1)
        } else {
            self.finish_sequence()
        }
    }

    /// Sequence-complete effect: avatar back to center, then menu entry.
    pub fn finish_sequence(&mut self) -> Vec<Directive> {
        let center = self.settings.center;
        self.move_avatar(center);
        self.enter_menu("sequence completed");
        Vec::new()
    }

    /// Target lost: silence everything without changing state. An in-flight
    /// sequence keeps its step index but is suspended.
    pub fn silence_media(&mut self) {
        self.narration.pause();
        self.narration.reset();
        for video in self.registry.videos_mut() {
            video.pause();
        }
        if let Some(run) = self.sequence.as_mut() {
            run.suspended = true;
            tracing::info!("Sequence run {} suspended at step {}", run.run, run.step);
        }
    }

    /// Target found again after the intro. A suspended sequence restarts
    /// from step 0; anything else is left as is.
    pub fn resume_after_found(&mut self) -> Vec<Directive> {
        let suspended = self.sequence.map(|s| s.suspended).unwrap_or(false);
        if self.state == PresentationState::ContentSequence && suspended {
            self.restart_sequence()
        } else {
            Vec::new()
        }
    }

    /// Advance media clocks and the avatar animation by one frame.
    pub fn tick(&mut self, delta: Duration) {
        self.registry.tick_media(delta);
        self.narration.tick(delta);
        self.mixer.advance(delta);
    }
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("state", &self.state)
            .field("cards_revealed", &self.cards_revealed)
            .field("sequence", &self.sequence)
            .finish()
    }
}
