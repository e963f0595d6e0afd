//! Single-task event loop. Tracker callbacks, taps, timer wake-ups and
//! media completions all arrive on one channel and are applied in delivery
//! order; render ticks interleave between them.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use arstage_core::{ArError, ArResult, Camera, Duration, Viewport};
use arstage_scene::{ContentId, InteractionRouter};

use crate::assemble::Experience;
use crate::navigation::Navigator;
use crate::presentation::{Directive, Presentation, PresentationState, Transition, Trigger, TriggerSink};
use crate::render::{RenderBackend, SceneSetup};
use crate::tracking::{TrackingEvent, TrackingLifecycle};

/// Render ticks are never closer together than this.
const MIN_FRAME_PERIOD: std::time::Duration = std::time::Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Tracking(TrackingEvent),
    AnchorPose(Mat4),
    /// A tap in screen pixels.
    Pointer { x: f32, y: f32 },
    /// A tap on whatever screen point shows the object unobstructed.
    TapObject(ContentId),
    Resize(Viewport),
    Trigger(Trigger),
    Shutdown,
}

/// Cloneable sending side of the director's input channel.
#[derive(Debug, Clone)]
pub struct DirectorHandle {
    tx: mpsc::UnboundedSender<Input>,
}

impl DirectorHandle {
    pub fn send(&self, input: Input) -> ArResult<()> {
        self.tx.send(input).map_err(|_| ArError::ChannelClosed)
    }

    pub fn target_found(&self) -> ArResult<()> {
        self.send(Input::Tracking(TrackingEvent::Found))
    }

    pub fn target_lost(&self) -> ArResult<()> {
        self.send(Input::Tracking(TrackingEvent::Lost))
    }

    pub fn anchor_pose(&self, pose: Mat4) -> ArResult<()> {
        self.send(Input::AnchorPose(pose))
    }

    pub fn tap(&self, x: f32, y: f32) -> ArResult<()> {
        self.send(Input::Pointer { x, y })
    }

    pub fn tap_object(&self, id: impl Into<String>) -> ArResult<()> {
        self.send(Input::TapObject(ContentId::new(id)))
    }

    pub fn shutdown(&self) -> ArResult<()> {
        self.send(Input::Shutdown)
    }
}

/// Outcome of a director session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub final_state: PresentationState,
    pub transitions: Vec<Transition>,
    pub visible: Vec<ContentId>,
    pub sequence_step: Option<usize>,
    pub frames: u64,
}

pub struct Director<R, N> {
    presentation: Presentation,
    tracking: TrackingLifecycle,
    router: InteractionRouter,
    renderer: R,
    navigator: N,
    setup: SceneSetup,
    camera: Camera,
    viewport: Viewport,
    frame_interval: Duration,
    frames: u64,
    tx: mpsc::UnboundedSender<Input>,
    rx: mpsc::UnboundedReceiver<Input>,
}

impl<R: RenderBackend, N: Navigator> Director<R, N> {
    pub fn new(experience: Experience, renderer: R, navigator: N) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let Experience {
            mut presentation,
            router,
            setup,
            camera,
            viewport,
            frame_interval,
            ..
        } = experience;
        let sink_tx = tx.clone();
        presentation.set_sink(TriggerSink::new(move |trigger| {
            let _ = sink_tx.send(Input::Trigger(trigger));
        }));
        Self {
            presentation,
            tracking: TrackingLifecycle::new(),
            router,
            renderer,
            navigator,
            setup,
            camera,
            viewport,
            frame_interval,
            frames: 0,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> DirectorHandle {
        DirectorHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Process inputs and render ticks until a shutdown input arrives.
    pub async fn run(&mut self) -> ArResult<SessionReport> {
        self.renderer.setup(&self.setup)?;
        for object in self.presentation.registry().objects() {
            self.renderer.add_object(object)?;
        }
        let period = self.frame_interval.to_std().max(MIN_FRAME_PERIOD);
        tracing::info!(
            "Director running at {:.1} fps",
            1.0 / period.as_secs_f64()
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            tokio::select! {
                biased;
                input = self.rx.recv() => match input {
                    Some(Input::Shutdown) | None => break,
                    Some(input) => self.dispatch(input),
                },
                now = ticker.tick() => {
                    let delta = Duration::from_std(now.saturating_duration_since(last));
                    last = now;
                    self.frame(delta)?;
                }
            }
        }

        tracing::info!(
            "Director stopped in state {} after {} frames",
            self.presentation.state(),
            self.frames
        );
        Ok(self.report())
    }

    /// Apply one input immediately.
    pub fn dispatch(&mut self, input: Input) {
        let directives = match input {
            Input::Tracking(event) => self.tracking.handle(event, &mut self.presentation),
            Input::AnchorPose(pose) => {
                self.presentation.update_anchor_pose(pose);
                Vec::new()
            }
            Input::Pointer { x, y } => {
                match self.router.route_pointer_event(
                    x,
                    y,
                    &self.viewport,
                    &self.camera,
                    self.presentation.registry(),
                ) {
                    Some(action) => self.presentation.handle(Trigger::Action(action)),
                    None => Vec::new(),
                }
            }
            Input::TapObject(id) => match self.screen_point_of(&id) {
                Some(point) => {
                    return self.dispatch(Input::Pointer {
                        x: point.x,
                        y: point.y,
                    })
                }
                None => {
                    tracing::warn!("'{}' cannot be tapped from the current view", id);
                    Vec::new()
                }
            },
            Input::Resize(viewport) => {
                self.viewport = viewport;
                self.camera.aspect = viewport.aspect_ratio();
                Vec::new()
            }
            Input::Trigger(trigger) => self.presentation.handle(trigger),
            Input::Shutdown => Vec::new(),
        };
        self.apply(directives);
    }

    fn apply(&mut self, directives: Vec<Directive>) {
        for directive in directives {
            match directive {
                Directive::Wake { after, trigger } => {
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(after.to_std()).await;
                        let _ = tx.send(Input::Trigger(trigger));
                    });
                }
                Directive::Navigate(url) => self.navigator.open(&url),
            }
        }
    }

    /// Screen point where a tap ray reaches `id` before any other
    /// interactive object. Samples the object's face from the center out.
    pub fn screen_point_of(&self, id: &ContentId) -> Option<Vec2> {
        const OFFSETS: [f32; 5] = [0.0, 0.3, -0.3, 0.45, -0.45];
        let registry = self.presentation.registry();
        let size = registry.get(id)?.size?;
        let world = registry.world_matrix(id)?;
        for fy in OFFSETS {
            for fx in OFFSETS {
                let local = Vec3::new(fx * size.x, fy * size.y, 0.0);
                let Some(ndc) = self.camera.project_to_ndc(world.transform_point3(local)) else {
                    continue;
                };
                let ray = self.camera.ray_from_ndc(ndc);
                if self
                    .router
                    .pick(&ray, registry)
                    .is_some_and(|hit| &hit.target == id)
                {
                    return Some(self.viewport.to_screen(ndc));
                }
            }
        }
        None
    }

    /// One render tick. Reads the presentation, never transitions it.
    pub fn frame(&mut self, delta: Duration) -> ArResult<()> {
        self.presentation.tick(delta);
        let registry = self.presentation.registry();
        for object in registry.objects() {
            let world = registry.anchor().world_of(&object.placement);
            self.renderer.set_transform(&object.id, world);
            self.renderer.set_visibility(&object.id, object.visible);
        }
        self.renderer.advance_animation(delta);
        self.renderer.render_frame()?;
        self.frames += 1;
        Ok(())
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            final_state: self.presentation.state(),
            transitions: self.presentation.history().to_vec(),
            visible: self.presentation.registry().visible_ids(),
            sequence_step: self.presentation.sequence().map(|s| s.step),
            frames: self.frames,
        }
    }
}
