//! Scripted sessions: a JSON list of tracker events and taps replayed
//! against a director on virtual time.

use std::future::Future;
use std::path::Path;

use async_trait::async_trait;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use arstage_core::{ArError, ArResult, Duration, TrackingConfig, MAX_TIMER_SECS};
use arstage_runtime::{DirectorHandle, TrackingEngine};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptStep {
    Found,
    Lost,
    /// Move the anchor to a new translation in camera space.
    Pose { translation: [f32; 3] },
    /// Tap at a screen pixel.
    Tap { x: f32, y: f32 },
    /// Tap wherever the object shows unobstructed.
    TapObject { id: String },
    Wait { secs: f64 },
}

fn default_anchor() -> [f32; 3] {
    [0.0, 0.0, -3.0]
}

fn default_settle() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    /// Anchor translation sent before the first step.
    #[serde(default = "default_anchor")]
    pub anchor: [f32; 3],
    pub steps: Vec<ScriptStep>,
    /// Idle time after the last step before the session shuts down.
    #[serde(default = "default_settle")]
    pub settle_secs: f64,
}

impl SessionScript {
    pub fn from_json_str(contents: &str) -> ArResult<Self> {
        let script: Self = serde_json::from_str(contents)?;
        for step in &script.steps {
            if let ScriptStep::Wait { secs } = step {
                if !secs.is_finite() || *secs < 0.0 || *secs > MAX_TIMER_SECS {
                    return Err(ArError::InvalidArgument(format!(
                        "wait must be between 0 and {} seconds, got {}",
                        MAX_TIMER_SECS, secs
                    )));
                }
            }
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> ArResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// A walk through every section: intro, the full content sequence,
    /// case studies and the website link.
    pub fn tour() -> Self {
        use ScriptStep::*;
        let tap = |id: &str| TapObject { id: id.to_string() };
        Self {
            anchor: default_anchor(),
            steps: vec![
                Found,
                Wait { secs: 9.0 },
                tap("button:our-content"),
                Wait { secs: 50.0 },
                tap("button:about-us"),
                Wait { secs: 2.0 },
                tap("button:back"),
                Wait { secs: 1.0 },
                tap("button:case-studies"),
                Wait { secs: 1.0 },
                tap("button:show-case-studies"),
                Wait { secs: 1.0 },
                tap("button:website"),
            ],
            settle_secs: default_settle(),
        }
    }
}

/// Plays a [`SessionScript`] in place of a camera tracker, then shuts the
/// director down.
#[derive(Debug)]
pub struct ScriptedTracker {
    script: SessionScript,
    task: Option<JoinHandle<ArResult<()>>>,
}

impl ScriptedTracker {
    pub fn new(script: SessionScript) -> Self {
        Self { script, task: None }
    }
}

#[async_trait]
impl TrackingEngine for ScriptedTracker {
    async fn start(&mut self, config: &TrackingConfig, events: DirectorHandle) -> ArResult<()> {
        if self.task.is_some() {
            return Err(ArError::InvalidArgument("tracker already started".to_string()));
        }
        tracing::info!(
            "Replaying {} scripted step(s) for target {}",
            self.script.steps.len(),
            config.target
        );
        let replay = replay(self.script.clone(), events.clone());
        self.task = Some(tokio::spawn(supervise(replay, events)));
        Ok(())
    }

    async fn stop(&mut self) -> ArResult<()> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        task.abort();
        match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(ArError::Other(format!("script task failed: {}", e))),
        }
    }
}

/// Run the replay and shut the director down however it ends, so a failed
/// script cannot leave the session running.
async fn supervise<F>(replay: F, events: DirectorHandle) -> ArResult<()>
where
    F: Future<Output = ArResult<()>> + Send + 'static,
{
    let outcome = match tokio::spawn(replay).await {
        Ok(result) => result,
        Err(e) => Err(ArError::Other(format!("script replay aborted: {}", e))),
    };
    if let Err(e) = &outcome {
        tracing::warn!("Session script stopped early: {}", e);
    }
    // Already closed when the replay finished normally.
    let _ = events.shutdown();
    outcome
}

async fn replay(script: SessionScript, events: DirectorHandle) -> ArResult<()> {
    events.anchor_pose(Mat4::from_translation(Vec3::from_array(script.anchor)))?;
    for step in script.steps {
        tracing::debug!("Script step {:?}", step);
        match step {
            ScriptStep::Found => events.target_found()?,
            ScriptStep::Lost => events.target_lost()?,
            ScriptStep::Pose { translation } => {
                events.anchor_pose(Mat4::from_translation(Vec3::from_array(translation)))?
            }
            ScriptStep::Tap { x, y } => events.tap(x, y)?,
            ScriptStep::TapObject { id } => events.tap_object(id)?,
            ScriptStep::Wait { secs } => {
                tokio::time::sleep(Duration::from_seconds(secs).to_std()).await
            }
        }
    }
    tokio::time::sleep(Duration::from_seconds(script.settle_secs).to_std()).await;
    events.shutdown()
}
