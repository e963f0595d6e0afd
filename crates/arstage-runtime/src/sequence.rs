use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One (avatar placement, video) pairing of the content sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequenceStep {
    /// Where the avatar stands while this step plays.
    pub avatar_position: Vec3,
    /// Index of the video resource in the content registry.
    pub video: usize,
}

/// Progress of one activation of the content sequence.
///
/// Every activation gets a fresh `run` number; completion and timeout
/// notices carry the run and step they were issued for, so a notice from a
/// cancelled activation can never advance a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRun {
    pub run: u64,
    pub step: usize,
    /// Set while the target is lost; playback is paused and the step index
    /// is kept.
    pub suspended: bool,
}

impl SequenceRun {
    pub fn start(run: u64) -> Self {
        Self {
            run,
            step: 0,
            suspended: false,
        }
    }

    /// Whether a notice for (`run`, `step`) should advance this run.
    pub fn accepts(&self, run: u64, step: usize) -> bool {
        !self.suspended && self.run == run && self.step == step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_only_current_step_of_current_run() {
        let mut run = SequenceRun::start(3);
        assert!(run.accepts(3, 0));
        assert!(!run.accepts(2, 0));
        assert!(!run.accepts(3, 1));
        run.suspended = true;
        assert!(!run.accepts(3, 0));
    }
}
