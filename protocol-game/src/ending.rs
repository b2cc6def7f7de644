//! Timed ending sequence played once the final mission is debriefed
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EndingTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndingStage {
    #[default]
    Idle,
    Hacking,
    Syncing,
    Reveal,
}

/// When the driver should deliver the next tick, and with which epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    pub epoch: u64,
    pub delay: Duration,
}

/// What a single tick did to the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndingStep {
    /// Stale epoch, or a stage that does not accept ticks.
    Ignored,
    Progressed { progress: u8 },
    Syncing,
    Revealed,
}

/// Progress-bar state machine `IDLE -> HACKING -> SYNCING -> REVEAL`.
///
/// Every start or reset bumps the epoch, so ticks scheduled for an earlier run
/// of the sequence fall through as [`EndingStep::Ignored`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndingSequence {
    stage: EndingStage,
    progress: u8,
    epoch: u64,
    timing: EndingTiming,
}

impl EndingSequence {
    #[must_use]
    pub const fn new(timing: EndingTiming) -> Self {
        Self {
            stage: EndingStage::Idle,
            progress: 0,
            epoch: 0,
            timing,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> EndingStage {
        self.stage
    }

    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn timing(&self) -> &EndingTiming {
        &self.timing
    }

    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        matches!(self.stage, EndingStage::Reveal)
    }

    /// Begin hacking. Returns `false` without touching anything when the
    /// sequence has already left IDLE.
    pub fn start(&mut self) -> bool {
        if self.stage != EndingStage::Idle {
            log::debug!("Ending sequence already running in {:?}", self.stage);
            return false;
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.stage = EndingStage::Hacking;
        self.progress = 0;
        true
    }

    /// Back to IDLE with a fresh epoch.
    pub fn reset(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.stage = EndingStage::Idle;
        self.progress = 0;
    }

    /// The delay before the next tick, or `None` when the sequence is at rest.
    #[must_use]
    pub const fn next_tick(&self) -> Option<ScheduledTick> {
        let delay = match self.stage {
            EndingStage::Hacking => self.timing.tick_interval(),
            EndingStage::Syncing => self.timing.reveal_delay(),
            EndingStage::Idle | EndingStage::Reveal => return None,
        };
        Some(ScheduledTick {
            epoch: self.epoch,
            delay,
        })
    }

    pub fn tick(&mut self, epoch: u64) -> EndingStep {
        if epoch != self.epoch {
            log::debug!(
                "Dropping ending tick for epoch {epoch} (current {})",
                self.epoch
            );
            return EndingStep::Ignored;
        }
        match self.stage {
            EndingStage::Hacking => {
                let threshold = self.timing.completion_threshold;
                self.progress = self
                    .progress
                    .saturating_add(self.timing.progress_step)
                    .min(threshold);
                if self.progress >= threshold {
                    self.stage = EndingStage::Syncing;
                    EndingStep::Syncing
                } else {
                    EndingStep::Progressed {
                        progress: self.progress,
                    }
                }
            }
            EndingStage::Syncing => {
                self.stage = EndingStage::Reveal;
                EndingStep::Revealed
            }
            EndingStage::Idle | EndingStage::Reveal => EndingStep::Ignored,
        }
    }
}

impl Default for EndingSequence {
    fn default() -> Self {
        Self::new(EndingTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_rest(seq: &mut EndingSequence) -> Vec<EndingStep> {
        let mut steps = Vec::new();
        while let Some(tick) = seq.next_tick() {
            steps.push(seq.tick(tick.epoch));
        }
        steps
    }

    #[test]
    fn default_timing_takes_twenty_hacking_ticks() {
        let mut seq = EndingSequence::default();
        assert!(seq.start());
        let steps = run_to_rest(&mut seq);
        assert_eq!(steps.len(), 21);
        assert_eq!(steps[0], EndingStep::Progressed { progress: 5 });
        assert_eq!(steps[18], EndingStep::Progressed { progress: 95 });
        assert_eq!(steps[19], EndingStep::Syncing);
        assert_eq!(steps[20], EndingStep::Revealed);
        assert_eq!(seq.progress(), 100);
        assert!(seq.is_revealed());
    }

    #[test]
    fn progress_is_capped_at_threshold() {
        let mut seq = EndingSequence::new(EndingTiming {
            progress_step: 30,
            ..EndingTiming::immediate()
        });
        seq.start();
        let steps = run_to_rest(&mut seq);
        assert_eq!(
            steps,
            vec![
                EndingStep::Progressed { progress: 30 },
                EndingStep::Progressed { progress: 60 },
                EndingStep::Progressed { progress: 90 },
                EndingStep::Syncing,
                EndingStep::Revealed,
            ]
        );
        assert_eq!(seq.progress(), 100);
    }

    #[test]
    fn delays_follow_stage() {
        let mut seq = EndingSequence::default();
        assert!(seq.next_tick().is_none());
        seq.start();
        assert_eq!(seq.next_tick().unwrap().delay, Duration::from_millis(15));
        for _ in 0..20 {
            let epoch = seq.epoch();
            seq.tick(epoch);
        }
        assert_eq!(seq.stage(), EndingStage::Syncing);
        assert_eq!(seq.next_tick().unwrap().delay, Duration::from_millis(400));
    }

    #[test]
    fn second_start_is_a_no_op() {
        let mut seq = EndingSequence::default();
        assert!(seq.start());
        let epoch = seq.epoch();
        seq.tick(epoch);
        assert!(!seq.start());
        assert_eq!(seq.progress(), 5);
        assert_eq!(seq.epoch(), epoch);
    }

    #[test]
    fn stale_epoch_is_ignored() {
        let mut seq = EndingSequence::default();
        seq.start();
        let stale = seq.next_tick().unwrap();
        seq.reset();
        seq.start();
        assert_eq!(seq.tick(stale.epoch), EndingStep::Ignored);
        assert_eq!(seq.progress(), 0);
    }

    #[test]
    fn reveal_and_idle_ignore_ticks() {
        let mut seq = EndingSequence::default();
        assert_eq!(seq.tick(seq.epoch()), EndingStep::Ignored);
        seq.start();
        run_to_rest(&mut seq);
        assert_eq!(seq.tick(seq.epoch()), EndingStep::Ignored);
        assert_eq!(seq.stage(), EndingStage::Reveal);
    }
}
