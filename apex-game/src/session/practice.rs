use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{PRACTICE_BOOST_MAX, PRACTICE_BOOST_MIN, PRACTICE_COMPLETE_PCT};

/// Boosts earned by a completed practice programme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeOutcome {
    pub confidence_boost: u32,
    pub condition_boost: u32,
}

/// Fixed-step practice programme; completes after `100 / step` ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeRun {
    progress: u32,
    step: u32,
    outcome: Option<PracticeOutcome>,
}

impl PracticeRun {
    #[must_use]
    pub fn new(step: u32) -> Self {
        Self {
            progress: 0,
            step: step.max(1),
            outcome: None,
        }
    }

    #[must_use]
    pub const fn progress(&self) -> u32 {
        self.progress
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<PracticeOutcome> {
        self.outcome
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    /// Advance one tick. Returns the outcome on the tick that completes the run.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<PracticeOutcome> {
        if self.is_complete() {
            return None;
        }
        self.progress = (self.progress + self.step).min(PRACTICE_COMPLETE_PCT);
        if self.progress < PRACTICE_COMPLETE_PCT {
            return None;
        }
        let boost = rng.gen_range(PRACTICE_BOOST_MIN..=PRACTICE_BOOST_MAX);
        let outcome = PracticeOutcome {
            confidence_boost: boost,
            condition_boost: boost,
        };
        log::debug!("practice complete, boost {boost}");
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// Tick until the programme completes.
    pub fn run_to_completion<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PracticeOutcome {
        loop {
            if let Some(outcome) = self.outcome {
                return outcome;
            }
            let _ = self.tick(rng);
        }
    }
}
