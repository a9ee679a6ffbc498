use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    GRID_SIZE, QUALI_BASE_LAP, QUALI_COMPLETE_PCT, QUALI_DELTA_JITTER, QUALI_DIFFICULTY_SPREAD,
    QUALI_ENGINE_SPAN, QUALI_GRID_BACKMARKER, QUALI_GRID_THRESHOLDS, QUALI_PLAYER_JITTER,
    QUALI_POLE_FACTOR, QUALI_SECTOR_JITTER, QUALI_SECTOR_ONE_PCT, QUALI_SECTOR_TWO_PCT,
};
use crate::data::Race;
use crate::numbers::floor_f64_to_u32;
use crate::profile::CarStats;

/// Final classification of a flying lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualifyingOutcome {
    pub grid_position: u8,
    pub pole_time: f64,
    pub player_time: f64,
    pub sectors: [f64; 3],
}

impl QualifyingOutcome {
    /// Signed gap to the pole lap in seconds.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.player_time - self.pole_time
    }
}

/// One flying lap, revealed sector by sector as progress advances.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifyingRun {
    pole_time: f64,
    player_time: f64,
    step: f64,
    progress: f64,
    sectors: [Option<f64>; 3],
    live_delta: f64,
    outcome: Option<QualifyingOutcome>,
}

impl QualifyingRun {
    /// Fix the pole target and the player's lap time for this track.
    pub fn start<R: Rng + ?Sized>(race: &Race, car: &CarStats, step: f64, rng: &mut R) -> Self {
        let base = QUALI_BASE_LAP + race.difficulty * QUALI_DIFFICULTY_SPREAD;
        let pole_time = base * QUALI_POLE_FACTOR;
        let jitter = rng.gen_range(0.0..QUALI_PLAYER_JITTER);
        let player_time = base * (1.1 - (car.engine_power / 200.0) * QUALI_ENGINE_SPAN) + jitter;
        log::debug!(
            "qualifying at {}: pole {pole_time:.3}s, player {player_time:.3}s",
            race.name
        );
        Self {
            pole_time,
            player_time,
            step: if step > 0.0 { step } else { 0.5 },
            progress: 0.0,
            sectors: [None; 3],
            live_delta: 0.0,
            outcome: None,
        }
    }

    #[must_use]
    pub const fn pole_time(&self) -> f64 {
        self.pole_time
    }

    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub const fn live_delta(&self) -> f64 {
        self.live_delta
    }

    #[must_use]
    pub const fn sectors(&self) -> [Option<f64>; 3] {
        self.sectors
    }

    /// Zero-based index of the sector currently being driven.
    #[must_use]
    pub fn current_sector(&self) -> usize {
        self.sectors.iter().filter(|s| s.is_some()).count().min(2)
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<QualifyingOutcome> {
        self.outcome
    }

    /// Advance one tick. Returns the outcome on the tick that completes the lap.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<QualifyingOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        self.progress = (self.progress + self.step).min(QUALI_COMPLETE_PCT);
        let expected = (self.player_time - self.pole_time) * (self.progress / 100.0);
        self.live_delta = expected + rng.gen_range(-QUALI_DELTA_JITTER..QUALI_DELTA_JITTER);

        let third = self.player_time / 3.0;
        if self.progress >= QUALI_SECTOR_ONE_PCT && self.sectors[0].is_none() {
            self.sectors[0] = Some(third + rng.gen_range(-QUALI_SECTOR_JITTER..QUALI_SECTOR_JITTER));
        }
        if self.progress >= QUALI_SECTOR_TWO_PCT && self.sectors[1].is_none() {
            self.sectors[1] = Some(third + rng.gen_range(-QUALI_SECTOR_JITTER..QUALI_SECTOR_JITTER));
        }
        if self.progress < QUALI_COMPLETE_PCT {
            return None;
        }

        let s1 = self.sectors[0].unwrap_or(third);
        let s2 = self.sectors[1].unwrap_or(third);
        let s3 = self.player_time - s1 - s2;
        self.sectors[2] = Some(s3);

        let slot = grid_position_for_delta(self.player_time - self.pole_time);
        let grid_position = slot.saturating_add(rng.gen_range(0..=1)).clamp(1, GRID_SIZE);
        let outcome = QualifyingOutcome {
            grid_position,
            pole_time: self.pole_time,
            player_time: self.player_time,
            sectors: [s1, s2, s3],
        };
        log::debug!("qualified P{grid_position} ({})", format_lap_time(self.player_time));
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// Tick until the lap completes.
    pub fn run_to_completion<R: Rng + ?Sized>(&mut self, rng: &mut R) -> QualifyingOutcome {
        loop {
            if let Some(outcome) = self.outcome {
                return outcome;
            }
            let _ = self.tick(rng);
        }
    }
}

/// Grid slot for a gap to pole, before jitter.
#[must_use]
pub fn grid_position_for_delta(delta: f64) -> u8 {
    QUALI_GRID_THRESHOLDS
        .iter()
        .find(|(bound, _)| delta <= *bound)
        .map_or(QUALI_GRID_BACKMARKER, |(_, position)| *position)
}

/// `m:ss.mmm`.
#[must_use]
pub fn format_lap_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = floor_f64_to_u32(seconds / 60.0);
    let remainder = seconds - f64::from(minutes) * 60.0;
    format!("{minutes}:{remainder:06.3}")
}
