//! Weekend session simulations: practice, qualifying and the race.
mod practice;
mod qualifying;
mod race;
mod strategy;

use thiserror::Error;

use crate::profile::RaceSession;

pub use practice::{PracticeOutcome, PracticeRun};
pub use qualifying::{QualifyingOutcome, QualifyingRun, format_lap_time, grid_position_for_delta};
pub use race::{
    LapOutcome, LiveRaceState, MechanicalFault, PitTick, RaceEventLog, RaceSimulator, Weather,
};
pub use strategy::{Strategy, StrategyProfile, TireCompound};

/// An action that does not apply in the current session or race state.
/// The caller's snapshot is left as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("expected {expected} session, profile is in {actual}")]
    WrongSession {
        expected: RaceSession,
        actual: RaceSession,
    },
    #[error("race session entered without a qualifying position")]
    MissingQualifyingPosition,
    #[error("no race scheduled at calendar index {index}")]
    NoRaceScheduled { index: usize },
    #[error("race has not started")]
    RaceNotStarted,
    #[error("race already started")]
    AlreadyStarted,
    #[error("car is in the pit lane")]
    PitInProgress,
    #[error("final lap already reached")]
    RaceOver,
    #[error("pit stop not available")]
    PitUnavailable,
    #[error("no pit stop in progress")]
    NoPitStop,
    #[error("compound can only be chosen during a pit stop")]
    CompoundLocked,
    #[error("race still running (lap {lap} of {total})")]
    RaceNotFinished { lap: u32, total: u32 },
    #[error("race finish already in progress")]
    FinishInProgress,
    #[error("finishing position {position} is off the grid")]
    PositionOutOfRange { position: u8 },
    #[error("no race in progress")]
    NoActiveRace,
    #[error("no celebration awaiting acknowledgement")]
    NotCelebrating,
    #[error("no decision awaiting a choice")]
    NotDeciding,
    #[error("post-race flow still pending")]
    PostRacePending,
}
