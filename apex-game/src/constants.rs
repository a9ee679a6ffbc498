//! Shared tuning constants for the career simulation.

/// Number of cars on the grid; positions are always in `1..=GRID_SIZE`.
pub const GRID_SIZE: u8 = 20;
/// Place count used by the finish prize formula (`(21 - position)`).
pub const PRIZE_PLACES: u8 = GRID_SIZE + 1;

pub const STARTING_AGE: u8 = 16;
pub const STARTING_BUDGET: f64 = 50_000.0;
pub const STARTING_SEASON: u32 = 2024;
pub const STARTING_STANDING: i32 = 50;

/// Upper bound for the short-term driver meters (conditioning, confidence).
pub const METER_MAX: f64 = 100.0;
/// Attribute gain for a single skill or tech point.
pub const DEVELOPMENT_STEP: f64 = 2.0;
/// Ownership ceiling for a single team.
pub const MAX_OWNERSHIP_PCT: f64 = 100.0;

pub const SAVE_SLOT_COUNT: u8 = 4;

pub const PRACTICE_COMPLETE_PCT: u32 = 100;
pub const PRACTICE_BOOST_MIN: u32 = 2;
pub const PRACTICE_BOOST_MAX: u32 = 6;

pub const QUALI_BASE_LAP: f64 = 85.0;
pub const QUALI_DIFFICULTY_SPREAD: f64 = 10.0;
pub const QUALI_POLE_FACTOR: f64 = 0.95;
pub const QUALI_ENGINE_SPAN: f64 = 0.18;
pub const QUALI_PLAYER_JITTER: f64 = 1.5;
pub const QUALI_SECTOR_JITTER: f64 = 0.2;
pub const QUALI_DELTA_JITTER: f64 = 0.025;
pub const QUALI_SECTOR_ONE_PCT: f64 = 33.0;
pub const QUALI_SECTOR_TWO_PCT: f64 = 66.0;
pub const QUALI_COMPLETE_PCT: f64 = 100.0;
/// Upper (inclusive) delta bounds mapped to grid slots, checked in order.
pub const QUALI_GRID_THRESHOLDS: [(f64, u8); 5] =
    [(0.1, 1), (0.3, 2), (0.8, 5), (1.5, 10), (2.5, 16)];
pub const QUALI_GRID_BACKMARKER: u8 = 20;

pub const RACE_START_TRACK_TEMP: f64 = 42.0;
pub const RACE_START_WIND: f64 = 12.0;
pub const RACE_START_GAP_AHEAD: f64 = 1.5;
pub const RACE_START_GAP_BEHIND: f64 = 2.0;
pub const RACE_FALLBACK_GRID_SLOT: u8 = 10;
pub const PIT_STATIONARY_SECS: f64 = 2.8;

pub const LOG_LIGHTS_OUT: &str = "Lights out and away we go!";
pub const LOG_LOST_PLACE: &str = "Lost position! Overtaken on the straight.";

pub const NARRATIVE_FALLBACK: &str = "The race concluded with a solid result for the team.";
pub const NARRATIVE_EMPTY: &str = "A standard performance in a tough field.";
pub const RADIO_FALLBACK: &str = "Radio check. Focus on the race.";
pub const RADIO_EMPTY: &str = "Copy that. Keep your head down and push.";

/// Per-step adjustment used by decision effects on relationship meters.
pub const DECISION_METER_STEP: i32 = 5;
