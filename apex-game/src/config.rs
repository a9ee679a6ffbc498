//! Tunable simulation, timing, and economy parameters.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decision::DecisionPolicy;

const DEFAULT_CONFIG_DATA: &str = include_str!("../data/config.json");

/// Top-level configuration; missing sections fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub race: RaceTuning,
    #[serde(default)]
    pub economy: EconomyTuning,
    #[serde(default)]
    pub decision_policy: DecisionPolicy,
}

impl GameConfig {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_CONFIG_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        self.race.validate()?;
        self.economy.validate()
    }
}

/// Timer cadence for the cooperative session loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    pub lap_interval_ms: u64,
    pub pit_countdown_secs: u32,
    pub pit_tick_ms: u64,
    /// Practice progress gained per tick, in percent.
    pub practice_step: u32,
    /// Qualifying progress gained per tick, in percent.
    pub qualifying_step: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lap_interval_ms: 800,
            pit_countdown_secs: 5,
            pit_tick_ms: 1_000,
            practice_step: 10,
            qualifying_step: 0.5,
        }
    }
}

impl TimingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("lapIntervalMs", self.lap_interval_ms),
            ("pitTickMs", self.pit_tick_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        if self.practice_step == 0 || self.practice_step > 100 {
            return Err(ConfigError::RangeViolation {
                field: "practiceStep",
                min: 1.0,
                max: 100.0,
                value: f64::from(self.practice_step),
            });
        }
        if !(self.qualifying_step > 0.0 && self.qualifying_step <= 100.0) {
            return Err(ConfigError::RangeViolation {
                field: "qualifyingStep",
                min: 0.0,
                max: 100.0,
                value: self.qualifying_step,
            });
        }
        Ok(())
    }
}

/// Per-lap race model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RaceTuning {
    /// A roll above this may produce an overtake.
    pub overtake_roll: f64,
    /// A roll below this may cost a place.
    pub lose_place_roll: f64,
    /// Multiplied by track difficulty to obtain the performance threshold.
    pub threshold_factor: f64,
    pub conditioning_drain: f64,
    pub stamina_divisor: f64,
    /// Remaining tire life (percent) below which grip falls off.
    pub tire_cliff: f64,
    pub tire_floor: f64,
    pub event_log_capacity: usize,
    /// A roll above this grants driver of the day to an eligible finisher.
    pub dotd_roll: f64,
    pub dotd_max_position: u8,
}

impl Default for RaceTuning {
    fn default() -> Self {
        Self {
            overtake_roll: 0.88,
            lose_place_roll: 0.08,
            threshold_factor: 0.9,
            conditioning_drain: 0.3,
            stamina_divisor: 80.0,
            tire_cliff: 30.0,
            tire_floor: 0.4,
            event_log_capacity: 5,
            dotd_roll: 0.7,
            dotd_max_position: 5,
        }
    }
}

impl RaceTuning {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("overtakeRoll", self.overtake_roll),
            ("losePlaceRoll", self.lose_place_roll),
            ("tireFloor", self.tire_floor),
            ("dotdRoll", self.dotd_roll),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: 1.0,
                    value,
                });
            }
        }
        if self.lose_place_roll > self.overtake_roll {
            return Err(ConfigError::RollBandsOverlap {
                lose: self.lose_place_roll,
                overtake: self.overtake_roll,
            });
        }
        if self.stamina_divisor <= 0.0 {
            return Err(ConfigError::MinViolation {
                field: "staminaDivisor",
                min: 0.0,
                value: self.stamina_divisor,
            });
        }
        if !(self.tire_cliff > 0.0 && self.tire_cliff <= 100.0) {
            return Err(ConfigError::RangeViolation {
                field: "tireCliff",
                min: 0.0,
                max: 100.0,
                value: self.tire_cliff,
            });
        }
        if self.event_log_capacity == 0 {
            return Err(ConfigError::MinViolation {
                field: "eventLogCapacity",
                min: 1.0,
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Reward sizes and championship thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EconomyTuning {
    pub prize_per_place: f64,
    /// Races per season assumed when spreading an annual dividend yield.
    pub dividend_divisor: f64,
    pub dotd_cash: f64,
    pub dotd_skill_points: u32,
    pub wdc_cash: f64,
    pub wdc_skill_points: u32,
    pub wcc_cash: f64,
    pub wcc_tech_points: u32,
    pub wdc_average_threshold: f64,
    pub wdc_points_ratio: f64,
    pub wcc_average_threshold: f64,
    pub telemetry_tech_points: u32,
    pub base_tech_points: u32,
    /// Finishing at or above this position earns a skill point.
    pub skill_point_cutoff: u8,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            prize_per_place: 2_000.0,
            dividend_divisor: 21.0,
            dotd_cash: 1_500.0,
            dotd_skill_points: 1,
            wdc_cash: 50_000.0,
            wdc_skill_points: 10,
            wcc_cash: 30_000.0,
            wcc_tech_points: 10,
            wdc_average_threshold: 3.5,
            wdc_points_ratio: 0.7,
            wcc_average_threshold: 5.0,
            telemetry_tech_points: 2,
            base_tech_points: 1,
            skill_point_cutoff: 10,
        }
    }
}

impl EconomyTuning {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.dividend_divisor <= 0.0 {
            return Err(ConfigError::MinViolation {
                field: "dividendDivisor",
                min: 0.0,
                value: self.dividend_divisor,
            });
        }
        if !(0.0..=1.0).contains(&self.wdc_points_ratio) {
            return Err(ConfigError::RangeViolation {
                field: "wdcPointsRatio",
                min: 0.0,
                max: 1.0,
                value: self.wdc_points_ratio,
            });
        }
        for (field, value) in [
            ("prizePerPlace", self.prize_per_place),
            ("dotdCash", self.dotd_cash),
            ("wdcCash", self.wdc_cash),
            ("wccCash", self.wcc_cash),
        ] {
            if value < 0.0 {
                return Err(ConfigError::MinViolation {
                    field,
                    min: 0.0,
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be a non-zero interval")]
    ZeroInterval { field: &'static str },
    #[error("lose-place roll {lose:.2} exceeds overtake roll {overtake:.2}")]
    RollBandsOverlap { lose: f64, overtake: f64 },
}
