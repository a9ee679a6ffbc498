//! Skill and tech point spending.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEVELOPMENT_STEP;
use crate::profile::PlayerProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DriverAttribute {
    Pace,
    Concentration,
    Stamina,
    Experience,
    Conditioning,
    Confidence,
}

impl DriverAttribute {
    pub const ALL: [Self; 6] = [
        Self::Pace,
        Self::Concentration,
        Self::Stamina,
        Self::Experience,
        Self::Conditioning,
        Self::Confidence,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CarAttribute {
    Aerodynamics,
    EnginePower,
    Chassis,
    Reliability,
}

impl CarAttribute {
    pub const ALL: [Self; 4] = [
        Self::Aerodynamics,
        Self::EnginePower,
        Self::Chassis,
        Self::Reliability,
    ];
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DevelopmentError {
    #[error("no skill points available")]
    NoSkillPoints,
    #[error("no tech points available")]
    NoTechPoints,
}

/// Spend one skill point on a driver attribute.
///
/// # Errors
///
/// Returns `DevelopmentError::NoSkillPoints` when the balance is zero.
pub fn spend_skill_point(
    profile: &PlayerProfile,
    attribute: DriverAttribute,
    now: DateTime<Utc>,
) -> Result<PlayerProfile, DevelopmentError> {
    if profile.skill_points == 0 {
        return Err(DevelopmentError::NoSkillPoints);
    }
    let mut next = profile.clone();
    next.skill_points -= 1;
    let stats = &mut next.driver_stats;
    let slot = match attribute {
        DriverAttribute::Pace => &mut stats.pace,
        DriverAttribute::Concentration => &mut stats.concentration,
        DriverAttribute::Stamina => &mut stats.stamina,
        DriverAttribute::Experience => &mut stats.experience,
        DriverAttribute::Conditioning => &mut stats.conditioning,
        DriverAttribute::Confidence => &mut stats.confidence,
    };
    *slot += DEVELOPMENT_STEP;
    stats.clamp_meters();
    next.touch(now);
    Ok(next)
}

/// Spend one tech point on a car attribute.
///
/// # Errors
///
/// Returns `DevelopmentError::NoTechPoints` when the balance is zero.
pub fn spend_tech_point(
    profile: &PlayerProfile,
    attribute: CarAttribute,
    now: DateTime<Utc>,
) -> Result<PlayerProfile, DevelopmentError> {
    if profile.tech_points == 0 {
        return Err(DevelopmentError::NoTechPoints);
    }
    let mut next = profile.clone();
    next.tech_points -= 1;
    let car = &mut next.car_stats;
    let slot = match attribute {
        CarAttribute::Aerodynamics => &mut car.aerodynamics,
        CarAttribute::EnginePower => &mut car.engine_power,
        CarAttribute::Chassis => &mut car.chassis,
        CarAttribute::Reliability => &mut car.reliability,
    };
    *slot += DEVELOPMENT_STEP;
    next.touch(now);
    Ok(next)
}
