//! Commentary seam: race write-ups and engineer radio from an external collaborator.
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

use crate::constants::{NARRATIVE_EMPTY, NARRATIVE_FALLBACK, RADIO_EMPTY, RADIO_FALLBACK};
use crate::profile::PlayerProfile;
use crate::session::Weather;

/// The slice of the profile a commentator needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub driver_name: String,
    pub team_name: Option<String>,
    pub tier: String,
    pub season: u32,
}

impl ProfileSummary {
    #[must_use]
    pub fn from_profile(profile: &PlayerProfile) -> Self {
        Self {
            driver_name: profile.name.clone(),
            team_name: profile.team_name().map(str::to_string),
            tier: profile.tier.to_string(),
            season: profile.season,
        }
    }
}

/// Live telemetry handed to the engineer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioContext {
    pub lap: u32,
    pub total_laps: u32,
    pub position: u8,
    pub gap_to_ahead: f64,
    pub gap_to_behind: f64,
    pub tire_wear: f64,
    pub fuel_level: f64,
    pub weather: Weather,
    pub strategy: String,
    pub car_reliability: f64,
    pub last_event: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NarrativeError {
    #[error("narrative service unavailable: {0}")]
    Unavailable(String),
    #[error("narrative request rejected: {0}")]
    Rejected(String),
}

/// External text generator. Implementations may perform network I/O.
pub trait Narrator {
    /// Short post-race write-up for the driver's finish.
    fn race_narrative(
        &self,
        summary: &ProfileSummary,
        position: u8,
        race_name: &str,
    ) -> impl Future<Output = Result<String, NarrativeError>>;

    /// One-line radio call from the race engineer.
    fn engineer_radio(
        &self,
        context: &RadioContext,
    ) -> impl Future<Output = Result<String, NarrativeError>>;
}

/// Await the collaborator once; failures and blank replies degrade to fixed text.
pub async fn narrate_race<N: Narrator>(
    narrator: &N,
    summary: &ProfileSummary,
    position: u8,
    race_name: &str,
) -> String {
    match narrator.race_narrative(summary, position, race_name).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => NARRATIVE_EMPTY.to_string(),
        Err(err) => {
            log::warn!("race narrative failed for {race_name}: {err}");
            NARRATIVE_FALLBACK.to_string()
        }
    }
}

pub async fn radio_message<N: Narrator>(narrator: &N, context: &RadioContext) -> String {
    match narrator.engineer_radio(context).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => RADIO_EMPTY.to_string(),
        Err(err) => {
            log::warn!("engineer radio failed on lap {}: {err}", context.lap);
            RADIO_FALLBACK.to_string()
        }
    }
}

/// Template commentator used when no remote service is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNarrator;

impl Narrator for OfflineNarrator {
    async fn race_narrative(
        &self,
        summary: &ProfileSummary,
        position: u8,
        race_name: &str,
    ) -> Result<String, NarrativeError> {
        let team = summary.team_name.as_deref().unwrap_or("a privateer entry");
        let verdict = match position {
            1 => "a commanding victory that had the paddock on its feet",
            2..=3 => "a podium that keeps the championship alive",
            4..=10 => "hard-earned points after a race of patient defending",
            _ => "a quiet afternoon outside the points",
        };
        Ok(format!(
            "{} brought the {team} car home in P{position} at the {race_name}, {verdict}.",
            summary.driver_name
        ))
    }

    async fn engineer_radio(&self, context: &RadioContext) -> Result<String, NarrativeError> {
        let call = if context.tire_wear > 70.0 {
            "Tyres are going off, box box box."
        } else if context.gap_to_ahead < 1.0 {
            "You're within a second, push for the undercut."
        } else if context.fuel_level < 15.0 {
            "Fuel is marginal, lift and coast into turn one."
        } else {
            "Delta is good, keep it tidy."
        };
        Ok(format!("P{}, lap {}/{}. {call}", context.position, context.lap, context.total_laps))
    }
}
