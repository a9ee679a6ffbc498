//! Persistent career state for the active driver.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    METER_MAX, STARTING_AGE, STARTING_BUDGET, STARTING_SEASON, STARTING_STANDING,
};
use crate::data::{AcademyId, Team, TeamCatalog, Tier};

/// Cyclic weekend session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RaceSession {
    #[default]
    Practice,
    Qualifying,
    Race,
}

impl RaceSession {
    /// The session that follows this one within the weekend cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Practice => Self::Qualifying,
            Self::Qualifying => Self::Race,
            Self::Race => Self::Practice,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Practice => "PRACTICE",
            Self::Qualifying => "QUALIFYING",
            Self::Race => "RACE",
        }
    }
}

impl fmt::Display for RaceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver attributes. Conditioning and confidence are 0-100 meters; the rest grow without cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverStats {
    pub pace: f64,
    pub concentration: f64,
    /// Long-term physical attribute; slows conditioning drain during races.
    pub stamina: f64,
    pub experience: f64,
    /// Short-term race readiness.
    pub conditioning: f64,
    /// Mental state, affected by recent form.
    pub confidence: f64,
}

impl Default for DriverStats {
    fn default() -> Self {
        Self {
            pace: 40.0,
            concentration: 40.0,
            stamina: 50.0,
            experience: 0.0,
            conditioning: METER_MAX,
            confidence: 80.0,
        }
    }
}

impl DriverStats {
    /// Keep both meters inside `0..=100`.
    pub fn clamp_meters(&mut self) {
        self.conditioning = self.conditioning.clamp(0.0, METER_MAX);
        self.confidence = self.confidence.clamp(0.0, METER_MAX);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarStats {
    pub aerodynamics: f64,
    pub engine_power: f64,
    pub chassis: f64,
    pub reliability: f64,
}

impl Default for CarStats {
    fn default() -> Self {
        Self {
            aerodynamics: 30.0,
            engine_power: 30.0,
            chassis: 30.0,
            reliability: 60.0,
        }
    }
}

impl CarStats {
    /// Mean of engine, aero and chassis normalised to `0..=1`, then mapped onto `0.5..=1.0`.
    #[must_use]
    pub fn capability(&self) -> f64 {
        let base = (self.engine_power + self.aerodynamics + self.chassis) / 300.0;
        base * 0.5 + 0.5
    }
}

/// Outcome of one race, appended to the season results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub race_name: String,
    pub position: u8,
    pub points: u32,
    pub narrative: String,
    pub driver_of_the_day: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrophyKind {
    Wdc,
    Wcc,
    Dotd,
    Rookie,
}

impl TrophyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wdc => "WDC",
            Self::Wcc => "WCC",
            Self::Dotd => "DOTD",
            Self::Rookie => "ROOKIE",
        }
    }
}

impl fmt::Display for TrophyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trophy {
    /// `{TYPE}_{season}`; unique within a profile.
    pub id: String,
    pub name: String,
    pub year: u32,
    #[serde(rename = "type")]
    pub kind: TrophyKind,
}

impl Trophy {
    #[must_use]
    pub fn key(kind: TrophyKind, season: u32) -> String {
        format!("{kind}_{season}")
    }

    #[must_use]
    pub fn new(kind: TrophyKind, season: u32, name: impl Into<String>) -> Self {
        Self {
            id: Self::key(kind, season),
            name: name.into(),
            year: season,
            kind,
        }
    }
}

/// Ownership stake in a team, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub team_id: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reputation {
    pub board: i32,
    pub fans: i32,
    pub team: i32,
}

impl Default for Reputation {
    fn default() -> Self {
        Self {
            board: STARTING_STANDING,
            fans: 0,
            team: STARTING_STANDING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum InboxKind {
    Urgent,
    Tech,
    #[default]
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: String,
    pub sender: String,
    pub role: String,
    pub subject: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: InboxKind,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Identity choices collected by character creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDriver {
    pub name: String,
    pub nationality: String,
    pub avatar_seed: String,
    pub academy_id: AcademyId,
}

/// The complete career state. Engine operations take a snapshot and return a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    pub nationality: String,
    pub age: u8,
    #[serde(default)]
    pub avatar_seed: String,
    pub tier: Tier,
    pub team: Option<Team>,
    pub budget: f64,
    pub skill_points: u32,
    pub tech_points: u32,
    pub career_points: u32,
    pub driver_stats: DriverStats,
    pub car_stats: CarStats,
    #[serde(default)]
    pub results: Vec<RaceResult>,
    pub season: u32,
    pub current_race_index: usize,
    pub current_session: RaceSession,
    #[serde(default)]
    pub qualifying_position: Option<u8>,
    #[serde(default)]
    pub trophies: Vec<Trophy>,
    #[serde(default)]
    pub lifestyle: Vec<String>,
    #[serde(default)]
    pub investments: Vec<Investment>,
    pub academy_id: AcademyId,
    #[serde(default)]
    pub academy_standing: i32,
    #[serde(default)]
    pub engineer_rapport: i32,
    #[serde(default)]
    pub teammate_relationship: i32,
    #[serde(default)]
    pub is_sharing_data: bool,
    #[serde(default)]
    pub reputation: Reputation,
    #[serde(default)]
    pub inbox: Vec<InboxMessage>,
    #[serde(default)]
    pub news_headlines: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl PlayerProfile {
    /// Build a rookie profile with the fixed starting values and the academy's R4 seat.
    #[must_use]
    pub fn create(
        request: NewDriver,
        catalog: &TeamCatalog,
        entropy: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let team = catalog.starting_team(request.academy_id).cloned();
        Self {
            id: profile_id(entropy),
            name: request.name,
            nationality: request.nationality,
            age: STARTING_AGE,
            avatar_seed: request.avatar_seed,
            tier: Tier::R4,
            team,
            budget: STARTING_BUDGET,
            skill_points: 0,
            tech_points: 0,
            career_points: 0,
            driver_stats: DriverStats::default(),
            car_stats: CarStats::default(),
            results: Vec::new(),
            season: STARTING_SEASON,
            current_race_index: 0,
            current_session: RaceSession::Practice,
            qualifying_position: None,
            trophies: Vec::new(),
            lifestyle: Vec::new(),
            investments: Vec::new(),
            academy_id: request.academy_id,
            academy_standing: STARTING_STANDING,
            engineer_rapport: STARTING_STANDING,
            teammate_relationship: STARTING_STANDING,
            is_sharing_data: true,
            reputation: Reputation::default(),
            inbox: Vec::new(),
            news_headlines: Vec::new(),
            last_updated: now,
        }
    }

    /// Stamp the snapshot with the time of its last mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }

    #[must_use]
    pub fn has_trophy(&self, kind: TrophyKind, season: u32) -> bool {
        let key = Trophy::key(kind, season);
        self.trophies.iter().any(|trophy| trophy.id == key)
    }

    /// Append a trophy unless one with the same `(type, season)` already exists.
    /// Returns whether the trophy was added.
    pub fn award_trophy(&mut self, trophy: Trophy) -> bool {
        if self.trophies.iter().any(|existing| existing.id == trophy.id) {
            return false;
        }
        self.trophies.push(trophy);
        true
    }

    /// Ownership percentage held in a team (0 when none).
    #[must_use]
    pub fn ownership(&self, team_id: &str) -> f64 {
        self.investments
            .iter()
            .find(|inv| inv.team_id == team_id)
            .map_or(0.0, |inv| inv.percentage)
    }

    /// Mean finishing position over the current season, if any race was run.
    #[must_use]
    pub fn average_position(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let total: u32 = self.results.iter().map(|r| u32::from(r.position)).sum();
        Some(f64::from(total) / crate::numbers::usize_to_f64(self.results.len()))
    }

    #[must_use]
    pub fn team_name(&self) -> Option<&str> {
        self.team.as_ref().map(|team| team.name.as_str())
    }
}

/// Format entropy as a version-4 style identifier.
#[must_use]
pub fn profile_id(entropy: u64) -> String {
    let mixed = entropy.rotate_left(29) ^ 0x9E37_79B9_7F4A_7C15;
    format!(
        "{:08x}-{:04x}-4{:03x}-a{:03x}-{:012x}",
        entropy >> 32,
        (entropy >> 16) & 0xFFFF,
        entropy & 0x0FFF,
        (mixed >> 52) & 0x0FFF,
        mixed & 0xFFFF_FFFF_FFFF
    )
}
