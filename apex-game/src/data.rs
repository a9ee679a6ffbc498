//! Static reference data: tiers, academies, teams, and the season calendar.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::numbers::position_index;

const DEFAULT_TEAM_DATA: &str = include_str!("../data/teams.json");
const DEFAULT_CALENDAR_DATA: &str = include_str!("../data/calendar.json");
const UNKNOWN_DRIVERS: [&str; 2] = ["Unknown A", "Unknown B"];

/// Competition level, ascending in prestige from R4 to R1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Tier {
    #[default]
    R4,
    R3,
    R2,
    R1,
}

impl Tier {
    pub const ALL: [Self; 4] = [Self::R4, Self::R3, Self::R2, Self::R1];

    /// Scale applied to every monetary reward earned in this tier.
    #[must_use]
    pub const fn reward_multiplier(self) -> f64 {
        match self {
            Self::R4 => 1.0,
            Self::R3 => 5.0,
            Self::R2 => 20.0,
            Self::R1 => 100.0,
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::R4 => "R4 Junior Academy",
            Self::R3 => "R3 Regional Series",
            Self::R2 => "R2 Challenger Cup",
            Self::R1 => "Apex World Series",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::R4 => "The proving grounds.",
            Self::R3 => "Technical open-wheel racing.",
            Self::R2 => "One step away from glory.",
            Self::R1 => "The pinnacle of motorsport.",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::R4 => "R4",
            Self::R3 => "R3",
            Self::R2 => "R2",
            Self::R1 => "R1",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sponsoring driver programme chosen at character creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AcademyId {
    Zenith,
    Valkyrie,
    Spectre,
    #[default]
    Indie,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Academy {
    pub id: AcademyId,
    pub name: String,
    pub description: String,
    pub philosophy: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Up,
    Down,
    #[default]
    Stable,
}

/// A constructor entry. Teams are immutable reference data; profiles hold owned copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    #[serde(default)]
    pub academy_id: Option<AcademyId>,
    /// Relative strength, 0-100.
    pub base_performance: f64,
    #[serde(default)]
    pub seat_cost: f64,
    pub market_value: f64,
    /// Annual yield as a fraction (0.05 = 5%), paid out pro-rata per race.
    pub dividend_yield: f64,
    #[serde(default)]
    pub market_trend: MarketTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CircuitType {
    Street,
    #[default]
    Permanent,
    Hybrid,
}

/// A calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub name: String,
    pub laps: u32,
    /// Track difficulty in `0.0..=1.0`.
    pub difficulty: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub length: String,
    pub turns: u32,
    #[serde(default)]
    pub lap_record: String,
    #[serde(default)]
    pub circuit_type: CircuitType,
    #[serde(default)]
    pub drs_zones: u32,
}

/// Teams, academies and the AI driver line-ups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TeamCatalog {
    #[serde(default)]
    pub academies: Vec<Academy>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub drivers: BTreeMap<String, Vec<String>>,
}

impl TeamCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_TEAM_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<TeamCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a team catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn find(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|team| team.id == team_id)
    }

    pub fn in_tier(&self, tier: Tier) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(move |team| team.tier == tier)
    }

    #[must_use]
    pub fn academy(&self, id: AcademyId) -> Option<&Academy> {
        self.academies.iter().find(|academy| academy.id == id)
    }

    /// The R4 seat offered to a rookie from the given academy, falling back to the first team.
    #[must_use]
    pub fn starting_team(&self, academy: AcademyId) -> Option<&Team> {
        self.in_tier(Tier::R4)
            .find(|team| team.academy_id == Some(academy))
            .or_else(|| self.teams.first())
    }

    /// AI driver names for a team's two seats.
    #[must_use]
    pub fn driver_names(&self, team_id: &str) -> Vec<&str> {
        self.drivers.get(team_id).map_or_else(
            || UNKNOWN_DRIVERS.to_vec(),
            |names| names.iter().map(String::as_str).collect(),
        )
    }
}

/// The ordered season calendar together with the championship points table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    #[serde(default)]
    pub points_table: Vec<u32>,
    #[serde(default)]
    pub races: Vec<Race>,
}

impl Calendar {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_CALENDAR_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_calendar() -> &'static Self {
        static CALENDAR: OnceLock<Calendar> = OnceLock::new();
        CALENDAR.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a calendar.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.races.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    #[must_use]
    pub fn race(&self, index: usize) -> Option<&Race> {
        self.races.get(index)
    }

    /// Championship points for a finishing position; zero outside the table.
    #[must_use]
    pub fn points_for(&self, position: u8) -> u32 {
        position_index(position)
            .and_then(|idx| self.points_table.get(idx))
            .copied()
            .unwrap_or(0)
    }

    /// Points awarded for a win.
    #[must_use]
    pub fn winner_points(&self) -> u32 {
        self.points_table.first().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalogs_parse() {
        let teams = TeamCatalog::default_catalog();
        assert_eq!(teams.teams.len(), 20);
        assert_eq!(teams.academies.len(), 4);
        assert_eq!(teams.in_tier(Tier::R4).count(), 10);

        let calendar = Calendar::default_calendar();
        assert_eq!(calendar.len(), 24);
        assert_eq!(calendar.points_table, vec![25, 18, 15, 12, 10, 8, 6, 4, 2, 1]);
        assert_eq!(calendar.race(7).map(|race| race.laps), Some(78));
    }

    #[test]
    fn points_table_is_zero_below_tenth() {
        let calendar = Calendar::default_calendar();
        assert_eq!(calendar.points_for(1), 25);
        assert_eq!(calendar.points_for(10), 1);
        assert_eq!(calendar.points_for(11), 0);
        assert_eq!(calendar.points_for(0), 0);
    }

    #[test]
    fn starting_team_follows_academy() {
        let teams = TeamCatalog::default_catalog();
        let zenith = teams.starting_team(AcademyId::Zenith).expect("zenith seat");
        assert_eq!(zenith.id, "r4_1");
        let indie = teams.starting_team(AcademyId::Indie).expect("indie seat");
        assert_eq!(indie.id, "r4_4");
        assert_eq!(teams.driver_names("missing"), vec!["Unknown A", "Unknown B"]);
    }

    #[test]
    fn tier_multipliers_scale_with_prestige() {
        let multipliers: Vec<f64> = Tier::ALL.iter().map(|t| t.reward_multiplier()).collect();
        assert_eq!(multipliers, vec![1.0, 5.0, 20.0, 100.0]);
        assert_eq!(Tier::R1.to_string(), "R1");
    }
}
