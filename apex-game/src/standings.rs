//! Championship tables for the player's tier.
use serde::{Deserialize, Serialize};

use crate::data::TeamCatalog;
use crate::numbers::{floor_f64_to_u32, u32_to_f64, usize_to_f64};
use crate::profile::PlayerProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStanding {
    pub name: String,
    pub team_id: String,
    pub points: u32,
    pub is_player: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorStanding {
    pub team_id: String,
    pub team_name: String,
    pub points: u32,
    pub drivers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Standings {
    pub drivers: Vec<DriverStanding>,
    pub constructors: Vec<ConstructorStanding>,
}

impl Standings {
    /// One-based rank of the player in the drivers' table.
    #[must_use]
    pub fn player_rank(&self) -> Option<usize> {
        self.drivers
            .iter()
            .position(|entry| entry.is_player)
            .map(|idx| idx + 1)
    }
}

/// Projected points for an AI seat. Deterministic per team, season and seat.
#[must_use]
pub fn ai_points(base_performance: f64, team_id: &str, season: u32, race_index: usize, seat: usize) -> u32 {
    let char_code = team_id.chars().next().map_or(0, u32::from);
    let phase = u32_to_f64(char_code) + u32_to_f64(season) + usize_to_f64(seat);
    let projected = base_performance / 100.0 * usize_to_f64(race_index) * 15.0 + phase.sin() * 5.0;
    floor_f64_to_u32(projected.max(0.0))
}

/// Drivers' and constructors' tables for every team in the player's tier.
#[must_use]
pub fn standings(profile: &PlayerProfile, teams: &TeamCatalog) -> Standings {
    let player_team = profile.team.as_ref().map(|team| team.id.as_str());
    let mut drivers = Vec::new();
    let mut constructors = Vec::new();

    for team in teams.in_tier(profile.tier) {
        let mut constructor = ConstructorStanding {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            points: 0,
            drivers: Vec::new(),
        };
        for (seat, ai_name) in teams.driver_names(&team.id).into_iter().enumerate() {
            let is_player = seat == 0 && player_team == Some(team.id.as_str());
            let (name, points) = if is_player {
                (profile.name.clone(), profile.career_points)
            } else {
                let points = ai_points(
                    team.base_performance,
                    &team.id,
                    profile.season,
                    profile.current_race_index,
                    seat,
                );
                (ai_name.to_string(), points)
            };
            constructor.points += points;
            constructor.drivers.push(name.clone());
            drivers.push(DriverStanding {
                name,
                team_id: team.id.clone(),
                points,
                is_player,
            });
        }
        constructors.push(constructor);
    }

    drivers.sort_by(|a, b| b.points.cmp(&a.points));
    constructors.sort_by(|a, b| b.points.cmp(&a.points));
    Standings {
        drivers,
        constructors,
    }
}
