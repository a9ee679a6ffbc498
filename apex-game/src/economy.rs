//! Prize money, dividends and share trading.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EconomyTuning;
use crate::constants::{MAX_OWNERSHIP_PCT, PRIZE_PLACES};
use crate::data::{Team, TeamCatalog, Tier};
use crate::profile::{Investment, PlayerProfile};

/// Money credited by one race settlement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RaceEarnings {
    pub finish_prize: f64,
    pub dividend_income: f64,
    pub dotd_bonus: f64,
    pub total: f64,
}

impl RaceEarnings {
    #[must_use]
    pub fn new(finish_prize: f64, dividend_income: f64, dotd_bonus: f64) -> Self {
        Self {
            finish_prize,
            dividend_income,
            dotd_bonus,
            total: finish_prize + dividend_income + dotd_bonus,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TradeError {
    #[error("unknown team {0}")]
    UnknownTeam(String),
    #[error("trade percentage must be positive (got {0:.2})")]
    NonPositivePercent(f64),
    #[error("insufficient budget: need {cost:.0}, have {budget:.0}")]
    InsufficientBudget { cost: f64, budget: f64 },
    #[error("stake in {team_id} would reach {resulting:.2}%")]
    OwnershipCap { team_id: String, resulting: f64 },
    #[error("no shares held in {0}")]
    NothingOwned(String),
}

/// `max(0, (21 - position) * prize_per_place * multiplier)`.
#[must_use]
pub fn finish_prize(position: u8, tier: Tier, tuning: &EconomyTuning) -> f64 {
    let places = f64::from(PRIZE_PLACES) - f64::from(position);
    (places * tuning.prize_per_place * tier.reward_multiplier()).max(0.0)
}

/// Per-race share of every held team's annual dividend.
#[must_use]
pub fn dividend_income(profile: &PlayerProfile, teams: &TeamCatalog, tuning: &EconomyTuning) -> f64 {
    profile
        .investments
        .iter()
        .filter_map(|inv| {
            teams.find(&inv.team_id).map(|team| {
                team.market_value * inv.percentage / 100.0 * team.dividend_yield
                    / tuning.dividend_divisor
            })
        })
        .sum()
}

/// Driver-of-the-day cash, scaled by tier.
#[must_use]
pub fn dotd_bonus(tier: Tier, tuning: &EconomyTuning) -> f64 {
    tuning.dotd_cash * tier.reward_multiplier()
}

#[must_use]
pub fn share_cost(team: &Team, percent: f64) -> f64 {
    team.market_value / 100.0 * percent
}

/// Market value of every stake the profile holds.
#[must_use]
pub fn portfolio_value(profile: &PlayerProfile, teams: &TeamCatalog) -> f64 {
    profile
        .investments
        .iter()
        .filter_map(|inv| teams.find(&inv.team_id).map(|team| share_cost(team, inv.percentage)))
        .sum()
}

/// Buy `percent` of a team.
///
/// # Errors
///
/// Returns `TradeError` when the team is unknown, the percentage is not
/// positive, the stake would exceed 100%, or the budget cannot cover the cost.
pub fn buy_shares(
    profile: &PlayerProfile,
    teams: &TeamCatalog,
    team_id: &str,
    percent: f64,
    now: DateTime<Utc>,
) -> Result<PlayerProfile, TradeError> {
    let team = teams
        .find(team_id)
        .ok_or_else(|| TradeError::UnknownTeam(team_id.to_string()))?;
    if percent <= 0.0 || !percent.is_finite() {
        return Err(TradeError::NonPositivePercent(percent));
    }
    let resulting = profile.ownership(team_id) + percent;
    if resulting > MAX_OWNERSHIP_PCT {
        return Err(TradeError::OwnershipCap {
            team_id: team_id.to_string(),
            resulting,
        });
    }
    let cost = share_cost(team, percent);
    if profile.budget < cost {
        return Err(TradeError::InsufficientBudget {
            cost,
            budget: profile.budget,
        });
    }

    let mut next = profile.clone();
    next.budget -= cost;
    match next.investments.iter_mut().find(|inv| inv.team_id == team_id) {
        Some(inv) => inv.percentage += percent,
        None => next.investments.push(Investment {
            team_id: team_id.to_string(),
            percentage: percent,
        }),
    }
    next.touch(now);
    log::debug!("bought {percent:.2}% of {team_id} for {cost:.0}");
    Ok(next)
}

/// Sell up to `percent` of a team; the sale is capped at the stake held.
///
/// # Errors
///
/// Returns `TradeError` when the team is unknown, the percentage is not
/// positive, or nothing is owned.
pub fn sell_shares(
    profile: &PlayerProfile,
    teams: &TeamCatalog,
    team_id: &str,
    percent: f64,
    now: DateTime<Utc>,
) -> Result<PlayerProfile, TradeError> {
    let team = teams
        .find(team_id)
        .ok_or_else(|| TradeError::UnknownTeam(team_id.to_string()))?;
    if percent <= 0.0 || !percent.is_finite() {
        return Err(TradeError::NonPositivePercent(percent));
    }
    let owned = profile.ownership(team_id);
    if owned <= 0.0 {
        return Err(TradeError::NothingOwned(team_id.to_string()));
    }
    let sold = owned.min(percent);
    let proceeds = share_cost(team, sold);

    let mut next = profile.clone();
    next.budget += proceeds;
    for inv in &mut next.investments {
        if inv.team_id == team_id {
            inv.percentage -= sold;
        }
    }
    next.investments.retain(|inv| inv.percentage > 0.0);
    next.touch(now);
    log::debug!("sold {sold:.2}% of {team_id} for {proceeds:.0}");
    Ok(next)
}
