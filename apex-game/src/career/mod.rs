//! Career state machine: session transitions, race settlement and season rollover.
mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::celebration::{Celebration, CelebrationQueue};
use crate::config::EconomyTuning;
use crate::constants::{GRID_SIZE, METER_MAX};
use crate::data::{Calendar, TeamCatalog, Tier};
use crate::economy::{RaceEarnings, dividend_income, dotd_bonus, finish_prize};
use crate::numbers::{u32_to_f64, usize_to_f64};
use crate::profile::{PlayerProfile, RaceResult, RaceSession, Trophy, TrophyKind};
use crate::session::{PracticeOutcome, QualifyingOutcome, SessionError};

pub use session::CareerSession;

/// Reference data and tuning a settlement reads.
#[derive(Debug, Clone, Copy)]
pub struct CareerContext<'a> {
    pub teams: &'a TeamCatalog,
    pub calendar: &'a Calendar,
    pub economy: &'a EconomyTuning,
}

/// End-of-season evaluation, produced by the race that closes the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonReview {
    pub season: u32,
    pub tier: Tier,
    pub average_position: f64,
    pub career_points: u32,
    pub drivers_title: bool,
    pub constructors_title: bool,
}

/// Everything one finished race changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceSettlement {
    pub profile: PlayerProfile,
    pub result: RaceResult,
    pub earnings: RaceEarnings,
    pub celebrations: CelebrationQueue,
    pub season_review: Option<SeasonReview>,
}

fn expect_session(profile: &PlayerProfile, expected: RaceSession) -> Result<(), SessionError> {
    if profile.current_session == expected {
        Ok(())
    } else {
        Err(SessionError::WrongSession {
            expected,
            actual: profile.current_session,
        })
    }
}

/// Fold a completed practice programme in and move on to qualifying.
///
/// # Errors
///
/// Returns `SessionError::WrongSession` outside practice.
pub fn apply_practice(
    profile: &PlayerProfile,
    outcome: PracticeOutcome,
    now: DateTime<Utc>,
) -> Result<PlayerProfile, SessionError> {
    expect_session(profile, RaceSession::Practice)?;
    let mut next = profile.clone();
    let stats = &mut next.driver_stats;
    stats.confidence = (stats.confidence + u32_to_f64(outcome.confidence_boost)).min(METER_MAX);
    stats.conditioning =
        (stats.conditioning + u32_to_f64(outcome.condition_boost)).min(METER_MAX);
    next.current_session = RaceSession::Qualifying;
    next.touch(now);
    Ok(next)
}

/// Record the grid slot and move on to the race.
///
/// # Errors
///
/// Returns `SessionError::WrongSession` outside qualifying.
pub fn apply_qualifying(
    profile: &PlayerProfile,
    outcome: &QualifyingOutcome,
    now: DateTime<Utc>,
) -> Result<PlayerProfile, SessionError> {
    expect_session(profile, RaceSession::Qualifying)?;
    let mut next = profile.clone();
    next.qualifying_position = Some(outcome.grid_position);
    next.current_session = RaceSession::Race;
    next.touch(now);
    Ok(next)
}

/// Fold a race result into the profile: money, points, progression and,
/// on the last race of the calendar, the season awards and rollover.
///
/// # Errors
///
/// Returns `SessionError` when the profile is not in its race session, the
/// calendar has no race at the current index, or the finishing position is
/// outside the grid.
pub fn settle_race(
    profile: &PlayerProfile,
    result: RaceResult,
    ctx: &CareerContext<'_>,
    now: DateTime<Utc>,
) -> Result<RaceSettlement, SessionError> {
    expect_session(profile, RaceSession::Race)?;
    if !(1..=GRID_SIZE).contains(&result.position) {
        return Err(SessionError::PositionOutOfRange {
            position: result.position,
        });
    }
    if profile.current_race_index >= ctx.calendar.len() {
        return Err(SessionError::NoRaceScheduled {
            index: profile.current_race_index,
        });
    }
    let tuning = ctx.economy;
    let tier = profile.tier;
    let multiplier = tier.reward_multiplier();
    let mut celebrations = CelebrationQueue::new();

    let prize = finish_prize(result.position, tier, tuning);
    let dividends = dividend_income(profile, ctx.teams, tuning);
    let dotd_cash = if result.driver_of_the_day {
        let cash = dotd_bonus(tier, tuning);
        celebrations.push(Celebration {
            kind: TrophyKind::Dotd,
            cash,
            skill_points: tuning.dotd_skill_points,
            tech_points: 0,
        });
        cash
    } else {
        0.0
    };
    let earnings = RaceEarnings::new(prize, dividends, dotd_cash);

    let mut next = profile.clone();
    next.results.push(result.clone());
    next.current_race_index += 1;
    next.current_session = RaceSession::Practice;
    next.qualifying_position = None;
    next.budget += earnings.total;
    next.career_points += result.points;
    next.tech_points += if next.is_sharing_data {
        tuning.telemetry_tech_points
    } else {
        tuning.base_tech_points
    };
    if result.position <= tuning.skill_point_cutoff {
        next.skill_points += 1;
    }
    if result.driver_of_the_day {
        next.skill_points += tuning.dotd_skill_points;
    }
    log::debug!(
        "{} settled: P{} +{} pts, earnings {:.0}",
        result.race_name,
        result.position,
        result.points,
        earnings.total
    );

    let mut season_review = None;
    if next.current_race_index >= ctx.calendar.len() {
        let review = close_season(&mut next, ctx, multiplier, &mut celebrations);
        season_review = Some(review);
    }
    next.touch(now);

    Ok(RaceSettlement {
        profile: next,
        result,
        earnings,
        celebrations,
        season_review,
    })
}

fn close_season(
    profile: &mut PlayerProfile,
    ctx: &CareerContext<'_>,
    multiplier: f64,
    celebrations: &mut CelebrationQueue,
) -> SeasonReview {
    let tuning = ctx.economy;
    let season = profile.season;
    let average_position = profile.average_position().unwrap_or(f64::INFINITY);
    let title_line =
        tuning.wdc_points_ratio * u32_to_f64(ctx.calendar.winner_points()) * usize_to_f64(ctx.calendar.len());

    let mut drivers_title = false;
    if average_position < tuning.wdc_average_threshold
        || u32_to_f64(profile.career_points) > title_line
    {
        let trophy = Trophy::new(TrophyKind::Wdc, season, format!("{} Champion", profile.tier));
        if profile.award_trophy(trophy) {
            let cash = tuning.wdc_cash * multiplier;
            profile.budget += cash;
            profile.skill_points += tuning.wdc_skill_points;
            celebrations.push(Celebration {
                kind: TrophyKind::Wdc,
                cash,
                skill_points: tuning.wdc_skill_points,
                tech_points: 0,
            });
            drivers_title = true;
            log::info!("{} wins the {} {} drivers' title", profile.name, season, profile.tier);
        }
    }

    let mut constructors_title = false;
    if average_position < tuning.wcc_average_threshold {
        let trophy = Trophy::new(TrophyKind::Wcc, season, format!("{} Constructor", profile.tier));
        if profile.award_trophy(trophy) {
            let cash = tuning.wcc_cash * multiplier;
            profile.budget += cash;
            profile.tech_points += tuning.wcc_tech_points;
            celebrations.push(Celebration {
                kind: TrophyKind::Wcc,
                cash,
                skill_points: 0,
                tech_points: tuning.wcc_tech_points,
            });
            constructors_title = true;
            log::info!("{} takes the {} {} constructors' title", profile.name, season, profile.tier);
        }
    }

    let review = SeasonReview {
        season,
        tier: profile.tier,
        average_position,
        career_points: profile.career_points,
        drivers_title,
        constructors_title,
    };
    profile.season += 1;
    profile.current_race_index = 0;
    profile.career_points = 0;
    profile.results.clear();
    log::info!(
        "season {season} closed (avg P{average_position:.2}); season {} begins",
        profile.season
    );
    review
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AcademyId;
    use crate::profile::NewDriver;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    fn rookie() -> PlayerProfile {
        PlayerProfile::create(
            NewDriver {
                name: "Ana Costa".into(),
                nationality: "PT".into(),
                avatar_seed: "a".into(),
                academy_id: AcademyId::Spectre,
            },
            TeamCatalog::default_catalog(),
            77,
            now(),
        )
    }

    fn result(position: u8, dotd: bool) -> RaceResult {
        let calendar = Calendar::default_calendar();
        RaceResult {
            race_name: "Test GP".into(),
            position,
            points: calendar.points_for(position),
            narrative: String::new(),
            driver_of_the_day: dotd,
        }
    }

    fn ctx() -> CareerContext<'static> {
        static ECONOMY: std::sync::OnceLock<EconomyTuning> = std::sync::OnceLock::new();
        CareerContext {
            teams: TeamCatalog::default_catalog(),
            calendar: Calendar::default_calendar(),
            economy: ECONOMY.get_or_init(EconomyTuning::default),
        }
    }

    fn in_race(mut profile: PlayerProfile) -> PlayerProfile {
        profile.current_session = RaceSession::Race;
        profile.qualifying_position = Some(3);
        profile
    }

    #[test]
    fn practice_boost_clamps_and_advances() {
        let mut profile = rookie();
        profile.driver_stats.conditioning = 97.0;
        let next = apply_practice(
            &profile,
            PracticeOutcome {
                confidence_boost: 6,
                condition_boost: 6,
            },
            now(),
        )
        .unwrap();
        assert!((next.driver_stats.conditioning - 100.0).abs() < f64::EPSILON);
        assert!((next.driver_stats.confidence - 86.0).abs() < f64::EPSILON);
        assert_eq!(next.current_session, RaceSession::Qualifying);
        assert!(apply_practice(&next, PracticeOutcome { confidence_boost: 1, condition_boost: 1 }, now()).is_err());
    }

    #[test]
    fn win_pays_prize_and_points() {
        let profile = in_race(rookie());
        let settlement = settle_race(&profile, result(1, false), &ctx(), now()).unwrap();
        let next = &settlement.profile;
        assert!((settlement.earnings.finish_prize - 40_000.0).abs() < f64::EPSILON);
        assert!((next.budget - 90_000.0).abs() < f64::EPSILON);
        assert_eq!(next.career_points, 25);
        assert_eq!(next.tech_points, 2);
        assert_eq!(next.skill_points, 1);
        assert_eq!(next.current_race_index, 1);
        assert_eq!(next.current_session, RaceSession::Practice);
        assert_eq!(next.qualifying_position, None);
        assert!(settlement.celebrations.is_empty());
        assert!(settlement.season_review.is_none());
    }

    #[test]
    fn driver_of_the_day_adds_cash_and_skill_point() {
        let mut profile = in_race(rookie());
        profile.is_sharing_data = false;
        let settlement = settle_race(&profile, result(12, true), &ctx(), now()).unwrap();
        let next = &settlement.profile;
        assert!((settlement.earnings.dotd_bonus - 1_500.0).abs() < f64::EPSILON);
        assert_eq!(next.skill_points, 1);
        assert_eq!(next.tech_points, 1);
        assert_eq!(settlement.celebrations.kinds(), vec![TrophyKind::Dotd]);
    }

    #[test]
    fn settlement_outside_race_is_rejected() {
        let profile = rookie();
        assert!(matches!(
            settle_race(&profile, result(1, false), &ctx(), now()),
            Err(SessionError::WrongSession { .. })
        ));
    }

    #[test]
    fn off_grid_positions_are_rejected() {
        let profile = in_race(rookie());
        for position in [0, 21] {
            assert_eq!(
                settle_race(&profile, result(position, false), &ctx(), now()),
                Err(SessionError::PositionOutOfRange { position })
            );
        }
        let last = settle_race(&profile, result(20, false), &ctx(), now()).unwrap();
        assert!((last.earnings.finish_prize - 2_000.0).abs() < f64::EPSILON);
        assert_eq!(last.profile.skill_points, 0);
    }

    #[test]
    fn final_race_closes_season_with_awards_in_order() {
        let calendar = Calendar::default_calendar();
        let mut profile = in_race(rookie());
        profile.current_race_index = calendar.len() - 1;
        profile.results = (0..calendar.len() - 1).map(|_| result(2, false)).collect();
        profile.career_points = 18 * 23;
        let budget_before = profile.budget;

        let settlement = settle_race(&profile, result(1, true), &ctx(), now()).unwrap();
        assert_eq!(
            settlement.celebrations.kinds(),
            vec![TrophyKind::Dotd, TrophyKind::Wdc, TrophyKind::Wcc]
        );
        let next = &settlement.profile;
        assert_eq!(next.season, 2025);
        assert_eq!(next.current_race_index, 0);
        assert_eq!(next.career_points, 0);
        assert!(next.results.is_empty());
        assert!(next.has_trophy(TrophyKind::Wdc, 2024));
        assert!(next.has_trophy(TrophyKind::Wcc, 2024));
        assert_eq!(next.trophies[0].name, "R4 Champion");
        assert_eq!(next.skill_points, 1 + 1 + 10);
        assert_eq!(next.tech_points, 2 + 10);
        let expected = budget_before + 40_000.0 + 1_500.0 + 50_000.0 + 30_000.0;
        assert!((next.budget - expected).abs() < 1e-6);
        let review = settlement.season_review.unwrap();
        assert!(review.drivers_title && review.constructors_title);
        assert_eq!(review.career_points, 18 * 23 + 25);
    }

    #[test]
    fn midfield_season_earns_no_titles() {
        let calendar = Calendar::default_calendar();
        let mut profile = in_race(rookie());
        profile.current_race_index = calendar.len() - 1;
        profile.results = (0..calendar.len() - 1).map(|_| result(9, false)).collect();
        let settlement = settle_race(&profile, result(9, false), &ctx(), now()).unwrap();
        assert!(settlement.celebrations.is_empty());
        assert!(settlement.profile.trophies.is_empty());
        assert_eq!(settlement.profile.season, 2025);
    }

    #[test]
    fn titles_are_not_duplicated_within_a_season() {
        let calendar = Calendar::default_calendar();
        let mut profile = in_race(rookie());
        profile.award_trophy(Trophy::new(TrophyKind::Wdc, 2024, "R4 Champion"));
        profile.current_race_index = calendar.len() - 1;
        profile.results = (0..calendar.len() - 1).map(|_| result(1, false)).collect();
        let settlement = settle_race(&profile, result(1, false), &ctx(), now()).unwrap();
        let wdc_count = settlement
            .profile
            .trophies
            .iter()
            .filter(|t| t.kind == TrophyKind::Wdc)
            .count();
        assert_eq!(wdc_count, 1);
        assert_eq!(settlement.celebrations.kinds(), vec![TrophyKind::Wcc]);
    }
}
