use anyhow::{Context, Result, bail};
use apex_game::{
    AcademyId, CareerSession, GameData, ManualClock, NewDriver, OfflineNarrator, PlayerProfile,
    PostRaceStage, RaceSimulator, TimerFire,
};
use chrono::{DateTime, TimeZone, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::checks::{
    check_celebration_order, check_live_state, check_meters, check_progression,
    check_unique_trophies,
};
use super::policy::{DriverPolicy, DriverStyle, Upgrade};

type Career = CareerSession<OfflineNarrator, ManualClock>;

/// Outcome of one automated career.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerReport {
    pub seed: u64,
    pub style: String,
    pub seasons: u32,
    pub races: usize,
    pub wins: usize,
    pub podiums: usize,
    pub pit_stops: usize,
    pub driver_of_the_day: usize,
    pub season_points: Vec<u32>,
    pub trophies: Vec<String>,
    pub final_budget: f64,
    pub final_tier: String,
    pub violations: Vec<String>,
    pub passed: bool,
    pub duration_ms: u128,
}

#[derive(Debug, Default)]
struct RunTally {
    races: usize,
    wins: usize,
    podiums: usize,
    pit_stops: usize,
    driver_of_the_day: usize,
    season_points: Vec<u32>,
    violations: Vec<String>,
}

impl RunTally {
    fn flag(&mut self, race: usize, violation: Option<String>) {
        if let Some(message) = violation {
            self.violations.push(format!("race {race}: {message}"));
        }
    }
}

fn career_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

const ACADEMIES: [AcademyId; 4] = [
    AcademyId::Zenith,
    AcademyId::Valkyrie,
    AcademyId::Spectre,
    AcademyId::Indie,
];

/// Drives seeded careers through the engine under a driving style.
#[derive(Debug, Clone)]
pub struct CareerRunner {
    data: GameData,
    verbose: bool,
}

impl CareerRunner {
    pub const fn new(data: GameData, verbose: bool) -> Self {
        Self { data, verbose }
    }

    pub fn load_default(verbose: bool) -> Result<Self> {
        let data = GameData::embedded();
        data.config.validate().context("embedded configuration is invalid")?;
        if data.calendar.is_empty() {
            bail!("embedded calendar has no races");
        }
        Ok(Self::new(data, verbose))
    }

    pub const fn data(&self) -> &GameData {
        &self.data
    }

    /// Run `seasons` full seasons for one seed and style.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine refuses a step the runner expects to
    /// be legal; invariant breaches are reported in the result instead.
    pub async fn run(&self, seed: u64, style: DriverStyle, seasons: u32) -> Result<CareerReport> {
        let started = Instant::now();
        let academy = ACADEMIES[usize::try_from(seed % 4).unwrap_or(0)];
        let profile = PlayerProfile::create(
            NewDriver {
                name: format!("Tester {seed}"),
                nationality: "XX".into(),
                avatar_seed: seed.to_string(),
                academy_id: academy,
            },
            &self.data.teams,
            seed,
            career_start(),
        );
        let mut career = CareerSession::new(
            profile,
            self.data.clone(),
            seed,
            OfflineNarrator,
            ManualClock::new(career_start()),
        );
        let mut policy = style.create_policy(seed);
        let mut tally = RunTally::default();
        let total_races = usize::try_from(seasons).unwrap_or(0) * self.data.calendar.len();

        for race in 1..=total_races {
            self.run_weekend(&mut career, policy.as_mut(), &mut tally, race)
                .await
                .with_context(|| format!("seed {seed} {style} race {race}"))?;
        }

        let profile = career.profile();
        tally.flag(total_races, check_unique_trophies(profile));
        let passed = tally.violations.is_empty();
        if self.verbose {
            let status = if passed { "ok".green() } else { "violations".red() };
            println!(
                "   {} seed {seed}: {} races, {} wins, budget {:.0} [{status}]",
                style.label().bright_white(),
                tally.races,
                tally.wins,
                profile.budget
            );
        }
        Ok(CareerReport {
            seed,
            style: style.label().to_string(),
            seasons,
            races: tally.races,
            wins: tally.wins,
            podiums: tally.podiums,
            pit_stops: tally.pit_stops,
            driver_of_the_day: tally.driver_of_the_day,
            season_points: tally.season_points,
            trophies: profile.trophies.iter().map(|t| t.id.clone()).collect(),
            final_budget: profile.budget,
            final_tier: profile.tier.to_string(),
            violations: tally.violations,
            passed,
            duration_ms: started.elapsed().as_millis(),
        })
    }

    async fn run_weekend(
        &self,
        career: &mut Career,
        policy: &mut dyn DriverPolicy,
        tally: &mut RunTally,
        race: usize,
    ) -> Result<()> {
        spend_points(career, policy);
        if let Some((team_id, percent)) = policy.investment(career.profile()) {
            if let Err(err) = career.buy_shares(&team_id, percent) {
                log::debug!("{} skipped investment: {err}", policy.name());
            }
        }

        career.run_practice()?;
        tally.flag(race, check_meters(career.profile()));
        career.run_qualifying()?;
        career.start_race(policy.race_strategy(career.profile()))?;
        self.drive_race(career, policy, tally, race)?;

        let before = career.profile().clone();
        let settlement = career.finish_race().await?;
        tally.races += 1;
        let position = settlement.result.position;
        if position == 1 {
            tally.wins += 1;
        }
        if position <= 3 {
            tally.podiums += 1;
        }
        if settlement.result.driver_of_the_day {
            tally.driver_of_the_day += 1;
        }
        if let Some(review) = settlement.season_review {
            tally.season_points.push(review.career_points);
            log::info!(
                "season {} closed: avg P{:.2}, {} pts",
                review.season,
                review.average_position,
                review.career_points
            );
        }
        tally.flag(race, check_celebration_order(&settlement.celebrations));
        tally.flag(
            race,
            check_progression(&before, career.profile(), self.data.calendar.len()),
        );

        resolve_post_race(career, policy)?;
        tally.flag(race, check_meters(career.profile()));
        Ok(())
    }

    fn drive_race(
        &self,
        career: &mut Career,
        policy: &mut dyn DriverPolicy,
        tally: &mut RunTally,
        race: usize,
    ) -> Result<()> {
        let timing = &self.data.config.timing;
        let laps = career.race_state().map_or(0, |state| state.total_laps);
        // Each lap needs one lap interval; each stop needs a full countdown.
        let budget = usize::try_from(laps).unwrap_or(0) * 10 + 100;

        for _ in 0..budget {
            let paused = career.race_simulator().is_some_and(RaceSimulator::is_paused);
            let step = if paused {
                timing.pit_tick_ms
            } else {
                timing.lap_interval_ms
            };
            career.clock().advance_ms(step);
            let fired: Vec<TimerFire> = career.pump_race()?;
            let Some(state) = career.race_state() else {
                bail!("race vanished mid-run");
            };
            tally.flag(race, check_live_state(state, &fired));
            if state.is_final_lap_reached() {
                return Ok(());
            }
            if !paused && policy.should_pit(state) {
                let compound = policy.compound(state);
                career.pit()?;
                career.select_compound(compound)?;
                tally.pit_stops += 1;
            }
        }
        bail!("race did not reach the flag within {budget} timer steps")
    }
}

fn spend_points(career: &mut Career, policy: &mut dyn DriverPolicy) {
    while let Some(upgrade) = policy.upgrade(career.profile()) {
        let spent = match upgrade {
            Upgrade::Driver(attr) => career.develop_driver(attr).map(|_| ()),
            Upgrade::Car(attr) => career.develop_car(attr).map(|_| ()),
        };
        if let Err(err) = spent {
            log::debug!("{} stopped spending: {err}", policy.name());
            break;
        }
    }
}

fn resolve_post_race(career: &mut Career, policy: &mut dyn DriverPolicy) -> Result<()> {
    while let Some(stage) = career.post_race().map(|flow| flow.stage().clone()) {
        match stage {
            PostRaceStage::Celebrating(_) => {
                career.acknowledge()?;
            }
            PostRaceStage::Deciding(decision) => {
                let choice = policy.decide(career.profile(), &decision);
                career.decide(choice)?;
            }
            PostRaceStage::Hub => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_runner() -> CareerRunner {
        let mut data = GameData::embedded();
        data.calendar.races.truncate(3);
        for race in &mut data.calendar.races {
            race.laps = 15;
        }
        CareerRunner::new(data, false)
    }

    #[tokio::test]
    async fn every_style_completes_a_short_season() {
        let runner = short_runner();
        for style in DriverStyle::ALL {
            let report = runner.run(11, style, 1).await.unwrap();
            assert_eq!(report.races, 3, "{style}");
            assert_eq!(report.season_points.len(), 1);
            assert!(report.passed, "{style}: {:?}", report.violations);
        }
    }

    #[tokio::test]
    async fn same_seed_same_career() {
        let runner = short_runner();
        let first = runner.run(5, DriverStyle::Random, 2).await.unwrap();
        let second = runner.run(5, DriverStyle::Random, 2).await.unwrap();
        assert_eq!(first.season_points, second.season_points);
        assert_eq!(first.trophies, second.trophies);
        assert!((first.final_budget - second.final_budget).abs() < f64::EPSILON);
    }
}
