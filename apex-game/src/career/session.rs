use crate::GameData;
use crate::celebration::{PostRaceFlow, PostRaceStage};
use crate::data::Race;
use crate::decision::{DecisionChoice, apply_decision};
use crate::development::{CarAttribute, DevelopmentError, DriverAttribute, spend_skill_point, spend_tech_point};
use crate::economy::{TradeError, buy_shares, sell_shares};
use crate::narrative::{Narrator, ProfileSummary, radio_message};
use crate::profile::{PlayerProfile, RaceSession};
use crate::rng::{RngBundle, roll};
use crate::session::{
    LiveRaceState, PracticeOutcome, PracticeRun, QualifyingOutcome, QualifyingRun, RaceSimulator,
    SessionError, Strategy, TireCompound,
};
use crate::standings::{Standings, standings};
use crate::timers::{Clock, RaceTimers, TimerFire};

use super::{CareerContext, RaceSettlement, apply_practice, apply_qualifying, settle_race};

#[derive(Debug)]
struct LiveRace {
    sim: RaceSimulator,
    timers: RaceTimers,
}

/// One driver's career in motion: the current snapshot plus whatever weekend
/// session or post-race flow is open against it.
#[derive(Debug)]
pub struct CareerSession<N, C> {
    profile: PlayerProfile,
    data: GameData,
    rng: RngBundle,
    seed: u64,
    narrator: N,
    clock: C,
    race: Option<LiveRace>,
    post_race: Option<PostRaceFlow>,
}

impl<N: Narrator, C: Clock> CareerSession<N, C> {
    #[must_use]
    pub fn new(profile: PlayerProfile, data: GameData, seed: u64, narrator: N, clock: C) -> Self {
        log::debug!("career session for {} opened with seed {seed}", profile.name);
        Self {
            profile,
            data,
            rng: RngBundle::from_user_seed(seed),
            seed,
            narrator,
            clock,
            race: None,
            post_race: None,
        }
    }

    #[must_use]
    pub const fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    #[must_use]
    pub fn into_profile(self) -> PlayerProfile {
        self.profile
    }

    #[must_use]
    pub const fn data(&self) -> &GameData {
        &self.data
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    /// The calendar entry the profile is currently on.
    #[must_use]
    pub fn current_race(&self) -> Option<&Race> {
        self.data.calendar.race(self.profile.current_race_index)
    }

    #[must_use]
    pub fn race_state(&self) -> Option<&LiveRaceState> {
        self.race.as_ref().map(|live| live.sim.state())
    }

    #[must_use]
    pub fn race_simulator(&self) -> Option<&RaceSimulator> {
        self.race.as_ref().map(|live| &live.sim)
    }

    #[must_use]
    pub const fn post_race(&self) -> Option<&PostRaceFlow> {
        self.post_race.as_ref()
    }

    #[must_use]
    pub fn standings(&self) -> Standings {
        standings(&self.profile, &self.data.teams)
    }

    fn ensure_hub(&self) -> Result<(), SessionError> {
        if self.post_race.is_some() {
            Err(SessionError::PostRacePending)
        } else {
            Ok(())
        }
    }

    fn scheduled_race(&self) -> Result<&Race, SessionError> {
        self.current_race().ok_or(SessionError::NoRaceScheduled {
            index: self.profile.current_race_index,
        })
    }

    /// Run the practice programme to 100% and fold the boosts in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` outside practice or while a post-race flow is open.
    pub fn run_practice(&mut self) -> Result<PracticeOutcome, SessionError> {
        self.ensure_hub()?;
        if self.profile.current_session != RaceSession::Practice {
            return Err(SessionError::WrongSession {
                expected: RaceSession::Practice,
                actual: self.profile.current_session,
            });
        }
        let mut run = PracticeRun::new(self.data.config.timing.practice_step);
        let outcome = run.run_to_completion(&mut *self.rng.practice());
        self.profile = apply_practice(&self.profile, outcome, self.clock.now())?;
        log::debug!(
            "practice complete: +{} confidence, +{} conditioning",
            outcome.confidence_boost,
            outcome.condition_boost
        );
        Ok(outcome)
    }

    /// Run a qualifying lap to the line and record the grid slot.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` outside qualifying, with no race scheduled, or
    /// while a post-race flow is open.
    pub fn run_qualifying(&mut self) -> Result<QualifyingOutcome, SessionError> {
        self.ensure_hub()?;
        if self.profile.current_session != RaceSession::Qualifying {
            return Err(SessionError::WrongSession {
                expected: RaceSession::Qualifying,
                actual: self.profile.current_session,
            });
        }
        let race = self.scheduled_race()?;
        let outcome = {
            let mut rng = self.rng.qualifying();
            let mut run = QualifyingRun::start(
                race,
                &self.profile.car_stats,
                self.data.config.timing.qualifying_step,
                &mut *rng,
            );
            run.run_to_completion(&mut *rng)
        };
        self.profile = apply_qualifying(&self.profile, &outcome, self.clock.now())?;
        log::debug!(
            "qualified P{} ({:+.3}s to pole)",
            outcome.grid_position,
            outcome.delta()
        );
        Ok(outcome)
    }

    /// Line up on the grid, go lights out and arm the lap timer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the profile is not in its race session, a
    /// race is already running, or a post-race flow is open.
    pub fn start_race(&mut self, strategy: Strategy) -> Result<&LiveRaceState, SessionError> {
        self.ensure_hub()?;
        if self.race.is_some() {
            return Err(SessionError::AlreadyStarted);
        }
        let race = self.scheduled_race()?;
        let mut sim = RaceSimulator::new(
            &self.profile,
            race,
            &self.data.calendar.points_table,
            &self.data.config,
        )?;
        sim.start(strategy)?;
        let mut timers = RaceTimers::new(&self.data.config.timing);
        timers.start(self.clock.now());
        log::info!("{}: lights out from P{}", race.name, sim.state().position);
        let live = self.race.insert(LiveRace { sim, timers });
        Ok(live.sim.state())
    }

    fn live_race(&mut self) -> Result<&mut LiveRace, SessionError> {
        self.race.as_mut().ok_or(SessionError::NoActiveRace)
    }

    /// Fire every lap or pit tick that has fallen due on the clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveRace` when no race is running.
    pub fn pump_race(&mut self) -> Result<Vec<TimerFire>, SessionError> {
        let now = self.clock.now();
        let live = self.race.as_mut().ok_or(SessionError::NoActiveRace)?;
        Ok(live.timers.pump(&mut live.sim, now, &mut *self.rng.race()))
    }

    /// Call the car in; the lap timer stops until the countdown releases it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when no race is running or a stop is not possible.
    pub fn pit(&mut self) -> Result<(), SessionError> {
        let now = self.clock.now();
        let live = self.live_race()?;
        live.sim.initiate_pit()?;
        live.timers.pit_requested(now);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError` when no race is running or the car is not stopped.
    pub fn select_compound(&mut self, compound: TireCompound) -> Result<(), SessionError> {
        self.live_race()?.sim.select_compound(compound)
    }

    /// # Errors
    ///
    /// Returns `SessionError` when no race is running or the car is in the pits.
    pub fn set_strategy(&mut self, strategy: Strategy) -> Result<(), SessionError> {
        self.live_race()?.sim.set_strategy(strategy)
    }

    /// Ask the engineer for a radio call on the current race state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveRace` when no race is running.
    pub async fn engineer_radio(&self) -> Result<String, SessionError> {
        let live = self.race.as_ref().ok_or(SessionError::NoActiveRace)?;
        let context = live.sim.radio_context(self.profile.car_stats.reliability);
        Ok(radio_message(&self.narrator, &context).await)
    }

    /// Leave the race mid-way. Timers are cancelled and nothing is recorded;
    /// the profile stays in its race session with the grid slot intact.
    pub fn abandon_race(&mut self) -> bool {
        match self.race.take() {
            Some(mut live) => {
                live.timers.cancel();
                log::info!("race abandoned on lap {}", live.sim.state().lap);
                true
            }
            None => false,
        }
    }

    /// Take the flag: classify, settle the result and open the post-race flow.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when no race is running or laps remain. The
    /// profile and the finish stream are unchanged on error.
    pub async fn finish_race(&mut self) -> Result<RaceSettlement, SessionError> {
        let live = self.race.as_mut().ok_or(SessionError::NoActiveRace)?;
        if !live.sim.is_finished() {
            let state = live.sim.state();
            return Err(SessionError::RaceNotFinished {
                lap: state.lap,
                total: state.total_laps,
            });
        }
        let dotd_roll = roll(&mut *self.rng.finish());
        let summary = ProfileSummary::from_profile(&self.profile);
        let result = live
            .sim
            .finish_with_roll(&self.narrator, &summary, dotd_roll)
            .await?;
        let ctx = CareerContext {
            teams: &self.data.teams,
            calendar: &self.data.calendar,
            economy: &self.data.config.economy,
        };
        let settlement = settle_race(&self.profile, result, &ctx, self.clock.now())?;

        if let Some(mut live) = self.race.take() {
            live.timers.cancel();
        }
        self.profile = settlement.profile.clone();
        self.post_race = Some(PostRaceFlow::new(
            settlement.celebrations.clone(),
            &self.data.decisions,
            &mut *self.rng.decision(),
        ));
        self.close_post_race_if_done();
        log::info!(
            "{}: P{} for {} pts",
            settlement.result.race_name,
            settlement.result.position,
            settlement.result.points
        );
        Ok(settlement)
    }

    /// Dismiss the celebration on screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when no celebration is showing.
    pub fn acknowledge(&mut self) -> Result<PostRaceStage, SessionError> {
        let flow = self.post_race.as_mut().ok_or(SessionError::NotCelebrating)?;
        let stage = flow
            .acknowledge(&self.data.decisions, &mut *self.rng.decision())?
            .clone();
        self.close_post_race_if_done();
        Ok(stage)
    }

    /// Resolve the open decision and return to the hub.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotDeciding` when no decision is open.
    pub fn decide(&mut self, choice: DecisionChoice) -> Result<&PlayerProfile, SessionError> {
        let flow = self.post_race.as_mut().ok_or(SessionError::NotDeciding)?;
        let (decision, choice) = flow.decide(choice)?;
        self.profile = apply_decision(
            &self.profile,
            &decision,
            choice,
            self.data.config.decision_policy,
            self.clock.now(),
        );
        self.close_post_race_if_done();
        Ok(&self.profile)
    }

    fn close_post_race_if_done(&mut self) {
        if self.post_race.as_ref().is_some_and(PostRaceFlow::is_complete) {
            self.post_race = None;
        }
    }

    /// # Errors
    ///
    /// See [`buy_shares`].
    pub fn buy_shares(&mut self, team_id: &str, percent: f64) -> Result<&PlayerProfile, TradeError> {
        self.profile = buy_shares(&self.profile, &self.data.teams, team_id, percent, self.clock.now())?;
        Ok(&self.profile)
    }

    /// # Errors
    ///
    /// See [`sell_shares`].
    pub fn sell_shares(&mut self, team_id: &str, percent: f64) -> Result<&PlayerProfile, TradeError> {
        self.profile = sell_shares(&self.profile, &self.data.teams, team_id, percent, self.clock.now())?;
        Ok(&self.profile)
    }

    /// # Errors
    ///
    /// See [`spend_skill_point`].
    pub fn develop_driver(&mut self, attribute: DriverAttribute) -> Result<&PlayerProfile, DevelopmentError> {
        self.profile = spend_skill_point(&self.profile, attribute, self.clock.now())?;
        Ok(&self.profile)
    }

    /// # Errors
    ///
    /// See [`spend_tech_point`].
    pub fn develop_car(&mut self, attribute: CarAttribute) -> Result<&PlayerProfile, DevelopmentError> {
        self.profile = spend_tech_point(&self.profile, attribute, self.clock.now())?;
        Ok(&self.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AcademyId, TeamCatalog};
    use crate::narrative::OfflineNarrator;
    use crate::profile::NewDriver;
    use crate::timers::ManualClock;
    use chrono::{DateTime, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 14, 0, 0).unwrap()
    }

    fn session(seed: u64) -> CareerSession<OfflineNarrator, ManualClock> {
        let profile = PlayerProfile::create(
            NewDriver {
                name: "Noor Haddad".into(),
                nationality: "JO".into(),
                avatar_seed: "n".into(),
                academy_id: AcademyId::Zenith,
            },
            TeamCatalog::default_catalog(),
            seed,
            start(),
        );
        CareerSession::new(profile, GameData::embedded(), seed, OfflineNarrator, ManualClock::new(start()))
    }

    fn drive_to_flag(career: &mut CareerSession<OfflineNarrator, ManualClock>) {
        let laps = career.current_race().map_or(0, |race| race.laps);
        for _ in 0..laps {
            career.clock().advance_ms(800);
            career.pump_race().unwrap();
        }
    }

    #[test]
    fn weekend_sessions_run_in_order() {
        let mut career = session(4);
        assert!(matches!(
            career.run_qualifying(),
            Err(SessionError::WrongSession { .. })
        ));
        career.run_practice().unwrap();
        assert_eq!(career.profile().current_session, RaceSession::Qualifying);
        let quali = career.run_qualifying().unwrap();
        assert_eq!(career.profile().qualifying_position, Some(quali.grid_position));
        assert_eq!(career.profile().current_session, RaceSession::Race);
        let state = career.start_race(Strategy::Balanced).unwrap();
        assert_eq!(state.lap, 1);
        assert!(matches!(
            career.start_race(Strategy::Balanced),
            Err(SessionError::AlreadyStarted)
        ));
    }

    #[test]
    fn pump_without_race_is_rejected() {
        let mut career = session(4);
        assert_eq!(career.pump_race(), Err(SessionError::NoActiveRace));
        assert!(!career.abandon_race());
    }

    #[tokio::test]
    async fn finishing_settles_and_opens_post_race_flow() {
        let mut career = session(9);
        career.run_practice().unwrap();
        career.run_qualifying().unwrap();
        career.start_race(Strategy::Aggressive).unwrap();
        assert!(matches!(
            career.finish_race().await,
            Err(SessionError::RaceNotFinished { .. })
        ));
        drive_to_flag(&mut career);
        let settlement = career.finish_race().await.unwrap();

        let profile = career.profile();
        assert_eq!(profile.current_race_index, 1);
        assert_eq!(profile.current_session, RaceSession::Practice);
        assert_eq!(profile.results.len(), 1);
        assert_eq!(profile.results[0], settlement.result);
        assert!(!settlement.result.narrative.is_empty());
        assert!(career.race_state().is_none());
        assert!(matches!(
            career.run_practice(),
            Err(SessionError::PostRacePending)
        ));

        while matches!(
            career.post_race().map(PostRaceFlow::stage),
            Some(PostRaceStage::Celebrating(_))
        ) {
            career.acknowledge().unwrap();
        }
        let budget = career.profile().budget;
        career.decide(DecisionChoice::B).unwrap();
        assert!((career.profile().budget - budget).abs() < f64::EPSILON);
        assert!(career.post_race().is_none());
        career.run_practice().unwrap();
    }

    #[tokio::test]
    async fn abandoned_race_records_nothing() {
        let mut career = session(2);
        career.run_practice().unwrap();
        career.run_qualifying().unwrap();
        career.start_race(Strategy::Conservative).unwrap();
        career.clock().advance_ms(2_400);
        assert_eq!(career.pump_race().unwrap().len(), 3);
        assert!(career.abandon_race());
        assert!(career.profile().results.is_empty());
        assert_eq!(career.profile().current_session, RaceSession::Race);
        assert_eq!(career.finish_race().await.unwrap_err(), SessionError::NoActiveRace);
    }

    #[tokio::test]
    async fn early_finish_leaves_finish_stream_untouched() {
        let mut career = session(21);
        assert_eq!(career.finish_race().await.unwrap_err(), SessionError::NoActiveRace);
        assert_eq!(career.rng().finish().draws(), 0);

        career.run_practice().unwrap();
        career.run_qualifying().unwrap();
        career.start_race(Strategy::Balanced).unwrap();
        for _ in 0..3 {
            assert!(matches!(
                career.finish_race().await,
                Err(SessionError::RaceNotFinished { .. })
            ));
        }
        assert_eq!(career.rng().finish().draws(), 0);

        drive_to_flag(&mut career);
        career.finish_race().await.unwrap();
        assert!(career.rng().finish().draws() > 0);
    }

    #[tokio::test]
    async fn engineer_answers_during_the_race() {
        let mut career = session(6);
        assert_eq!(career.engineer_radio().await, Err(SessionError::NoActiveRace));
        career.run_practice().unwrap();
        career.run_qualifying().unwrap();
        career.start_race(Strategy::Balanced).unwrap();
        let call = career.engineer_radio().await.unwrap();
        assert!(!call.is_empty());
    }

    #[test]
    fn pit_stop_runs_through_the_session() {
        let mut career = session(12);
        career.run_practice().unwrap();
        career.run_qualifying().unwrap();
        career.start_race(Strategy::Aggressive).unwrap();
        career.clock().advance_ms(1_600);
        career.pump_race().unwrap();
        career.pit().unwrap();
        career.select_compound(TireCompound::Hard).unwrap();
        career.clock().advance_ms(5_000);
        let fired = career.pump_race().unwrap();
        assert_eq!(
            fired.last(),
            Some(&TimerFire::PitRelease {
                compound: TireCompound::Hard
            })
        );
        assert_eq!(career.race_simulator().map(RaceSimulator::compound), Some(TireCompound::Hard));
    }

    #[test]
    fn same_seed_same_weekend() {
        let mut first = session(31);
        let mut second = session(31);
        assert_eq!(first.run_practice().unwrap(), second.run_practice().unwrap());
        assert_eq!(first.run_qualifying().unwrap(), second.run_qualifying().unwrap());
    }
}
