use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use super::SessionError;
use super::strategy::{Strategy, TireCompound};
use crate::config::{GameConfig, RaceTuning};
use crate::constants::{
    GRID_SIZE, LOG_LIGHTS_OUT, LOG_LOST_PLACE, METER_MAX, PIT_STATIONARY_SECS,
    RACE_FALLBACK_GRID_SLOT, RACE_START_GAP_AHEAD, RACE_START_GAP_BEHIND, RACE_START_TRACK_TEMP,
    RACE_START_WIND,
};
use crate::data::Race;
use crate::narrative::{Narrator, ProfileSummary, RadioContext, narrate_race};
use crate::numbers::{position_index, u32_to_f64};
use crate::profile::{CarStats, DriverStats, PlayerProfile, RaceResult, RaceSession};
use crate::rng::roll;

/// Most-recent-first race feed.
pub type RaceEventLog = SmallVec<[String; 5]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Sunny,
    Overcast,
    Rainy,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sunny => "Sunny",
            Self::Overcast => "Overcast",
            Self::Rainy => "Rainy",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MechanicalFault {
    GearboxSync,
    ErsFail,
    DrsStuck,
    SensorTire,
    SensorFuel,
    AeroDmg,
}

/// Ephemeral telemetry for a race in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveRaceState {
    pub lap: u32,
    pub total_laps: u32,
    pub position: u8,
    /// Percent of tread consumed, `0..=100`.
    pub tire_wear: f64,
    pub fuel_level: f64,
    pub weather: Weather,
    pub track_temp: f64,
    pub wind_speed: f64,
    pub gap_to_ahead: f64,
    pub gap_to_behind: f64,
    pub events: RaceEventLog,
    pub faults: Vec<MechanicalFault>,
    /// Live copies of the driver meters; the profile is not touched mid-race.
    pub conditioning: f64,
    pub confidence: f64,
}

impl LiveRaceState {
    /// Lights-out state for a grid slot (P10 when qualifying never ran).
    #[must_use]
    pub fn lights_out(total_laps: u32, grid_slot: Option<u8>, driver: &DriverStats) -> Self {
        let mut events = RaceEventLog::new();
        events.push(LOG_LIGHTS_OUT.to_string());
        Self {
            lap: 1,
            total_laps,
            position: grid_slot.unwrap_or(RACE_FALLBACK_GRID_SLOT).clamp(1, GRID_SIZE),
            tire_wear: 0.0,
            fuel_level: 100.0,
            weather: Weather::Sunny,
            track_temp: RACE_START_TRACK_TEMP,
            wind_speed: RACE_START_WIND,
            gap_to_ahead: RACE_START_GAP_AHEAD,
            gap_to_behind: RACE_START_GAP_BEHIND,
            events,
            faults: Vec::new(),
            conditioning: driver.conditioning,
            confidence: driver.confidence,
        }
    }

    #[must_use]
    pub const fn is_final_lap_reached(&self) -> bool {
        self.lap >= self.total_laps
    }

    #[must_use]
    pub fn last_event(&self) -> Option<&str> {
        self.events.first().map(String::as_str)
    }
}

/// Position change produced by one lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LapOutcome {
    Overtake { position: u8, turn: u32 },
    LostPlace { position: u8 },
    Held,
}

/// Progress of a pit countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitTick {
    Counting { remaining: u32 },
    Released { compound: TireCompound },
}

/// Lap-by-lap simulation of one race for the player's car.
#[derive(Debug, Clone)]
pub struct RaceSimulator {
    race: Race,
    driver: DriverStats,
    car: CarStats,
    points_table: Vec<u32>,
    tuning: RaceTuning,
    pit_countdown_secs: u32,
    state: LiveRaceState,
    strategy: Strategy,
    compound: TireCompound,
    pit_countdown: Option<u32>,
    started: bool,
    finishing: bool,
}

impl RaceSimulator {
    /// Put the car on the grid.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the profile is not in its race session or
    /// has no qualifying position.
    pub fn new(
        profile: &PlayerProfile,
        race: &Race,
        points_table: &[u32],
        config: &GameConfig,
    ) -> Result<Self, SessionError> {
        if profile.current_session != RaceSession::Race {
            return Err(SessionError::WrongSession {
                expected: RaceSession::Race,
                actual: profile.current_session,
            });
        }
        let grid_slot = profile
            .qualifying_position
            .ok_or(SessionError::MissingQualifyingPosition)?;
        Ok(Self {
            race: race.clone(),
            driver: profile.driver_stats,
            car: profile.car_stats,
            points_table: points_table.to_vec(),
            tuning: config.race.clone(),
            pit_countdown_secs: config.timing.pit_countdown_secs,
            state: LiveRaceState::lights_out(race.laps, Some(grid_slot), &profile.driver_stats),
            strategy: Strategy::default(),
            compound: TireCompound::default(),
            pit_countdown: None,
            started: false,
            finishing: false,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &LiveRaceState {
        &self.state
    }

    #[must_use]
    pub const fn race(&self) -> &Race {
        &self.race
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[must_use]
    pub const fn compound(&self) -> TireCompound {
        self.compound
    }

    #[must_use]
    pub const fn pit_countdown(&self) -> Option<u32> {
        self.pit_countdown
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.pit_countdown.is_some()
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.state.is_final_lap_reached()
    }

    /// Whether the lap timer should be firing.
    #[must_use]
    pub const fn lap_timer_active(&self) -> bool {
        self.started && !self.is_paused() && !self.is_finished()
    }

    /// Leave the grid with the chosen engine mode.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` on a second call.
    pub fn start(&mut self, strategy: Strategy) -> Result<(), SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }
        self.strategy = strategy;
        self.started = true;
        log::debug!(
            "{} started from P{} on {}",
            self.race.name,
            self.state.position,
            strategy
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::PitInProgress` while the car is stationary.
    pub fn set_strategy(&mut self, strategy: Strategy) -> Result<(), SessionError> {
        if self.is_paused() {
            return Err(SessionError::PitInProgress);
        }
        self.strategy = strategy;
        Ok(())
    }

    /// Choose the compound to be fitted by the pending stop.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::CompoundLocked` outside a pit countdown.
    pub fn select_compound(&mut self, compound: TireCompound) -> Result<(), SessionError> {
        if !self.is_paused() {
            return Err(SessionError::CompoundLocked);
        }
        self.compound = compound;
        Ok(())
    }

    /// Draw this lap's rolls and advance one lap.
    ///
    /// # Errors
    ///
    /// See [`Self::apply_lap_roll`].
    pub fn simulate_lap<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<LapOutcome, SessionError> {
        self.ensure_lap_can_run()?;
        let lap_roll = roll(rng);
        let turn = rng.gen_range(1..=self.race.turns.max(1));
        self.apply_lap_roll(lap_roll, turn)
    }

    /// Advance one lap with an explicit roll and overtaking turn.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` before the start, during a pit stop, or once
    /// the final lap has been reached; the state is left untouched.
    pub fn apply_lap_roll(&mut self, lap_roll: f64, turn: u32) -> Result<LapOutcome, SessionError> {
        self.ensure_lap_can_run()?;
        let tuning = &self.tuning;
        let preset = self.strategy.profile();
        let difficulty = self.race.difficulty;

        let stamina_factor = (100.0 - self.driver.stamina) / tuning.stamina_divisor;
        let drain = (tuning.conditioning_drain * difficulty * stamina_factor).max(0.0);
        self.state.conditioning = (self.state.conditioning - drain).clamp(0.0, METER_MAX);

        let tire_life = 100.0 - self.state.tire_wear;
        let tire_perf = if tire_life > tuning.tire_cliff {
            1.0
        } else {
            (tire_life / tuning.tire_cliff).max(tuning.tire_floor)
        };
        let confidence_mult = 0.95 + self.state.confidence / 1000.0;
        let total_perf = self.car.capability() * preset.performance * tire_perf * confidence_mult;
        let threshold = difficulty * tuning.threshold_factor;

        let outcome = if lap_roll > tuning.overtake_roll
            && total_perf > threshold
            && self.state.position > 1
        {
            self.state.position -= 1;
            self.state.confidence = (self.state.confidence + 1.0).min(METER_MAX);
            LapOutcome::Overtake {
                position: self.state.position,
                turn,
            }
        } else if lap_roll < tuning.lose_place_roll
            && total_perf < threshold
            && self.state.position < GRID_SIZE
        {
            self.state.position += 1;
            LapOutcome::LostPlace {
                position: self.state.position,
            }
        } else {
            LapOutcome::Held
        };

        let wear = self.compound.base_wear_rate() * preset.wear;
        self.state.tire_wear = (self.state.tire_wear + wear).min(100.0);
        let burn = 100.0 / u32_to_f64(self.state.total_laps.max(1));
        self.state.fuel_level = (self.state.fuel_level - burn).max(0.0);

        match outcome {
            LapOutcome::Overtake { position, turn } => {
                self.log_event(format!("P{position}! Aggressive move at Turn {turn}."));
            }
            LapOutcome::LostPlace { .. } => self.log_event(LOG_LOST_PLACE.to_string()),
            LapOutcome::Held => {}
        }
        self.state.lap += 1;
        log::debug!(
            "lap {}/{}: P{} perf {total_perf:.3} vs {threshold:.3}, wear {:.1}",
            self.state.lap,
            self.state.total_laps,
            self.state.position,
            self.state.tire_wear
        );
        Ok(outcome)
    }

    /// Call the car in; lap advancement pauses for the countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` before the start, while already stopped, or
    /// after the final lap.
    pub fn initiate_pit(&mut self) -> Result<(), SessionError> {
        if !self.started {
            return Err(SessionError::RaceNotStarted);
        }
        if self.is_paused() || self.is_finished() {
            return Err(SessionError::PitUnavailable);
        }
        self.pit_countdown = Some(self.pit_countdown_secs);
        log::debug!("box this lap ({}s window)", self.pit_countdown_secs);
        Ok(())
    }

    /// One second of the pit countdown. Reaching zero fits fresh tyres.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoPitStop` when no countdown is active.
    pub fn pit_tick(&mut self) -> Result<PitTick, SessionError> {
        let remaining = self.pit_countdown.ok_or(SessionError::NoPitStop)?;
        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.pit_countdown = Some(remaining);
            return Ok(PitTick::Counting { remaining });
        }
        self.pit_countdown = None;
        self.state.tire_wear = 0.0;
        let compound = self.compound;
        self.log_event(format!(
            "Pit Stop: {PIT_STATIONARY_SECS}s. Released on new {compound}s."
        ));
        Ok(PitTick::Released { compound })
    }

    #[must_use]
    pub fn radio_context(&self, car_reliability: f64) -> RadioContext {
        RadioContext {
            lap: self.state.lap,
            total_laps: self.state.total_laps,
            position: self.state.position,
            gap_to_ahead: self.state.gap_to_ahead,
            gap_to_behind: self.state.gap_to_behind,
            tire_wear: self.state.tire_wear,
            fuel_level: self.state.fuel_level,
            weather: self.state.weather,
            strategy: self.strategy.as_str().to_string(),
            car_reliability,
            last_event: self.state.last_event().unwrap_or_default().to_string(),
        }
    }

    /// Classify the finish, drawing the driver-of-the-day roll from `rng`.
    ///
    /// # Errors
    ///
    /// See [`Self::finish_with_roll`].
    pub async fn finish<N: Narrator, R: Rng + ?Sized>(
        &mut self,
        narrator: &N,
        summary: &ProfileSummary,
        rng: &mut R,
    ) -> Result<RaceResult, SessionError> {
        let dotd_roll = roll(rng);
        self.finish_with_roll(narrator, summary, dotd_roll).await
    }

    /// Await the write-up once and produce the race result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when laps remain or a finish is already underway.
    pub async fn finish_with_roll<N: Narrator>(
        &mut self,
        narrator: &N,
        summary: &ProfileSummary,
        dotd_roll: f64,
    ) -> Result<RaceResult, SessionError> {
        if self.finishing {
            return Err(SessionError::FinishInProgress);
        }
        if !self.is_finished() {
            return Err(SessionError::RaceNotFinished {
                lap: self.state.lap,
                total: self.state.total_laps,
            });
        }
        self.finishing = true;
        let position = self.state.position;
        let narrative = narrate_race(narrator, summary, position, &self.race.name).await;
        let points = position_index(position)
            .and_then(|idx| self.points_table.get(idx))
            .copied()
            .unwrap_or(0);
        let driver_of_the_day =
            position <= self.tuning.dotd_max_position && dotd_roll > self.tuning.dotd_roll;
        log::debug!("{} classified P{position}, {points} pts", self.race.name);
        Ok(RaceResult {
            race_name: self.race.name.clone(),
            position,
            points,
            narrative,
            driver_of_the_day,
        })
    }

    fn ensure_lap_can_run(&self) -> Result<(), SessionError> {
        if !self.started {
            return Err(SessionError::RaceNotStarted);
        }
        if self.is_paused() {
            return Err(SessionError::PitInProgress);
        }
        if self.is_finished() {
            return Err(SessionError::RaceOver);
        }
        Ok(())
    }

    fn log_event(&mut self, event: String) {
        self.state.events.insert(0, event);
        self.state.events.truncate(self.tuning.event_log_capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AcademyId, Calendar, TeamCatalog};
    use crate::narrative::OfflineNarrator;
    use crate::profile::NewDriver;
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn race_profile(grid: u8) -> PlayerProfile {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 14, 0, 0).unwrap();
        let mut profile = PlayerProfile::create(
            NewDriver {
                name: "Noa Heller".into(),
                nationality: "DE".into(),
                avatar_seed: "n".into(),
                academy_id: AcademyId::Zenith,
            },
            TeamCatalog::default_catalog(),
            99,
            now,
        );
        profile.current_session = RaceSession::Race;
        profile.qualifying_position = Some(grid);
        profile
    }

    fn short_race(laps: u32, difficulty: f64) -> Race {
        Race {
            laps,
            difficulty,
            ..Calendar::default_calendar().race(0).unwrap().clone()
        }
    }

    fn simulator(grid: u8, race: &Race) -> RaceSimulator {
        let calendar = Calendar::default_calendar();
        RaceSimulator::new(&race_profile(grid), race, &calendar.points_table, &GameConfig::default())
            .unwrap()
    }

    #[test]
    fn requires_race_session_and_grid_slot() {
        let race = short_race(5, 0.5);
        let mut profile = race_profile(4);
        profile.qualifying_position = None;
        let err = RaceSimulator::new(&profile, &race, &[25], &GameConfig::default()).unwrap_err();
        assert_eq!(err, SessionError::MissingQualifyingPosition);

        profile.current_session = RaceSession::Qualifying;
        let err = RaceSimulator::new(&profile, &race, &[25], &GameConfig::default()).unwrap_err();
        assert!(matches!(err, SessionError::WrongSession { .. }));
    }

    #[test]
    fn starts_with_lights_out_state() {
        let race = short_race(50, 0.5);
        let sim = simulator(7, &race);
        let state = sim.state();
        assert_eq!(state.lap, 1);
        assert_eq!(state.position, 7);
        assert!(state.tire_wear.abs() < f64::EPSILON);
        assert_eq!(state.events.as_slice(), [LOG_LIGHTS_OUT.to_string()]);
        assert_eq!(sim.compound(), TireCompound::Medium);
        assert!(!sim.lap_timer_active());
    }

    #[test]
    fn lap_before_start_is_rejected() {
        let race = short_race(5, 0.5);
        let mut sim = simulator(5, &race);
        assert_eq!(sim.apply_lap_roll(0.99, 1), Err(SessionError::RaceNotStarted));
        assert_eq!(sim.state().lap, 1);
    }

    #[test]
    fn high_roll_overtakes_on_easy_track() {
        let race = short_race(10, 0.2);
        let mut sim = simulator(5, &race);
        sim.start(Strategy::Balanced).unwrap();
        let outcome = sim.apply_lap_roll(0.95, 7).unwrap();
        assert_eq!(outcome, LapOutcome::Overtake { position: 4, turn: 7 });
        assert_eq!(sim.state().last_event(), Some("P4! Aggressive move at Turn 7."));
        assert!((sim.state().confidence - 81.0).abs() < 1e-9);
        assert_eq!(sim.state().lap, 2);
        assert!((sim.state().tire_wear - 2.0).abs() < 1e-9);
        assert!((sim.state().fuel_level - 90.0).abs() < 1e-9);
    }

    #[test]
    fn low_roll_loses_place_on_hard_track() {
        let race = short_race(10, 0.95);
        let mut sim = simulator(5, &race);
        sim.start(Strategy::Conservative).unwrap();
        let outcome = sim.apply_lap_roll(0.01, 3).unwrap();
        assert_eq!(outcome, LapOutcome::LostPlace { position: 6 });
        assert_eq!(sim.state().last_event(), Some(LOG_LOST_PLACE));
        assert!((sim.state().tire_wear - 1.6).abs() < 1e-9);
    }

    #[test]
    fn leader_and_backmarker_hold_position() {
        let race = short_race(10, 0.2);
        let mut leader = simulator(1, &race);
        leader.start(Strategy::Aggressive).unwrap();
        assert_eq!(leader.apply_lap_roll(0.99, 1).unwrap(), LapOutcome::Held);

        let hard = short_race(10, 0.99);
        let mut last = simulator(20, &hard);
        last.start(Strategy::Conservative).unwrap();
        assert_eq!(last.apply_lap_roll(0.0, 1).unwrap(), LapOutcome::Held);
    }

    #[test]
    fn conditioning_drains_with_difficulty() {
        let race = short_race(10, 1.0);
        let mut sim = simulator(10, &race);
        sim.start(Strategy::Balanced).unwrap();
        sim.apply_lap_roll(0.5, 1).unwrap();
        // stamina 50 -> 0.3 * 1.0 * (50 / 80)
        assert!((sim.state().conditioning - (100.0 - 0.1875)).abs() < 1e-9);
    }

    #[test]
    fn tick_after_final_lap_is_noop() {
        let race = short_race(3, 0.5);
        let mut sim = simulator(10, &race);
        sim.start(Strategy::Balanced).unwrap();
        sim.apply_lap_roll(0.5, 1).unwrap();
        sim.apply_lap_roll(0.5, 1).unwrap();
        assert!(sim.is_finished());
        let before = sim.state().clone();
        assert_eq!(sim.apply_lap_roll(0.99, 1), Err(SessionError::RaceOver));
        assert_eq!(sim.state(), &before);
        assert_eq!(sim.initiate_pit(), Err(SessionError::PitUnavailable));
    }

    #[test]
    fn pit_stop_pauses_and_resets_wear() {
        let race = short_race(20, 0.5);
        let mut sim = simulator(8, &race);
        sim.start(Strategy::Aggressive).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..4 {
            sim.simulate_lap(&mut rng).unwrap();
        }
        assert!(sim.state().tire_wear > 0.0);
        assert_eq!(sim.select_compound(TireCompound::Soft), Err(SessionError::CompoundLocked));

        sim.initiate_pit().unwrap();
        assert_eq!(sim.initiate_pit(), Err(SessionError::PitUnavailable));
        assert_eq!(sim.simulate_lap(&mut rng), Err(SessionError::PitInProgress));
        assert_eq!(sim.set_strategy(Strategy::Balanced), Err(SessionError::PitInProgress));
        sim.select_compound(TireCompound::Hard).unwrap();

        for remaining in (1..=4).rev() {
            assert_eq!(sim.pit_tick().unwrap(), PitTick::Counting { remaining });
        }
        assert_eq!(
            sim.pit_tick().unwrap(),
            PitTick::Released {
                compound: TireCompound::Hard
            }
        );
        assert!(sim.state().tire_wear.abs() < f64::EPSILON);
        assert_eq!(
            sim.state().last_event(),
            Some("Pit Stop: 2.8s. Released on new Hards.")
        );
        assert_eq!(sim.pit_tick(), Err(SessionError::NoPitStop));
        assert!(sim.lap_timer_active());
    }

    #[test]
    fn event_log_keeps_five_newest() {
        let race = short_race(30, 0.1);
        let mut sim = simulator(20, &race);
        sim.start(Strategy::Balanced).unwrap();
        for turn in 1..=8 {
            sim.apply_lap_roll(0.99, turn).unwrap();
        }
        let events = &sim.state().events;
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], "P12! Aggressive move at Turn 8.");
    }

    #[test]
    fn bounds_hold_over_long_race() {
        let race = short_race(200, 0.7);
        let mut sim = simulator(10, &race);
        sim.start(Strategy::Aggressive).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        while sim.simulate_lap(&mut rng).is_ok() {
            let state = sim.state();
            assert!((0.0..=100.0).contains(&state.tire_wear));
            assert!((0.0..=100.0).contains(&state.conditioning));
            assert!((0.0..=100.0).contains(&state.confidence));
            assert!((1..=20).contains(&state.position));
            assert!(state.fuel_level >= 0.0);
        }
        assert!((sim.state().tire_wear - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn finish_requires_final_lap_and_runs_once() {
        let race = short_race(2, 0.3);
        let mut sim = simulator(3, &race);
        let summary = ProfileSummary::from_profile(&race_profile(3));
        assert!(matches!(
            sim.finish_with_roll(&OfflineNarrator, &summary, 0.9).await,
            Err(SessionError::RaceNotFinished { .. })
        ));
        sim.start(Strategy::Balanced).unwrap();
        sim.apply_lap_roll(0.5, 1).unwrap();

        let result = sim.finish_with_roll(&OfflineNarrator, &summary, 0.9).await.unwrap();
        assert_eq!(result.position, 3);
        assert_eq!(result.points, 15);
        assert!(result.driver_of_the_day);
        assert!(!result.narrative.is_empty());
        assert_eq!(
            sim.finish_with_roll(&OfflineNarrator, &summary, 0.9).await,
            Err(SessionError::FinishInProgress)
        );
    }

    #[tokio::test]
    async fn driver_of_the_day_needs_top_five_and_roll() {
        let race = short_race(1, 0.3);
        let summary = ProfileSummary::from_profile(&race_profile(6));
        let mut sixth = simulator(6, &race);
        let result = sixth.finish_with_roll(&OfflineNarrator, &summary, 0.99).await.unwrap();
        assert!(!result.driver_of_the_day);
        assert_eq!(result.points, 8);

        let mut fifth = simulator(5, &race);
        let result = fifth.finish_with_roll(&OfflineNarrator, &summary, 0.7).await.unwrap();
        assert!(!result.driver_of_the_day);
    }
}
