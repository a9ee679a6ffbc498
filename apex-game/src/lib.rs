//! Apex Racing Career Engine
//!
//! Platform-agnostic core logic for a motorsport career simulation: weekend
//! sessions, race settlement, the team-share economy and season progression.
//! This crate carries no UI or platform-specific dependencies.

pub mod career;
pub mod celebration;
pub mod config;
pub mod constants;
pub mod data;
pub mod decision;
pub mod development;
pub mod economy;
pub mod narrative;
pub mod numbers;
pub mod profile;
pub mod rng;
pub mod session;
pub mod standings;
pub mod storage;
pub mod timers;

// Re-export commonly used types
pub use career::{
    CareerContext, CareerSession, RaceSettlement, SeasonReview, apply_practice, apply_qualifying,
    settle_race,
};
pub use celebration::{Celebration, CelebrationQueue, PostRaceFlow, PostRaceStage};
pub use config::{ConfigError, EconomyTuning, GameConfig, RaceTuning, TimingConfig};
pub use data::{Academy, AcademyId, Calendar, Race, Team, TeamCatalog, Tier};
pub use decision::{
    Decision, DecisionCatalog, DecisionChoice, DecisionEffect, DecisionPolicy, apply_decision,
};
pub use development::{CarAttribute, DevelopmentError, DriverAttribute, spend_skill_point, spend_tech_point};
pub use economy::{RaceEarnings, TradeError, buy_shares, portfolio_value, sell_shares};
pub use narrative::{NarrativeError, Narrator, OfflineNarrator, ProfileSummary, RadioContext};
pub use profile::{
    CarStats, DriverStats, NewDriver, PlayerProfile, RaceResult, RaceSession, Trophy, TrophyKind,
};
pub use rng::RngBundle;
pub use session::{
    LapOutcome, LiveRaceState, PracticeOutcome, QualifyingOutcome, RaceSimulator, SessionError,
    Strategy, TireCompound, Weather,
};
pub use standings::{Standings, standings};
pub use storage::{MemoryStorage, SaveBook, SaveSlot, StorageError};
pub use timers::{Clock, ManualClock, RaceTimers, SystemClock, TimerFire};

use serde::de::Error as _;

const EMBEDDED_TEAMS: &str = include_str!("../data/teams.json");
const EMBEDDED_CALENDAR: &str = include_str!("../data/calendar.json");
const EMBEDDED_DECISIONS: &str = include_str!("../data/decisions.json");
const EMBEDDED_CONFIG: &str = include_str!("../data/config.json");

/// Everything a career session reads but never writes.
#[derive(Debug, Clone, PartialEq)]
pub struct GameData {
    pub teams: TeamCatalog,
    pub calendar: Calendar,
    pub decisions: DecisionCatalog,
    pub config: GameConfig,
}

impl GameData {
    /// The data bundled into the crate.
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            teams: TeamCatalog::default_catalog().clone(),
            calendar: Calendar::default_calendar().clone(),
            decisions: DecisionCatalog::default_catalog().clone(),
            config: GameConfig::default_config(),
        }
    }
}

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load teams, academies and AI line-ups
    ///
    /// # Errors
    ///
    /// Returns an error if the team data cannot be loaded.
    fn load_team_catalog(&self) -> Result<TeamCatalog, Self::Error>;

    /// Load the season calendar and points table
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar cannot be loaded.
    fn load_calendar(&self) -> Result<Calendar, Self::Error>;

    /// Load the post-race decision deck
    ///
    /// # Errors
    ///
    /// Returns an error if the decisions cannot be loaded.
    fn load_decisions(&self) -> Result<DecisionCatalog, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;

    /// Load the full bundle a session needs
    ///
    /// # Errors
    ///
    /// Returns an error if any part fails to load.
    fn load_game_data(&self) -> Result<GameData, Self::Error> {
        Ok(GameData {
            teams: self.load_team_catalog()?,
            calendar: self.load_calendar()?,
            decisions: self.load_decisions()?,
            config: self.load_config("config")?,
        })
    }
}

/// Loader over the JSON compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedData;

impl DataLoader for EmbeddedData {
    type Error = serde_json::Error;

    fn load_team_catalog(&self) -> Result<TeamCatalog, Self::Error> {
        TeamCatalog::from_json(EMBEDDED_TEAMS)
    }

    fn load_calendar(&self) -> Result<Calendar, Self::Error> {
        Calendar::from_json(EMBEDDED_CALENDAR)
    }

    fn load_decisions(&self) -> Result<DecisionCatalog, Self::Error> {
        DecisionCatalog::from_json(EMBEDDED_DECISIONS)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        match config_name {
            "config" => serde_json::from_str(EMBEDDED_CONFIG),
            other => Err(serde_json::Error::custom(format!(
                "no embedded config named {other}"
            ))),
        }
    }
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait SlotStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write the serialized slot list
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn save_slots(&self, blob: &str) -> Result<(), Self::Error>;

    /// Read the serialized slot list, `None` when nothing was ever saved
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be read.
    fn load_slots(&self) -> Result<Option<String>, Self::Error>;
}

/// Main engine tying reference data to the save slots
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: SlotStorage,
{
    data_loader: L,
    saves: SaveBook<S>,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: SlotStorage,
{
    /// Create a new engine with the provided data loader and storage
    pub fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            saves: SaveBook::new(storage),
        }
    }

    pub const fn saves(&self) -> &SaveBook<S> {
        &self.saves
    }

    /// Read the stored slots
    ///
    /// # Errors
    ///
    /// Returns an error if the saves cannot be read or parsed; the previous
    /// slots are kept.
    pub fn load_saves(&mut self) -> Result<(), StorageError> {
        self.saves.load()
    }

    /// Load and validate the reference data
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the configuration is out of bounds.
    pub fn load_data(&self) -> Result<GameData, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let data = self.data_loader.load_game_data().map_err(Into::into)?;
        data.config.validate()?;
        Ok(data)
    }

    /// Create a rookie in a slot
    ///
    /// # Errors
    ///
    /// Returns an error if the team data cannot be loaded or the slot cannot
    /// be written.
    pub fn create_profile(
        &mut self,
        slot_id: u8,
        request: NewDriver,
        entropy: u64,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<PlayerProfile, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let teams = self.data_loader.load_team_catalog().map_err(Into::into)?;
        let profile = self
            .saves
            .create_profile(slot_id, request, &teams, entropy, now)?;
        log::info!("created {} in slot {slot_id}", profile.name);
        Ok(profile)
    }

    /// Open a career session on a slot's profile
    ///
    /// # Errors
    ///
    /// Returns an error if the reference data cannot be loaded.
    pub fn open_session<N, C>(
        &self,
        slot_id: u8,
        seed: u64,
        narrator: N,
        clock: C,
    ) -> Result<Option<CareerSession<N, C>>, anyhow::Error>
    where
        N: Narrator,
        C: Clock,
        L::Error: Into<anyhow::Error>,
    {
        let Some(profile) = self.saves.profile(slot_id).cloned() else {
            return Ok(None);
        };
        let data = self.load_data()?;
        Ok(Some(CareerSession::new(profile, data, seed, narrator, clock)))
    }

    /// Store a session's snapshot back into its slot and persist
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is unknown or empty, or the write fails.
    pub fn commit(&mut self, slot_id: u8, profile: &PlayerProfile) -> Result<(), StorageError> {
        self.saves.update(slot_id, profile.clone())?;
        self.saves.persist()
    }

    /// Clear a slot
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is unknown or the write fails.
    pub fn delete_profile(&mut self, slot_id: u8) -> Result<(), StorageError> {
        self.saves.delete(slot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde::de::DeserializeOwned;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_team_catalog(&self) -> Result<TeamCatalog, Self::Error> {
            Ok(TeamCatalog::default_catalog().clone())
        }

        fn load_calendar(&self) -> Result<Calendar, Self::Error> {
            let mut calendar = Calendar::default_calendar().clone();
            calendar.races.truncate(2);
            Ok(calendar)
        }

        fn load_decisions(&self) -> Result<DecisionCatalog, Self::Error> {
            Ok(DecisionCatalog::default())
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            let parsed = serde_json::from_str("{}").unwrap();
            Ok(parsed)
        }
    }

    fn request() -> NewDriver {
        NewDriver {
            name: "Rosa Vega".into(),
            nationality: "MX".into(),
            avatar_seed: "r".into(),
            academy_id: AcademyId::Indie,
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    }

    #[test]
    fn embedded_loader_matches_bundled_data() {
        let data = EmbeddedData.load_game_data().unwrap();
        assert_eq!(data, GameData::embedded());
        assert!(EmbeddedData.load_config::<GameConfig>("missing").is_err());
    }

    #[test]
    fn engine_creates_commits_and_reopens() {
        let storage = MemoryStorage::default();
        let mut engine = GameEngine::new(FixtureLoader, storage.clone());
        engine.create_profile(1, request(), 5, now()).unwrap();

        let mut session = engine
            .open_session(1, 99, OfflineNarrator, ManualClock::new(now()))
            .unwrap()
            .expect("slot 1 holds a profile");
        assert_eq!(session.data().calendar.len(), 2);
        session.run_practice().unwrap();
        engine.commit(1, session.profile()).unwrap();

        let mut reopened = GameEngine::new(FixtureLoader, storage);
        reopened.load_saves().unwrap();
        let stored = reopened.saves().profile(1).expect("persisted");
        assert_eq!(stored.current_session, RaceSession::Qualifying);
        assert!(
            reopened
                .open_session(2, 1, OfflineNarrator, ManualClock::new(now()))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn invalid_config_is_refused() {
        struct BrokenConfig;
        impl DataLoader for BrokenConfig {
            type Error = Infallible;
            fn load_team_catalog(&self) -> Result<TeamCatalog, Self::Error> {
                Ok(TeamCatalog::default())
            }
            fn load_calendar(&self) -> Result<Calendar, Self::Error> {
                Ok(Calendar::default())
            }
            fn load_decisions(&self) -> Result<DecisionCatalog, Self::Error> {
                Ok(DecisionCatalog::default())
            }
            fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
            where
                T: DeserializeOwned,
            {
                Ok(serde_json::from_str(r#"{ "timing": { "lapIntervalMs": 0 } }"#).unwrap())
            }
        }
        let engine = GameEngine::new(BrokenConfig, MemoryStorage::default());
        assert!(engine.load_data().is_err());
    }
}
