use apex_game::{
    AcademyId, Calendar, CareerContext, CareerSession, DecisionChoice, GameData, ManualClock,
    NewDriver, OfflineNarrator, PlayerProfile, PostRaceFlow, PostRaceStage, RaceResult, RaceSession, Strategy,
    TeamCatalog, TimerFire, TrophyKind, settle_race,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap()
}

fn rookie(academy_id: AcademyId) -> PlayerProfile {
    PlayerProfile::create(
        NewDriver {
            name: "Jun Okafor".into(),
            nationality: "NG".into(),
            avatar_seed: "j".into(),
            academy_id,
        },
        TeamCatalog::default_catalog(),
        0xFEED,
        start(),
    )
}

fn short_calendar(races: usize) -> GameData {
    let mut data = GameData::embedded();
    data.calendar.races.truncate(races);
    for race in &mut data.calendar.races {
        race.laps = 12;
    }
    data
}

fn assert_meters(profile: &PlayerProfile) {
    let stats = &profile.driver_stats;
    assert!((0.0..=100.0).contains(&stats.conditioning), "conditioning {}", stats.conditioning);
    assert!((0.0..=100.0).contains(&stats.confidence), "confidence {}", stats.confidence);
}

fn assert_unique_trophies(profile: &PlayerProfile) {
    let mut seen = HashSet::new();
    for trophy in &profile.trophies {
        assert!(seen.insert((trophy.kind, trophy.year)), "duplicate {}", trophy.id);
    }
}

async fn run_weekend(career: &mut CareerSession<OfflineNarrator, ManualClock>, strategy: Strategy) {
    career.run_practice().unwrap();
    assert_meters(career.profile());
    career.run_qualifying().unwrap();
    career.start_race(strategy).unwrap();

    let mut pitted = false;
    loop {
        career.clock().advance_ms(1_000);
        let fired = career.pump_race().unwrap();
        let state = career.race_state().unwrap();
        assert!((0.0..=100.0).contains(&state.tire_wear));
        assert!((0.0..=100.0).contains(&state.conditioning));
        assert!((1..=20).contains(&state.position));
        if fired.iter().any(|f| matches!(f, TimerFire::PitRelease { .. })) {
            assert!(state.tire_wear.abs() < f64::EPSILON);
        }
        if state.is_final_lap_reached() {
            break;
        }
        if !pitted && state.tire_wear > 25.0 {
            career.pit().unwrap();
            pitted = true;
        }
    }
    career.finish_race().await.unwrap();

    loop {
        let deciding = match career.post_race().map(PostRaceFlow::stage) {
            None => break,
            Some(PostRaceStage::Deciding(_)) => true,
            Some(_) => false,
        };
        if deciding {
            career.decide(DecisionChoice::A).unwrap();
        } else {
            career.acknowledge().unwrap();
        }
    }
}

#[tokio::test]
async fn season_rolls_over_after_the_last_race() {
    let data = short_calendar(4);
    let mut career = CareerSession::new(
        rookie(AcademyId::Zenith),
        data,
        2024,
        OfflineNarrator,
        ManualClock::new(start()),
    );

    for completed in 1..4 {
        run_weekend(&mut career, Strategy::Balanced).await;
        let profile = career.profile();
        assert_eq!(profile.current_race_index, completed);
        assert_eq!(profile.results.len(), completed);
        assert_eq!(profile.current_session, RaceSession::Practice);
        assert_meters(profile);
    }

    let points_before: u32 = career.profile().career_points;
    assert_eq!(
        points_before,
        career.profile().results.iter().map(|r| r.points).sum::<u32>()
    );
    run_weekend(&mut career, Strategy::Aggressive).await;
    let profile = career.profile();
    assert_eq!(profile.season, 2025);
    assert_eq!(profile.current_race_index, 0);
    assert_eq!(profile.career_points, 0);
    assert!(profile.results.is_empty());
    assert_unique_trophies(profile);
    assert!(profile.tech_points >= 4);
}

#[tokio::test]
async fn two_seasons_keep_trophies_unique() {
    let data = short_calendar(2);
    let mut career = CareerSession::new(
        rookie(AcademyId::Valkyrie),
        data,
        77,
        OfflineNarrator,
        ManualClock::new(start()),
    );
    for _ in 0..4 {
        run_weekend(&mut career, Strategy::Conservative).await;
        assert_unique_trophies(career.profile());
    }
    assert_eq!(career.profile().season, 2026);
}

#[test]
fn perfect_season_wins_the_title_once() {
    let calendar = Calendar::default_calendar();
    let teams = TeamCatalog::default_catalog();
    let economy = apex_game::EconomyTuning::default();
    let ctx = CareerContext {
        teams,
        calendar,
        economy: &economy,
    };
    let mut profile = rookie(AcademyId::Spectre);
    let mut wdc_celebrations = 0;

    for index in 0..calendar.len() {
        profile.current_session = RaceSession::Race;
        profile.qualifying_position = Some(1);
        let result = RaceResult {
            race_name: calendar.race(index).unwrap().name.clone(),
            position: 1,
            points: calendar.points_for(1),
            narrative: String::new(),
            driver_of_the_day: false,
        };
        let settlement = settle_race(&profile, result, &ctx, start()).unwrap();
        wdc_celebrations += settlement
            .celebrations
            .iter()
            .filter(|c| c.kind == TrophyKind::Wdc)
            .count();
        profile = settlement.profile;
    }

    assert_eq!(wdc_celebrations, 1);
    assert_eq!(
        profile
            .trophies
            .iter()
            .filter(|t| t.kind == TrophyKind::Wdc)
            .count(),
        1
    );
    assert!(profile.has_trophy(TrophyKind::Wdc, 2024));
    assert_eq!(profile.career_points, 0);
    assert_eq!(profile.season, 2025);
    assert_eq!(profile.current_race_index, 0);
}
