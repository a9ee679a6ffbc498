//! Invariants every automated career must hold.
use std::collections::HashSet;

use apex_game::{CelebrationQueue, LiveRaceState, PlayerProfile, TimerFire, TrophyKind};

fn in_meter_range(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

pub fn check_meters(profile: &PlayerProfile) -> Option<String> {
    let stats = &profile.driver_stats;
    if !in_meter_range(stats.conditioning) {
        return Some(format!("conditioning out of range: {:.2}", stats.conditioning));
    }
    if !in_meter_range(stats.confidence) {
        return Some(format!("confidence out of range: {:.2}", stats.confidence));
    }
    None
}

/// Live telemetry bounds, plus fresh tyres right after a release.
pub fn check_live_state(state: &LiveRaceState, fired: &[TimerFire]) -> Option<String> {
    if !in_meter_range(state.tire_wear) {
        return Some(format!("lap {}: tire wear {:.2}", state.lap, state.tire_wear));
    }
    if !in_meter_range(state.conditioning) || !in_meter_range(state.confidence) {
        return Some(format!(
            "lap {}: live meters {:.2}/{:.2}",
            state.lap, state.conditioning, state.confidence
        ));
    }
    if !(1..=20).contains(&state.position) {
        return Some(format!("lap {}: position P{}", state.lap, state.position));
    }
    let released = fired
        .iter()
        .any(|fire| matches!(fire, TimerFire::PitRelease { .. }));
    let lap_after_release = fired
        .iter()
        .skip_while(|fire| !matches!(fire, TimerFire::PitRelease { .. }))
        .any(|fire| matches!(fire, TimerFire::Lap { .. }));
    if released && !lap_after_release && state.tire_wear.abs() > f64::EPSILON {
        return Some(format!("pit release left {:.2}% wear", state.tire_wear));
    }
    None
}

/// Race index and season after a settlement, given the values before it.
pub fn check_progression(
    before: &PlayerProfile,
    after: &PlayerProfile,
    calendar_len: usize,
) -> Option<String> {
    let closes_season = before.current_race_index + 1 >= calendar_len;
    if closes_season {
        if after.current_race_index != 0 || after.season != before.season + 1 {
            return Some(format!(
                "season {} did not roll over (index {}, season {})",
                before.season, after.current_race_index, after.season
            ));
        }
        if after.career_points != 0 || !after.results.is_empty() {
            return Some("season rollover kept points or results".to_string());
        }
    } else if after.current_race_index != before.current_race_index + 1
        || after.season != before.season
    {
        return Some(format!(
            "race index moved {} -> {}",
            before.current_race_index, after.current_race_index
        ));
    }
    None
}

pub fn check_unique_trophies(profile: &PlayerProfile) -> Option<String> {
    let mut seen = HashSet::new();
    profile
        .trophies
        .iter()
        .find(|trophy| !seen.insert((trophy.kind, trophy.year)))
        .map(|trophy| format!("duplicate trophy {}", trophy.id))
}

fn trigger_rank(kind: TrophyKind) -> u8 {
    match kind {
        TrophyKind::Dotd => 0,
        TrophyKind::Wdc => 1,
        TrophyKind::Wcc => 2,
        TrophyKind::Rookie => 3,
    }
}

/// Celebrations must come out DOTD, then WDC, then WCC, each at most once.
pub fn check_celebration_order(queue: &CelebrationQueue) -> Option<String> {
    let kinds = queue.kinds();
    let ordered = kinds
        .windows(2)
        .all(|pair| trigger_rank(pair[0]) < trigger_rank(pair[1]));
    if ordered && !kinds.contains(&TrophyKind::Rookie) {
        None
    } else {
        Some(format!("celebrations out of order: {kinds:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_game::{AcademyId, Celebration, NewDriver, TeamCatalog, Trophy};
    use chrono::{TimeZone, Utc};

    fn rookie() -> PlayerProfile {
        PlayerProfile::create(
            NewDriver {
                name: "Check Driver".into(),
                nationality: "FR".into(),
                avatar_seed: "c".into(),
                academy_id: AcademyId::Indie,
            },
            TeamCatalog::default_catalog(),
            5,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn celebration(kind: TrophyKind) -> Celebration {
        Celebration {
            kind,
            cash: 0.0,
            skill_points: 0,
            tech_points: 0,
        }
    }

    #[test]
    fn flags_meter_overflow() {
        let mut profile = rookie();
        assert!(check_meters(&profile).is_none());
        profile.driver_stats.confidence = 100.5;
        assert!(check_meters(&profile).is_some());
    }

    #[test]
    fn flags_duplicate_trophies() {
        let mut profile = rookie();
        profile.trophies.push(Trophy::new(TrophyKind::Wdc, 2024, "R4 Champion"));
        assert!(check_unique_trophies(&profile).is_none());
        profile.trophies.push(Trophy::new(TrophyKind::Wdc, 2024, "R4 Champion"));
        assert!(check_unique_trophies(&profile).is_some());
    }

    #[test]
    fn celebration_order_is_trigger_order() {
        let mut good = CelebrationQueue::new();
        good.push(celebration(TrophyKind::Dotd));
        good.push(celebration(TrophyKind::Wcc));
        assert!(check_celebration_order(&good).is_none());

        let mut bad = CelebrationQueue::new();
        bad.push(celebration(TrophyKind::Wdc));
        bad.push(celebration(TrophyKind::Dotd));
        assert!(check_celebration_order(&bad).is_some());
    }

    #[test]
    fn progression_wraps_at_calendar_end() {
        let before = rookie();
        let mut after = before.clone();
        after.current_race_index = 1;
        assert!(check_progression(&before, &after, 24).is_none());
        assert!(check_progression(&before, &after, 1).is_some());
        after.current_race_index = 0;
        after.season += 1;
        assert!(check_progression(&before, &after, 1).is_none());
    }
}
