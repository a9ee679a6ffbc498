use std::fmt;

use apex_game::{
    CarAttribute, Decision, DecisionChoice, DecisionEffect, DriverAttribute, LiveRaceState,
    PlayerProfile, Strategy, TireCompound,
};
use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// A development purchase chosen between races.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upgrade {
    Driver(DriverAttribute),
    Car(CarAttribute),
}

/// Policy interface for automated careers.
pub trait DriverPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Strategy at lights out.
    fn race_strategy(&mut self, profile: &PlayerProfile) -> Strategy;

    /// Whether to call the car in this lap.
    fn should_pit(&mut self, state: &LiveRaceState) -> bool;

    /// Tyres fitted during a stop.
    fn compound(&mut self, state: &LiveRaceState) -> TireCompound;

    /// Answer to the post-race decision.
    fn decide(&mut self, profile: &PlayerProfile, decision: &Decision) -> DecisionChoice;

    /// Next point to spend, if any.
    fn upgrade(&mut self, profile: &PlayerProfile) -> Option<Upgrade>;

    /// Team stake to buy in the hub, as `(team id, percent)`.
    fn investment(&mut self, _profile: &PlayerProfile) -> Option<(String, f64)> {
        None
    }
}

/// Built-in driving styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum DriverStyle {
    Balanced,
    Aggressive,
    Conservative,
    Random,
}

impl DriverStyle {
    pub const ALL: [Self; 4] = [
        Self::Balanced,
        Self::Aggressive,
        Self::Conservative,
        Self::Random,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Balanced => "Balanced",
            Self::Aggressive => "Aggressive",
            Self::Conservative => "Conservative",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn DriverPolicy> {
        match self {
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Aggressive => Box::new(AggressivePolicy),
            Self::Conservative => Box::new(ConservativePolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for DriverStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const PACE_FIRST: [DriverAttribute; 3] = [
    DriverAttribute::Pace,
    DriverAttribute::Concentration,
    DriverAttribute::Experience,
];

fn weakest_car_part(profile: &PlayerProfile) -> CarAttribute {
    let car = &profile.car_stats;
    [
        (CarAttribute::EnginePower, car.engine_power),
        (CarAttribute::Aerodynamics, car.aerodynamics),
        (CarAttribute::Chassis, car.chassis),
    ]
    .into_iter()
    .min_by(|a, b| a.1.total_cmp(&b.1))
    .map_or(CarAttribute::EnginePower, |(attr, _)| attr)
}

fn spend_everything(profile: &PlayerProfile) -> Option<Upgrade> {
    if profile.tech_points > 0 {
        return Some(Upgrade::Car(weakest_car_part(profile)));
    }
    if profile.skill_points > 0 {
        let idx = usize::try_from(profile.skill_points).unwrap_or(0) % PACE_FIRST.len();
        return Some(Upgrade::Driver(PACE_FIRST[idx]));
    }
    None
}

struct BalancedPolicy;
struct AggressivePolicy;
struct ConservativePolicy;

impl DriverPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn race_strategy(&mut self, _profile: &PlayerProfile) -> Strategy {
        Strategy::Balanced
    }

    fn should_pit(&mut self, state: &LiveRaceState) -> bool {
        state.tire_wear > 60.0 && state.total_laps.saturating_sub(state.lap) > 5
    }

    fn compound(&mut self, state: &LiveRaceState) -> TireCompound {
        if state.total_laps.saturating_sub(state.lap) > 25 {
            TireCompound::Hard
        } else {
            TireCompound::Medium
        }
    }

    fn decide(&mut self, profile: &PlayerProfile, decision: &Decision) -> DecisionChoice {
        if decision.cost_a <= profile.budget * 0.1 {
            DecisionChoice::A
        } else {
            DecisionChoice::B
        }
    }

    fn upgrade(&mut self, profile: &PlayerProfile) -> Option<Upgrade> {
        spend_everything(profile)
    }

    fn investment(&mut self, profile: &PlayerProfile) -> Option<(String, f64)> {
        let team = profile.team.as_ref()?;
        (profile.budget > 150_000.0 && profile.ownership(&team.id) < 10.0)
            .then(|| (team.id.clone(), 1.0))
    }
}

impl DriverPolicy for AggressivePolicy {
    fn name(&self) -> &'static str {
        "aggressive"
    }

    fn race_strategy(&mut self, _profile: &PlayerProfile) -> Strategy {
        Strategy::Aggressive
    }

    fn should_pit(&mut self, state: &LiveRaceState) -> bool {
        state.tire_wear > 75.0 && state.total_laps.saturating_sub(state.lap) > 3
    }

    fn compound(&mut self, _state: &LiveRaceState) -> TireCompound {
        TireCompound::Soft
    }

    fn decide(&mut self, _profile: &PlayerProfile, decision: &Decision) -> DecisionChoice {
        if decision.option_b.effect == DecisionEffect::Rivalry {
            DecisionChoice::B
        } else {
            DecisionChoice::A
        }
    }

    fn upgrade(&mut self, profile: &PlayerProfile) -> Option<Upgrade> {
        if profile.skill_points > 0 {
            return Some(Upgrade::Driver(DriverAttribute::Pace));
        }
        (profile.tech_points > 0).then_some(Upgrade::Car(CarAttribute::EnginePower))
    }
}

impl DriverPolicy for ConservativePolicy {
    fn name(&self) -> &'static str {
        "conservative"
    }

    fn race_strategy(&mut self, _profile: &PlayerProfile) -> Strategy {
        Strategy::Conservative
    }

    fn should_pit(&mut self, state: &LiveRaceState) -> bool {
        state.tire_wear > 45.0 && state.total_laps.saturating_sub(state.lap) > 8
    }

    fn compound(&mut self, _state: &LiveRaceState) -> TireCompound {
        TireCompound::Hard
    }

    fn decide(&mut self, _profile: &PlayerProfile, decision: &Decision) -> DecisionChoice {
        if decision.cost_a > 0.0 {
            DecisionChoice::B
        } else {
            DecisionChoice::A
        }
    }

    fn upgrade(&mut self, profile: &PlayerProfile) -> Option<Upgrade> {
        if profile.tech_points > 0 {
            return Some(Upgrade::Car(CarAttribute::Reliability));
        }
        (profile.skill_points > 0).then_some(Upgrade::Driver(DriverAttribute::Stamina))
    }

    fn investment(&mut self, profile: &PlayerProfile) -> Option<(String, f64)> {
        (profile.budget > 100_000.0 && profile.investments.is_empty())
            .then(|| ("r4_10".to_string(), 2.0))
    }
}

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl DriverPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn race_strategy(&mut self, _profile: &PlayerProfile) -> Strategy {
        Strategy::ALL[self.rng.gen_range(0..Strategy::ALL.len())]
    }

    fn should_pit(&mut self, state: &LiveRaceState) -> bool {
        state.tire_wear > 50.0 && self.rng.gen_bool(0.2)
    }

    fn compound(&mut self, _state: &LiveRaceState) -> TireCompound {
        TireCompound::ALL[self.rng.gen_range(0..TireCompound::ALL.len())]
    }

    fn decide(&mut self, _profile: &PlayerProfile, _decision: &Decision) -> DecisionChoice {
        if self.rng.gen_bool(0.5) {
            DecisionChoice::A
        } else {
            DecisionChoice::B
        }
    }

    fn upgrade(&mut self, profile: &PlayerProfile) -> Option<Upgrade> {
        if profile.skill_points > 0 && self.rng.gen_bool(0.5) {
            let attr = DriverAttribute::ALL[self.rng.gen_range(0..DriverAttribute::ALL.len())];
            return Some(Upgrade::Driver(attr));
        }
        (profile.tech_points > 0).then(|| Upgrade::Car(weakest_car_part(profile)))
    }
}
