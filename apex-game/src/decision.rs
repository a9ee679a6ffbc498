//! Post-race narrative decisions and how a chosen option folds into the profile.
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::constants::{DECISION_METER_STEP, METER_MAX};
use crate::numbers::u32_to_f64;
use crate::profile::PlayerProfile;

const DEFAULT_DECISION_DATA: &str = include_str!("../data/decisions.json");

/// The profile dimension an option claims to affect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionEffect {
    Budget,
    Team,
    Condition,
    Relationship,
    Rivalry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub label: String,
    pub effect: DecisionEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub text: String,
    pub option_a: DecisionOption,
    pub option_b: DecisionOption,
    /// Budget debit for option A; negative values are a gain.
    #[serde(default)]
    pub cost_a: f64,
}

impl Decision {
    #[must_use]
    pub const fn option(&self, choice: DecisionChoice) -> &DecisionOption {
        match choice {
            DecisionChoice::A => &self.option_a,
            DecisionChoice::B => &self.option_b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionChoice {
    A,
    B,
}

/// How a resolved decision touches the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPolicy {
    /// Only option A's cost reaches the budget; option B is cosmetic.
    #[default]
    CostOnly,
    /// Option A's cost plus the stated non-budget effect of whichever option was picked.
    ApplyEffects,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DecisionCatalog {
    #[serde(default)]
    pub decisions: Vec<Decision>,
}

impl DecisionCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_DECISION_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<DecisionCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a decision catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Uniform draw over the catalog.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Decision> {
        if self.decisions.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.decisions.len());
        self.decisions.get(idx)
    }
}

/// Fold the chosen option into a fresh snapshot.
#[must_use]
pub fn apply_decision(
    profile: &PlayerProfile,
    decision: &Decision,
    choice: DecisionChoice,
    policy: DecisionPolicy,
    now: DateTime<Utc>,
) -> PlayerProfile {
    let mut next = profile.clone();
    if choice == DecisionChoice::A {
        next.budget -= decision.cost_a;
    }
    if policy == DecisionPolicy::ApplyEffects {
        apply_effect(&mut next, decision.option(choice).effect);
    }
    log::debug!(
        "decision {} resolved with option {:?} under {:?}",
        decision.id,
        choice,
        policy
    );
    next.touch(now);
    next
}

fn apply_effect(profile: &mut PlayerProfile, effect: DecisionEffect) {
    match effect {
        DecisionEffect::Budget => {}
        DecisionEffect::Team => {
            profile.reputation.team = profile.reputation.team.saturating_add(DECISION_METER_STEP);
        }
        DecisionEffect::Condition => {
            let step = u32_to_f64(DECISION_METER_STEP.unsigned_abs());
            profile.driver_stats.conditioning =
                (profile.driver_stats.conditioning + step).clamp(0.0, METER_MAX);
        }
        DecisionEffect::Relationship => {
            profile.teammate_relationship = profile
                .teammate_relationship
                .saturating_add(DECISION_METER_STEP);
        }
        DecisionEffect::Rivalry => {
            profile.teammate_relationship = profile
                .teammate_relationship
                .saturating_sub(DECISION_METER_STEP);
        }
    }
}
