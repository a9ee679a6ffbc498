use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine mode preset trading pace against degradation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strategy {
    Aggressive,
    #[default]
    Balanced,
    Conservative,
}

/// Multipliers carried by a strategy preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyProfile {
    pub wear: f64,
    /// Reported only; the lap model burns fuel at a flat rate.
    pub fuel: f64,
    pub risk: f64,
    pub performance: f64,
}

const AGGRESSIVE: StrategyProfile = StrategyProfile {
    wear: 1.3,
    fuel: 1.25,
    risk: 1.5,
    performance: 1.12,
};

const BALANCED: StrategyProfile = StrategyProfile {
    wear: 1.0,
    fuel: 1.0,
    risk: 1.0,
    performance: 1.0,
};

const CONSERVATIVE: StrategyProfile = StrategyProfile {
    wear: 0.8,
    fuel: 0.8,
    risk: 0.6,
    performance: 0.92,
};

impl Strategy {
    pub const ALL: [Self; 3] = [Self::Aggressive, Self::Balanced, Self::Conservative];

    #[must_use]
    pub const fn profile(self) -> StrategyProfile {
        match self {
            Self::Aggressive => AGGRESSIVE,
            Self::Balanced => BALANCED,
            Self::Conservative => CONSERVATIVE,
        }
    }

    /// Short label shown on the pit wall.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggressive => "Attack",
            Self::Balanced => "Balanced",
            Self::Conservative => "Save",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggressive => "Aggressive",
            Self::Balanced => "Balanced",
            Self::Conservative => "Conservative",
        }
    }

    /// Parse a case-insensitive preset name.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TireCompound {
    Soft,
    #[default]
    Medium,
    Hard,
}

impl TireCompound {
    pub const ALL: [Self; 3] = [Self::Soft, Self::Medium, Self::Hard];

    /// Wear added per lap before the strategy multiplier.
    #[must_use]
    pub const fn base_wear_rate(self) -> f64 {
        match self {
            Self::Soft => 3.0,
            Self::Medium => 2.0,
            Self::Hard => 1.2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Soft => "Soft",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for TireCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
