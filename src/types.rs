// =============================================================================
// Shared types used across the UWR scoring core
// =============================================================================
//
// Categorical fields of the canonical score record.  Every enum serialises to
// the lowercase (kebab-case where needed) strings used on the wire.

use serde::{Deserialize, Serialize};

/// Trade direction carried on a score record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
    Neutral,
    Unknown,
}

impl Default for Direction {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
            Self::Neutral => write!(f, "neutral"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Coarse risk classification of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
    Extreme,
}

impl std::fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Extreme => write!(f, "extreme"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    Perp,
    Futures,
    Options,
    Index,
    Basket,
    Other,
}

impl MarketType {
    /// Parse a free-form market label (e.g. from an enriched signal).
    /// Unrecognised labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "spot" => Self::Spot,
            "perp" | "perpetual" | "perps" => Self::Perp,
            "futures" | "future" => Self::Futures,
            "options" | "option" => Self::Options,
            "index" => Self::Index,
            "basket" => Self::Basket,
            _ => Self::Other,
        }
    }

    /// Default instrument type for this market.
    pub fn default_instrument(self) -> InstrumentType {
        match self {
            Self::Spot => InstrumentType::Spot,
            Self::Perp => InstrumentType::LinearPerp,
            Self::Futures => InstrumentType::Futures,
            Self::Options => InstrumentType::Option,
            Self::Index => InstrumentType::Index,
            Self::Basket => InstrumentType::Synthetic,
            Self::Other => InstrumentType::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Crypto,
    Fx,
    Equity,
    Rates,
    Commodity,
    Multi,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstrumentType {
    Spot,
    LinearPerp,
    InversePerp,
    Futures,
    Option,
    Index,
    Synthetic,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

/// Expected trade duration as reported by an analyst.
///
/// Wider than the set of horizons that carry a decay template: `LongTerm`
/// and `Unknown` are folded onto concrete templates by the decay lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HoldingHorizon {
    Scalp,
    Intraday,
    Swing,
    Position,
    LongTerm,
    Unknown,
}

impl HoldingHorizon {
    /// Parse a horizon label.  Anything unrecognised is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "scalp" => Self::Scalp,
            "intraday" => Self::Intraday,
            "swing" => Self::Swing,
            "position" => Self::Position,
            "long-term" | "long_term" | "longterm" => Self::LongTerm,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for HoldingHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalp => write!(f, "scalp"),
            Self::Intraday => write!(f, "intraday"),
            Self::Swing => write!(f, "swing"),
            Self::Position => write!(f, "position"),
            Self::LongTerm => write!(f, "long-term"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
