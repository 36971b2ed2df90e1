// =============================================================================
// Signal Context — Market and timing metadata for record assembly
// =============================================================================

use chrono::{DateTime, Utc};

use crate::types::{AssetClass, HoldingHorizon, InstrumentType, MarketType};

/// Context an analyst attaches to a score record.  Fields left as `None`
/// are filled with the strategy's defaults at assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalContext {
    /// When the signal was scored.  Passed in, never read from the clock,
    /// so scoring stays reproducible.
    pub scored_at: DateTime<Utc>,
    /// `BASE/QUOTE` symbol, e.g. "ETH/USDT".
    pub symbol: Option<String>,
    pub market_type: Option<MarketType>,
    pub asset_class: Option<AssetClass>,
    pub instrument_type: Option<InstrumentType>,
    pub venue: Option<String>,
    pub signal_timeframe: Option<String>,
    pub holding_horizon: Option<HoldingHorizon>,
    pub strategy_version: Option<String>,
    /// Analyst-reported conviction in [0, 1].  Neutral (1.0) when absent.
    pub conviction: Option<f64>,
}

impl SignalContext {
    pub fn new(scored_at: DateTime<Utc>) -> Self {
        Self {
            scored_at,
            symbol: None,
            market_type: None,
            asset_class: None,
            instrument_type: None,
            venue: None,
            signal_timeframe: None,
            holding_horizon: None,
            strategy_version: None,
            conviction: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_market(mut self, market_type: MarketType) -> Self {
        self.market_type = Some(market_type);
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.signal_timeframe = Some(timeframe.into());
        self
    }

    pub fn with_horizon(mut self, horizon: HoldingHorizon) -> Self {
        self.holding_horizon = Some(horizon);
        self
    }

    pub fn with_conviction(mut self, conviction: f64) -> Self {
        self.conviction = Some(conviction);
        self
    }

    /// ISO-8601 form of `scored_at` with millisecond precision.
    pub fn scored_at_iso(&self) -> String {
        self.scored_at
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}
