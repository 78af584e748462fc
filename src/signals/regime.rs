//! Market regime classification from tier hints and the volatility flag

use crate::models::decision::MarketRegime;
use crate::models::tier::{MacroResult, TrendResult, VolatilityRegime};

pub struct RegimeClassifier;

impl RegimeClassifier {
    /// A volatility extreme wins; otherwise an agreeing trend/macro hint,
    /// otherwise the macro hint.
    pub fn classify(trend: &TrendResult, macro_direction: &MacroResult) -> MarketRegime {
        Self::classify_hints(
            trend.regime_hint,
            macro_direction.regime_hint,
            macro_direction.volatility_regime,
        )
    }

    pub fn classify_hints(
        trend_hint: MarketRegime,
        macro_hint: MarketRegime,
        volatility: VolatilityRegime,
    ) -> MarketRegime {
        match volatility {
            VolatilityRegime::High => MarketRegime::HighVolatility,
            VolatilityRegime::Low => MarketRegime::LowVolatility,
            VolatilityRegime::Normal if trend_hint == macro_hint => trend_hint,
            VolatilityRegime::Normal => macro_hint,
        }
    }
}
