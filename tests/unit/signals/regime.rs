use tierfusion::models::{MacroResult, MarketRegime, TrendResult, VolatilityRegime};
use tierfusion::signals::RegimeClassifier;

#[test]
fn test_volatility_extremes_override_hints() {
    for hint in MarketRegime::ALL {
        assert_eq!(
            RegimeClassifier::classify_hints(hint, hint, VolatilityRegime::High),
            MarketRegime::HighVolatility
        );
        assert_eq!(
            RegimeClassifier::classify_hints(hint, hint, VolatilityRegime::Low),
            MarketRegime::LowVolatility
        );
    }
}

#[test]
fn test_agreeing_hints() {
    assert_eq!(
        RegimeClassifier::classify_hints(
            MarketRegime::Bullish,
            MarketRegime::Bullish,
            VolatilityRegime::Normal
        ),
        MarketRegime::Bullish
    );
    assert_eq!(
        RegimeClassifier::classify_hints(
            MarketRegime::Bearish,
            MarketRegime::Bearish,
            VolatilityRegime::Normal
        ),
        MarketRegime::Bearish
    );
}

#[test]
fn test_disagreement_defers_to_macro() {
    assert_eq!(
        RegimeClassifier::classify_hints(
            MarketRegime::Bullish,
            MarketRegime::Sideways,
            VolatilityRegime::Normal
        ),
        MarketRegime::Sideways
    );
    assert_eq!(
        RegimeClassifier::classify_hints(
            MarketRegime::Sideways,
            MarketRegime::Bearish,
            VolatilityRegime::Normal
        ),
        MarketRegime::Bearish
    );
}

#[test]
fn test_classify_reads_tier_results() {
    let trend = TrendResult {
        score: 0.8,
        regime_hint: MarketRegime::Bullish,
        has_data: true,
        ..TrendResult::neutral()
    };
    let macro_direction = MacroResult {
        score: 0.7,
        regime_hint: MarketRegime::Bullish,
        has_data: true,
        ..MacroResult::neutral()
    };
    assert_eq!(
        RegimeClassifier::classify(&trend, &macro_direction),
        MarketRegime::Bullish
    );

    let volatile = MacroResult {
        volatility_regime: VolatilityRegime::High,
        atr_ratio: 2.0,
        ..macro_direction
    };
    assert_eq!(
        RegimeClassifier::classify(&trend, &volatile),
        MarketRegime::HighVolatility
    );
}

#[test]
fn test_neutral_tiers_are_sideways() {
    assert_eq!(
        RegimeClassifier::classify(&TrendResult::neutral(), &MacroResult::neutral()),
        MarketRegime::Sideways
    );
}
