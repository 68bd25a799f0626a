//! Crossover detection, trend confirmation and trade plan math

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use types::{Direction, Signal};

use crate::config::{IndicatorConfig, RiskConfig};
use crate::indicators::{sma, sma_tail};

/// Take-profit distances in multiples of the stop distance
pub const TP1_MULTIPLE: Decimal = dec!(1.5);
pub const TP2_MULTIPLE: Decimal = dec!(2);
pub const TP3_MULTIPLE: Decimal = dec!(3);

/// Decimal places of the position size
pub const SIZE_DECIMALS: u32 = 3;

/// Classify the transition between the last two bars.
///
/// LONG when the fast average moves from strictly below to strictly above the
/// slow one, SHORT for the reverse. Equality on either bar is no cross, and so
/// is a series too short for two slow-average values.
pub fn detect_crossover(closes: &[Decimal], periods: IndicatorConfig) -> Option<Direction> {
    let fast = sma_tail(closes, periods.fast_period, 2)?;
    let slow = sma_tail(closes, periods.slow_period, 2)?;

    let (prev_fast, last_fast) = (fast[0], fast[1]);
    let (prev_slow, last_slow) = (slow[0], slow[1]);

    if prev_fast < prev_slow && last_fast > last_slow {
        Some(Direction::Long)
    } else if prev_fast > prev_slow && last_fast < last_slow {
        Some(Direction::Short)
    } else {
        None
    }
}

/// Fast average strictly above slow on the latest bar.
///
/// `false` when either average is undefined; callers check history first.
pub fn is_uptrend(closes: &[Decimal], periods: IndicatorConfig) -> bool {
    match (sma(closes, periods.fast_period), sma(closes, periods.slow_period)) {
        (Some(fast), Some(slow)) => fast > slow,
        _ => false,
    }
}

/// Whether the higher timeframes back the entry cross.
///
/// LONG needs both higher timeframes in an uptrend. SHORT needs neither in an
/// uptrend, which is not the mirror image of the LONG rule: a flat average
/// confirms a SHORT but never a LONG.
pub fn is_confirmed(direction: Direction, h1_uptrend: bool, h4_uptrend: bool) -> bool {
    match direction {
        Direction::Long => h1_uptrend && h4_uptrend,
        Direction::Short => !(h1_uptrend || h4_uptrend),
    }
}

/// Stop and targets derived from entry and ATR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeLevels {
    pub stop_loss: Decimal,
    pub tp1: Decimal,
    pub tp2: Decimal,
    pub tp3: Decimal,
}

impl TradeLevels {
    /// Levels `atr * multiplier` away from entry on the losing side, and
    /// 1.5x / 2x / 3x that distance on the winning side
    pub fn compute(direction: Direction, entry: Decimal, atr: Decimal, multiplier: Decimal) -> Self {
        let risk = atr * multiplier;
        let sign = match direction {
            Direction::Long => Decimal::ONE,
            Direction::Short => Decimal::NEGATIVE_ONE,
        };

        Self {
            stop_loss: entry - sign * risk,
            tp1: entry + sign * risk * TP1_MULTIPLE,
            tp2: entry + sign * risk * TP2_MULTIPLE,
            tp3: entry + sign * risk * TP3_MULTIPLE,
        }
    }
}

/// Units such that hitting the stop loses `risk_percent` of the balance,
/// rounded to 3 decimals. `None` when entry and stop coincide.
pub fn position_size(
    account_balance: Decimal,
    risk_percent: Decimal,
    entry: Decimal,
    stop_loss: Decimal,
) -> Option<Decimal> {
    let distance = (entry - stop_loss).abs();
    if distance.is_zero() {
        return None;
    }
    let risk_amount = account_balance * (risk_percent / dec!(100));
    Some((risk_amount / distance).round_dp(SIZE_DECIMALS))
}

/// Complete trade plan for a confirmed cross; `None` when the ATR is zero
pub fn build_signal(
    symbol: &str,
    direction: Direction,
    entry: Decimal,
    atr: Decimal,
    risk: &RiskConfig,
    timestamp: DateTime<Utc>,
) -> Option<Signal> {
    let levels = TradeLevels::compute(direction, entry, atr, risk.atr_multiplier);
    let size = position_size(
        risk.account_balance,
        risk.risk_percent,
        entry,
        levels.stop_loss,
    )?;

    Some(Signal {
        symbol: symbol.to_string(),
        direction,
        entry,
        stop_loss: levels.stop_loss,
        tp1: levels.tp1,
        tp2: levels.tp2,
        tp3: levels.tp3,
        size,
        timestamp,
    })
}

/// Alert text for a signal
pub fn format_alert(signal: &Signal) -> String {
    format!(
        "{} {}\nEntry: {:.4}\nSL: {:.4}\nTP1: {:.4}\nTP2: {:.4}\nTP3: {:.4}\nSize: {:.3}",
        signal.direction,
        signal.symbol,
        signal.entry.round_dp(4),
        signal.stop_loss.round_dp(4),
        signal.tp1.round_dp(4),
        signal.tp2.round_dp(4),
        signal.tp3.round_dp(4),
        signal.size.round_dp(SIZE_DECIMALS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIODS: IndicatorConfig = IndicatorConfig {
        fast_period: 5,
        slow_period: 50,
    };

    /// 45 bars at 100, five at `dip`, then `last`
    fn series(dip: Decimal, last: Decimal) -> Vec<Decimal> {
        let mut closes = vec![dec!(100); 45];
        closes.extend(std::iter::repeat(dip).take(5));
        closes.push(last);
        closes
    }

    #[test]
    fn test_bullish_cross() {
        // prev: fast 99 < slow 99.9, last: fast 101.2 > slow 100.1
        let closes = series(dec!(99), dec!(110));
        assert_eq!(detect_crossover(&closes, PERIODS), Some(Direction::Long));
    }

    #[test]
    fn test_bearish_cross() {
        let closes = series(dec!(101), dec!(90));
        assert_eq!(detect_crossover(&closes, PERIODS), Some(Direction::Short));
    }

    #[test]
    fn test_detection_is_idempotent() {
        let closes = series(dec!(99), dec!(110));
        let first = detect_crossover(&closes, PERIODS);
        let second = detect_crossover(&closes, PERIODS);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_cross_without_transition() {
        let flat = vec![dec!(100); 60];
        assert_eq!(detect_crossover(&flat, PERIODS), None);

        let rising: Vec<Decimal> = (1..=60).map(Decimal::from).collect();
        assert_eq!(detect_crossover(&rising, PERIODS), None);
    }

    #[test]
    fn test_equality_never_crosses() {
        // prev bar: both averages exactly 100
        let mut closes = vec![dec!(100); 50];
        closes.push(dec!(110));
        assert_eq!(detect_crossover(&closes, PERIODS), None);

        // last bar: fast (4*91 + 135)/5 and slow (44*100 + 5*91 + 135)/50 are both 99.8
        let mut closes = vec![dec!(100); 45];
        closes.extend([dec!(91); 5]);
        closes.push(dec!(135));
        let fast = sma(&closes, 5).unwrap();
        let slow = sma(&closes, 50).unwrap();
        assert_eq!(fast, slow);
        assert_eq!(detect_crossover(&closes, PERIODS), None);
    }

    #[test]
    fn test_short_history_is_no_cross() {
        let closes = vec![dec!(100); 50];
        assert_eq!(detect_crossover(&closes, PERIODS), None);
        assert_eq!(detect_crossover(&[], PERIODS), None);
    }

    #[test]
    fn test_uptrend_is_strict() {
        let rising: Vec<Decimal> = (1..=50).map(Decimal::from).collect();
        assert!(is_uptrend(&rising, PERIODS));

        let flat = vec![dec!(100); 50];
        assert!(!is_uptrend(&flat, PERIODS));

        assert!(!is_uptrend(&rising[..49], PERIODS));
    }

    #[test]
    fn test_confirmation_rules() {
        assert!(is_confirmed(Direction::Long, true, true));
        assert!(!is_confirmed(Direction::Long, true, false));
        assert!(!is_confirmed(Direction::Long, false, false));

        assert!(is_confirmed(Direction::Short, false, false));
        assert!(!is_confirmed(Direction::Short, true, false));
        assert!(!is_confirmed(Direction::Short, false, true));
    }

    #[test]
    fn test_long_levels() {
        let levels = TradeLevels::compute(Direction::Long, dec!(100), dec!(10), dec!(1.5));
        assert_eq!(levels.stop_loss, dec!(85));
        assert_eq!(levels.tp1, dec!(122.5));
        assert_eq!(levels.tp2, dec!(130));
        assert_eq!(levels.tp3, dec!(145));
    }

    #[test]
    fn test_short_levels() {
        let levels = TradeLevels::compute(Direction::Short, dec!(100), dec!(10), dec!(1.5));
        assert_eq!(levels.stop_loss, dec!(115));
        assert_eq!(levels.tp1, dec!(77.5));
        assert_eq!(levels.tp2, dec!(70));
        assert_eq!(levels.tp3, dec!(55));
    }

    #[test]
    fn test_position_size() {
        let size = position_size(dec!(1000), dec!(2), dec!(100), dec!(98)).unwrap();
        assert_eq!(size, dec!(10.0));

        let size = position_size(dec!(1000), dec!(2), dec!(100), dec!(115)).unwrap();
        assert_eq!(size, dec!(1.333));

        assert_eq!(position_size(dec!(1000), dec!(2), dec!(100), dec!(100)), None);
    }

    #[test]
    fn test_zero_atr_builds_no_signal() {
        let risk = RiskConfig::default();
        assert!(build_signal("BTCUSDT", Direction::Long, dec!(100), Decimal::ZERO, &risk, Utc::now())
            .is_none());
    }

    #[test]
    fn test_alert_format() {
        let risk = RiskConfig::default();
        let signal =
            build_signal("BTCUSDT", Direction::Long, dec!(100), dec!(10), &risk, Utc::now()).unwrap();

        assert_eq!(
            format_alert(&signal),
            "LONG BTCUSDT\nEntry: 100.0000\nSL: 85.0000\nTP1: 122.5000\nTP2: 130.0000\nTP3: 145.0000\nSize: 1.333"
        );
    }

    #[test]
    fn test_alert_rounds_to_four_places() {
        let risk = RiskConfig::default();
        let signal = build_signal(
            "ETHUSDT",
            Direction::Short,
            dec!(2345.678912),
            dec!(3),
            &risk,
            Utc::now(),
        )
        .unwrap();

        let alert = format_alert(&signal);
        assert!(alert.starts_with("SHORT ETHUSDT\nEntry: 2345.6789\n"));
        assert!(alert.contains("SL: 2350.1789\n"));
        assert!(alert.ends_with("Size: 4.444"));
    }
}
