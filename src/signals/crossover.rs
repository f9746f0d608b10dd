// =============================================================================
// Crossover Detector — Buy/sell markers from paired indicator crossings
// =============================================================================
//
// Two pair rules run over the merged timeline, each comparing a point with the
// point immediately before it in sequence order (not in wall-clock time):
//
//   EMA rule:   fast = ema_short, slow = ema_long
//   MACD rule:  fast = macd,      slow = signal
//
//   bullish:  prev_fast <= prev_slow  &&  cur_fast > cur_slow   => Buy
//   bearish:  prev_fast >= prev_slow  &&  cur_fast < cur_slow   => Sell
//
// A marker is plotted at the point's close when present, else at cur_fast.
// Rules are evaluated EMA first, MACD second; a MACD marker replaces an EMA
// marker on the same point.
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::timeline::{MergedPoint, Signal};
use crate::types::IndicatorKey;

// =============================================================================
// Types
// =============================================================================

/// Which pair rule produced a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverRule {
    EmaCross,
    MacdSignal,
}

impl std::fmt::Display for CrossoverRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmaCross => write!(f, "EMA cross"),
            Self::MacdSignal => write!(f, "MACD/signal cross"),
        }
    }
}

/// A marker that ended up on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossoverEvent {
    pub timestamp: i64,
    pub rule: CrossoverRule,
    pub side: &'static str,
    pub price: f64,
}

struct PairRule {
    rule: CrossoverRule,
    fast: IndicatorKey,
    slow: IndicatorKey,
}

/// Evaluation order matters: later rules overwrite earlier ones.
const RULES: [PairRule; 2] = [
    PairRule {
        rule: CrossoverRule::EmaCross,
        fast: IndicatorKey::EmaShort,
        slow: IndicatorKey::EmaLong,
    },
    PairRule {
        rule: CrossoverRule::MacdSignal,
        fast: IndicatorKey::Macd,
        slow: IndicatorKey::Signal,
    },
];

impl PairRule {
    /// Evaluate this rule for `cur` against `prev`.
    ///
    /// Returns `None` when either key is missing at either point.
    fn evaluate(&self, prev: &MergedPoint, cur: &MergedPoint) -> Option<Signal> {
        let prev_fast = prev.value(self.fast)?;
        let prev_slow = prev.value(self.slow)?;
        let cur_fast = cur.value(self.fast)?;
        let cur_slow = cur.value(self.slow)?;

        let price = cur.value(IndicatorKey::Close).unwrap_or(cur_fast);

        if prev_fast <= prev_slow && cur_fast > cur_slow {
            Some(Signal::Buy(price))
        } else if prev_fast >= prev_slow && cur_fast < cur_slow {
            Some(Signal::Sell(price))
        } else {
            None
        }
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Recompute crossover markers for every point of `points`.
///
/// Any existing markers are cleared first, so applying twice is the same as
/// applying once. Returns the markers that remain on the timeline, oldest
/// first.
pub fn apply_crossovers(points: &mut [MergedPoint]) -> Vec<CrossoverEvent> {
    for point in points.iter_mut() {
        point.signal = None;
    }

    let mut events = Vec::new();

    for i in 1..points.len() {
        let (before, rest) = points.split_at_mut(i);
        let prev = &before[i - 1];
        let cur = &mut rest[0];

        let mut fired: Option<(CrossoverRule, Signal)> = None;
        for rule in &RULES {
            if let Some(signal) = rule.evaluate(prev, cur) {
                if let Some((earlier, _)) = fired {
                    debug!(
                        timestamp = cur.timestamp,
                        replaced = %earlier,
                        by = %rule.rule,
                        "crossover marker overwritten by later rule"
                    );
                }
                fired = Some((rule.rule, signal));
            }
        }

        if let Some((rule, signal)) = fired {
            cur.signal = Some(signal);
            events.push(CrossoverEvent {
                timestamp: cur.timestamp,
                rule,
                side: if signal.is_buy() { "BUY" } else { "SELL" },
                price: signal.price(),
            });
        }
    }

    events
}
