use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::IndicatorKey;

// ---------------------------------------------------------------------------
// IndicatorValues
// ---------------------------------------------------------------------------

/// Sparse per-indicator values for one instant, one slot per [`IndicatorKey`].
///
/// `None` means the indicator has no sample at that instant. It is never a
/// stand-in for zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorValues {
    slots: [Option<f64>; IndicatorKey::COUNT],
}

impl IndicatorValues {
    pub fn get(&self, key: IndicatorKey) -> Option<f64> {
        self.slots[key.index()]
    }

    pub fn set(&mut self, key: IndicatorKey, value: f64) {
        self.slots[key.index()] = Some(value);
    }

    pub fn contains(&self, key: IndicatorKey) -> bool {
        self.slots[key.index()].is_some()
    }

    /// Present entries in key declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (IndicatorKey, f64)> + '_ {
        IndicatorKey::ALL
            .iter()
            .filter_map(|&k| self.get(k).map(|v| (k, v)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// A crossover marker. One enum value per point keeps buy and sell mutually
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// Bullish crossover, plotted at the carried price.
    Buy(f64),
    /// Bearish crossover, plotted at the carried price.
    Sell(f64),
}

impl Signal {
    pub fn price(self) -> f64 {
        match self {
            Self::Buy(p) | Self::Sell(p) => p,
        }
    }

    pub fn is_buy(self) -> bool {
        matches!(self, Self::Buy(_))
    }

    fn field_name(self) -> &'static str {
        match self {
            Self::Buy(_) => "buySignal",
            Self::Sell(_) => "sellSignal",
        }
    }
}

// ---------------------------------------------------------------------------
// MergedPoint
// ---------------------------------------------------------------------------

/// One row of the unified timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPoint {
    /// Epoch milliseconds. The only merge/lookup key.
    pub timestamp: i64,
    /// Local `HH:MM` label for the x-axis. Display only.
    pub display_time: String,
    pub values: IndicatorValues,
    pub signal: Option<Signal>,
}

impl MergedPoint {
    pub fn new(timestamp: i64, display_time: String) -> Self {
        Self {
            timestamp,
            display_time,
            values: IndicatorValues::default(),
            signal: None,
        }
    }

    pub fn value(&self, key: IndicatorKey) -> Option<f64> {
        self.values.get(key)
    }

    pub fn buy_signal(&self) -> Option<f64> {
        match self.signal {
            Some(Signal::Buy(p)) => Some(p),
            _ => None,
        }
    }

    pub fn sell_signal(&self) -> Option<f64> {
        match self.signal {
            Some(Signal::Sell(p)) => Some(p),
            _ => None,
        }
    }
}

/// Flat row shape the chart renderer binds to:
/// `{"timestamp", "displayTime", "<indicator>"..., "buySignal"|"sellSignal"}`.
/// Absent indicators and signals are omitted rather than written as `null`.
impl Serialize for MergedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2 + self.values.len() + usize::from(self.signal.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("displayTime", &self.display_time)?;
        for (key, value) in self.values.iter() {
            map.serialize_entry(key.as_str(), &value)?;
        }
        if let Some(signal) = self.signal {
            map.serialize_entry(signal.field_name(), &signal.price())?;
        }
        map.end()
    }
}
