// =============================================================================
// Shared types used across the crypto monitor
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// IndicatorKey
// =============================================================================

/// The closed set of indicators the remote service can compute.
///
/// The discriminant doubles as a slot index for [`crate::timeline::IndicatorValues`],
/// so variants must stay densely numbered from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKey {
    Close = 0,
    Sma = 1,
    EmaShort = 2,
    EmaLong = 3,
    Macd = 4,
    Signal = 5,
    Distance = 6,
}

impl IndicatorKey {
    /// Number of variants.
    pub const COUNT: usize = 7;

    /// Every key, in declaration order.
    pub const ALL: [IndicatorKey; Self::COUNT] = [
        Self::Close,
        Self::Sma,
        Self::EmaShort,
        Self::EmaLong,
        Self::Macd,
        Self::Signal,
        Self::Distance,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Sma => "sma",
            Self::EmaShort => "ema_short",
            Self::EmaLong => "ema_long",
            Self::Macd => "macd",
            Self::Signal => "signal",
            Self::Distance => "distance",
        }
    }

    /// Human-readable legend label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Close => "Close Price",
            Self::Sma => "SMA",
            Self::EmaShort => "EMA Short",
            Self::EmaLong => "EMA Long",
            Self::Macd => "MACD",
            Self::Signal => "Signal",
            Self::Distance => "Distance",
        }
    }

    /// Line colour used by the chart renderer.
    pub fn color(self) -> &'static str {
        match self {
            Self::Close => "#8884d8",
            Self::Sma => "#82ca9d",
            Self::EmaShort => "#ffc658",
            Self::EmaLong => "#ff7c7c",
            Self::Macd => "#a48fff",
            Self::Signal => "#ff8042",
            Self::Distance => "#00c5ff",
        }
    }

    /// Remote endpoint path and optional `type` query parameter.
    ///
    /// Both EMA variants share the `/ema` route and are told apart by `type`.
    pub fn endpoint(self) -> (&'static str, Option<&'static str>) {
        match self {
            Self::EmaShort => ("ema", Some("short")),
            Self::EmaLong => ("ema", Some("long")),
            other => (other.as_str(), None),
        }
    }

    /// Slot index into fixed-size per-key arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown indicator '{}'", s.trim()))
    }
}

/// Parse a comma-separated indicator list such as `"close,ema_short"`.
///
/// Empty segments are skipped; the first unknown name fails the whole list.
pub fn parse_indicator_list(raw: &str) -> anyhow::Result<Vec<IndicatorKey>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(IndicatorKey::from_str)
        .collect()
}

// =============================================================================
// Look-back windows
// =============================================================================

/// Window lengths (minutes) offered by the window selector.
pub const WINDOW_PRESETS: [u32; 4] = [360, 720, 1440, 4320];

/// Selector label for a window length.
pub fn window_label(window_minutes: u32) -> String {
    match window_minutes {
        360 => "6 hours".to_string(),
        720 => "12 hours".to_string(),
        1440 => "1 day".to_string(),
        4320 => "3 days".to_string(),
        other => format!("{other} minutes"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense() {
        for (i, key) in IndicatorKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("EMA_SHORT".parse::<IndicatorKey>().unwrap(), IndicatorKey::EmaShort);
        assert_eq!(" macd ".parse::<IndicatorKey>().unwrap(), IndicatorKey::Macd);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "rsi".parse::<IndicatorKey>().unwrap_err();
        assert!(err.to_string().contains("rsi"));
    }

    #[test]
    fn parse_list_keeps_order() {
        let keys = parse_indicator_list("signal, close,,macd").unwrap();
        assert_eq!(keys, vec![IndicatorKey::Signal, IndicatorKey::Close, IndicatorKey::Macd]);
        assert!(parse_indicator_list("close,bogus").is_err());
    }

    #[test]
    fn ema_keys_share_endpoint() {
        assert_eq!(IndicatorKey::EmaShort.endpoint(), ("ema", Some("short")));
        assert_eq!(IndicatorKey::EmaLong.endpoint(), ("ema", Some("long")));
        assert_eq!(IndicatorKey::Distance.endpoint(), ("distance", None));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&IndicatorKey::EmaLong).unwrap();
        assert_eq!(json, "\"ema_long\"");
        let back: IndicatorKey = serde_json::from_str("\"sma\"").unwrap();
        assert_eq!(back, IndicatorKey::Sma);
    }

    #[test]
    fn window_labels() {
        assert_eq!(window_label(1440), "1 day");
        assert_eq!(window_label(90), "90 minutes");
    }
}
