//! Congestion severity scale
use serde::{Deserialize, Serialize};

/// Per-segment congestion severity as reported by a directions provider.
///
/// `Unknown` only ever appears in provider data (missing coverage); the
/// engine never emits it for a segment it has worsened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Unknown,
    #[default]
    Low,
    Moderate,
    Heavy,
    Severe,
}

impl CongestionLevel {
    /// Ordinal severity on the 0..=3 scale. `Unknown` ranks with `Low`.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Unknown | Self::Low => 0,
            Self::Moderate => 1,
            Self::Heavy => 2,
            Self::Severe => 3,
        }
    }

    /// Level for an ordinal value, clamped into the 0..=3 scale.
    #[must_use]
    pub const fn from_ordinal(value: u8) -> Self {
        match value {
            0 => Self::Low,
            1 => Self::Moderate,
            2 => Self::Heavy,
            _ => Self::Severe,
        }
    }

    /// Whether this level slows traffic at all.
    #[must_use]
    pub const fn is_congested(self) -> bool {
        self.ordinal() > 0
    }

    /// Wire name used by directions providers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
            Self::Severe => "severe",
        }
    }
}

impl std::fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CongestionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "low" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "heavy" => Ok(Self::Heavy),
            "severe" => Ok(Self::Severe),
            _ => Err(format!("Unknown congestion level: {s}")),
        }
    }
}
