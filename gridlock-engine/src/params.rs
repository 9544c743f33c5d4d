//! Mask-shape parameters and intensity interpolation.
use serde::{Deserialize, Serialize};

use crate::numbers;

/// Dilation radius bounds per band, in segments.
pub const DILATION_RANGE: (u32, u32) = (0, 60);
/// Run length bounds per band, in segments.
pub const RUN_LENGTH_RANGE: (u32, u32) = (1, 80);
/// Run count bounds per band.
pub const RUN_COUNT_RANGE: (u32, u32) = (0, 8);

/// Intensity-zero shape of the worsening mask.
///
/// Fields stay inside their documented ranges at every derivation: dilation
/// 0..=60, run length 1..=80, run count 0..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseParams {
    #[serde(default)]
    pub dil_orange: u32,
    #[serde(default)]
    pub dil_red: u32,
    #[serde(default)]
    pub dil_severe: u32,
    #[serde(default = "default_len_orange")]
    pub len_orange: u32,
    #[serde(default = "default_len_red")]
    pub len_red: u32,
    #[serde(default = "default_len_severe")]
    pub len_severe: u32,
    #[serde(default)]
    pub runs_orange: u32,
    #[serde(default)]
    pub runs_red: u32,
    #[serde(default)]
    pub runs_severe: u32,
}

impl Default for BaseParams {
    fn default() -> Self {
        Self {
            dil_orange: 0,
            dil_red: 0,
            dil_severe: 0,
            len_orange: default_len_orange(),
            len_red: default_len_red(),
            len_severe: default_len_severe(),
            runs_orange: 0,
            runs_red: 0,
            runs_severe: 0,
        }
    }
}

impl BaseParams {
    /// Clamp every field into its documented range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            dil_orange: clamp_field(self.dil_orange, DILATION_RANGE),
            dil_red: clamp_field(self.dil_red, DILATION_RANGE),
            dil_severe: clamp_field(self.dil_severe, DILATION_RANGE),
            len_orange: clamp_field(self.len_orange, RUN_LENGTH_RANGE),
            len_red: clamp_field(self.len_red, RUN_LENGTH_RANGE),
            len_severe: clamp_field(self.len_severe, RUN_LENGTH_RANGE),
            runs_orange: clamp_field(self.runs_orange, RUN_COUNT_RANGE),
            runs_red: clamp_field(self.runs_red, RUN_COUNT_RANGE),
            runs_severe: clamp_field(self.runs_severe, RUN_COUNT_RANGE),
        }
    }
}

/// Per-unit-intensity growth rate for each `BaseParams` field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamWeights {
    #[serde(default = "default_dil_orange_weight")]
    pub dil_orange: f64,
    #[serde(default = "default_dil_red_weight")]
    pub dil_red: f64,
    #[serde(default = "default_dil_severe_weight")]
    pub dil_severe: f64,
    #[serde(default = "default_len_orange_weight")]
    pub len_orange: f64,
    #[serde(default = "default_len_red_weight")]
    pub len_red: f64,
    #[serde(default = "default_len_severe_weight")]
    pub len_severe: f64,
    #[serde(default = "default_runs_orange_weight")]
    pub runs_orange: f64,
    #[serde(default = "default_runs_red_weight")]
    pub runs_red: f64,
    #[serde(default = "default_runs_severe_weight")]
    pub runs_severe: f64,
}

impl Default for ParamWeights {
    fn default() -> Self {
        Self {
            dil_orange: default_dil_orange_weight(),
            dil_red: default_dil_red_weight(),
            dil_severe: default_dil_severe_weight(),
            len_orange: default_len_orange_weight(),
            len_red: default_len_red_weight(),
            len_severe: default_len_severe_weight(),
            runs_orange: default_runs_orange_weight(),
            runs_red: default_runs_red_weight(),
            runs_severe: default_runs_severe_weight(),
        }
    }
}

/// Derive the concrete mask parameters for a search intensity.
///
/// `value = clamp(round(base + intensity * weight))` per field, so every
/// field is non-decreasing in `intensity` for non-negative weights.
#[must_use]
pub fn params_for_intensity(
    intensity: f64,
    base: &BaseParams,
    weights: &ParamWeights,
) -> BaseParams {
    let lerp = |base_value: u32, weight: f64, range: (u32, u32)| {
        numbers::round_f64_to_u32(f64::from(base_value) + intensity * weight, range.0, range.1)
    };
    BaseParams {
        dil_orange: lerp(base.dil_orange, weights.dil_orange, DILATION_RANGE),
        dil_red: lerp(base.dil_red, weights.dil_red, DILATION_RANGE),
        dil_severe: lerp(base.dil_severe, weights.dil_severe, DILATION_RANGE),
        len_orange: lerp(base.len_orange, weights.len_orange, RUN_LENGTH_RANGE),
        len_red: lerp(base.len_red, weights.len_red, RUN_LENGTH_RANGE),
        len_severe: lerp(base.len_severe, weights.len_severe, RUN_LENGTH_RANGE),
        runs_orange: lerp(base.runs_orange, weights.runs_orange, RUN_COUNT_RANGE),
        runs_red: lerp(base.runs_red, weights.runs_red, RUN_COUNT_RANGE),
        runs_severe: lerp(base.runs_severe, weights.runs_severe, RUN_COUNT_RANGE),
    }
}

fn clamp_field(value: u32, range: (u32, u32)) -> u32 {
    value.clamp(range.0, range.1)
}

fn default_len_orange() -> u32 {
    4
}

fn default_len_red() -> u32 {
    3
}

fn default_len_severe() -> u32 {
    2
}

fn default_dil_orange_weight() -> f64 {
    0.25
}

fn default_dil_red_weight() -> f64 {
    0.15
}

fn default_dil_severe_weight() -> f64 {
    0.08
}

fn default_len_orange_weight() -> f64 {
    0.10
}

fn default_len_red_weight() -> f64 {
    0.06
}

fn default_len_severe_weight() -> f64 {
    0.04
}

fn default_runs_orange_weight() -> f64 {
    0.08
}

fn default_runs_red_weight() -> f64 {
    0.05
}

fn default_runs_severe_weight() -> f64 {
    0.03
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_intensity_reproduces_base() {
        let base = BaseParams::default();
        let derived = params_for_intensity(0.0, &base, &ParamWeights::default());
        assert_eq!(derived, base);
    }

    #[test]
    fn interpolation_is_monotonic_per_field() {
        let base = BaseParams::default();
        let weights = ParamWeights::default();
        let mut previous = params_for_intensity(0.0, &base, &weights);
        for step in 1..=40 {
            let current = params_for_intensity(f64::from(step) * 5.0, &base, &weights);
            assert!(current.dil_orange >= previous.dil_orange);
            assert!(current.len_orange >= previous.len_orange);
            assert!(current.runs_orange >= previous.runs_orange);
            assert!(current.runs_severe >= previous.runs_severe);
            previous = current;
        }
    }

    #[test]
    fn derivation_respects_clamp_ranges() {
        let base = BaseParams::default();
        let derived = params_for_intensity(10_000.0, &base, &ParamWeights::default());
        assert_eq!(derived.dil_orange, DILATION_RANGE.1);
        assert_eq!(derived.len_orange, RUN_LENGTH_RANGE.1);
        assert_eq!(derived.runs_orange, RUN_COUNT_RANGE.1);
    }

    #[test]
    fn clamped_repairs_out_of_range_fields() {
        let params = BaseParams {
            dil_orange: 500,
            len_orange: 0,
            runs_orange: 99,
            ..BaseParams::default()
        };
        let clamped = params.clamped();
        assert_eq!(clamped.dil_orange, 60);
        assert_eq!(clamped.len_orange, 1);
        assert_eq!(clamped.runs_orange, 8);
    }

    #[test]
    fn params_json_fills_missing_fields() {
        let params: BaseParams = serde_json::from_str(r#"{"runs_orange": 2}"#).unwrap();
        assert_eq!(params.runs_orange, 2);
        assert_eq!(params.len_orange, 4);
        assert_eq!(params.dil_orange, 0);
    }
}
