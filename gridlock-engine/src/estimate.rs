//! Travel-time estimation for baseline and worsened profiles.
use serde::{Deserialize, Serialize};

use crate::level::CongestionLevel;
use crate::numbers;

/// Relative slow-down multiplier per congestion level versus free flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Factors {
    #[serde(default = "default_low_factor")]
    pub low: f64,
    #[serde(default = "default_moderate_factor")]
    pub moderate: f64,
    #[serde(default = "default_heavy_factor")]
    pub heavy: f64,
    #[serde(default = "default_severe_factor")]
    pub severe: f64,
}

impl Default for Factors {
    fn default() -> Self {
        Self {
            low: default_low_factor(),
            moderate: default_moderate_factor(),
            heavy: default_heavy_factor(),
            severe: default_severe_factor(),
        }
    }
}

impl Factors {
    /// Multiplier for a level. `Unknown` resolves to the free-flow factor.
    #[must_use]
    pub const fn factor(&self, level: CongestionLevel) -> f64 {
        match level {
            CongestionLevel::Unknown | CongestionLevel::Low => self.low,
            CongestionLevel::Moderate => self.moderate,
            CongestionLevel::Heavy => self.heavy,
            CongestionLevel::Severe => self.severe,
        }
    }
}

/// Estimate the adjusted profile's travel time in whole minutes.
///
/// Prefers per-segment reweighting when `segment_durations` covers the
/// profile; otherwise scales the route total by the ratio of
/// distance-weighted average factors. Returns `None` for degenerate input
/// (no segments or a non-positive baseline total), which callers treat as
/// "baseline time, zero delta".
#[must_use]
pub fn estimate_minutes(
    baseline: &[CongestionLevel],
    adjusted: &[CongestionLevel],
    distances: &[f64],
    segment_durations: Option<&[f64]>,
    base_total_seconds: f64,
    factors: &Factors,
) -> Option<f64> {
    let n = baseline.len().min(adjusted.len());
    if n == 0 || base_total_seconds <= 0.0 {
        return None;
    }

    if let Some(durations) = segment_durations.filter(|durations| durations.len() >= n) {
        let mut total_seconds = 0.0;
        for position in 0..n {
            let base_factor = factors.factor(baseline[position]);
            let ratio = if base_factor > 0.0 {
                factors.factor(adjusted[position]) / base_factor
            } else {
                1.0
            };
            total_seconds += durations[position] * ratio;
        }
        return Some((total_seconds / 60.0).round());
    }

    let base_average = weighted_average_factor(&baseline[..n], distances, factors);
    let adjusted_average = weighted_average_factor(&adjusted[..n], distances, factors);
    if base_average <= 0.0 {
        return None;
    }
    Some((base_total_seconds * (adjusted_average / base_average) / 60.0).round())
}

/// Distance-weighted average factor; uniform weights when no usable distance.
fn weighted_average_factor(
    levels: &[CongestionLevel],
    distances: &[f64],
    factors: &Factors,
) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (position, level) in levels.iter().enumerate() {
        let weight = distances.get(position).copied().unwrap_or(0.0).max(0.0);
        weighted += weight * factors.factor(*level);
        total_weight += weight;
    }
    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        let uniform: f64 = levels.iter().map(|level| factors.factor(*level)).sum();
        uniform / numbers::f64_from_usize(levels.len())
    }
}

fn default_low_factor() -> f64 {
    1.0
}

fn default_moderate_factor() -> f64 {
    2.0
}

fn default_heavy_factor() -> f64 {
    3.0
}

fn default_severe_factor() -> f64 {
    4.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::CongestionLevel as Level;

    #[test]
    fn per_segment_mode_scales_by_factor_ratio() {
        let baseline = vec![Level::Low, Level::Low, Level::Moderate];
        let adjusted = vec![Level::Moderate, Level::Low, Level::Heavy];
        let durations = vec![60.0, 60.0, 120.0];
        // 60 * 2 + 60 * 1 + 120 * 1.5 = 360 seconds.
        let minutes = estimate_minutes(
            &baseline,
            &adjusted,
            &[100.0; 3],
            Some(&durations),
            240.0,
            &Factors::default(),
        );
        assert_eq!(minutes, Some(6.0));
    }

    #[test]
    fn fallback_scales_route_total_by_average_ratio() {
        let baseline = vec![Level::Low; 10];
        let mut adjusted = baseline.clone();
        for slot in adjusted.iter_mut().take(5) {
            *slot = Level::Moderate;
        }
        // Average factor rises from 1.0 to 1.5: 1200 s -> 1800 s.
        let minutes = estimate_minutes(
            &baseline,
            &adjusted,
            &[1000.0; 10],
            None,
            1200.0,
            &Factors::default(),
        );
        assert_eq!(minutes, Some(30.0));
    }

    #[test]
    fn fallback_weights_by_distance() {
        let baseline = vec![Level::Low, Level::Low];
        let adjusted = vec![Level::Severe, Level::Low];
        // The worsened segment carries 3/4 of the distance.
        let minutes = estimate_minutes(
            &baseline,
            &adjusted,
            &[3000.0, 1000.0],
            None,
            600.0,
            &Factors::default(),
        );
        // Average factor (3*4 + 1*1)/4 = 3.25: 600 s -> 1950 s -> 33 min.
        assert_eq!(minutes, Some(33.0));
    }

    #[test]
    fn zero_distances_fall_back_to_uniform_weights() {
        let baseline = vec![Level::Low, Level::Low];
        let adjusted = vec![Level::Moderate, Level::Moderate];
        let minutes = estimate_minutes(
            &baseline,
            &adjusted,
            &[0.0, 0.0],
            None,
            600.0,
            &Factors::default(),
        );
        assert_eq!(minutes, Some(20.0));
    }

    #[test]
    fn short_duration_array_falls_back_to_distances() {
        let baseline = vec![Level::Low; 4];
        let adjusted = vec![Level::Moderate; 4];
        let minutes = estimate_minutes(
            &baseline,
            &adjusted,
            &[500.0; 4],
            Some(&[60.0, 60.0]),
            600.0,
            &Factors::default(),
        );
        // Two entries cannot cover four segments; ratio mode doubles the total.
        assert_eq!(minutes, Some(20.0));
    }

    #[test]
    fn degenerate_inputs_return_none() {
        let factors = Factors::default();
        assert_eq!(estimate_minutes(&[], &[], &[], None, 600.0, &factors), None);
        assert_eq!(
            estimate_minutes(
                &[Level::Low],
                &[Level::Low],
                &[100.0],
                None,
                0.0,
                &factors
            ),
            None
        );
        assert_eq!(
            estimate_minutes(
                &[Level::Low],
                &[Level::Low],
                &[100.0],
                None,
                -60.0,
                &factors
            ),
            None
        );
    }

    #[test]
    fn unknown_segments_use_free_flow_factor() {
        let baseline = vec![Level::Unknown, Level::Low];
        let adjusted = vec![Level::Moderate, Level::Low];
        let minutes = estimate_minutes(
            &baseline,
            &adjusted,
            &[100.0, 100.0],
            Some(&[60.0, 60.0]),
            120.0,
            &Factors::default(),
        );
        // Unknown baseline counts as free flow, so the ratio is 2.0 on it.
        assert_eq!(minutes, Some(3.0));
    }
}
