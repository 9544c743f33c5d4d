//! Orchestration: validate input, search, and assemble the worsened result.
use serde::{Deserialize, Serialize};

use crate::estimate::{self, Factors};
use crate::level::CongestionLevel;
use crate::mask::{self, MaskContext};
use crate::params::{BaseParams, ParamWeights};
use crate::rng::DEFAULT_SEED;
use crate::route::{LegAnnotation, ParamsUsed, Route, WorsenMeta};
use crate::search::{self, DEFAULT_BISECTIONS, DEFAULT_INTENSITY_MAX, SearchConfig, SearchRequest};

/// Distance above which a segment counts as highway-like, in meters.
pub const DEFAULT_HIGHWAY_THRESHOLD_METERS: f64 = 250.0;

/// Caller-supplied request for one worsening computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorsenOptions {
    /// Minutes the worsened estimate should exceed the baseline by.
    pub target_delta_minutes: f64,
    #[serde(default)]
    pub prefer_highways: bool,
    #[serde(default = "default_highway_threshold")]
    pub highway_threshold_meters: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub factors: Factors,
    #[serde(default)]
    pub base_params: BaseParams,
    #[serde(default)]
    pub weights: ParamWeights,
    #[serde(default = "default_intensity_max")]
    pub intensity_max: f64,
    #[serde(default = "default_bisections")]
    pub bisections: u32,
}

impl Default for WorsenOptions {
    fn default() -> Self {
        Self {
            target_delta_minutes: 0.0,
            prefer_highways: false,
            highway_threshold_meters: default_highway_threshold(),
            seed: default_seed(),
            factors: Factors::default(),
            base_params: BaseParams::default(),
            weights: ParamWeights::default(),
            intensity_max: default_intensity_max(),
            bisections: default_bisections(),
        }
    }
}

impl WorsenOptions {
    /// Options for a target delta with every other knob at its default.
    #[must_use]
    pub fn new(target_delta_minutes: f64) -> Self {
        Self {
            target_delta_minutes: target_delta_minutes.max(0.0),
            ..Self::default()
        }
    }

    /// Parse caller options from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or if validation fails.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let options: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<(), String> {
        if self.target_delta_minutes < 0.0 || !self.target_delta_minutes.is_finite() {
            return Err(format!(
                "target_delta_minutes must be finite and non-negative, got {}",
                self.target_delta_minutes
            ));
        }
        if self.intensity_max <= 0.0 {
            return Err(format!(
                "intensity_max must be positive, got {}",
                self.intensity_max
            ));
        }
        Ok(())
    }
}

/// Outcome of one worsening computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorsenResult {
    /// Worsened per-segment levels, `min(congestion, distance)` long.
    pub adjusted_levels: Vec<CongestionLevel>,
    pub estimated_duration_minutes: f64,
    pub base_duration_minutes: f64,
    /// Estimated minus baseline minutes.
    pub delta_minutes: f64,
    pub params_used: ParamsUsed,
    /// Clone of the input route with the adjusted annotation attached.
    pub route: Route,
}

/// Worsen a route's congestion profile toward a target extra-minutes delta.
///
/// Never fails: degenerate input (empty annotation arrays, non-positive
/// route duration) short-circuits to a result that mirrors the baseline
/// with a zero delta.
#[must_use]
pub fn worsen_route(route: &Route, options: &WorsenOptions) -> WorsenResult {
    let annotation = route.first_leg_annotation();
    let congestion = annotation
        .and_then(|a| a.congestion.as_deref())
        .unwrap_or(&[]);
    let distance = annotation
        .and_then(|a| a.distance.as_deref())
        .unwrap_or(&[]);
    let segment_durations = annotation.and_then(|a| a.duration.as_deref());

    let n = congestion.len().min(distance.len());
    let base_seconds = route.duration;
    let base_minutes = (base_seconds.max(0.0) / 60.0).round();
    let base_params = options.base_params.clamped();
    let ctx = MaskContext {
        prefer_highways: options.prefer_highways,
        highway_threshold_meters: options.highway_threshold_meters,
        seed: options.seed,
    };

    if n == 0 || base_seconds <= 0.0 {
        let adjusted = congestion[..n].to_vec();
        return assemble(route, options, adjusted, base_minutes, base_minutes, base_params, ctx);
    }

    let baseline = &congestion[..n];
    let distances = &distance[..n];
    let durations = segment_durations.filter(|durations| durations.len() >= n);

    let request = SearchRequest {
        baseline,
        distances,
        segment_durations: durations,
        base_total_seconds: base_seconds,
        target_delta_minutes: options.target_delta_minutes.max(0.0),
        base: &base_params,
        weights: &options.weights,
        factors: &options.factors,
        ctx,
    };
    let cfg = SearchConfig {
        intensity_max: options.intensity_max,
        bisections: options.bisections,
    };
    let outcome = search::search_intensity(&request, &cfg);

    // Recompute at the winning parameters so the reported numbers are
    // reproducible from `params_used` alone.
    let adjusted = mask::build_worsened_mask(baseline, distances, &outcome.params, &ctx);
    let estimated = estimate::estimate_minutes(
        baseline,
        &adjusted,
        distances,
        durations,
        base_seconds,
        &options.factors,
    )
    .unwrap_or(base_minutes);

    assemble(route, options, adjusted, estimated, base_minutes, outcome.params, ctx)
}

/// Convenience wrapper returning only the annotated route clone.
#[must_use]
pub fn worsen_route_copy(
    route: &Route,
    target_delta_minutes: f64,
    options: Option<WorsenOptions>,
) -> Route {
    let mut options = options.unwrap_or_default();
    options.target_delta_minutes = target_delta_minutes.max(0.0);
    worsen_route(route, &options).route
}

fn assemble(
    route: &Route,
    options: &WorsenOptions,
    adjusted: Vec<CongestionLevel>,
    estimated_minutes: f64,
    base_minutes: f64,
    params: BaseParams,
    ctx: MaskContext,
) -> WorsenResult {
    let delta_minutes = estimated_minutes - base_minutes;
    let params_used = ParamsUsed {
        params,
        prefer_highways: ctx.prefer_highways,
        seed: ctx.seed,
    };
    let meta = WorsenMeta {
        estimated_seconds: estimated_minutes * 60.0,
        estimated_minutes,
        delta_minutes,
        params: params_used,
        factors: options.factors,
    };

    let mut annotated = route.clone();
    if let Some(leg) = annotated.legs.first_mut() {
        let annotation = leg.annotation.get_or_insert_with(LegAnnotation::default);
        annotation.congestion = Some(adjusted.clone());
    }
    annotated.worsen_meta = Some(meta);

    WorsenResult {
        adjusted_levels: adjusted,
        estimated_duration_minutes: estimated_minutes,
        base_duration_minutes: base_minutes,
        delta_minutes,
        params_used,
        route: annotated,
    }
}

fn default_highway_threshold() -> f64 {
    DEFAULT_HIGHWAY_THRESHOLD_METERS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_intensity_max() -> f64 {
    DEFAULT_INTENSITY_MAX
}

fn default_bisections() -> u32 {
    DEFAULT_BISECTIONS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::CongestionLevel as Level;
    use crate::route::RouteLeg;

    fn route_with(
        congestion: Vec<Level>,
        distance: Vec<f64>,
        duration: Option<Vec<f64>>,
        total_seconds: f64,
    ) -> Route {
        Route {
            duration: total_seconds,
            legs: vec![RouteLeg {
                annotation: Some(LegAnnotation {
                    congestion: Some(congestion),
                    distance: Some(distance),
                    duration,
                }),
            }],
            ..Route::default()
        }
    }

    #[test]
    fn empty_congestion_short_circuits() {
        let route = route_with(vec![], vec![1000.0; 4], None, 1200.0);
        let result = worsen_route(&route, &WorsenOptions::new(10.0));
        assert!(result.adjusted_levels.is_empty());
        assert!((result.delta_minutes).abs() < f64::EPSILON);
        assert_eq!(result.params_used.params, BaseParams::default());
    }

    #[test]
    fn zero_duration_short_circuits_with_truncated_baseline() {
        let route = route_with(vec![Level::Low; 6], vec![1000.0; 4], None, 0.0);
        let result = worsen_route(&route, &WorsenOptions::new(10.0));
        assert_eq!(result.adjusted_levels, vec![Level::Low; 4]);
        assert!((result.delta_minutes).abs() < f64::EPSILON);
        assert!((result.base_duration_minutes).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_annotation_short_circuits() {
        let route = Route {
            duration: 900.0,
            legs: vec![RouteLeg::default()],
            ..Route::default()
        };
        let result = worsen_route(&route, &WorsenOptions::new(5.0));
        assert!(result.adjusted_levels.is_empty());
        assert!((result.base_duration_minutes - 15.0).abs() < f64::EPSILON);
        assert!((result.delta_minutes).abs() < f64::EPSILON);
    }

    #[test]
    fn adjusted_levels_length_is_min_of_inputs() {
        let route = route_with(vec![Level::Low; 12], vec![800.0; 9], None, 1800.0);
        let result = worsen_route(&route, &WorsenOptions::new(5.0));
        assert_eq!(result.adjusted_levels.len(), 9);
        let clone_annotation = result.route.first_leg_annotation().unwrap();
        assert_eq!(clone_annotation.congestion.as_ref().unwrap().len(), 9);
    }

    #[test]
    fn input_route_is_not_mutated() {
        let route = route_with(vec![Level::Low; 10], vec![1000.0; 10], None, 1200.0);
        let before = route.clone();
        let _ = worsen_route(&route, &WorsenOptions::new(10.0));
        assert_eq!(route, before);
    }

    #[test]
    fn result_numbers_are_reproducible_from_params_used() {
        let route = route_with(vec![Level::Low; 10], vec![1000.0; 10], None, 1200.0);
        let options = WorsenOptions::new(10.0);
        let result = worsen_route(&route, &options);

        let ctx = MaskContext {
            prefer_highways: result.params_used.prefer_highways,
            highway_threshold_meters: options.highway_threshold_meters,
            seed: result.params_used.seed,
        };
        let annotation = route.first_leg_annotation().unwrap();
        let baseline = annotation.congestion.as_deref().unwrap();
        let distances = annotation.distance.as_deref().unwrap();
        let replayed =
            mask::build_worsened_mask(baseline, distances, &result.params_used.params, &ctx);
        assert_eq!(replayed, result.adjusted_levels);
    }

    #[test]
    fn worsen_route_copy_returns_annotated_clone() {
        let route = route_with(vec![Level::Low; 10], vec![1000.0; 10], None, 1200.0);
        let copy = worsen_route_copy(&route, 10.0, None);
        let meta = copy.worsen_meta.unwrap();
        assert!(meta.delta_minutes >= 0.0);
        assert_eq!(
            copy.first_leg_annotation().unwrap().congestion.as_ref().unwrap().len(),
            10
        );
    }

    #[test]
    fn negative_target_is_normalized_to_zero() {
        let route = route_with(vec![Level::Low; 10], vec![1000.0; 10], None, 1200.0);
        let copy = worsen_route_copy(&route, -15.0, None);
        let meta = copy.worsen_meta.unwrap();
        assert!((meta.delta_minutes).abs() < f64::EPSILON);
    }

    #[test]
    fn options_json_rejects_negative_target() {
        let err = WorsenOptions::from_json(r#"{"target_delta_minutes": -3.0}"#).unwrap_err();
        assert!(err.contains("non-negative"));
        let ok = WorsenOptions::from_json(r#"{"target_delta_minutes": 8.0, "seed": 7}"#).unwrap();
        assert!((ok.target_delta_minutes - 8.0).abs() < f64::EPSILON);
        assert_eq!(ok.seed, 7);
        assert_eq!(ok.bisections, DEFAULT_BISECTIONS);
    }
}
