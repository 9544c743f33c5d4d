//! Bounded bisection search over mask intensity.
use crate::estimate::{self, Factors};
use crate::level::CongestionLevel;
use crate::mask::{self, MaskContext};
use crate::params::{self, BaseParams, ParamWeights};

/// Default upper bound of the intensity interval.
pub const DEFAULT_INTENSITY_MAX: f64 = 200.0;
/// Default iteration budget.
pub const DEFAULT_BISECTIONS: u32 = 10;

const MIN_BISECTIONS: u32 = 3;
const MAX_BISECTIONS: u32 = 20;

/// Search tuning supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub intensity_max: f64,
    pub bisections: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            intensity_max: DEFAULT_INTENSITY_MAX,
            bisections: DEFAULT_BISECTIONS,
        }
    }
}

/// Everything one intensity evaluation needs.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub baseline: &'a [CongestionLevel],
    pub distances: &'a [f64],
    pub segment_durations: Option<&'a [f64]>,
    pub base_total_seconds: f64,
    pub target_delta_minutes: f64,
    pub base: &'a BaseParams,
    pub weights: &'a ParamWeights,
    pub factors: &'a Factors,
    pub ctx: MaskContext,
}

/// Best candidate found by a search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub intensity: f64,
    pub params: BaseParams,
    pub adjusted_levels: Vec<CongestionLevel>,
    pub estimated_minutes: f64,
}

/// Bisect intensity toward the target delta under a fixed iteration budget.
///
/// The mapping from intensity to estimated minutes is a step function
/// (levels are discrete and runs move in whole segments), so the final
/// interval can be worse than an earlier midpoint. The lowest-difference
/// candidate seen anywhere during the search is the one returned.
#[must_use]
pub fn search_intensity(request: &SearchRequest<'_>, cfg: &SearchConfig) -> SearchOutcome {
    let base_minutes = (request.base_total_seconds / 60.0).round();
    let iterations = cfg.bisections.clamp(MIN_BISECTIONS, MAX_BISECTIONS);
    let intensity_max = if cfg.intensity_max > 0.0 {
        cfg.intensity_max
    } else {
        DEFAULT_INTENSITY_MAX
    };

    let evaluate = |intensity: f64| -> SearchOutcome {
        let derived = params::params_for_intensity(intensity, request.base, request.weights);
        let adjusted = mask::build_worsened_mask(
            request.baseline,
            request.distances,
            &derived,
            &request.ctx,
        );
        let estimated = estimate::estimate_minutes(
            request.baseline,
            &adjusted,
            request.distances,
            request.segment_durations,
            request.base_total_seconds,
            request.factors,
        )
        .unwrap_or(base_minutes);
        SearchOutcome {
            intensity,
            params: derived,
            adjusted_levels: adjusted,
            estimated_minutes: estimated,
        }
    };

    let mut lower = 0.0f64;
    let mut upper = intensity_max;
    let mut best: Option<(f64, SearchOutcome)> = None;

    for _ in 0..iterations {
        let midpoint = f64::midpoint(lower, upper);
        let candidate = evaluate(midpoint);
        let achieved = candidate.estimated_minutes - base_minutes;
        let difference = (achieved - request.target_delta_minutes).abs();
        if best
            .as_ref()
            .is_none_or(|(best_difference, _)| difference < *best_difference)
        {
            best = Some((difference, candidate));
        }
        if achieved < request.target_delta_minutes {
            lower = midpoint;
        } else {
            upper = midpoint;
        }
    }

    best.map_or_else(|| evaluate(0.0), |(_, outcome)| outcome)
}
