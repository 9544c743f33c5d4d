//! Gridlock congestion engine
//!
//! Platform-agnostic core for route-congestion amplification: given a
//! baseline driving route's per-segment congestion profile, synthesize a
//! worsened profile whose estimated travel time exceeds the baseline by a
//! caller-specified number of minutes. The engine is pure and deterministic;
//! all randomness flows from the caller-supplied seed and it performs no I/O.

pub mod estimate;
pub mod level;
pub mod mask;
pub mod numbers;
pub mod params;
pub mod rng;
pub mod route;
pub mod search;
pub mod worsen;

// Re-export commonly used types
pub use estimate::{Factors, estimate_minutes};
pub use level::CongestionLevel;
pub use mask::{BandMasks, MaskContext, build_worsened_mask, worsened_bands};
pub use params::{
    BaseParams, DILATION_RANGE, ParamWeights, RUN_COUNT_RANGE, RUN_LENGTH_RANGE,
    params_for_intensity,
};
pub use rng::{DEFAULT_SEED, PlacementRng};
pub use route::{LegAnnotation, ParamsUsed, Route, RouteLeg, WorsenMeta};
pub use search::{
    DEFAULT_BISECTIONS, DEFAULT_INTENSITY_MAX, SearchConfig, SearchOutcome, SearchRequest,
    search_intensity,
};
pub use worsen::{
    DEFAULT_HIGHWAY_THRESHOLD_METERS, WorsenOptions, WorsenResult, worsen_route,
    worsen_route_copy,
};
