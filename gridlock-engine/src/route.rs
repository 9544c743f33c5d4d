//! Directions-provider route shapes consumed and produced by the engine.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::estimate::Factors;
use crate::level::CongestionLevel;
use crate::params::BaseParams;

/// Per-segment annotation arrays for one route leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LegAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub congestion: Option<Vec<CongestionLevel>>,
    /// Meters per segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Vec<f64>>,
    /// Seconds per segment; enables exact per-segment reweighting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Vec<f64>>,
}

/// One leg of a provider route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RouteLeg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<LegAnnotation>,
}

/// One route as returned by a directions provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Route {
    /// Baseline travel time for the whole route, in seconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
    /// Opaque provider geometry, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    /// Worsening metadata attached by the engine; absent on provider routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worsen_meta: Option<WorsenMeta>,
}

impl Route {
    /// Annotation arrays of the first leg, when present.
    #[must_use]
    pub fn first_leg_annotation(&self) -> Option<&LegAnnotation> {
        self.legs.first().and_then(|leg| leg.annotation.as_ref())
    }
}

/// Final parameters and placement inputs a result was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamsUsed {
    pub params: BaseParams,
    pub prefer_highways: bool,
    pub seed: u64,
}

/// Metadata block attached to the adjusted route clone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorsenMeta {
    pub estimated_seconds: f64,
    pub estimated_minutes: f64,
    pub delta_minutes: f64,
    pub params: ParamsUsed,
    pub factors: Factors,
}
