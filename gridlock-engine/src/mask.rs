//! Band-mask pipeline: dilation, nesting, and deterministic run seeding.
use rand::Rng;
use smallvec::SmallVec;

use crate::level::CongestionLevel;
use crate::numbers;
use crate::params::BaseParams;
use crate::rng::PlacementRng;

/// Fraction of the route a single run may cover at most.
const MAX_RUN_COVER: f64 = 0.95;

/// Worsening tier handled by the mask pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Band {
    Orange,
    Red,
    Severe,
}

/// Placement inputs shared by every mask build in one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskContext {
    pub prefer_highways: bool,
    pub highway_threshold_meters: f64,
    pub seed: u64,
}

/// Boolean per-segment masks for the three worsening tiers.
///
/// A valid value is nested: every severe position is also red, every red
/// position is also orange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandMasks {
    pub orange: Vec<bool>,
    pub red: Vec<bool>,
    pub severe: Vec<bool>,
}

/// Run start positions chosen for one band; at most eight runs are placed.
pub(crate) type RunStarts = SmallVec<[usize; 8]>;

/// Build the worsened per-segment levels for one parameter set.
///
/// Deterministic in `(baseline, distances, params, ctx)`: the placement RNG
/// is re-derived from `ctx.seed` on every call.
#[must_use]
pub fn build_worsened_mask(
    baseline: &[CongestionLevel],
    distances: &[f64],
    params: &BaseParams,
    ctx: &MaskContext,
) -> Vec<CongestionLevel> {
    let masks = worsened_bands(baseline, distances, params, ctx);
    collapse(&masks, baseline)
}

/// Derive the worsened band masks without collapsing them to levels.
#[must_use]
pub fn worsened_bands(
    baseline: &[CongestionLevel],
    distances: &[f64],
    params: &BaseParams,
    ctx: &MaskContext,
) -> BandMasks {
    worsened_bands_traced(baseline, distances, params, ctx).0
}

pub(crate) fn worsened_bands_traced(
    baseline: &[CongestionLevel],
    distances: &[f64],
    params: &BaseParams,
    ctx: &MaskContext,
) -> (BandMasks, [RunStarts; 3]) {
    let params = params.clamped();
    let mut rng = PlacementRng::from_user_seed(ctx.seed);

    let masks = band_masks_from_levels(baseline);
    let masks = BandMasks {
        orange: dilate(&masks.orange, numbers::usize_from_u32(params.dil_orange)),
        red: dilate(&masks.red, numbers::usize_from_u32(params.dil_red)),
        severe: dilate(&masks.severe, numbers::usize_from_u32(params.dil_severe)),
    };
    // Independent per-band radii can break nesting; re-enforce before seeding.
    let mut masks = enforce_nesting(masks);

    let orange_starts = seed_band_runs(
        &mut masks,
        Band::Orange,
        params.runs_orange,
        params.len_orange,
        distances,
        ctx,
        rng.orange(),
    );
    let red_starts = seed_band_runs(
        &mut masks,
        Band::Red,
        params.runs_red,
        params.len_red,
        distances,
        ctx,
        rng.red(),
    );
    let severe_starts = seed_band_runs(
        &mut masks,
        Band::Severe,
        params.runs_severe,
        params.len_severe,
        distances,
        ctx,
        rng.severe(),
    );

    (masks, [orange_starts, red_starts, severe_starts])
}

fn band_masks_from_levels(baseline: &[CongestionLevel]) -> BandMasks {
    BandMasks {
        orange: baseline.iter().map(|level| level.ordinal() >= 1).collect(),
        red: baseline.iter().map(|level| level.ordinal() >= 2).collect(),
        severe: baseline.iter().map(|level| level.ordinal() >= 3).collect(),
    }
}

/// Grow every marked region by `radius` positions in both directions.
fn dilate(mask: &[bool], radius: usize) -> Vec<bool> {
    if radius == 0 || mask.is_empty() {
        return mask.to_vec();
    }
    let n = mask.len();
    let mut grown = vec![false; n];
    for (position, set) in mask.iter().enumerate() {
        if !set {
            continue;
        }
        let from = position.saturating_sub(radius);
        let to = (position + radius).min(n - 1);
        for slot in &mut grown[from..=to] {
            *slot = true;
        }
    }
    grown
}

/// Force severe ⊆ red ⊆ orange, strongest bands losing positions first.
fn enforce_nesting(masks: BandMasks) -> BandMasks {
    let BandMasks {
        orange,
        mut red,
        mut severe,
    } = masks;
    for (slot, gate) in red.iter_mut().zip(&orange) {
        *slot = *slot && *gate;
    }
    for (slot, gate) in severe.iter_mut().zip(&red) {
        *slot = *slot && *gate;
    }
    BandMasks {
        orange,
        red,
        severe,
    }
}

fn seed_band_runs<R: Rng>(
    masks: &mut BandMasks,
    band: Band,
    count: u32,
    length: u32,
    distances: &[f64],
    ctx: &MaskContext,
    rng: &mut R,
) -> RunStarts {
    let n = masks.orange.len();
    let mut starts = RunStarts::new();
    if n == 0 || count == 0 {
        return starts;
    }
    let length = numbers::usize_from_u32(length).clamp(1, run_length_cap(n));
    for _ in 0..count {
        let pool = starts_pool(masks, band);
        let Some(start) = pick_start(&pool, distances, length, n, ctx, rng) else {
            break;
        };
        mark_run(masks, band, start, length);
        starts.push(start);
    }
    starts
}

/// Longest run a route of `n` segments admits without being trivially covered.
fn run_length_cap(n: usize) -> usize {
    let capped = (numbers::f64_from_usize(n) * MAX_RUN_COVER).floor();
    let capped = numbers::usize_from_u32(numbers::round_f64_to_u32(capped, 0, u32::MAX));
    capped.max(1)
}

/// Eligible start positions for a band: red runs start inside the current
/// orange region, severe runs inside the current red region.
fn starts_pool(masks: &BandMasks, band: Band) -> Vec<usize> {
    match band {
        Band::Orange => (0..masks.orange.len()).collect(),
        Band::Red => marked_positions(&masks.orange),
        Band::Severe => marked_positions(&masks.red),
    }
}

fn marked_positions(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(position, set)| set.then_some(position))
        .collect()
}

/// Draw a run start from the pool.
///
/// Starts where the run fits whole are preferred; when `prefer_highways` is
/// set and the pool holds segments longer than the threshold, sampling is
/// restricted to those.
fn pick_start<R: Rng>(
    pool: &[usize],
    distances: &[f64],
    length: usize,
    n: usize,
    ctx: &MaskContext,
    rng: &mut R,
) -> Option<usize> {
    if pool.is_empty() {
        return None;
    }
    let fitting: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&position| position + length <= n)
        .collect();
    let candidates: &[usize] = if fitting.is_empty() { pool } else { &fitting };

    if ctx.prefer_highways {
        let highways: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&position| {
                distances
                    .get(position)
                    .is_some_and(|meters| *meters > ctx.highway_threshold_meters)
            })
            .collect();
        if !highways.is_empty() {
            return Some(highways[rng.gen_range(0..highways.len())]);
        }
    }

    Some(candidates[rng.gen_range(0..candidates.len())])
}

/// Mark a run into its band and every weaker band, clipping at the route end.
fn mark_run(masks: &mut BandMasks, band: Band, start: usize, length: usize) {
    let end = (start + length).min(masks.orange.len());
    for position in start..end {
        masks.orange[position] = true;
        if matches!(band, Band::Red | Band::Severe) {
            masks.red[position] = true;
        }
        if matches!(band, Band::Severe) {
            masks.severe[position] = true;
        }
    }
}

/// Collapse nested band masks back to one level per segment.
fn collapse(masks: &BandMasks, baseline: &[CongestionLevel]) -> Vec<CongestionLevel> {
    baseline
        .iter()
        .enumerate()
        .map(|(position, level)| {
            if masks.severe.get(position).copied().unwrap_or(false) {
                CongestionLevel::Severe
            } else if masks.red.get(position).copied().unwrap_or(false) {
                CongestionLevel::Heavy
            } else if masks.orange.get(position).copied().unwrap_or(false) {
                CongestionLevel::Moderate
            } else {
                *level
            }
        })
        .collect()
}
