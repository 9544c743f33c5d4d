//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it into `[lo, hi]`, returning `lo` for NaN values.
#[must_use]
pub fn round_f64_to_u32(value: f64, lo: u32, hi: u32) -> u32 {
    if value.is_nan() {
        return lo;
    }
    let lo_f = cast::<u32, f64>(lo).unwrap_or(0.0);
    let hi_f = cast::<u32, f64>(hi).unwrap_or(f64::MAX);
    let rounded = value.round().clamp(lo_f, hi_f);
    cast::<f64, u32>(rounded).unwrap_or(lo)
}

/// Widen a u32 into usize in a single location.
#[must_use]
pub fn usize_from_u32(value: u32) -> usize {
    cast::<u32, usize>(value).unwrap_or(0)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn f64_from_usize(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}
