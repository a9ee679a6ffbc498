//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Floor a f64 into the u32 range, returning 0 for negative or non-finite values.
#[must_use]
pub fn floor_f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    cast::<f64, u32>(value.min(max).floor()).unwrap_or(0)
}

/// Convert a count into f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert a u32 into f64.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Convert a grid position into a table index (`position - 1`), if the position is valid.
#[must_use]
pub fn position_index(position: u8) -> Option<usize> {
    usize::from(position).checked_sub(1)
}
