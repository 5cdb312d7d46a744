//! Cycle-over-cycle change measurement used by the alert gate.

/// Absorbs `f64` subtraction error so a change equal to the threshold stays
/// on the skip side of the boundary.
pub const BOUNDARY_TOLERANCE: f64 = 1e-12;

/// `|current - last| / |last|`, or `None` when `last` is zero and the ratio is undefined.
pub fn relative_change(last: f64, current: f64) -> Option<f64> {
    if last == 0.0 {
        return None;
    }
    Some(((current - last) / last).abs())
}

/// Whether a move from `last` to `current` clears `threshold`.
///
/// The boundary is excluded: a change equal to the threshold is not reported.
/// An undefined change (`last == 0`) always clears the gate.
pub fn clears_threshold(last: f64, current: f64, threshold: f64) -> bool {
    match relative_change(last, current) {
        None => true,
        Some(change) => change - threshold > BOUNDARY_TOLERANCE,
    }
}
