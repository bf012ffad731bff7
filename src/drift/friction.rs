// drift/friction.rs

/// Linear decay toward zero that snaps to exactly zero instead of crossing it.
#[inline]
pub fn towards_zero(value: f64, step: f64) -> f64 {
    if value > step {
        value - step
    } else if value < -step {
        value + step
    } else {
        0.0
    }
}
