//! Right ascension wrapping.
//!
//! Right ascension is cyclic with the discontinuity at 0/360 degrees. Both
//! helpers here use `libm::fmod` (via [`crate::math::fmod`]) and then shift
//! negative remainders up by one turn, since `%` on floats is a remainder
//! and keeps the sign of the dividend.

use crate::constants::TWOPI;
use crate::math::fmod;

/// Wraps an angle to `[0, 2π)` radians.
///
/// ```
/// use celestial_core::angle::wrap_0_2pi;
/// use std::f64::consts::PI;
///
/// let ra = wrap_0_2pi(-0.5);
/// assert!(ra > 0.0 && ra < 2.0 * PI);
/// ```
#[inline]
pub fn wrap_0_2pi(x: f64) -> f64 {
    let w = fmod(x, TWOPI);
    let w = if w < 0.0 { w + TWOPI } else { w };
    // -tiny + 2π rounds to exactly 2π
    if w >= TWOPI {
        0.0
    } else {
        w
    }
}

/// Wraps decimal degrees to `[0, 360)`.
#[inline]
pub fn wrap_ra_deg(ra_deg: f64) -> f64 {
    let w = fmod(ra_deg, 360.0);
    let w = if w < 0.0 { w + 360.0 } else { w };
    if w >= 360.0 {
        0.0
    } else {
        w
    }
}
