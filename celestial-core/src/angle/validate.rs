use super::core::Angle;
use crate::constants::HALF_PI;
use crate::{AstroError, MathErrorKind};

pub fn validate_right_ascension(angle: Angle) -> Result<Angle, AstroError> {
    let rad = angle.radians();
    if rad.is_finite() {
        let normalized = super::normalize::wrap_0_2pi(rad);
        return Ok(Angle::from_radians(normalized));
    }

    Err(AstroError::math_error(
        "validate_right_ascension",
        MathErrorKind::NotFinite,
        "RA not finite",
    ))
}

/// Validates a declination against `[-90°, +90°]`.
pub fn validate_declination(angle: Angle) -> Result<Angle, AstroError> {
    let rad = angle.radians();
    if !rad.is_finite() {
        return Err(AstroError::math_error(
            "validate_declination",
            MathErrorKind::NotFinite,
            "Dec not finite",
        ));
    }

    // tolerate the rounding of 90.0 * DEG_TO_RAD
    if (-HALF_PI - 1e-15..=HALF_PI + 1e-15).contains(&rad) {
        return Ok(angle);
    }

    Err(AstroError::math_error(
        "validate_declination",
        MathErrorKind::OutOfRange,
        &format!("Dec {:.2}° out of range [-90°, +90°]", angle.degrees()),
    ))
}
