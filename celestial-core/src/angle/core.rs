//! Core angle type.
//!
//! [`Angle`] stores radians and converts to degrees, hours and arcseconds on
//! demand. Catalog-facing code speaks decimal degrees; the spherical geometry
//! underneath wants radians, and this type is the boundary between the two.
//!
//! ```
//! use celestial_core::Angle;
//!
//! let ra = Angle::from_hours(13.0 + 20.0 / 60.0);
//! assert!((ra.degrees() - 200.0).abs() < 1e-10);
//!
//! let radius = Angle::from_arcseconds(2.0);
//! assert!((radius.degrees() - 2.0 / 3600.0).abs() < 1e-15);
//! ```

use crate::constants::{ARCSEC_PER_DEGREE, DEG_TO_RAD, RAD_TO_DEG};
use crate::AstroError;

/// An angle stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle {
    rad: f64,
}

impl Angle {
    pub const ZERO: Self = Self { rad: 0.0 };

    #[inline]
    pub const fn from_radians(rad: f64) -> Self {
        Self { rad }
    }

    #[inline]
    pub fn from_degrees(deg: f64) -> Self {
        Self::from_radians(deg * DEG_TO_RAD)
    }

    /// One hour of right ascension is 15 degrees.
    #[inline]
    pub fn from_hours(h: f64) -> Self {
        Self::from_degrees(h * 15.0)
    }

    #[inline]
    pub fn from_arcseconds(arcsec: f64) -> Self {
        Self::from_degrees(arcsec / ARCSEC_PER_DEGREE)
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.rad
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.rad * RAD_TO_DEG
    }

    #[inline]
    pub fn hours(self) -> f64 {
        self.degrees() / 15.0
    }

    #[inline]
    pub fn arcseconds(self) -> f64 {
        self.degrees() * ARCSEC_PER_DEGREE
    }

    #[inline]
    pub fn sin(self) -> f64 {
        libm::sin(self.rad)
    }

    #[inline]
    pub fn cos(self) -> f64 {
        libm::cos(self.rad)
    }

    /// Returns `(sin, cos)` in one call.
    #[inline]
    pub fn sin_cos(self) -> (f64, f64) {
        libm::sincos(self.rad)
    }

    /// Right ascension wrapped into `[0, 2π)`; errors on non-finite input.
    pub fn validate_right_ascension(self) -> Result<Self, AstroError> {
        super::validate::validate_right_ascension(self)
    }

    /// Declination checked against `[-90°, +90°]`.
    pub fn validate_declination(self) -> Result<Self, AstroError> {
        super::validate::validate_declination(self)
    }
}
