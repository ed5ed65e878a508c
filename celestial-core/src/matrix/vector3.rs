//! 3D Cartesian vectors for unit-sphere geometry.
//!
//! Sky positions become unit vectors before any spatial indexing happens.
//! Trixel vertices, edge midpoints and cap centres are all `Vector3`s, and
//! the containment tests reduce to dot and cross products:
//!
//! - **Dot product**: `a.dot(&b)` is `cos(θ)` for unit vectors.
//! - **Cross product**: `a.cross(&b)` is the pole of the great circle through
//!   `a` and `b`; the sign of `a.cross(&b).dot(&p)` says which side `p` is on.
//!
//! ```
//! use celestial_core::Vector3;
//!
//! let a = Vector3::x_axis();
//! let b = Vector3::y_axis();
//! assert_eq!(a.dot(&b), 0.0);
//! assert_eq!(a.cross(&b), Vector3::z_axis());
//! ```
//!
//! # Coordinate Conventions
//!
//! - **θ (theta)**: azimuth from +X toward +Y (right ascension)
//! - **φ (phi)**: elevation from the XY plane (declination)
use crate::constants::{DEG_TO_RAD, RAD_TO_DEG};
use std::fmt;

/// A 3D Cartesian vector.
///
/// ```
/// use celestial_core::Vector3;
///
/// let pole = Vector3::from_radec_deg(0.0, 90.0);
/// assert!((pole.z - 1.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zeros() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn x_axis() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn y_axis() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline]
    pub const fn z_axis() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn magnitude(&self) -> f64 {
        libm::sqrt(self.magnitude_squared())
    }

    #[inline]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Unit vector in the same direction. The zero vector is returned unchanged.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            *self
        } else {
            Self::new(self.x / mag, self.y / mag, self.z / mag)
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Angle between two directions in radians, `[0, π]`.
    ///
    /// Uses `atan2(|a×b|, a·b)`, which stays accurate for both tiny and
    /// near-antipodal separations where `acos` of the dot product does not.
    pub fn angle_to(&self, other: &Self) -> f64 {
        libm::atan2(self.cross(other).magnitude(), self.dot(other))
    }

    /// Normalized midpoint of the great-circle arc between two unit vectors.
    pub fn midpoint(&self, other: &Self) -> Self {
        (*self + *other).normalize()
    }

    /// Unit vector from spherical angles in radians.
    pub fn from_spherical(ra: f64, dec: f64) -> Self {
        let (sin_ra, cos_ra) = libm::sincos(ra);
        let (sin_dec, cos_dec) = libm::sincos(dec);
        Self::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }

    /// Returns `(theta, phi)` in radians with theta in `(-π, π]`.
    ///
    /// For the zero vector, returns `(0.0, 0.0)`.
    pub fn to_spherical(&self) -> (f64, f64) {
        let d2 = self.x * self.x + self.y * self.y;

        let theta = if d2 == 0.0 {
            0.0
        } else {
            libm::atan2(self.y, self.x)
        };
        let phi = if self.z == 0.0 {
            0.0
        } else {
            libm::atan2(self.z, libm::sqrt(d2))
        };

        (theta, phi)
    }

    #[inline]
    pub fn from_radec_deg(ra_deg: f64, dec_deg: f64) -> Self {
        Self::from_spherical(ra_deg * DEG_TO_RAD, dec_deg * DEG_TO_RAD)
    }

    /// Right ascension in `[0, 360)` and declination in `[-90, 90]`, degrees.
    pub fn to_radec_deg(&self) -> (f64, f64) {
        let (theta, phi) = self.to_spherical();
        let ra = crate::angle::wrap_ra_deg(theta * RAD_TO_DEG);
        (ra, phi * RAD_TO_DEG)
    }
}

impl std::ops::Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl std::ops::Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}, {:.6}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_vector3_magnitude() {
        let v = Vector3::new(3.0, 4.0, 0.0);
        assert_eq!(v.magnitude(), 5.0);
        assert_eq!(v.normalize(), Vector3::new(0.6, 0.8, 0.0));
        assert_eq!(Vector3::zeros().normalize(), Vector3::zeros());
    }

    #[test]
    fn test_vector3_arithmetic() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(a.dot(&b), 32.0);
    }

    #[test]
    fn test_cross_right_hand_rule() {
        assert_eq!(Vector3::y_axis().cross(&Vector3::z_axis()), Vector3::x_axis());
        assert_eq!(Vector3::z_axis().cross(&Vector3::x_axis()), Vector3::y_axis());
    }

    #[test]
    fn test_angle_to() {
        let x = Vector3::x_axis();
        assert!((x.angle_to(&Vector3::y_axis()) - FRAC_PI_2).abs() < 1e-15);
        assert!((x.angle_to(&-x) - PI).abs() < 1e-15);
        assert_eq!(x.angle_to(&x), 0.0);

        let tiny = Vector3::from_radec_deg(1e-7, 0.0);
        assert!((x.angle_to(&tiny).to_degrees() - 1e-7).abs() < 1e-18);
    }

    #[test]
    fn test_midpoint_is_unit() {
        let m = Vector3::x_axis().midpoint(&Vector3::y_axis());
        assert!((m.magnitude() - 1.0).abs() < 1e-15);
        assert!((m.x - m.y).abs() < 1e-15);
    }

    #[test]
    fn test_radec_roundtrip() {
        for &(ra, dec) in &[(0.0, 0.0), (155.125, -10.5), (359.9, 89.0), (270.0, -45.0)] {
            let (r, d) = Vector3::from_radec_deg(ra, dec).to_radec_deg();
            assert!((r - ra).abs() < 1e-9, "{ra} -> {r}");
            assert!((d - dec).abs() < 1e-9, "{dec} -> {d}");
        }
    }

    #[test]
    fn test_to_spherical_poles() {
        let (theta, phi) = Vector3::z_axis().to_spherical();
        assert_eq!(theta, 0.0);
        assert_eq!(phi, FRAC_PI_2);
        let (_, phi) = (-Vector3::z_axis()).to_spherical();
        assert_eq!(phi, -FRAC_PI_2);
    }

    #[test]
    fn test_display_formatting() {
        let v = Vector3::new(1.0, -0.5, 0.25);
        assert_eq!(v.to_string(), "[1.000000, -0.500000, 0.250000]");
    }
}
