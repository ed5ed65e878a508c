//! Coordinate and radius normalization at the API boundary.
//!
//! Every public entry point takes [`Coordinates`] and [`Radius`], so the
//! checks happen once: equal ra/dec lengths, finite values, declination
//! within the poles, right ascension wrapped into `[0, 360)`, radii finite
//! and non-negative.

use celestial_core::angle::{parse_dec, parse_ra};
use celestial_core::Angle;
use serde::{Deserialize, Serialize};

use crate::error::{HtmError, Result};

/// A set of (ra, dec) positions in decimal degrees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    ra: Vec<f64>,
    dec: Vec<f64>,
}

impl Coordinates {
    pub fn new(ra: Vec<f64>, dec: Vec<f64>) -> Result<Self> {
        if ra.len() != dec.len() {
            return Err(HtmError::mismatch("ra/dec lengths", ra.len(), dec.len()));
        }
        let ra = ra
            .into_iter()
            .map(|r| Ok(Angle::from_degrees(r).validate_right_ascension()?.degrees()))
            .collect::<Result<Vec<_>>>()?;
        for &d in &dec {
            Angle::from_degrees(d).validate_declination()?;
        }
        Ok(Self { ra, dec })
    }

    pub fn single(ra: f64, dec: f64) -> Result<Self> {
        Self::new(vec![ra], vec![dec])
    }

    /// Parses sexagesimal (`10:20:30`, `-45d30m15s`) or decimal strings.
    ///
    /// Right ascension sexagesimal is read as hours, declination as degrees.
    ///
    /// ```
    /// use celestial_htm::Coordinates;
    ///
    /// let coords = Coordinates::parse(&["10:20:30", "155.125"], &["-10:30:00", "-10.5"]).unwrap();
    /// assert!((coords.ra()[0] - coords.ra()[1]).abs() < 1e-10);
    /// assert!((coords.dec()[0] - coords.dec()[1]).abs() < 1e-10);
    /// ```
    pub fn parse<S: AsRef<str>>(ra: &[S], dec: &[S]) -> Result<Self> {
        if ra.len() != dec.len() {
            return Err(HtmError::mismatch("ra/dec lengths", ra.len(), dec.len()));
        }
        let ra = ra
            .iter()
            .map(|s| parse_ra(s.as_ref()).map(|a| a.degrees()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let dec = dec
            .iter()
            .map(|s| parse_dec(s.as_ref()).map(|a| a.degrees()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(ra, dec)
    }

    pub fn len(&self) -> usize {
        self.ra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ra.is_empty()
    }

    pub fn ra(&self) -> &[f64] {
        &self.ra
    }

    pub fn dec(&self) -> &[f64] {
        &self.dec
    }

    pub fn get(&self, i: usize) -> Option<(f64, f64)> {
        Some((*self.ra.get(i)?, *self.dec.get(i)?))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.ra.iter().copied().zip(self.dec.iter().copied())
    }
}

/// Match radius in degrees, one for all points or one per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Radius {
    Scalar(f64),
    PerPoint(Vec<f64>),
}

impl Radius {
    /// Checks values and that a per-point radius matches `n` query points.
    /// A one-element sequence is treated as a scalar.
    pub fn validate(&self, n: usize) -> Result<()> {
        let values: &[f64] = match self {
            Radius::Scalar(r) => std::slice::from_ref(r),
            Radius::PerPoint(rs) => {
                if rs.len() != 1 && rs.len() != n {
                    return Err(HtmError::mismatch("radius/query lengths", rs.len(), n));
                }
                rs
            }
        };
        match values.iter().find(|r| !r.is_finite() || **r < 0.0) {
            Some(&bad) => Err(HtmError::InvalidRadius(bad)),
            None => Ok(()),
        }
    }

    /// Radius for query point `i`. Call [`validate`](Self::validate) first.
    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        match self {
            Radius::Scalar(r) => *r,
            Radius::PerPoint(rs) if rs.len() == 1 => rs[0],
            Radius::PerPoint(rs) => rs[i],
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            Radius::Scalar(r) => *r,
            Radius::PerPoint(rs) => rs.iter().copied().fold(0.0, f64::max),
        }
    }
}

impl From<f64> for Radius {
    fn from(r: f64) -> Self {
        Radius::Scalar(r)
    }
}

impl From<Vec<f64>> for Radius {
    fn from(rs: Vec<f64>) -> Self {
        Radius::PerPoint(rs)
    }
}

impl From<&[f64]> for Radius {
    fn from(rs: &[f64]) -> Self {
        Radius::PerPoint(rs.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch() {
        let err = Coordinates::new(vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, HtmError::DimensionMismatch(_)));
    }

    #[test]
    fn test_ra_wrapped() {
        let coords = Coordinates::new(vec![-10.0, 370.0], vec![0.0, 0.0]).unwrap();
        assert!((coords.ra()[0] - 350.0).abs() < 1e-10);
        assert!((coords.ra()[1] - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_bad_declination() {
        assert!(matches!(
            Coordinates::single(0.0, 91.0),
            Err(HtmError::Coordinate(_))
        ));
        assert!(Coordinates::single(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = Coordinates::parse(&["xx"], &["0"]).unwrap_err();
        assert!(err.to_string().contains("right ascension"));
    }

    #[test]
    fn test_radius_validation() {
        assert!(Radius::from(1.0).validate(3).is_ok());
        assert!(Radius::from(vec![1.0]).validate(3).is_ok());
        assert!(Radius::from(vec![1.0, 2.0, 3.0]).validate(3).is_ok());
        assert!(matches!(
            Radius::from(vec![1.0, 2.0]).validate(3),
            Err(HtmError::DimensionMismatch(_))
        ));
        assert!(matches!(
            Radius::from(-1.0).validate(1),
            Err(HtmError::InvalidRadius(_))
        ));
        assert!(Radius::from(f64::INFINITY).validate(1).is_err());
    }

    #[test]
    fn test_radius_get() {
        let r = Radius::from(vec![0.5]);
        assert_eq!(r.get(7), 0.5);
        let r = Radius::from(vec![0.1, 0.2]);
        assert_eq!(r.get(1), 0.2);
        assert_eq!(r.max(), 0.2);
    }
}
