//! Error types for coordinate handling.
//!
//! [`AstroError`] covers the two ways a coordinate can be rejected before it
//! reaches any spatial index: the text could not be parsed, or the numeric
//! value is unusable (non-finite, outside the valid range).
//!
//! # Error Categories
//!
//! | Variant | Use Case |
//! |---------|----------|
//! | [`Parse`](AstroError::Parse) | Sexagesimal or decimal text that matches no known format |
//! | [`MathError`](AstroError::MathError) | NaN/infinite values, declination beyond the poles |
//!
//! # Usage
//!
//! ```
//! use celestial_core::{AstroError, MathErrorKind};
//!
//! fn checked_radius(r: f64) -> Result<f64, AstroError> {
//!     if !r.is_finite() {
//!         return Err(AstroError::math_error(
//!             "checked_radius",
//!             MathErrorKind::NotFinite,
//!             "radius is not finite",
//!         ));
//!     }
//!     Ok(r)
//! }
//! ```

use thiserror::Error;

/// Classification of numeric failures.
#[derive(Debug, Clone, PartialEq)]
pub enum MathErrorKind {
    /// Input value is invalid for the operation.
    InvalidInput,
    /// Value is NaN or infinity.
    NotFinite,
    /// Value outside valid domain (e.g., declination > 90°).
    OutOfRange,
}

/// Error type for coordinate parsing and validation.
#[derive(Error, Debug)]
pub enum AstroError {
    /// Text that could not be read as an angle in the expected format.
    #[error("Cannot parse '{input}' as {expected}")]
    Parse { input: String, expected: String },

    /// Numerical failure or out-of-domain value.
    #[error("Math error in {operation} ({kind:?}): {message}")]
    MathError {
        operation: String,
        kind: MathErrorKind,
        message: String,
    },
}

/// Convenience alias for `Result<T, AstroError>`.
pub type AstroResult<T> = Result<T, AstroError>;

impl AstroError {
    /// Creates a [`Parse`](Self::Parse) error.
    pub fn parse_error(input: &str, expected: &str) -> Self {
        Self::Parse {
            input: input.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Creates a [`MathError`](Self::MathError) with the given kind.
    pub fn math_error(operation: &str, kind: MathErrorKind, reason: &str) -> Self {
        Self::MathError {
            operation: operation.to_string(),
            kind,
            message: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err = AstroError::parse_error("12:xx:00", "HMS format");
        assert_eq!(err.to_string(), "Cannot parse '12:xx:00' as HMS format");
    }

    #[test]
    fn test_math_error_with_kind() {
        let err = AstroError::math_error(
            "validate_declination",
            MathErrorKind::OutOfRange,
            "Dec 95.00° out of range [-90°, +90°]",
        );
        assert!(err.to_string().contains("Math error"));
        assert!(err.to_string().contains("OutOfRange"));
    }

    #[test]
    fn test_send_sync() {
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}
        _assert_send::<AstroError>();
        _assert_sync::<AstroError>();
    }
}
