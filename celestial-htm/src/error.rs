use celestial_core::AstroError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum HtmError {
    #[error("invalid mesh depth {depth}: must be at most {max}")]
    InvalidDepth { depth: u8, max: u8 },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("no trixel index: {0}")]
    MissingIndex(String),

    #[error("invalid radius {0}: must be finite and non-negative")]
    InvalidRadius(f64),

    #[error("invalid trixel: {0}")]
    InvalidTrixel(String),

    #[error("coordinate error: {0}")]
    Coordinate(#[from] AstroError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, HtmError>;

impl HtmError {
    pub(crate) fn mismatch(what: &str, left: usize, right: usize) -> Self {
        HtmError::DimensionMismatch(format!("{what}: {left} != {right}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = HtmError::InvalidDepth { depth: 26, max: 25 };
        assert_eq!(err.to_string(), "invalid mesh depth 26: must be at most 25");

        let err = HtmError::mismatch("ra/dec lengths", 3, 2);
        assert_eq!(err.to_string(), "dimension mismatch: ra/dec lengths: 3 != 2");
    }

    #[test]
    fn test_store_error_converts() {
        let err: HtmError = StoreError::MissingIndex { depth: 16 }.into();
        assert!(matches!(err, HtmError::Store(_)));
    }
}
