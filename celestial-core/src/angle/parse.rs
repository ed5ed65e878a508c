//! Parsing of sexagesimal and decimal angle strings.
//!
//! Catalog tools hand coordinates around in two shapes: decimal degrees
//! (`"155.125"`) and sexagesimal strings (`"10:20:30"`, `"+45d30m15s"`,
//! `"-00 12 34.5"`). Right ascension sexagesimal is hours, declination
//! sexagesimal is degrees.
//!
//! ```text
//! Colon-separated:  12:34:56.789
//! Space-separated:  12 34 56.789
//! Letter markers:   12h34m56.789s  or  45d30m15s
//! Symbol notation:  45d 30' 15"
//! ```
//!
//! Signs are only valid at the beginning: `-12:34:56` works, `12:-34:56` does not.
//!
//! ```
//! use celestial_core::angle::{parse_dec, parse_ra, AngleUnits};
//!
//! let ra = parse_ra("10:20:30").unwrap();
//! assert!((ra.degrees() - 155.125).abs() < 1e-10);
//!
//! let dec = parse_dec("-45.5").unwrap();
//! assert_eq!(dec.degrees(), -45.5);
//!
//! let radius = "2.0".arcsec().unwrap();
//! assert!((radius.degrees() - 2.0 / 3600.0).abs() < 1e-15);
//! ```

use super::Angle;
use crate::AstroError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Parse strings as angles with an explicit unit.
pub trait AngleUnits {
    /// Decimal degrees.
    fn deg(&self) -> Result<Angle, AstroError>;
    /// Decimal hours (1 hour = 15 degrees).
    fn hours(&self) -> Result<Angle, AstroError>;
    fn arcmin(&self) -> Result<Angle, AstroError>;
    fn arcsec(&self) -> Result<Angle, AstroError>;
    /// Degrees-minutes-seconds.
    fn dms(&self) -> Result<Angle, AstroError>;
    /// Hours-minutes-seconds.
    fn hms(&self) -> Result<Angle, AstroError>;
}

impl AngleUnits for str {
    #[inline]
    fn deg(&self) -> Result<Angle, AstroError> {
        parse_decimal(self).map(Angle::from_degrees)
    }

    #[inline]
    fn hours(&self) -> Result<Angle, AstroError> {
        parse_decimal(self).map(Angle::from_hours)
    }

    #[inline]
    fn arcmin(&self) -> Result<Angle, AstroError> {
        parse_decimal(self).map(|v| Angle::from_degrees(v / 60.0))
    }

    #[inline]
    fn arcsec(&self) -> Result<Angle, AstroError> {
        parse_decimal(self).map(Angle::from_arcseconds)
    }

    #[inline]
    fn dms(&self) -> Result<Angle, AstroError> {
        parse_dms(self)
    }

    #[inline]
    fn hms(&self) -> Result<Angle, AstroError> {
        parse_hms(self)
    }
}

/// Right ascension from either sexagesimal hours or decimal degrees.
pub fn parse_ra(s: &str) -> Result<Angle, AstroError> {
    parse_hms(s)
        .or_else(|_| s.deg())
        .map_err(|_| AstroError::parse_error(s, "right ascension"))
}

/// Declination from either sexagesimal degrees or decimal degrees.
pub fn parse_dec(s: &str) -> Result<Angle, AstroError> {
    parse_dms(s)
        .or_else(|_| s.deg())
        .map_err(|_| AstroError::parse_error(s, "declination"))
}

fn parse_decimal(s: &str) -> Result<f64, AstroError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| AstroError::parse_error(s, "number"))
}

static SEXAGESIMAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        ^\s*
        ([+-])?                     # optional sign
        (\d{1,3})                   # hours or degrees
        \s*(?:[:hHdD]\s*|\s+)       # separator
        (\d{1,2})                   # minutes
        \s*(?:[:mM']\s*|\s+)        # separator
        (\d{1,2}(?:\.\d*)?)         # seconds with optional decimal
        \s*(?:[sS"])?               # optional trailing marker
        \s*$
        "#,
    )
    .expect("sexagesimal pattern is a valid regex")
});

/// Parse a string as hours-minutes-seconds.
///
/// Accepts `12:34:56`, `12 34 56` and `12h34m56s`. The result can exceed
/// 24h if the input does.
pub fn parse_hms(s: &str) -> Result<Angle, AstroError> {
    sexagesimal(s, "HMS").map(Angle::from_hours)
}

/// Parse a string as degrees-minutes-seconds.
///
/// Accepts `45:30:15`, `45 30 15`, `45d30m15s` and `45d 30' 15"`.
pub fn parse_dms(s: &str) -> Result<Angle, AstroError> {
    sexagesimal(s, "DMS").map(Angle::from_degrees)
}

fn sexagesimal(s: &str, expected: &str) -> Result<f64, AstroError> {
    let normalized = s.replace("''", "\"");
    let caps = SEXAGESIMAL_REGEX
        .captures(&normalized)
        .ok_or_else(|| AstroError::parse_error(s, expected))?;

    let field = |i: usize| -> Result<f64, AstroError> {
        caps[i]
            .parse::<f64>()
            .map_err(|_| AstroError::parse_error(s, expected))
    };

    let sign = match caps.get(1).map(|m| m.as_str()) {
        Some("-") => -1.0,
        _ => 1.0,
    };
    let minutes = field(3)?;
    let seconds = field(4)?;
    if minutes >= 60.0 || seconds >= 60.0 {
        return Err(AstroError::parse_error(s, expected));
    }

    Ok(sign * (field(2)? + minutes / 60.0 + seconds / 3600.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_decimal_parsing() {
        assert_eq!("45.5".deg().unwrap().degrees(), 45.5);
        assert_eq!("12.5".hours().unwrap().hours(), 12.5);
        assert!(("60.0".arcmin().unwrap().degrees() - 1.0).abs() < EPSILON);
        assert!(("3600.0".arcsec().unwrap().degrees() - 1.0).abs() < EPSILON);
        assert_eq!("  -45.5  ".deg().unwrap().degrees(), -45.5);
    }

    #[test]
    fn test_hms_formats() {
        let expected = 12.0 + 34.0 / 60.0 + 56.0 / 3600.0;
        for s in ["12:34:56", "12 34 56", "12h34m56s", "12h 34m 56s", "12H34M56S"] {
            let angle = s.hms().unwrap();
            assert!((angle.hours() - expected).abs() < EPSILON, "{s}");
        }

        let angle = "-5:30:45.5".hms().unwrap();
        let expected = -(5.0 + 30.0 / 60.0 + 45.5 / 3600.0);
        assert!((angle.hours() - expected).abs() < EPSILON);
    }

    #[test]
    fn test_dms_formats() {
        let expected = 45.0 + 30.0 / 60.0 + 15.0 / 3600.0;
        for s in ["45:30:15", "+45 30 15", "45d30m15s", "45d 30' 15\"", "45d 30' 15''"] {
            let angle = s.dms().unwrap();
            assert!((angle.degrees() - expected).abs() < EPSILON, "{s}");
        }
    }

    #[test]
    fn test_negative_zero_degrees() {
        let angle = "-00:30:00".dms().unwrap();
        assert!((angle.degrees() + 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_parse_ra_and_dec() {
        assert!((parse_ra("10:20:30").unwrap().degrees() - 155.125).abs() < EPSILON);
        assert_eq!(parse_ra("155.125").unwrap().degrees(), 155.125);
        assert!((parse_dec("-10:30:00").unwrap().degrees() + 10.5).abs() < EPSILON);
        assert_eq!(parse_dec("-10.5").unwrap().degrees(), -10.5);
    }

    #[test]
    fn test_error_cases() {
        assert!("not_a_number".deg().is_err());
        assert!("".deg().is_err());
        assert!("12:34".hms().is_err());
        assert!("12:34:".hms().is_err());
        assert!("45:-30:15".dms().is_err());
        assert!("12:61:00".hms().is_err());
        assert!(parse_ra("nowhere").is_err());
    }

    #[test]
    fn test_error_message_names_input() {
        let err = parse_dec("north").unwrap_err();
        assert_eq!(err.to_string(), "Cannot parse 'north' as declination");
    }
}
