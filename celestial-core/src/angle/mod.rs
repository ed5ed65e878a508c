mod core;
mod normalize;
mod parse;
mod validate;

pub use core::Angle;
pub use normalize::{wrap_0_2pi, wrap_ra_deg};
pub use parse::{parse_dec, parse_dms, parse_hms, parse_ra, AngleUnits};
pub use validate::{validate_declination, validate_right_ascension};
