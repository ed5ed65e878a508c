//! Radius-bounded crossmatching and set extraction.
//!
//! - [`matcher`]: index a reference set once, match query sets against it
//! - [`sets`]: group a single set into associated sources via a self-match

pub mod matcher;
pub mod sets;

pub use matcher::{match_coordinates, Match, Matcher, Matches};
pub use sets::{GroupingMode, SetExtractor};
