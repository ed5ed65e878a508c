//! Foundation math for indexing and crossmatching points on the celestial sphere.
//!
//! `celestial-core` holds the pieces every spatial query needs before any
//! mesh is involved: unit vectors on the sphere, typed angles, numerically
//! stable angular separation, and the conversion of sexagesimal coordinate
//! strings into decimal degrees.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`angle`] | [`Angle`] type, HMS/DMS parsing, RA/Dec normalization and validation |
//! | [`matrix`] | [`Vector3`] Cartesian vectors on the unit sphere |
//! | [`math`] | Vincenty angular separation |
//! | [`constants`] | Unit conversions and solid-angle constants |
//! | [`errors`] | [`AstroError`] and [`AstroResult`] |
//!
//! # Re-exports
//!
//! ```
//! use celestial_core::{Angle, Vector3};
//! use celestial_core::{AstroError, AstroResult, MathErrorKind};
//! ```
//!
//! # Design Notes
//!
//! - **Radians internally**: [`Angle`] stores radians; degree constructors and
//!   accessors exist for the catalog-facing API, which speaks decimal degrees.
//! - **No implicit state**: every function here is a pure calculator.

pub mod angle;
pub mod constants;
pub mod errors;
pub mod math;
pub mod matrix;

pub use angle::Angle;
pub use errors::{AstroError, AstroResult, MathErrorKind};
pub use math::angular_separation_deg;
pub use matrix::Vector3;
