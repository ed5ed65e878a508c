//! Hierarchical Triangular Mesh indexing for points on the celestial sphere.
//!
//! The sphere is divided into 8 root triangles, each recursively split into
//! four, down to a chosen depth. Every position falls into exactly one
//! triangle ("trixel") per depth, and trixel ids are plain integers whose
//! descendants form contiguous ranges. That makes them usable as a database
//! index column and as the candidate filter for radius crossmatches.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`mesh`] | [`Mesh`](mesh::Mesh), trixel ids, point lookup, circle intersection, [`MeshCache`](mesh::MeshCache) |
//! | [`matching`] | [`Matcher`] crossmatch engine, [`SetExtractor`] grouping |
//! | [`conesearch`] | [`ConeSearchPlanner`](conesearch::ConeSearchPlanner) over a [`TableStore`](store::TableStore) |
//! | [`store`] | Store trait, [`MemoryTable`](store::MemoryTable), [`TrixelIndexer`](store::TrixelIndexer) |
//! | [`coords`] | [`Coordinates`] and [`Radius`] input normalization |
//! | [`error`] | [`HtmError`] and [`Result`] |
//!
//! # Quick Start
//!
//! ```
//! use celestial_htm::mesh::Mesh;
//! use celestial_htm::{Coordinates, Matcher};
//!
//! let mesh = Mesh::new(16).unwrap();
//! let catalog = Coordinates::new(vec![200.0, 200.001, 10.0], vec![24.3, 24.3, -5.0]).unwrap();
//! let matcher = Matcher::new(mesh, catalog);
//!
//! let query = Coordinates::single(200.0, 24.3 + 1.0 / 3600.0).unwrap();
//! let matches = matcher.crossmatch(&query, 5.0 / 3600.0, 1).unwrap();
//! assert_eq!(matches.idx2, vec![0]);
//! ```
//!
//! # Units
//!
//! Positions, radii and separations are decimal degrees throughout, except
//! [`ConeSearchParams::radius_arcsec`](conesearch::ConeSearchParams::radius_arcsec).
//! Sexagesimal strings are converted by [`Coordinates::parse`].
//!
//! # Features
//!
//! - **`cli`**: Enables the `hmpty` binary (`htmid`, `index`, `search`).

pub mod conesearch;
pub mod coords;
pub mod error;
pub mod matching;
pub mod mesh;
pub mod store;

pub use coords::{Coordinates, Radius};
pub use error::{HtmError, Result};
pub use matching::{match_coordinates, GroupingMode, Match, Matcher, Matches, SetExtractor};
