//! The Hierarchical Triangular Mesh.
//!
//! The sphere is split into 8 root triangles (the faces of an octahedron)
//! and every triangle is recursively quadrisected through its edge
//! midpoints. A [`Mesh`] is nothing more than a chosen depth: trixel ids are
//! arithmetic, so no tree is ever stored.
//!
//! | Depth | Mean side | Mean area |
//! |-------|-----------|-----------|
//! | 0 | 90° | 5157 deg² |
//! | 10 | 5.3′ | 4.9e-3 deg² |
//! | 16 | 4.9″ | 1.2e-6 deg² |
//! | 25 | 0.01″ | 4.5e-12 deg² |
//!
//! # Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`trixel`] | Id encoding, names, parent/child/descendant arithmetic, triangle geometry |
//! | [`locate`] | Point to leaf-trixel lookup |
//! | [`intersect`] | Circle to trixel-set cover |
//! | [`cache`] | Explicit depth-keyed mesh memoization |
//!
//! ```
//! use celestial_htm::mesh::Mesh;
//!
//! let mesh = Mesh::new(16).unwrap();
//! let id = mesh.lookup_id(200.0, 24.3);
//! assert_eq!(celestial_htm::mesh::depth_of(id).unwrap(), 16);
//! ```

pub mod cache;
pub mod intersect;
pub mod locate;
pub mod trixel;

pub use cache::MeshCache;
pub use intersect::TrixelRanges;
pub use trixel::{children, depth_of, descendant_range, from_name, is_valid, name, parent, Trixel};

use celestial_core::constants::{FULL_SPHERE_SR, SQ_DEG_PER_STERADIAN};
use celestial_core::Vector3;

use crate::coords::Coordinates;
use crate::error::{HtmError, Result};

/// Deepest supported level; ids at depth 25 use 54 bits.
pub const MAX_DEPTH: u8 = 25;

/// Mesh of a fixed depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mesh {
    depth: u8,
}

impl Mesh {
    pub fn new(depth: u8) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(HtmError::InvalidDepth {
                depth,
                max: MAX_DEPTH,
            });
        }
        Ok(Self { depth })
    }

    #[inline]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Mean trixel area in square degrees.
    pub fn area(&self) -> f64 {
        let root_sr = FULL_SPHERE_SR / 8.0;
        root_sr / 4f64.powi(self.depth as i32) * SQ_DEG_PER_STERADIAN
    }

    /// Mean trixel side length in degrees.
    pub fn side_length_deg(&self) -> f64 {
        side_length_deg(self.depth)
    }

    /// Finest depth whose mean side is still at least `radius_deg`,
    /// clamped to `[min, max]`.
    ///
    /// # Arguments
    /// * `radius_deg` - match or search radius in degrees
    /// * `min`, `max` - allowed depth range (`max` is capped at [`MAX_DEPTH`])
    ///
    /// ```
    /// use celestial_htm::mesh::Mesh;
    ///
    /// // 10 arcsec sits between depth 14 (19.8″) and 15 (9.9″)
    /// assert_eq!(Mesh::depth_for_radius(10.0 / 3600.0, 4, 16), 14);
    /// assert_eq!(Mesh::depth_for_radius(45.0, 4, 16), 4);
    /// ```
    pub fn depth_for_radius(radius_deg: f64, min: u8, max: u8) -> u8 {
        let max = max.min(MAX_DEPTH);
        let mut depth = 0;
        while depth < max && side_length_deg(depth + 1) >= radius_deg {
            depth += 1;
        }
        depth.max(min).min(max)
    }

    /// Leaf trixel id of every coordinate, in input order.
    pub fn lookup(&self, coords: &Coordinates) -> Vec<u64> {
        locate::locate_all(self.depth, coords)
    }

    pub fn lookup_id(&self, ra_deg: f64, dec_deg: f64) -> u64 {
        locate::locate(self.depth, &Vector3::from_radec_deg(ra_deg, dec_deg))
    }

    /// Sorted ids of the trixels overlapping a circle.
    ///
    /// With `inclusive` every trixel touching the circle is returned; without
    /// it only trixels lying entirely inside. Large circles at deep levels
    /// produce a lot of ids; prefer [`intersect_ranges`](Self::intersect_ranges)
    /// there.
    pub fn intersect(
        &self,
        ra_deg: f64,
        dec_deg: f64,
        radius_deg: f64,
        inclusive: bool,
    ) -> Result<Vec<u64>> {
        Ok(self
            .intersect_ranges(ra_deg, dec_deg, radius_deg, inclusive)?
            .ids()
            .collect())
    }

    pub fn intersect_ranges(
        &self,
        ra_deg: f64,
        dec_deg: f64,
        radius_deg: f64,
        inclusive: bool,
    ) -> Result<TrixelRanges> {
        if !radius_deg.is_finite() || radius_deg < 0.0 {
            return Err(HtmError::InvalidRadius(radius_deg));
        }
        let center = Vector3::from_radec_deg(ra_deg, dec_deg);
        Ok(intersect::cover(
            self.depth,
            &center,
            radius_deg.to_radians(),
            inclusive,
        ))
    }

    pub fn trixel(&self, id: u64) -> Result<Trixel> {
        let depth = depth_of(id)?;
        if depth != self.depth {
            return Err(HtmError::InvalidTrixel(format!(
                "{id} is at depth {depth}, mesh depth is {}",
                self.depth
            )));
        }
        Trixel::from_id(id)
    }
}

#[inline]
fn side_length_deg(depth: u8) -> f64 {
    90.0 / (1u64 << depth) as f64
}
