//! The crossmatch engine.
//!
//! A [`Matcher`] locates every reference point once and keeps the
//! `(trixel id, index)` pairs sorted by id. Matching a query point is then:
//!
//! 1. cover the query circle with inclusive trixel ranges at the index depth
//! 2. binary-search the sorted index for each range to collect candidates
//! 3. compute the exact Vincenty separation and keep those within the radius
//! 4. order by separation and keep the nearest `maxmatch` (0 keeps all)
//!
//! Query points are independent and run on the rayon pool; results are
//! concatenated in query order, so output is deterministic.

use celestial_core::{angular_separation_deg, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coords::{Coordinates, Radius};
use crate::error::Result;
use crate::mesh::{intersect, Mesh};

/// One matched pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub idx1: usize,
    pub idx2: usize,
    pub sep_deg: f64,
}

/// Match results as parallel columns.
///
/// Rows are ordered by `idx1`, then by increasing `sep_deg`, ties broken by
/// `idx2`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matches {
    pub idx1: Vec<usize>,
    pub idx2: Vec<usize>,
    pub sep_deg: Vec<f64>,
}

impl Matches {
    pub fn len(&self) -> usize {
        self.idx1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx1.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Match> + '_ {
        self.idx1
            .iter()
            .zip(&self.idx2)
            .zip(&self.sep_deg)
            .map(|((&idx1, &idx2), &sep_deg)| Match { idx1, idx2, sep_deg })
    }
}

impl FromIterator<Match> for Matches {
    fn from_iter<I: IntoIterator<Item = Match>>(iter: I) -> Self {
        let mut out = Matches::default();
        for m in iter {
            out.idx1.push(m.idx1);
            out.idx2.push(m.idx2);
            out.sep_deg.push(m.sep_deg);
        }
        out
    }
}

/// A reference coordinate set indexed for repeated matching.
#[derive(Debug, Clone)]
pub struct Matcher {
    mesh: Mesh,
    reference: Coordinates,
    index: Vec<(u64, usize)>,
}

impl Matcher {
    /// Indexes `reference` at the mesh's depth.
    pub fn new(mesh: Mesh, reference: Coordinates) -> Self {
        let mut index: Vec<(u64, usize)> = mesh
            .lookup(&reference)
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        index.sort_unstable();
        debug!(depth = mesh.depth(), points = index.len(), "indexed reference set");

        Self {
            mesh,
            reference,
            index,
        }
    }

    pub fn depth(&self) -> u8 {
        self.mesh.depth()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn reference(&self) -> &Coordinates {
        &self.reference
    }

    /// Matches `query` against the indexed reference set.
    ///
    /// # Arguments
    /// * `query` - positions to look up (`idx1` indexes into these)
    /// * `radius` - degrees, scalar or one per query point
    /// * `maxmatch` - 0 for all pairs, `k` for the `k` nearest per query point
    ///
    /// # Errors
    /// [`DimensionMismatch`](crate::HtmError::DimensionMismatch) for a radius
    /// sequence of the wrong length, [`InvalidRadius`](crate::HtmError::InvalidRadius)
    /// for negative or non-finite radii.
    pub fn crossmatch(
        &self,
        query: &Coordinates,
        radius: impl Into<Radius>,
        maxmatch: usize,
    ) -> Result<Matches> {
        let radius = radius.into();
        radius.validate(query.len())?;

        let per_point: Vec<Vec<Match>> = (0..query.len())
            .into_par_iter()
            .map(|i| {
                let (ra, dec) = (query.ra()[i], query.dec()[i]);
                self.match_one(i, ra, dec, radius.get(i), maxmatch)
            })
            .collect();

        let matches: Matches = per_point.into_iter().flatten().collect();
        debug!(
            depth = self.depth(),
            queries = query.len(),
            pairs = matches.len(),
            maxmatch,
            "crossmatch complete"
        );
        Ok(matches)
    }

    fn match_one(
        &self,
        i: usize,
        ra: f64,
        dec: f64,
        radius_deg: f64,
        maxmatch: usize,
    ) -> Vec<Match> {
        let center = Vector3::from_radec_deg(ra, dec);
        let cover = intersect::cover(self.depth(), &center, radius_deg.to_radians(), true);

        let mut found = Vec::new();
        for &(lo, hi) in cover.ranges() {
            let start = self.index.partition_point(|&(id, _)| id < lo);
            let end = self.index.partition_point(|&(id, _)| id <= hi);
            for &(_, j) in &self.index[start..end] {
                let (ra2, dec2) = (self.reference.ra()[j], self.reference.dec()[j]);
                let sep_deg = angular_separation_deg(ra, dec, ra2, dec2);
                if sep_deg <= radius_deg {
                    found.push(Match {
                        idx1: i,
                        idx2: j,
                        sep_deg,
                    });
                }
            }
        }

        found.sort_by(|a, b| a.sep_deg.total_cmp(&b.sep_deg).then(a.idx2.cmp(&b.idx2)));
        if maxmatch > 0 {
            found.truncate(maxmatch);
        }
        found
    }
}

/// One-shot crossmatch of `set1` against `set2` at the mesh's depth.
///
/// ```
/// use celestial_htm::{match_coordinates, Coordinates};
/// use celestial_htm::mesh::Mesh;
///
/// let mesh = Mesh::new(16).unwrap();
/// let a = Coordinates::single(200.0, 24.3).unwrap();
/// let b = Coordinates::single(200.0, 24.3 + 1.0 / 3600.0).unwrap();
///
/// let m = match_coordinates(mesh, &a, &b, 2.0 / 3600.0, 0).unwrap();
/// assert_eq!(m.len(), 1);
/// assert!((m.sep_deg[0] - 1.0 / 3600.0).abs() < 1e-9);
/// ```
pub fn match_coordinates(
    mesh: Mesh,
    set1: &Coordinates,
    set2: &Coordinates,
    radius: impl Into<Radius>,
    maxmatch: usize,
) -> Result<Matches> {
    Matcher::new(mesh, set2.clone()).crossmatch(set1, radius, maxmatch)
}
