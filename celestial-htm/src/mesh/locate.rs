//! Point to leaf-trixel lookup.
//!
//! The root is picked from the octant of the Cartesian point, then the
//! descent tests each level's three corner children against their inner
//! edge only (the point is already known to lie in the parent), falling
//! through to the central child.
//!
//! Boundary rules:
//! - roots use half-open octants: `x>0,y≥0` → N3/S0, `x≤0,y>0` → N2/S1,
//!   `x<0,y≤0` → N1/S2, `x≥0,y<0` → N0/S3, with `z ≥ 0` choosing the north;
//!   the poles land in N3/S0
//! - children are tried in order 0, 1, 2 with a closed test, first hit wins

use celestial_core::Vector3;
use rayon::prelude::*;

use super::trixel::{Trixel, N0, ROOT_VERTICES, S0};
use crate::coords::Coordinates;

/// Batches below this size are located on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

pub(crate) fn root_of(p: &Vector3) -> u64 {
    let north = p.z >= 0.0;
    // quadrant index counted from +x toward +y, as N3 N2 N1 N0 / S0 S1 S2 S3
    let quadrant = if p.x > 0.0 && p.y >= 0.0 {
        0
    } else if p.x <= 0.0 && p.y > 0.0 {
        1
    } else if p.x < 0.0 && p.y <= 0.0 {
        2
    } else if p.x >= 0.0 && p.y < 0.0 {
        3
    } else {
        // x == y == 0
        0
    };
    if north {
        N0 + 3 - quadrant
    } else {
        S0 + quadrant
    }
}

/// Leaf id at `depth` for a unit vector.
pub fn locate(depth: u8, p: &Vector3) -> u64 {
    let root = root_of(p);
    let mut trixel = Trixel {
        id: root,
        vertices: ROOT_VERTICES[(root - S0) as usize],
    };

    for _ in 0..depth {
        let [v0, v1, v2] = trixel.vertices;
        let (w0, w1, w2) = trixel.midpoints();
        let base = trixel.id << 2;

        trixel = if w2.cross(&w1).dot(p) >= 0.0 {
            Trixel { id: base, vertices: [v0, w2, w1] }
        } else if w0.cross(&w2).dot(p) >= 0.0 {
            Trixel { id: base | 1, vertices: [v1, w0, w2] }
        } else if w1.cross(&w0).dot(p) >= 0.0 {
            Trixel { id: base | 2, vertices: [v2, w1, w0] }
        } else {
            Trixel { id: base | 3, vertices: [w0, w1, w2] }
        };
    }

    trixel.id
}

pub(crate) fn locate_all(depth: u8, coords: &Coordinates) -> Vec<u64> {
    let locate_one = |(&ra, &dec): (&f64, &f64)| locate(depth, &Vector3::from_radec_deg(ra, dec));

    if coords.len() < PARALLEL_THRESHOLD {
        coords.ra().iter().zip(coords.dec()).map(locate_one).collect()
    } else {
        coords
            .ra()
            .par_iter()
            .zip(coords.dec().par_iter())
            .map(locate_one)
            .collect()
    }
}
