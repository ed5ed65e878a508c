//! Trixel identifiers and spherical-triangle geometry.
//!
//! An id packs the root triangle into its top four bits (`8..=15`) and two
//! child-selection bits per level below that, so a trixel at depth `d` has
//! a bit length of `2d + 4`. Child `k` of `id` is `id * 4 + k`, which makes
//! the descendants of any trixel at a deeper level one contiguous id range.
//!
//! | Id | Name | Vertices |
//! |----|------|----------|
//! | 8  | S0 | v1 v5 v2 |
//! | 9  | S1 | v2 v5 v3 |
//! | 10 | S2 | v3 v5 v4 |
//! | 11 | S3 | v4 v5 v1 |
//! | 12 | N0 | v1 v0 v4 |
//! | 13 | N1 | v4 v0 v3 |
//! | 14 | N2 | v3 v0 v2 |
//! | 15 | N3 | v2 v0 v1 |
//!
//! with `v0 = +z`, `v1 = +x`, `v2 = +y`, `v3 = -x`, `v4 = -y`, `v5 = -z`.
//! Every triangle is stored counter-clockwise seen from outside the sphere,
//! so a point `p` is inside when `(a × b) · p ≥ 0` for each edge `a → b`.

use celestial_core::Vector3;

use super::MAX_DEPTH;
use crate::error::{HtmError, Result};

const V0: Vector3 = Vector3::new(0.0, 0.0, 1.0);
const V1: Vector3 = Vector3::new(1.0, 0.0, 0.0);
const V2: Vector3 = Vector3::new(0.0, 1.0, 0.0);
const V3: Vector3 = Vector3::new(-1.0, 0.0, 0.0);
const V4: Vector3 = Vector3::new(0.0, -1.0, 0.0);
const V5: Vector3 = Vector3::new(0.0, 0.0, -1.0);

pub(crate) const ROOT_VERTICES: [[Vector3; 3]; 8] = [
    [V1, V5, V2],
    [V2, V5, V3],
    [V3, V5, V4],
    [V4, V5, V1],
    [V1, V0, V4],
    [V4, V0, V3],
    [V3, V0, V2],
    [V2, V0, V1],
];

pub const S0: u64 = 8;
pub const N0: u64 = 12;

/// A spherical triangle in the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trixel {
    pub id: u64,
    pub vertices: [Vector3; 3],
}

impl Trixel {
    /// The eight depth-0 triangles in id order (S0..S3, N0..N3).
    pub fn roots() -> [Trixel; 8] {
        let mut roots = [Trixel {
            id: 0,
            vertices: ROOT_VERTICES[0],
        }; 8];
        for (k, root) in roots.iter_mut().enumerate() {
            root.id = S0 + k as u64;
            root.vertices = ROOT_VERTICES[k];
        }
        roots
    }

    /// Rebuilds the triangle for an id by replaying its child path.
    pub fn from_id(id: u64) -> Result<Trixel> {
        let depth = depth_of(id)?;
        let root = (id >> (2 * depth as u32)) - S0;
        let mut trixel = Trixel {
            id: S0 + root,
            vertices: ROOT_VERTICES[root as usize],
        };
        for level in (0..depth as u32).rev() {
            let k = ((id >> (2 * level)) & 3) as usize;
            trixel = trixel.children()[k];
        }
        Ok(trixel)
    }

    pub fn depth(&self) -> u8 {
        // ids built through `roots`/`children` are always well formed
        bit_depth(self.id).unwrap_or(0)
    }

    /// Edge midpoints `(w0, w1, w2)`, opposite vertices 0, 1 and 2.
    #[inline]
    pub(crate) fn midpoints(&self) -> (Vector3, Vector3, Vector3) {
        let [v0, v1, v2] = self.vertices;
        (v1.midpoint(&v2), v0.midpoint(&v2), v0.midpoint(&v1))
    }

    /// The four sub-triangles, ordered by child bit.
    pub fn children(&self) -> [Trixel; 4] {
        let [v0, v1, v2] = self.vertices;
        let (w0, w1, w2) = self.midpoints();
        let base = self.id << 2;
        [
            Trixel { id: base, vertices: [v0, w2, w1] },
            Trixel { id: base | 1, vertices: [v1, w0, w2] },
            Trixel { id: base | 2, vertices: [v2, w1, w0] },
            Trixel { id: base | 3, vertices: [w0, w1, w2] },
        ]
    }

    /// Closed containment test for a unit vector.
    pub fn contains(&self, p: &Vector3) -> bool {
        let [v0, v1, v2] = self.vertices;
        v0.cross(&v1).dot(p) >= 0.0 && v1.cross(&v2).dot(p) >= 0.0 && v2.cross(&v0).dot(p) >= 0.0
    }

    /// Normalized centroid of the three vertices.
    pub fn center(&self) -> Vector3 {
        let [v0, v1, v2] = self.vertices;
        (v0 + v1 + v2).normalize()
    }

    /// Smallest cap around [`center`](Self::center) holding all three
    /// vertices, as `(center, radius in radians)`.
    pub fn bounding_cap(&self) -> (Vector3, f64) {
        let c = self.center();
        let r = self
            .vertices
            .iter()
            .map(|v| c.angle_to(v))
            .fold(0.0_f64, f64::max);
        (c, r)
    }

    pub fn name(&self) -> String {
        // well formed by construction, see `depth`
        name(self.id).unwrap_or_default()
    }
}

fn bit_depth(id: u64) -> Option<u8> {
    if id < S0 {
        return None;
    }
    let bits = 64 - id.leading_zeros();
    if bits % 2 != 0 {
        return None;
    }
    let depth = (bits - 4) / 2;
    if depth > MAX_DEPTH as u32 {
        return None;
    }
    Some(depth as u8)
}

/// Depth encoded in an id's bit length.
///
/// Fails with [`HtmError::InvalidTrixel`] for ids below 8, ids with an odd
/// bit length, and ids deeper than the maximum depth.
pub fn depth_of(id: u64) -> Result<u8> {
    bit_depth(id).ok_or_else(|| HtmError::InvalidTrixel(format!("{id} is not a trixel id")))
}

pub fn is_valid(id: u64) -> bool {
    bit_depth(id).is_some()
}

/// Parent id; roots have no parent.
pub fn parent(id: u64) -> Result<Option<u64>> {
    Ok(match depth_of(id)? {
        0 => None,
        _ => Some(id >> 2),
    })
}

pub fn children(id: u64) -> Result<[u64; 4]> {
    if depth_of(id)? >= MAX_DEPTH {
        return Err(HtmError::InvalidDepth {
            depth: MAX_DEPTH + 1,
            max: MAX_DEPTH,
        });
    }
    let base = id << 2;
    Ok([base, base | 1, base | 2, base | 3])
}

/// Inclusive id range of all descendants of `id` at `depth`.
///
/// ```
/// use celestial_htm::mesh::descendant_range;
///
/// // N0 at depth 1 covers N00..N03
/// assert_eq!(descendant_range(12, 1).unwrap(), (48, 51));
/// ```
pub fn descendant_range(id: u64, depth: u8) -> Result<(u64, u64)> {
    let own = depth_of(id)?;
    if depth > MAX_DEPTH {
        return Err(HtmError::InvalidDepth { depth, max: MAX_DEPTH });
    }
    if depth < own {
        return Err(HtmError::InvalidTrixel(format!(
            "{id} is at depth {own}, deeper than {depth}"
        )));
    }
    let shift = 2 * (depth - own) as u32;
    Ok((id << shift, ((id + 1) << shift) - 1))
}

/// Display name, e.g. `N3` for 15 or `S012` for 134.
pub fn name(id: u64) -> Result<String> {
    let depth = depth_of(id)? as u32;
    let root = id >> (2 * depth);
    let mut out = String::with_capacity(depth as usize + 2);
    if root >= N0 {
        out.push('N');
        out.push(char::from(b'0' + (root - N0) as u8));
    } else {
        out.push('S');
        out.push(char::from(b'0' + (root - S0) as u8));
    }
    for level in (0..depth).rev() {
        out.push(char::from(b'0' + ((id >> (2 * level)) & 3) as u8));
    }
    Ok(out)
}

/// Parses a display name back into an id.
pub fn from_name(name: &str) -> Result<u64> {
    let invalid = || HtmError::InvalidTrixel(format!("'{name}' is not a trixel name"));
    let bytes = name.trim().as_bytes();
    if bytes.len() < 2 || bytes.len() > MAX_DEPTH as usize + 2 {
        return Err(invalid());
    }
    let mut id = match bytes[0] {
        b'N' | b'n' => N0,
        b'S' | b's' => S0,
        _ => return Err(invalid()),
    };
    for (i, &b) in bytes[1..].iter().enumerate() {
        let digit = match b {
            b'0'..=b'3' => u64::from(b - b'0'),
            _ => return Err(invalid()),
        };
        id = if i == 0 { id + digit } else { (id << 2) | digit };
    }
    Ok(id)
}
