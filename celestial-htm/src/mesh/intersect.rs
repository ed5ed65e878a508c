//! Circle to trixel-set cover.
//!
//! A depth-first walk from the eight roots classifies each triangle against
//! the circle as outside, partial or inside. Subtrees whose bounding cap
//! cannot reach the circle are skipped without classification, and a
//! triangle found fully inside contributes its whole descendant range at the
//! target depth in one step. Only partial triangles are split, so the work
//! grows with the circle's perimeter measured in trixels rather than with
//! `4^depth`.
//!
//! Classification:
//! - inside: all three vertices inside the circle, and for circles wider
//!   than a hemisphere, the triangle also misses the complementary cap
//! - partial: a vertex inside, the circle centre inside the triangle, or an
//!   edge arc passing within the radius
//! - outside: none of the above
//!
//! Inclusive covers widen the radius by [`INCLUSIVE_SLACK`] so that points
//! sitting on trixel edges are never lost to rounding.

use celestial_core::constants::{HALF_PI, PI};
use celestial_core::Vector3;

use super::trixel::Trixel;

/// Radius padding, in radians, applied to inclusive covers.
pub const INCLUSIVE_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    Outside,
    Partial,
    Inside,
}

/// Sorted, coalesced, inclusive id ranges at a single depth.
///
/// ```
/// use celestial_htm::mesh::Mesh;
///
/// let mesh = Mesh::new(10).unwrap();
/// let ranges = mesh.intersect_ranges(10.0, 20.0, 0.5, true).unwrap();
/// let ids = mesh.intersect(10.0, 20.0, 0.5, true).unwrap();
/// assert_eq!(ranges.count(), ids.len() as u64);
/// assert!(ranges.contains(mesh.lookup_id(10.0, 20.0)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrixelRanges {
    depth: u8,
    ranges: Vec<(u64, u64)>,
}

impl TrixelRanges {
    pub fn new(depth: u8) -> Self {
        Self {
            depth,
            ranges: Vec::new(),
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn ranges(&self) -> &[(u64, u64)] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of ids covered.
    pub fn count(&self) -> u64 {
        self.ranges.iter().map(|(lo, hi)| hi - lo + 1).sum()
    }

    pub fn min(&self) -> Option<u64> {
        self.ranges.first().map(|r| r.0)
    }

    pub fn max(&self) -> Option<u64> {
        self.ranges.last().map(|r| r.1)
    }

    pub fn contains(&self, id: u64) -> bool {
        let i = self.ranges.partition_point(|&(_, hi)| hi < id);
        self.ranges.get(i).is_some_and(|&(lo, _)| lo <= id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.ranges.iter().flat_map(|&(lo, hi)| lo..=hi)
    }

    /// Appends a range that starts after every range already held.
    fn push(&mut self, lo: u64, hi: u64) {
        match self.ranges.last_mut() {
            Some(last) if last.1 + 1 >= lo => last.1 = last.1.max(hi),
            _ => self.ranges.push((lo, hi)),
        }
    }

    /// Merges another cover at the same depth into this one.
    pub fn union(&mut self, other: &TrixelRanges) {
        debug_assert_eq!(self.depth, other.depth);
        let mut all: Vec<(u64, u64)> = self
            .ranges
            .drain(..)
            .chain(other.ranges.iter().copied())
            .collect();
        all.sort_unstable();
        for (lo, hi) in all {
            self.push(lo, hi);
        }
    }
}

/// Circle as a unit centre vector plus a radius in radians.
struct Cap {
    center: Vector3,
    radius: f64,
}

impl Cap {
    fn contains(&self, p: &Vector3) -> bool {
        self.center.angle_to(p) <= self.radius
    }

    fn overlaps(&self, t: &Trixel) -> bool {
        self.radius >= 0.0
            && (t.vertices.iter().any(|v| self.contains(v))
                || t.contains(&self.center)
                || edges(t).any(|(a, b)| arc_distance(&self.center, &a, &b) <= self.radius))
    }

    fn classify(&self, t: &Trixel) -> Overlap {
        let inside = t.vertices.iter().filter(|v| self.contains(v)).count();
        if inside == 3 {
            if self.radius <= HALF_PI {
                return Overlap::Inside;
            }
            // wider than a hemisphere: the cap is no longer convex
            let complement = Cap {
                center: -self.center,
                radius: PI - self.radius,
            };
            return if complement.overlaps(t) {
                Overlap::Partial
            } else {
                Overlap::Inside
            };
        }
        if inside > 0
            || t.contains(&self.center)
            || edges(t).any(|(a, b)| arc_distance(&self.center, &a, &b) <= self.radius)
        {
            return Overlap::Partial;
        }
        Overlap::Outside
    }
}

fn edges(t: &Trixel) -> impl Iterator<Item = (Vector3, Vector3)> {
    let [v0, v1, v2] = t.vertices;
    [(v0, v1), (v1, v2), (v2, v0)].into_iter()
}

/// Smallest angle between `p` and the minor great-circle arc `a → b`.
fn arc_distance(p: &Vector3, a: &Vector3, b: &Vector3) -> f64 {
    let n = a.cross(b).normalize();
    let projected = *p - n * p.dot(&n);
    if projected.magnitude_squared() > 0.0 {
        let q = projected.normalize();
        if a.cross(&q).dot(&n) >= 0.0 && q.cross(b).dot(&n) >= 0.0 {
            return p.angle_to(&q);
        }
    }
    p.angle_to(a).min(p.angle_to(b))
}

/// Cover of a circle at `depth`. `radius` is in radians and already validated.
pub(crate) fn cover(depth: u8, center: &Vector3, radius: f64, inclusive: bool) -> TrixelRanges {
    let mut out = TrixelRanges::new(depth);
    let radius = if inclusive { radius + INCLUSIVE_SLACK } else { radius };

    if radius >= PI {
        for root in Trixel::roots() {
            push_descendants(&mut out, root.id, 0, depth);
        }
        return out;
    }

    let cap = Cap {
        center: center.normalize(),
        radius,
    };
    for root in Trixel::roots() {
        walk(&cap, &root, 0, depth, inclusive, &mut out);
    }
    out
}

fn walk(cap: &Cap, t: &Trixel, level: u8, depth: u8, inclusive: bool, out: &mut TrixelRanges) {
    let (bc, br) = t.bounding_cap();
    if cap.center.angle_to(&bc) > cap.radius + br {
        return;
    }

    match cap.classify(t) {
        Overlap::Outside => {}
        Overlap::Inside => push_descendants(out, t.id, level, depth),
        Overlap::Partial if level == depth => {
            if inclusive {
                out.push(t.id, t.id);
            }
        }
        Overlap::Partial => {
            for child in t.children() {
                walk(cap, &child, level + 1, depth, inclusive, out);
            }
        }
    }
}

fn push_descendants(out: &mut TrixelRanges, id: u64, level: u8, depth: u8) {
    let shift = 2 * (depth - level) as u32;
    out.push(id << shift, ((id + 1) << shift) - 1);
}
