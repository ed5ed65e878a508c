//! Grouping a coordinate list into sets of associated sources.
//!
//! The list is matched against itself (all pairs, self pairs included) at a
//! depth chosen from the radius, and the pair list is folded into groups.
//!
//! [`GroupingMode::FirstSeenAnchor`] makes one pass over the pairs in
//! `idx1` order. The first index of a pair that nobody has claimed opens a
//! new group as its anchor; an unclaimed second index joins whichever group
//! is open at that moment. Two consequences follow. A source within the
//! radius of two anchors that are not linked to each other joins the
//! earlier anchor. A source reachable only through a child joins the group
//! that is open when its pair comes up, which may not be the child's.
//!
//! [`GroupingMode::ConnectedComponents`] takes the transitive closure
//! instead, so any chain of sources each within the radius of the next ends
//! up in one group.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::matcher::Matcher;
use crate::coords::{Coordinates, Radius};
use crate::error::{HtmError, Result};
use crate::mesh::Mesh;

const MIN_DEPTH: u8 = 4;
const MAX_DEPTH: u8 = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    #[default]
    FirstSeenAnchor,
    ConnectedComponents,
}

/// Splits a list of sources into associated sets.
///
/// ```
/// use celestial_htm::{Coordinates, SetExtractor};
///
/// let coords = Coordinates::new(vec![10.0, 10.0001, 200.0], vec![-5.0, -5.0, 30.0]).unwrap();
/// let names = ["a", "b", "c"];
///
/// let sets = SetExtractor::new(10.0 / 3600.0).unwrap().extract(&coords, &names).unwrap();
/// assert_eq!(sets, vec![vec!["a", "b"], vec!["c"]]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SetExtractor {
    radius_deg: f64,
    mode: GroupingMode,
}

impl SetExtractor {
    pub fn new(radius_deg: f64) -> Result<Self> {
        Radius::Scalar(radius_deg).validate(1)?;
        Ok(Self {
            radius_deg,
            mode: GroupingMode::default(),
        })
    }

    pub fn with_mode(mut self, mode: GroupingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn radius_deg(&self) -> f64 {
        self.radius_deg
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    /// Partitions `sources` at the extractor's radius; `sources[i]` belongs
    /// to `coords` position `i`.
    pub fn extract<T: Clone>(&self, coords: &Coordinates, sources: &[T]) -> Result<Vec<Vec<T>>> {
        self.extract_with_radius(coords, self.radius_deg, sources)
    }

    /// Same as [`extract`](Self::extract) with a per-call radius in degrees.
    pub fn extract_with_radius<T: Clone>(
        &self,
        coords: &Coordinates,
        radius_deg: f64,
        sources: &[T],
    ) -> Result<Vec<Vec<T>>> {
        Radius::Scalar(radius_deg).validate(1)?;
        if sources.len() != coords.len() {
            return Err(HtmError::mismatch(
                "sources/coordinate lengths",
                sources.len(),
                coords.len(),
            ));
        }

        let depth = Mesh::depth_for_radius(radius_deg, MIN_DEPTH, MAX_DEPTH);
        let matcher = Matcher::new(Mesh::new(depth)?, coords.clone());
        let pairs = matcher.crossmatch(coords, radius_deg, 0)?;

        let groups = match self.mode {
            GroupingMode::FirstSeenAnchor => first_seen_anchor(&pairs.idx1, &pairs.idx2),
            GroupingMode::ConnectedComponents => {
                connected_components(coords.len(), &pairs.idx1, &pairs.idx2)
            }
        };
        debug!(
            sources = sources.len(),
            pairs = pairs.len(),
            groups = groups.len(),
            depth,
            mode = ?self.mode,
            "extracted sets"
        );

        Ok(groups
            .into_iter()
            .map(|g| g.into_iter().map(|i| sources[i].clone()).collect())
            .collect())
    }
}

fn first_seen_anchor(idx1: &[usize], idx2: &[usize]) -> Vec<Vec<usize>> {
    let mut anchors = HashSet::new();
    let mut children = HashSet::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (&m1, &m2) in idx1.iter().zip(idx2) {
        if !anchors.contains(&m1) && !children.contains(&m1) {
            anchors.insert(m1);
            groups.push(vec![m1]);
        }
        if !anchors.contains(&m2) && !children.contains(&m2) {
            if let Some(open) = groups.last_mut() {
                children.insert(m2);
                open.push(m2);
            }
        }
    }
    groups
}

fn connected_components(n: usize, idx1: &[usize], idx2: &[usize]) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for (&a, &b) in idx1.iter().zip(idx2) {
        let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
        if ra != rb {
            // smaller index stays the root so groups come out in first-seen order
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            parent[hi] = lo;
        }
    }

    let mut slot = vec![usize::MAX; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        if slot[root] == usize::MAX {
            slot[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[slot[root]].push(i);
    }
    groups
}
