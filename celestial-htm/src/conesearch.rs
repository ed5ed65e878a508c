//! Cone search against a table that carries trixel-id columns.
//!
//! The search runs in three stages:
//!
//! 1. **Plan**: cover every search circle with inclusive trixels at a depth
//!    the table has populated, falling back to coarser depths while the
//!    cover is too large, and to a min/max range predicate if it is still
//!    too large after that.
//! 2. **Fetch**: one [`TableStore::query`] call with the resulting filter.
//! 3. **Refine**: crossmatch the fetched rows against the centres at the
//!    exact radius.
//!
//! The planner never builds an index. A table without trixel columns is a
//! [`HtmError::MissingIndex`].
//!
//! ```
//! use std::sync::Arc;
//! use celestial_htm::conesearch::{ConeSearchParams, ConeSearchPlanner, PlannerConfig};
//! use celestial_htm::mesh::MeshCache;
//! use celestial_htm::store::{IndexerConfig, MemoryTable, TrixelIndexer};
//! use celestial_htm::Coordinates;
//!
//! let mut table = MemoryTable::new("sources", "id", "ra", "dec");
//! table.insert(1, 200.0, 24.3, Default::default());
//! table.insert(2, 200.1, 24.3, Default::default());
//! TrixelIndexer::new(IndexerConfig::default()).unwrap().index(&mut table).unwrap();
//!
//! let planner = ConeSearchPlanner::new(PlannerConfig::default(), Arc::new(MeshCache::new()));
//! let params = ConeSearchParams::new(Coordinates::single(200.0, 24.3).unwrap(), 5.0);
//! let results = planner.search(&table, &params).unwrap();
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].row.key, serde_json::json!(1));
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use celestial_core::constants::ARCSEC_PER_DEGREE;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::coords::{Coordinates, Radius};
use crate::error::{HtmError, Result};
use crate::matching::Matcher;
use crate::mesh::{Mesh, MeshCache, TrixelRanges};
use crate::store::{Row, StoreError, TableStore, TrixelFilter};

/// Planner thresholds and depth bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Trixel count above which the planner tries a coarser depth.
    pub fallback_threshold: u64,
    /// Trixel count above which the filter becomes a min/max range.
    pub range_threshold: u64,
    /// Maximum number of coarser-depth retries.
    pub max_fallbacks: u8,
    pub min_depth: u8,
    pub max_depth: u8,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            fallback_threshold: 35_000,
            range_threshold: 50_000,
            max_fallbacks: 2,
            min_depth: 4,
            max_depth: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConeSearchParams {
    pub centers: Coordinates,
    pub radius_arcsec: f64,
    /// Extra columns to fetch; `"*"` fetches all.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Keep only the closest row per centre.
    #[serde(default)]
    pub nearest_only: bool,
    /// Drop rows whose fetched columns repeat an earlier result for the
    /// same centre. Without extra columns, rows are compared by key.
    #[serde(default)]
    pub distinct: bool,
}

impl ConeSearchParams {
    pub fn new(centers: Coordinates, radius_arcsec: f64) -> Self {
        Self {
            centers,
            radius_arcsec,
            columns: Vec::new(),
            nearest_only: false,
            distinct: false,
        }
    }

    pub fn radius_deg(&self) -> f64 {
        self.radius_arcsec / ARCSEC_PER_DEGREE
    }
}

/// The coarse-stage decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub depth: u8,
    /// Trixels covered at `depth`.
    pub trixels: u64,
    pub fallbacks: u8,
    pub filter: TrixelFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConeSearchResult {
    /// Index into the search centres.
    pub center: usize,
    pub row: Row,
    pub sep_deg: f64,
}

pub struct ConeSearchPlanner {
    config: PlannerConfig,
    cache: Arc<MeshCache>,
}

impl ConeSearchPlanner {
    pub fn new(config: PlannerConfig, cache: Arc<MeshCache>) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Picks the depth and filter for a search over a table populated at
    /// `available` depths.
    #[instrument(
        skip(self, params),
        fields(centers = params.centers.len(), radius_arcsec = params.radius_arcsec)
    )]
    pub fn plan(&self, params: &ConeSearchParams, available: &[u8]) -> Result<QueryPlan> {
        let radius_deg = params.radius_deg();
        Radius::Scalar(radius_deg).validate(1)?;

        let mut depths: Vec<u8> = available.to_vec();
        depths.sort_unstable();
        depths.dedup();
        if depths.is_empty() {
            return Err(HtmError::MissingIndex(
                "table has no htm{depth}ID columns".to_string(),
            ));
        }

        let preferred =
            Mesh::depth_for_radius(radius_deg, self.config.min_depth, self.config.max_depth);
        let mut slot = snap_depth(&depths, preferred);
        let mut fallbacks = 0;
        let mut cover = self.cover(depths[slot], &params.centers, radius_deg)?;
        debug!(preferred, depth = depths[slot], trixels = cover.count(), "initial cover");

        while cover.count() > self.config.fallback_threshold
            && fallbacks < self.config.max_fallbacks
            && slot > 0
        {
            slot -= 1;
            fallbacks += 1;
            cover = self.cover(depths[slot], &params.centers, radius_deg)?;
            debug!(depth = depths[slot], trixels = cover.count(), "fell back to coarser depth");
        }

        let depth = depths[slot];
        let trixels = cover.count();
        let filter = match (cover.min(), cover.max()) {
            (Some(min), Some(max)) if trixels > self.config.range_threshold => {
                warn!(depth, trixels, min, max, "trixel list too long, using a range predicate");
                TrixelFilter::between(depth, min, max)
            }
            _ => TrixelFilter::ids(depth, cover.ids().collect()),
        };

        Ok(QueryPlan {
            depth,
            trixels,
            fallbacks,
            filter,
        })
    }

    /// Plans, fetches and refines a cone search.
    #[instrument(
        skip(self, store, params),
        fields(centers = params.centers.len(), radius_arcsec = params.radius_arcsec)
    )]
    pub fn search<S: TableStore + ?Sized>(
        &self,
        store: &S,
        params: &ConeSearchParams,
    ) -> Result<Vec<ConeSearchResult>> {
        let plan = self.plan(params, &store.trixel_depths())?;

        let rows = store
            .query(&plan.filter, &params.columns)
            .map_err(|e| match e {
                StoreError::MissingIndex { depth } => {
                    HtmError::MissingIndex(format!("no htm{depth}ID column"))
                }
                other => HtmError::Store(other),
            })?;
        debug!(depth = plan.depth, candidates = rows.len(), "fetched candidate rows");

        let results = self.refine(params, rows)?;
        debug!(results = results.len(), "refined cone search");
        Ok(results)
    }

    fn cover(&self, depth: u8, centers: &Coordinates, radius_deg: f64) -> Result<TrixelRanges> {
        let mesh = self.cache.get(depth)?;
        let mut cover = TrixelRanges::new(depth);
        for (ra, dec) in centers.iter() {
            cover.union(&mesh.intersect_ranges(ra, dec, radius_deg, true)?);
        }
        Ok(cover)
    }

    fn refine(&self, params: &ConeSearchParams, rows: Vec<Row>) -> Result<Vec<ConeSearchResult>> {
        let radius_deg = params.radius_deg();
        let candidates = Coordinates::new(
            rows.iter().map(|r| r.ra).collect(),
            rows.iter().map(|r| r.dec).collect(),
        )?;
        let depth =
            Mesh::depth_for_radius(radius_deg, self.config.min_depth, self.config.max_depth);
        let matcher = Matcher::new(self.cache.get(depth)?, candidates);
        let maxmatch = usize::from(params.nearest_only);
        let matches = matcher.crossmatch(&params.centers, radius_deg, maxmatch)?;

        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(matches.len());
        for m in matches.iter() {
            let row = &rows[m.idx2];
            if params.distinct && !seen.insert((m.idx1, distinct_key(row))) {
                continue;
            }
            results.push(ConeSearchResult {
                center: m.idx1,
                row: row.clone(),
                sep_deg: m.sep_deg,
            });
        }
        Ok(results)
    }
}

/// Duplicate key for `distinct`: the fetched columns, or the row key when
/// no columns were requested.
fn distinct_key(row: &Row) -> String {
    if row.columns.is_empty() {
        row.key.to_string()
    } else {
        serde_json::Value::Object(row.columns.clone()).to_string()
    }
}

/// Slot of the available depth closest to `preferred`, ties going coarser.
fn snap_depth(depths: &[u8], preferred: u8) -> usize {
    let mut best = 0;
    for (i, &d) in depths.iter().enumerate() {
        if d.abs_diff(preferred) < depths[best].abs_diff(preferred) {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{IndexerConfig, MemoryTable, TrixelIndexer, TrixelPredicate};
    use serde_json::{json, Map};

    fn planner(config: PlannerConfig) -> ConeSearchPlanner {
        ConeSearchPlanner::new(config, Arc::new(MeshCache::new()))
    }

    fn indexed_table() -> MemoryTable {
        let mut t = MemoryTable::new("transients", "id", "raDeg", "decDeg");
        let sources = [
            (1, 155.125, -10.5, "sn2016a"),
            (2, 155.125, -10.5 + 1.0 / 3600.0, "sn2016a"),
            (3, 155.125 + 3.0 / 3600.0, -10.5, "sn2016b"),
            (4, 160.0, 30.0, "agn"),
        ];
        for (id, ra, dec, name) in sources {
            let mut extra = Map::new();
            extra.insert("name".into(), json!(name));
            t.insert(id, ra, dec, extra);
        }
        TrixelIndexer::new(IndexerConfig::default())
            .unwrap()
            .index(&mut t)
            .unwrap();
        t
    }

    #[test]
    fn test_snap_depth_ties_coarser() {
        assert_eq!(snap_depth(&[10, 13, 16], 16), 2);
        assert_eq!(snap_depth(&[10, 13, 16], 14), 1);
        assert_eq!(snap_depth(&[10, 12, 16], 14), 1);
        assert_eq!(snap_depth(&[10, 13, 16], 4), 0);
        assert_eq!(snap_depth(&[10, 13, 16], 25), 2);
    }

    #[test]
    fn test_plan_snaps_to_available_depth() {
        let params = ConeSearchParams::new(Coordinates::single(10.0, 10.0).unwrap(), 5.0);
        let plan = planner(PlannerConfig::default()).plan(&params, &[10, 13, 16]).unwrap();
        assert_eq!(plan.depth, 16);
        assert_eq!(plan.fallbacks, 0);
        assert!(matches!(plan.filter.predicate, TrixelPredicate::In(_)));
    }

    #[test]
    fn test_plan_falls_back() {
        let config = PlannerConfig {
            fallback_threshold: 10,
            range_threshold: 1_000_000,
            ..Default::default()
        };
        // 60 arcsec prefers depth 12, snapped to 13
        let params = ConeSearchParams::new(Coordinates::single(10.0, 10.0).unwrap(), 60.0);
        let plan = planner(config).plan(&params, &[10, 13, 16]).unwrap();
        assert_eq!(plan.depth, 10);
        assert_eq!(plan.fallbacks, 1);
    }

    #[test]
    fn test_plan_switches_to_range() {
        let config = PlannerConfig {
            fallback_threshold: 1,
            range_threshold: 2,
            max_fallbacks: 0,
            ..Default::default()
        };
        let params = ConeSearchParams::new(Coordinates::single(10.0, 10.0).unwrap(), 60.0);
        let plan = planner(config).plan(&params, &[16]).unwrap();
        assert!(plan.trixels > 2);
        assert!(matches!(plan.filter.predicate, TrixelPredicate::Between { .. }));
    }

    #[test]
    fn test_plan_without_index() {
        let params = ConeSearchParams::new(Coordinates::single(10.0, 10.0).unwrap(), 5.0);
        assert!(matches!(
            planner(PlannerConfig::default()).plan(&params, &[]),
            Err(HtmError::MissingIndex(_))
        ));
    }

    #[test]
    fn test_search_all_and_nearest() {
        let table = indexed_table();
        let p = planner(PlannerConfig::default());
        let mut params = ConeSearchParams::new(Coordinates::single(155.125, -10.5).unwrap(), 5.0);
        params.columns = vec!["name".to_string()];

        let all = p.search(&table, &params).unwrap();
        let keys: Vec<_> = all.iter().map(|r| r.row.key.clone()).collect();
        assert_eq!(keys, vec![json!(1), json!(2), json!(3)]);
        assert!(all.windows(2).all(|w| w[0].sep_deg <= w[1].sep_deg));

        params.nearest_only = true;
        let nearest = p.search(&table, &params).unwrap();
        assert_eq!(nearest.len(), 1);
        assert_eq!(nearest[0].row.key, json!(1));
        assert_eq!(nearest[0].sep_deg, 0.0);
    }

    #[test]
    fn test_search_distinct() {
        let table = indexed_table();
        let mut params = ConeSearchParams::new(Coordinates::single(155.125, -10.5).unwrap(), 5.0);
        params.columns = vec!["name".to_string()];
        params.distinct = true;

        let results = planner(PlannerConfig::default()).search(&table, &params).unwrap();
        let names: Vec<_> = results.iter().map(|r| r.row.columns["name"].clone()).collect();
        assert_eq!(names, vec![json!("sn2016a"), json!("sn2016b")]);
    }

    #[test]
    fn test_search_distinct_per_center() {
        let mut table = MemoryTable::new("t", "id", "ra", "dec");
        table.insert(1, 10.0, 10.0, Map::new());
        table.insert(2, 10.0, 10.0 + 1.0 / 3600.0, Map::new());
        table.insert(3, 50.0, 10.0, Map::new());
        TrixelIndexer::new(IndexerConfig::default())
            .unwrap()
            .index(&mut table)
            .unwrap();

        let centers = Coordinates::new(vec![10.0, 50.0], vec![10.0, 10.0]).unwrap();
        let mut params = ConeSearchParams::new(centers, 5.0);
        params.distinct = true;
        let results = planner(PlannerConfig::default()).search(&table, &params).unwrap();
        let pairs: Vec<_> = results.iter().map(|r| (r.center, r.row.key.clone())).collect();
        assert_eq!(pairs, vec![(0, json!(1)), (0, json!(2)), (1, json!(3))]);
    }

    #[test]
    fn test_search_distinct_scoped_to_center() {
        let mut table = MemoryTable::new("t", "id", "ra", "dec");
        for (id, ra) in [(1, 10.0), (2, 50.0)] {
            let mut extra = Map::new();
            extra.insert("name".into(), json!("same"));
            table.insert(id, ra, 10.0, extra);
        }
        TrixelIndexer::new(IndexerConfig::default())
            .unwrap()
            .index(&mut table)
            .unwrap();

        let centers = Coordinates::new(vec![10.0, 50.0], vec![10.0, 10.0]).unwrap();
        let mut params = ConeSearchParams::new(centers, 5.0);
        params.columns = vec!["name".to_string()];
        params.distinct = true;
        let results = planner(PlannerConfig::default()).search(&table, &params).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].center, 1);
    }

    #[test]
    fn test_search_multiple_centers() {
        let table = indexed_table();
        let centers = Coordinates::new(vec![160.0, 155.125], vec![30.0, -10.5]).unwrap();
        let params = ConeSearchParams::new(centers, 2.0);
        let results = planner(PlannerConfig::default()).search(&table, &params).unwrap();
        let pairs: Vec<_> = results.iter().map(|r| (r.center, r.row.key.clone())).collect();
        assert_eq!(pairs, vec![(0, json!(4)), (1, json!(1)), (1, json!(2))]);
    }

    #[test]
    fn test_search_unindexed_table() {
        let mut table = MemoryTable::new("t", "id", "ra", "dec");
        table.insert(1, 1.0, 1.0, Map::new());
        let params = ConeSearchParams::new(Coordinates::single(1.0, 1.0).unwrap(), 5.0);
        assert!(matches!(
            planner(PlannerConfig::default()).search(&table, &params),
            Err(HtmError::MissingIndex(_))
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: PlannerConfig = serde_json::from_str(r#"{"max_fallbacks": 1}"#).unwrap();
        assert_eq!(config.max_fallbacks, 1);
        assert_eq!(config.fallback_threshold, 35_000);
    }
}
