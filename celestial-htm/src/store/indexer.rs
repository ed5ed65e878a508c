//! Bulk trixel-id computation.
//!
//! Pulls the rows that still lack ids, computes their ids at every
//! configured depth and writes them back batch by batch. Each batch is
//! located in parallel; batches are written in order, so an interrupted run
//! leaves a prefix of the table indexed and a rerun picks up the rest.

use std::collections::BTreeMap;
use std::time::Instant;

use celestial_core::Vector3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Row, TableStore, TrixelIdRecord};
use crate::error::Result;
use crate::mesh::{locate, Mesh};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Depths to populate; each gets an `htm{depth}ID` column.
    pub depths: Vec<u8>,
    /// Rows per write.
    pub batch_size: usize,
    /// Recompute ids for rows that already have them.
    pub force: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            depths: vec![16, 13, 10],
            batch_size: 2500,
            force: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub rows: usize,
    pub batches: usize,
}

#[derive(Debug, Clone)]
pub struct TrixelIndexer {
    config: IndexerConfig,
}

impl TrixelIndexer {
    /// Validates the configured depths. A zero batch size is treated as one.
    pub fn new(mut config: IndexerConfig) -> Result<Self> {
        for &depth in &config.depths {
            Mesh::new(depth)?;
        }
        config.depths.sort_unstable();
        config.depths.dedup();
        config.batch_size = config.batch_size.max(1);
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Ids for each row at every configured depth, in row order.
    pub fn compute(&self, rows: &[Row]) -> Vec<TrixelIdRecord> {
        rows.par_iter()
            .map(|row| {
                let p = Vector3::from_radec_deg(row.ra, row.dec);
                let ids: BTreeMap<u8, u64> = self
                    .config
                    .depths
                    .iter()
                    .map(|&depth| (depth, locate::locate(depth, &p)))
                    .collect();
                TrixelIdRecord {
                    key: row.key.clone(),
                    ids,
                }
            })
            .collect()
    }

    /// Indexes every pending row of `store`.
    pub fn index<S: TableStore>(&self, store: &mut S) -> Result<IndexSummary> {
        let start = Instant::now();
        let pending = store.rows_to_index(&self.config.depths, self.config.force)?;
        let total = pending.len();
        debug!(
            rows = total,
            depths = ?self.config.depths,
            force = self.config.force,
            "rows pending trixel ids"
        );

        let mut summary = IndexSummary::default();
        for batch in pending.chunks(self.config.batch_size) {
            let records = self.compute(batch);
            summary.rows += store.write_trixel_ids(&records)?;
            summary.batches += 1;

            let percent = summary.rows as f64 / total as f64 * 100.0;
            info!(
                batch = summary.batches,
                indexed = summary.rows,
                total,
                "{percent:.1}% indexed"
            );
        }

        info!(
            rows = summary.rows,
            batches = summary.batches,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "trixel indexing complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryTable, StoreError, TrixelFilter};
    use crate::HtmError;
    use serde_json::Map;

    fn table(n: usize) -> MemoryTable {
        let mut t = MemoryTable::new("sources", "id", "ra", "dec");
        for i in 0..n {
            t.insert(i as u64, i as f64 * 3.0, -60.0 + i as f64, Map::new());
        }
        t
    }

    #[test]
    fn test_default_config() {
        let config = IndexerConfig::default();
        assert_eq!(config.depths, vec![16, 13, 10]);
        assert_eq!(config.batch_size, 2500);
        assert!(!config.force);
    }

    #[test]
    fn test_rejects_deep_depth() {
        let config = IndexerConfig {
            depths: vec![10, 26],
            ..Default::default()
        };
        assert!(matches!(
            TrixelIndexer::new(config),
            Err(HtmError::InvalidDepth { .. })
        ));
    }

    #[test]
    fn test_index_in_batches() {
        let mut t = table(7);
        let indexer = TrixelIndexer::new(IndexerConfig {
            batch_size: 3,
            ..Default::default()
        })
        .unwrap();

        let summary = indexer.index(&mut t).unwrap();
        assert_eq!(summary, IndexSummary { rows: 7, batches: 3 });
        assert_eq!(t.trixel_depths(), vec![10, 13, 16]);

        let mesh = Mesh::new(13).unwrap();
        let id = mesh.lookup_id(6.0, -58.0);
        let rows = t.query(&TrixelFilter::ids(13, vec![id]), &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, serde_json::json!(2));
    }

    #[test]
    fn test_rejects_out_of_range_row() {
        let mut t = table(1);
        t.insert(1u64, 190.0, 95.0, Map::new());
        let indexer = TrixelIndexer::new(IndexerConfig::default()).unwrap();
        assert!(matches!(
            indexer.index(&mut t),
            Err(HtmError::Store(StoreError::InvalidRow { .. }))
        ));
        assert!(t.trixel_depths().is_empty());
    }

    #[test]
    fn test_rerun_skips_indexed_rows() {
        let mut t = table(4);
        let indexer = TrixelIndexer::new(IndexerConfig::default()).unwrap();
        indexer.index(&mut t).unwrap();
        assert_eq!(indexer.index(&mut t).unwrap().rows, 0);

        let forced = TrixelIndexer::new(IndexerConfig {
            force: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(forced.index(&mut t).unwrap().rows, 4);
    }

    #[test]
    fn test_ids_nest_across_depths() {
        let indexer = TrixelIndexer::new(IndexerConfig::default()).unwrap();
        let t = table(1);
        let rows = t.rows_to_index(&[10], true).unwrap();
        let rec = &indexer.compute(&rows)[0];
        assert_eq!(rec.ids[&13] >> 6, rec.ids[&10]);
        assert_eq!(rec.ids[&16] >> 6, rec.ids[&13]);
    }
}
