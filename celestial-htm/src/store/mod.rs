//! The external tabular store.
//!
//! Cone search and bulk indexing need exactly three things from a table:
//! which trixel-id columns exist, a query primitive filtered on one of
//! them, and a write primitive for computed ids. [`TableStore`] is that
//! seam. [`MemoryTable`] implements it over JSON rows, and an SQL-backed
//! store can render a [`TrixelFilter`] with [`TrixelFilter::to_sql`].
//!
//! Trixel columns are named `htm{depth}ID`, e.g. `htm16ID`.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`memory`] | [`MemoryTable`], JSON persisted rows |
//! | [`indexer`] | [`TrixelIndexer`], batch id computation for the write primitive |

pub mod indexer;
pub mod memory;

pub use indexer::{IndexSummary, IndexerConfig, TrixelIndexer};
pub use memory::MemoryTable;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table has no trixel column for depth {depth} (expected htm{depth}ID)")]
    MissingIndex { depth: u8 },

    #[error("no row with primary key {0}")]
    UnknownRow(String),

    #[error("invalid row {key}: {reason}")]
    InvalidRow { key: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Name of the trixel-id column for `depth`.
pub fn trixel_column(depth: u8) -> String {
    format!("htm{depth}ID")
}

/// Depth of a trixel-id column name, if it is one.
pub fn column_depth(column: &str) -> Option<u8> {
    column
        .strip_prefix("htm")?
        .strip_suffix("ID")?
        .parse()
        .ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrixelPredicate {
    /// Explicit ids, sorted ascending.
    In(Vec<u64>),
    /// Inclusive id range.
    Between { min: u64, max: u64 },
}

/// Trixel-id condition on one depth's column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrixelFilter {
    pub depth: u8,
    pub predicate: TrixelPredicate,
}

impl TrixelFilter {
    pub fn ids(depth: u8, mut ids: Vec<u64>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self {
            depth,
            predicate: TrixelPredicate::In(ids),
        }
    }

    pub fn between(depth: u8, min: u64, max: u64) -> Self {
        Self {
            depth,
            predicate: TrixelPredicate::Between { min, max },
        }
    }

    pub fn column(&self) -> String {
        trixel_column(self.depth)
    }

    pub fn matches(&self, id: u64) -> bool {
        match &self.predicate {
            TrixelPredicate::In(ids) => ids.binary_search(&id).is_ok(),
            TrixelPredicate::Between { min, max } => (*min..=*max).contains(&id),
        }
    }

    /// SQL `WHERE` fragment for SQL-backed stores.
    ///
    /// ```
    /// use celestial_htm::store::TrixelFilter;
    ///
    /// assert_eq!(TrixelFilter::ids(16, vec![3, 1, 2]).to_sql(), "htm16ID in (1,2,3)");
    /// assert_eq!(TrixelFilter::between(13, 5, 9).to_sql(), "htm13ID between 5 and 9");
    /// ```
    pub fn to_sql(&self) -> String {
        let column = self.column();
        match &self.predicate {
            TrixelPredicate::In(ids) => {
                let list: Vec<String> = ids.iter().map(u64::to_string).collect();
                format!("{column} in ({})", list.join(","))
            }
            TrixelPredicate::Between { min, max } => {
                format!("{column} between {min} and {max}")
            }
        }
    }
}

/// A row handed back by [`TableStore::query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub key: Value,
    pub ra: f64,
    pub dec: f64,
    /// Requested extra columns, absent values as `null`.
    pub columns: Map<String, Value>,
}

/// Computed trixel ids for one row, keyed by depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrixelIdRecord {
    pub key: Value,
    pub ids: BTreeMap<u8, u64>,
}

/// A table of positions that carries (or can be given) trixel-id columns.
pub trait TableStore {
    /// Depths with a populated `htm{depth}ID` column, ascending.
    fn trixel_depths(&self) -> Vec<u8>;

    /// Rows whose trixel id at `filter.depth` satisfies the filter.
    ///
    /// `columns` names the extra columns to return; `"*"` returns all.
    /// Fails with [`StoreError::MissingIndex`] when the column does not exist.
    fn query(&self, filter: &TrixelFilter, columns: &[String]) -> Result<Vec<Row>, StoreError>;

    /// Rows that still need ids at some of `depths` (all rows when `force`),
    /// with their positions and no extra columns.
    fn rows_to_index(&self, depths: &[u8], force: bool) -> Result<Vec<Row>, StoreError>;

    /// Writes computed ids back, returning the number of rows updated.
    fn write_trixel_ids(&mut self, records: &[TrixelIdRecord]) -> Result<usize, StoreError>;
}
