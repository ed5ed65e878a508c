//! In-memory table persisted as JSON.
//!
//! ```json
//! {
//!   "name": "transients",
//!   "primary_key": "id",
//!   "ra_column": "raDeg",
//!   "dec_column": "decDeg",
//!   "rows": [
//!     { "id": 1, "raDeg": 200.0, "decDeg": 24.3, "htm16ID": 54926008564 }
//!   ]
//! }
//! ```
//!
//! Trixel columns are discovered from the rows themselves. A row without
//! the filtered column (or with `null` there) never matches a query.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use celestial_core::angle::{validate_declination, validate_right_ascension};
use celestial_core::Angle;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{column_depth, trixel_column, Row, StoreError, TableStore, TrixelFilter, TrixelIdRecord};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryTable {
    pub name: String,
    pub primary_key: String,
    pub ra_column: String,
    pub dec_column: String,
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

impl MemoryTable {
    pub fn new(name: &str, primary_key: &str, ra_column: &str, dec_column: &str) -> Self {
        Self {
            name: name.to_string(),
            primary_key: primary_key.to_string(),
            ra_column: ra_column.to_string(),
            dec_column: dec_column.to_string(),
            rows: Vec::new(),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Writes the table as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Adds a row with a key and position; `extra` supplies other columns.
    pub fn insert(&mut self, key: impl Into<Value>, ra: f64, dec: f64, extra: Map<String, Value>) {
        let mut row = extra;
        row.insert(self.primary_key.clone(), key.into());
        row.insert(self.ra_column.clone(), Value::from(ra));
        row.insert(self.dec_column.clone(), Value::from(dec));
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn key_of(&self, row: &Map<String, Value>) -> Value {
        row.get(&self.primary_key).cloned().unwrap_or(Value::Null)
    }

    fn position(&self, row: &Map<String, Value>) -> Result<(f64, f64), StoreError> {
        let number = |column: &str| {
            row.get(column).and_then(Value::as_f64).ok_or_else(|| StoreError::InvalidRow {
                key: self.key_of(row).to_string(),
                reason: format!("column {column} is missing or not a number"),
            })
        };
        let (ra, dec) = (number(&self.ra_column)?, number(&self.dec_column)?);
        let invalid = |e: celestial_core::AstroError| StoreError::InvalidRow {
            key: self.key_of(row).to_string(),
            reason: e.to_string(),
        };
        validate_right_ascension(Angle::from_degrees(ra)).map_err(invalid)?;
        validate_declination(Angle::from_degrees(dec)).map_err(invalid)?;
        Ok((ra, dec))
    }

    fn to_row(&self, row: &Map<String, Value>, columns: &[String]) -> Result<Row, StoreError> {
        let (ra, dec) = self.position(row)?;
        let columns = if columns.iter().any(|c| c == "*") {
            row.clone()
        } else {
            columns
                .iter()
                .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                .collect()
        };
        Ok(Row {
            key: self.key_of(row),
            ra,
            dec,
            columns,
        })
    }
}

fn has_id(row: &Map<String, Value>, depth: u8) -> bool {
    row.get(&trixel_column(depth)).is_some_and(|v| v.as_u64().is_some())
}

impl TableStore for MemoryTable {
    fn trixel_depths(&self) -> Vec<u8> {
        let depths: BTreeSet<u8> = self
            .rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|(_, v)| v.as_u64().is_some())
            .filter_map(|(k, _)| column_depth(k))
            .collect();
        depths.into_iter().collect()
    }

    fn query(&self, filter: &TrixelFilter, columns: &[String]) -> Result<Vec<Row>, StoreError> {
        if !self.trixel_depths().contains(&filter.depth) {
            return Err(StoreError::MissingIndex {
                depth: filter.depth,
            });
        }
        let column = filter.column();
        self.rows
            .iter()
            .filter(|row| {
                row.get(&column)
                    .and_then(Value::as_u64)
                    .is_some_and(|id| filter.matches(id))
            })
            .map(|row| self.to_row(row, columns))
            .collect()
    }

    fn rows_to_index(&self, depths: &[u8], force: bool) -> Result<Vec<Row>, StoreError> {
        self.rows
            .iter()
            .filter(|row| force || depths.iter().any(|&d| !has_id(row, d)))
            .map(|row| self.to_row(row, &[]))
            .collect()
    }

    fn write_trixel_ids(&mut self, records: &[TrixelIdRecord]) -> Result<usize, StoreError> {
        let by_key: HashMap<String, usize> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (self.key_of(row).to_string(), i))
            .collect();

        // resolve every key first so a bad batch leaves the table untouched
        let targets = records
            .iter()
            .map(|rec| {
                let key = rec.key.to_string();
                by_key.get(&key).copied().ok_or(StoreError::UnknownRow(key))
            })
            .collect::<Result<Vec<usize>, StoreError>>()?;

        for (rec, i) in records.iter().zip(targets) {
            for (&depth, &id) in &rec.ids {
                self.rows[i].insert(trixel_column(depth), Value::from(id));
            }
        }
        Ok(records.len())
    }
}
