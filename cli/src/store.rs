use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use shelter_graph_core::{Connection, RecordStore, Shelter, StoreError, Year};
use tracing::{debug, warn};

use crate::config::Config;

/// Record store over two CSV files with header rows.
///
/// `shelters`: `id,name,locality,altitude,capacity,is_open`
/// `connections`: `id,shelter_id1,shelter_id2,distance,difficulty,duration,year`
/// with `duration` as `HH:MM:SS`.
#[derive(Debug, Clone)]
pub struct CsvStore {
    shelters_path: PathBuf,
    connections_path: PathBuf,
}

impl CsvStore {
    pub fn new(shelters_path: impl Into<PathBuf>, connections_path: impl Into<PathBuf>) -> Self {
        Self {
            shelters_path: shelters_path.into(),
            connections_path: connections_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.shelters_path(), config.connections_path())
    }

    pub fn shelters_path(&self) -> &Path {
        &self.shelters_path
    }

    pub fn connections_path(&self) -> &Path {
        &self.connections_path
    }
}

impl RecordStore for CsvStore {
    fn read_shelters(&self) -> Result<Vec<Shelter>, StoreError> {
        read_rows(&self.shelters_path)
    }

    fn read_connections(&self, year_cutoff: Year) -> Result<Vec<Connection>, StoreError> {
        let mut rows: Vec<Connection> = read_rows(&self.connections_path)?;
        rows.retain(|c| c.year <= year_cutoff);
        Ok(rows)
    }
}

/// Deserialize every row of `path`.
///
/// An unopenable file is `Unavailable`; a broken header or an I/O failure
/// mid-read is `Query`. Rows that fail to deserialize are skipped.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| StoreError::unavailable(format!("{}: {e}", path.display())))?;

    reader
        .headers()
        .map_err(|e| StoreError::query(format!("{}: bad header: {e}", path.display())))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (index, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => {
                return Err(StoreError::query(format!("{}: {e}", path.display())));
            }
            Err(e) => {
                // header is line 1
                warn!(file = %path.display(), line = index + 2, error = %e, "skipping malformed row");
                skipped += 1;
            }
        }
    }

    debug!(file = %path.display(), rows = rows.len(), skipped, "records read");
    Ok(rows)
}
