//! CSV snapshot import and export.
//!
//! A snapshot directory holds one file per table, headers equal to the
//! column names. Extra columns are ignored. `economic_indicators.csv`
//! is optional; every other file is required.

use crate::{
    error::{PipelineError, PipelineResult},
    snapshot::Snapshot,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::path::Path;

pub const STATES_FILE: &str = "dim_state.csv";
pub const CITIES_FILE: &str = "dim_city.csv";
pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const LOANS_FILE: &str = "loans.csv";
pub const DEFAULTS_FILE: &str = "defaults_collections.csv";
pub const INDICATORS_FILE: &str = "economic_indicators.csv";

fn read_table<T: DeserializeOwned>(dir: &Path, file: &str) -> PipelineResult<Vec<T>> {
    let path = dir.join(file);
    let handle = File::open(&path).map_err(|e| {
        PipelineError::Other(anyhow::anyhow!("Cannot open {}: {e}", path.display()))
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(handle);

    let mut rows = Vec::new();
    for (row, record) in reader.deserialize().enumerate() {
        let value: T = record.map_err(|e| PipelineError::MalformedRecord {
            table: file.trim_end_matches(".csv").to_string(),
            row,
            reason: e.to_string(),
        })?;
        rows.push(value);
    }
    log::debug!("csv: {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load a snapshot from a directory of CSV files.
pub fn load_snapshot_dir(dir: impl AsRef<Path>) -> PipelineResult<Snapshot> {
    let dir = dir.as_ref();
    let indicators = if dir.join(INDICATORS_FILE).exists() {
        read_table(dir, INDICATORS_FILE)?
    } else {
        log::warn!(
            "csv: {} not found in {}; economic metrics will be empty",
            INDICATORS_FILE,
            dir.display()
        );
        Vec::new()
    };

    let snapshot = Snapshot {
        states: read_table(dir, STATES_FILE)?,
        cities: read_table(dir, CITIES_FILE)?,
        customers: read_table(dir, CUSTOMERS_FILE)?,
        loans: read_table(dir, LOANS_FILE)?,
        defaults: read_table(dir, DEFAULTS_FILE)?,
        indicators,
    };
    log::info!("csv: loaded {} from {}", snapshot.fingerprint(), dir.display());
    Ok(snapshot)
}

fn write_table<T: Serialize>(dir: &Path, file: &str, rows: &[T]) -> PipelineResult<()> {
    let mut writer = csv::Writer::from_path(dir.join(file))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every table of `snapshot` into `dir`, creating it if needed.
pub fn write_snapshot_dir(dir: impl AsRef<Path>, snapshot: &Snapshot) -> PipelineResult<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    write_table(dir, STATES_FILE, &snapshot.states)?;
    write_table(dir, CITIES_FILE, &snapshot.cities)?;
    write_table(dir, CUSTOMERS_FILE, &snapshot.customers)?;
    write_table(dir, LOANS_FILE, &snapshot.loans)?;
    write_table(dir, DEFAULTS_FILE, &snapshot.defaults)?;
    write_table(dir, INDICATORS_FILE, &snapshot.indicators)?;
    log::info!("csv: wrote {} to {}", snapshot.fingerprint(), dir.display());
    Ok(())
}
