//! Per-film metrics table for charting
//!
//! One row per cleaned record with its main genre, return on investment and
//! derived financial status.

use crate::dataset::{MovieRecord, BUDGET, CAST_LIKES, GROSS, TITLE_YEAR};
use crate::errors::TrainerError;
use boxoffice_core::{derive_label, main_genre, roi};
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

pub const METRICS_HEADERS: [&str; 7] = [
    "main_genre",
    CAST_LIKES,
    BUDGET,
    TITLE_YEAR,
    GROSS,
    "ROI",
    "Financial_Status",
];

/// Write the metrics table to `path`, replacing any previous file
pub fn write_metrics_table(path: &Path, records: &[MovieRecord]) -> Result<(), TrainerError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        writer.write_record(METRICS_HEADERS)?;

        for record in records {
            let ratio = roi(record.budget, record.gross)
                .map(|r| r.to_string())
                .unwrap_or_default();
            writer.write_record([
                main_genre(&record.genres).to_string(),
                record.cast_likes.to_string(),
                record.budget.to_string(),
                record.title_year.to_string(),
                record.gross.to_string(),
                ratio,
                derive_label(record.budget, record.gross).to_string(),
            ])?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| TrainerError::Io(e.error))?;

    info!("Wrote metrics table ({} rows) to {}", records.len(), path.display());
    Ok(())
}
