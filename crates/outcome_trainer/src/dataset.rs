//! CSV dataset loading and preprocessing
//!
//! Reads the movie metadata table, drops exact duplicate rows, projects the
//! required columns into a typed [`Table`] and turns the imputed table into
//! [`MovieRecord`]s.

use crate::errors::TrainerError;
use crate::impute::{Column, Table};
use boxoffice_core::{feature_vector, FEATURE_COUNT};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

pub const GENRES: &str = "genres";
pub const CAST_LIKES: &str = "cast_total_facebook_likes";
pub const BUDGET: &str = "budget";
pub const TITLE_YEAR: &str = "title_year";
pub const GROSS: &str = "gross";

/// Columns the training table must provide
pub const REQUIRED_COLUMNS: [&str; 5] = [GENRES, CAST_LIKES, BUDGET, TITLE_YEAR, GROSS];

/// Columns always coerced to numbers
pub const NUMERIC_COLUMNS: [&str; 4] = [CAST_LIKES, BUDGET, TITLE_YEAR, GROSS];

/// Untyped table exactly as read from disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Load a delimited table with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path.as_ref())?;
        Self::from_csv_reader(reader)
    }

    pub fn from_reader<R: Read>(input: R) -> Result<Self, TrainerError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, TrainerError> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (line_idx, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(TrainerError::data_quality(format!(
                    "Row {}: expected at most {} fields, got {}",
                    line_idx + 1,
                    headers.len(),
                    record.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fail unless every required column is present and there is at least one row
    pub fn require_columns(&self, required: &[&str]) -> Result<(), TrainerError> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !self.headers.iter().any(|h| h == name))
            .collect();

        if !missing.is_empty() {
            return Err(TrainerError::data_quality(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }
        if self.rows.is_empty() {
            return Err(TrainerError::data_quality("dataset is empty"));
        }
        Ok(())
    }

    /// Remove exact duplicate rows, keeping the first occurrence.
    /// Returns the number of rows dropped.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    /// Typed projection of the named columns
    pub fn select(&self, names: &[&str]) -> Result<Table, TrainerError> {
        let mut table = Table::new();
        for &name in names {
            let idx = self
                .headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| TrainerError::data_quality(format!("missing column '{name}'")))?;
            let force_numeric = NUMERIC_COLUMNS.contains(&name);
            let column =
                Column::from_cells(self.rows.iter().map(|row| row[idx].as_str()), force_numeric);
            table.push(name, column);
        }
        Ok(table)
    }
}

/// One cleaned movie row
#[derive(Clone, Debug, PartialEq)]
pub struct MovieRecord {
    pub genres: String,
    pub cast_likes: f64,
    pub budget: f64,
    pub title_year: f64,
    pub gross: f64,
}

impl MovieRecord {
    /// Unscaled feature vector given the encoded genre
    pub fn features(&self, genre_code: u32) -> [f64; FEATURE_COUNT] {
        feature_vector(genre_code, self.cast_likes, self.budget, self.title_year)
    }
}

/// Records of a fully imputed table
pub fn records_from_table(table: &Table) -> Result<Vec<MovieRecord>, TrainerError> {
    let genres = table.text(GENRES)?;
    let cast_likes = table.numeric(CAST_LIKES)?;
    let budget = table.numeric(BUDGET)?;
    let title_year = table.numeric(TITLE_YEAR)?;
    let gross = table.numeric(GROSS)?;

    let records = genres
        .into_iter()
        .enumerate()
        .map(|(i, genres)| MovieRecord {
            genres,
            cast_likes: cast_likes[i],
            budget: budget[i],
            title_year: title_year[i],
            gross: gross[i],
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impute::Imputer;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
movie_title,genres,cast_total_facebook_likes,budget,title_year,gross
Alpha,Action|Adventure,5000,10000000,2016,25000000
Beta,Comedy,,10000000,2015,10000000
Gamma,Drama|Romance,1200,10000000,,5000000
Alpha,Action|Adventure,5000,10000000,2016,25000000
";

    fn create_test_csv() -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let file = create_test_csv()?;
        let table = RawTable::from_csv(file.path())?;

        assert_eq!(table.len(), 4);
        assert_eq!(table.headers[1], "genres");
        assert_eq!(table.rows[1][2], "");
        table.require_columns(&REQUIRED_COLUMNS)?;
        Ok(())
    }

    #[test]
    fn test_drop_duplicates() -> Result<()> {
        let mut table = RawTable::from_reader(SAMPLE.as_bytes())?;
        assert_eq!(table.drop_duplicates(), 1);
        assert_eq!(table.len(), 3);
        assert_eq!(table.drop_duplicates(), 0);
        Ok(())
    }

    #[test]
    fn test_missing_columns_reported() -> Result<()> {
        let table = RawTable::from_reader("genres,budget\nAction,10\n".as_bytes())?;
        let err = table.require_columns(&REQUIRED_COLUMNS).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cast_total_facebook_likes"), "{msg}");
        assert!(msg.contains("gross"), "{msg}");
        Ok(())
    }

    #[test]
    fn test_empty_table_rejected() -> Result<()> {
        let table = RawTable::from_reader(
            "genres,cast_total_facebook_likes,budget,title_year,gross\n".as_bytes(),
        )?;
        assert!(table.require_columns(&REQUIRED_COLUMNS).is_err());
        Ok(())
    }

    #[test]
    fn test_records_after_imputation() -> Result<()> {
        let mut raw = RawTable::from_reader(SAMPLE.as_bytes())?;
        raw.drop_duplicates();
        let table = raw.select(&REQUIRED_COLUMNS)?;
        let (_, table) = Imputer::fit_transform(table)?;
        let records = records_from_table(&table)?;

        assert_eq!(records.len(), 3);
        // median of [5000, 1200]
        assert_eq!(records[1].cast_likes, 3100.0);
        // median of [2016, 2015]
        assert_eq!(records[2].title_year, 2015.5);
        assert_eq!(records[0].features(7), [7.0, 5000.0, 10_000_000.0, 2016.0]);
        Ok(())
    }

    #[test]
    fn test_short_rows_are_padded() -> Result<()> {
        let table = RawTable::from_reader("a,b,c\n1,2\n".as_bytes())?;
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        Ok(())
    }
}
