//! Typed columns and missing-value imputation
//!
//! Numeric gaps are filled with the column median, categorical gaps with the
//! column mode. Statistics come from the same table they are applied to.

use boxoffice_core::PipelineError;
use std::collections::HashMap;

/// Cell markers treated as missing
pub const MISSING_MARKERS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "None"];

pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    MISSING_MARKERS.contains(&cell)
}

/// Parse a numeric cell; missing or unparseable cells become `None`
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    if is_missing(cell) {
        return None;
    }
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A single named column
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// Build a column from raw cells.
    ///
    /// Forced-numeric columns coerce unparseable cells to missing. Other
    /// columns are numeric only when every present cell parses.
    pub fn from_cells<'a, I>(cells: I, force_numeric: bool) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cells: Vec<&str> = cells.into_iter().collect();
        let numeric: Vec<Option<f64>> = cells.iter().map(|c| coerce_numeric(c)).collect();

        let all_parse = cells
            .iter()
            .zip(&numeric)
            .all(|(cell, value)| is_missing(cell) || value.is_some());
        let any_present = numeric.iter().any(Option::is_some);

        if force_numeric || (all_parse && any_present) {
            Column::Numeric(numeric)
        } else {
            Column::Categorical(
                cells
                    .iter()
                    .map(|c| (!is_missing(c)).then(|| c.trim().to_string()))
                    .collect(),
            )
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing_count(&self) -> usize {
        match self {
            Column::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            Column::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }
}

/// Column-oriented table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, column: Column) {
        self.names.push(name.into());
        self.columns.push(column);
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Fully populated numeric column
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>, PipelineError> {
        match self.column(name) {
            Some(Column::Numeric(values)) => values
                .iter()
                .map(|v| v.ok_or_else(|| missing_after_impute(name)))
                .collect(),
            Some(Column::Categorical(_)) => Err(PipelineError::DataQuality(format!(
                "column '{name}' is not numeric"
            ))),
            None => Err(PipelineError::DataQuality(format!("missing column '{name}'"))),
        }
    }

    /// Fully populated text column; numeric columns are rendered as text
    pub fn text(&self, name: &str) -> Result<Vec<String>, PipelineError> {
        match self.column(name) {
            Some(Column::Categorical(values)) => values
                .iter()
                .map(|v| v.clone().ok_or_else(|| missing_after_impute(name)))
                .collect(),
            Some(Column::Numeric(values)) => values
                .iter()
                .map(|v| v.map(|x| x.to_string()).ok_or_else(|| missing_after_impute(name)))
                .collect(),
            None => Err(PipelineError::DataQuality(format!("missing column '{name}'"))),
        }
    }
}

fn missing_after_impute(name: &str) -> PipelineError {
    PipelineError::DataQuality(format!("column '{name}' still has missing values"))
}

/// Value used to fill a column's gaps
#[derive(Debug, Clone, PartialEq)]
pub enum FillValue {
    Median(f64),
    Mode(String),
}

/// Median/mode imputer fitted on a table
#[derive(Debug, Clone, PartialEq)]
pub struct Imputer {
    fills: Vec<(String, FillValue)>,
}

impl Imputer {
    /// Compute the fill value of every column
    pub fn fit(table: &Table) -> Result<Self, PipelineError> {
        let mut fills = Vec::with_capacity(table.names.len());

        for (name, column) in table.names.iter().zip(&table.columns) {
            let fill = match column {
                Column::Numeric(values) => {
                    let present: Vec<f64> = values.iter().flatten().copied().collect();
                    FillValue::Median(median(present).ok_or_else(|| all_missing(name))?)
                }
                Column::Categorical(values) => {
                    FillValue::Mode(mode(values.iter().flatten()).ok_or_else(|| all_missing(name))?)
                }
            };
            fills.push((name.clone(), fill));
        }

        Ok(Self { fills })
    }

    /// Fill the gaps of `table` with the fitted values
    pub fn transform(&self, mut table: Table) -> Result<Table, PipelineError> {
        for (name, column) in table.names.iter().zip(table.columns.iter_mut()) {
            let fill = self.fill_for(name).ok_or_else(|| {
                PipelineError::DataQuality(format!("imputer was not fitted on column '{name}'"))
            })?;

            match (column, fill) {
                (Column::Numeric(values), FillValue::Median(m)) => {
                    for v in values.iter_mut().filter(|v| v.is_none()) {
                        *v = Some(*m);
                    }
                }
                (Column::Categorical(values), FillValue::Mode(m)) => {
                    for v in values.iter_mut().filter(|v| v.is_none()) {
                        *v = Some(m.clone());
                    }
                }
                _ => {
                    return Err(PipelineError::DataQuality(format!(
                        "column '{name}' changed type since the imputer was fitted"
                    )))
                }
            }
        }
        Ok(table)
    }

    pub fn fit_transform(table: Table) -> Result<(Self, Table), PipelineError> {
        let imputer = Self::fit(&table)?;
        let table = imputer.transform(table)?;
        Ok((imputer, table))
    }

    pub fn fill_for(&self, name: &str) -> Option<&FillValue> {
        self.fills.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }
}

fn all_missing(name: &str) -> PipelineError {
    PipelineError::DataQuality(format!(
        "column '{name}' has no values; cannot impute"
    ))
}

/// Median; mean of the two middle values for an even count
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Most frequent value; ties go to the lexicographically smallest
pub fn mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(v, _)| v.to_string())
}
