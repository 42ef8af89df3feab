//! Static, read-only tabular datasets backing the trends views.

use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::errors::{DashError, DashResult};

/// A delimited text file loaded once at startup.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

/// A table of matching rows, in file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSlice {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn load(path: &Path) -> DashResult<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DashError::dataset(format!("opening {}", path.display()), e))?;
        let dataset = Self::from_csv(&path.display().to_string(), reader)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            columns = dataset.headers.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: io::Read>(name: &str, reader: R) -> DashResult<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(name, reader)
    }

    fn from_csv<R: io::Read>(name: &str, mut reader: csv::Reader<R>) -> DashResult<Self> {
        let headers = reader
            .headers()
            .map_err(|e| DashError::dataset(format!("reading headers of {name}"), e))?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DashError::dataset(format!("reading rows of {name}"), e))?;

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> DashResult<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| {
                DashError::config(format!("dataset {} has no column '{column}'", self.name))
            })
    }

    /// Raw cell values of one column.
    pub fn text(&self, column: &str) -> DashResult<Vec<&str>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|r| r.get(idx).unwrap_or("")).collect())
    }

    /// Numeric cell values of one column; blanks and non-numbers are `None`.
    pub fn numeric(&self, column: &str) -> DashResult<Vec<Option<f64>>> {
        Ok(self
            .text(column)?
            .into_iter()
            .map(parse_number)
            .collect())
    }

    /// Rows whose cells equal every given `(column, value)` pair.
    ///
    /// Numbers compare numerically so `6` matches `6.0`.
    pub fn filter(&self, predicates: &[(&str, String)]) -> DashResult<TableSlice> {
        let resolved = predicates
            .iter()
            .map(|(column, value)| Ok((self.column_index(column)?, value.as_str())))
            .collect::<DashResult<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .filter(|row| {
                resolved
                    .iter()
                    .all(|(idx, wanted)| cell_matches(row.get(*idx).unwrap_or(""), wanted))
            })
            .map(|row| row.iter().map(str::to_string).collect())
            .collect();

        Ok(TableSlice {
            columns: self.headers.clone(),
            rows,
        })
    }
}

pub(crate) fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn cell_matches(cell: &str, wanted: &str) -> bool {
    match (parse_number(cell), parse_number(wanted)) {
        (Some(a), Some(b)) => a == b,
        _ => cell == wanted.trim(),
    }
}
