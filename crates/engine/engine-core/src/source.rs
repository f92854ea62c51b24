//! CSV history source.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use engine_api::{EngineError, HistorySource, Result};

/// Historical series read from one column of a CSV file with a header row.
///
/// The column is chosen by name or zero-based index; without one, the last
/// column is used, which covers both `value` files and `timestamp,value` files.
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    path: PathBuf,
    column: Option<String>,
    name: String,
}

impl CsvHistorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self {
            path,
            column: None,
            name,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn csv_error(&self, e: csv::Error) -> EngineError {
        EngineError::InvalidData(format!("{}: {e}", self.name))
    }

    fn column_index(&self, headers: &csv::StringRecord) -> Result<usize> {
        let Some(col) = self.column.as_deref() else {
            return headers
                .len()
                .checked_sub(1)
                .ok_or_else(|| EngineError::InvalidData(format!("{}: no columns", self.name)));
        };
        if let Some(idx) = headers.iter().position(|h| h.trim() == col) {
            return Ok(idx);
        }
        match col.parse::<usize>() {
            Ok(idx) if idx < headers.len() => Ok(idx),
            _ => Err(EngineError::invalid_parameter(
                "column",
                format!("'{col}' not found in {}", self.name),
            )),
        }
    }
}

impl HistorySource for CsvHistorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<f64>> {
        let file = File::open(&self.path)?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));

        let headers = reader.headers().map_err(|e| self.csv_error(e))?.clone();
        let col_idx = self.column_index(&headers)?;

        let mut data = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| self.csv_error(e))?;
            let cell = record.get(col_idx).unwrap_or("").trim();
            let value = cell.parse::<f64>().map_err(|_| {
                EngineError::InvalidData(format!(
                    "{}: row {} has non-numeric value '{cell}'",
                    self.name,
                    row + 1
                ))
            })?;
            data.push(value);
        }

        tracing::debug!(source = %self.name, rows = data.len(), "history loaded");
        Ok(data)
    }
}
