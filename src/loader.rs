use std::fs::File;
use std::path::Path;
use std::rc::Rc;

use csv::StringRecord;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// One data row, sharing its file's header record.
#[derive(Debug, Clone)]
pub struct CsvRow {
    headers: Rc<StringRecord>,
    values: StringRecord,
    line: u64,
}

impl CsvRow {
    pub fn new(headers: Rc<StringRecord>, values: StringRecord, line: u64) -> Self {
        Self {
            headers,
            values,
            line,
        }
    }

    /// Deserializes the row by header name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        self.values
            .deserialize(Some(&*self.headers))
            .map_err(|source| {
                let column = match source.kind() {
                    csv::ErrorKind::Deserialize { err, .. } => err
                        .field()
                        .and_then(|index| self.headers.get(index as usize))
                        .map(str::to_string),
                    _ => None,
                };
                AnalysisError::Parse {
                    line: self.line,
                    column,
                    source,
                }
            })
    }
}

pub fn read_csv(path: &Path) -> Result<Vec<CsvRow>> {
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| format_error(path, source))?
        .clone();
    if headers.is_empty() {
        return Err(AnalysisError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    let headers = Rc::new(headers);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| format_error(path, source))?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        rows.push(CsvRow::new(Rc::clone(&headers), record, line));
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn format_error(path: &Path, source: csv::Error) -> AnalysisError {
    if source.is_io_error() {
        AnalysisError::Io {
            path: path.to_path_buf(),
            source: source.into(),
        }
    } else {
        AnalysisError::Format {
            path: path.to_path_buf(),
            source,
        }
    }
}
