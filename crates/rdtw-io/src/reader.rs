//! CSV numeric matrix reader with full input validation.

use std::path::{Path, PathBuf};

use rdtw_core::{Matrix, Sequence};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads a rectangular matrix of finite numbers from a CSV file.
///
/// Every column is numeric; there is no identifier column. Rows are time
/// steps of a sequence, or query rows of a local cost matrix. A header row
/// is skipped only when [`with_headers`](Self::with_headers) is enabled.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::InconsistentRowLength`] | Row has a different column count than the first |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
pub struct MatrixReader {
    path: PathBuf,
    has_headers: bool,
}

impl MatrixReader {
    /// Create a new reader for the given CSV file path. Headers are off by default.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            has_headers: false,
        }
    }

    /// Treat the first row as a header and skip it.
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Read and validate the CSV file, returning its rows.
    #[instrument(skip(self), fields(path = %self.path.display(), headers = self.has_headers))]
    pub fn read(&self) -> Result<Vec<Vec<f64>>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so that our own InconsistentRowLength check fires
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut expected_cols = None;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            let expected = *expected_cols.get_or_insert(record.len());
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }

            let mut values = Vec::with_capacity(expected);
            for (col_index, raw) in record.iter().enumerate() {
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        col_index,
                        raw: raw.to_string(),
                    })?;
                values.push(value);
            }
            rows.push(values);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        debug!(n_cols = expected_cols.unwrap_or(0), "columns validated");
        info!(n_rows = rows.len(), "matrix loaded");
        Ok(rows)
    }

    /// Read the file as a sequence: one time step per row, one feature per column.
    ///
    /// # Errors
    ///
    /// Those of [`read`](Self::read), plus [`IoError::Invalid`] if the rows are
    /// rejected by [`Sequence::from_rows`].
    pub fn read_sequence(&self) -> Result<Sequence, IoError> {
        Sequence::from_rows(self.read()?).map_err(|source| IoError::Invalid {
            path: self.path.clone(),
            source,
        })
    }

    /// Read the file as a query-by-reference local cost matrix.
    ///
    /// # Errors
    ///
    /// Those of [`read`](Self::read), plus [`IoError::Invalid`] if a cost is
    /// negative.
    pub fn read_local_cost(&self) -> Result<Matrix<f64>, IoError> {
        Matrix::local_cost(self.read()?).map_err(|source| IoError::Invalid {
            path: self.path.clone(),
            source,
        })
    }
}
