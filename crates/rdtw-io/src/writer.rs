//! JSON result writer for alignments.

use std::fs;
use std::path::{Path, PathBuf};

use rdtw_core::{Alignment, Normalization, WarpingPath};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes alignment results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_alignment.json`.
pub struct AlignmentWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl AlignmentWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return `{output_dir}/{experiment}_alignment.json`.
    #[must_use]
    pub fn alignment_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_alignment.json", self.experiment.as_str()))
    }

    /// Write an alignment to `{experiment}_alignment.json` and return the path.
    ///
    /// `step_pattern` is recorded as given; the alignment itself only carries
    /// the pattern's normalization hint.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be serialized or written.
    #[instrument(skip_all)]
    pub fn write(&self, alignment: &Alignment, step_pattern: &str) -> Result<PathBuf, IoError> {
        let path = self.alignment_path();

        let artifact = AlignmentArtifact {
            experiment: self.experiment.as_str(),
            step_pattern,
            hint: alignment.hint,
            distance: alignment.distance,
            normalized_distance: alignment.normalized_distance,
            query_len: alignment.query_len,
            reference_len: alignment.reference_len,
            end_column: alignment.end_column,
            open_begin: alignment.open_begin,
            open_end: alignment.open_end,
            path: alignment.path.as_ref(),
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e.into(),
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "alignment written");
        Ok(path)
    }
}

// --- Shadow struct for JSON serialization ---

#[derive(Serialize)]
struct AlignmentArtifact<'a> {
    experiment: &'a str,
    step_pattern: &'a str,
    hint: Normalization,
    distance: f64,
    normalized_distance: Option<f64>,
    query_len: usize,
    reference_len: usize,
    end_column: usize,
    open_begin: bool,
    open_end: bool,
    path: Option<&'a WarpingPath>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdtw_core::{Dtw, Matrix, StepPattern};
    use tempfile::TempDir;

    fn small_alignment(distance_only: bool) -> Alignment {
        let local = Matrix::local_cost(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 0.5]])
            .unwrap();
        Dtw::new()
            .with_step_pattern(StepPattern::asymmetric())
            .with_distance_only(distance_only)
            .align_local_cost(&local)
            .unwrap()
    }

    #[test]
    fn creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let experiment = ExperimentName::new("nested".into()).unwrap();
        let writer = AlignmentWriter::new(&nested, experiment).unwrap();
        assert!(nested.is_dir());
        assert_eq!(writer.alignment_path(), nested.join("nested_alignment.json"));
    }

    #[test]
    fn write_alignment_fields() {
        let dir = TempDir::new().unwrap();
        let experiment = ExperimentName::new("test_exp".into()).unwrap();
        let writer = AlignmentWriter::new(dir.path(), experiment).unwrap();
        let path = writer.write(&small_alignment(false), "asymmetric").unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["experiment"], "test_exp");
        assert_eq!(content["step_pattern"], "asymmetric");
        assert_eq!(content["hint"], "N");
        assert_eq!(content["distance"].as_f64().unwrap(), 0.5);
        assert_eq!(content["query_len"].as_u64().unwrap(), 3);
        assert_eq!(content["reference_len"].as_u64().unwrap(), 2);
        assert_eq!(content["end_column"].as_u64().unwrap(), 1);
        assert_eq!(content["open_end"], false);

        let index1: Vec<u64> = content["path"]["index1"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_u64().unwrap())
            .collect();
        assert_eq!(index1, vec![0, 1, 2]);
        assert!(content["path"]["steps_taken"].is_array());
    }

    #[test]
    fn distance_only_writes_null_path() {
        let dir = TempDir::new().unwrap();
        let experiment = ExperimentName::new("dist".into()).unwrap();
        let writer = AlignmentWriter::new(dir.path(), experiment).unwrap();
        let path = writer.write(&small_alignment(true), "asymmetric").unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(content["path"].is_null());
    }
}
