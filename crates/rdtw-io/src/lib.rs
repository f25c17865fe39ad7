//! CSV input and JSON output for rdtw alignments.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::ExperimentName;
pub use error::IoError;
pub use reader::MatrixReader;
pub use writer::AlignmentWriter;
