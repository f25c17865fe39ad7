//! Dynamic Time Warping alignment with configurable step patterns and windows.
//!
//! Pure math library with zero I/O. Builds the global cost matrix of a local
//! cost matrix under a step pattern and a window constraint, recovers the
//! optimal warping path, and supports open-begin and open-end alignments.

mod alignment;
mod backtrack;
mod cost;
mod distance;
mod error;
mod matrix;
mod path;
mod sequence;
mod step_pattern;
mod window;

pub use alignment::{Alignment, Dtw, DtwInput, Internals, dtw};
pub use cost::GlobalCostMatrix;
pub use distance::{DistanceMethod, local_cost_matrix};
pub use error::{ConfigError, DtwError};
pub use matrix::{CostMatrix, DirectionMatrix, Matrix};
pub use path::{WarpingPath, WarpingStep};
pub use sequence::Sequence;
pub use step_pattern::{Normalization, StepPattern, StepRow, StepTerm, Transition};
pub use window::{Window, WindowFn};
