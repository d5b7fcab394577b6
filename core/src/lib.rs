pub mod error;
pub mod geometry;
pub mod report;

pub use error::{CarveError, PipelineStage};
pub use geometry::Fat16Geometry;
pub use report::{ExtractionFailure, RecoveredFileSummary, RecoveryReport};
