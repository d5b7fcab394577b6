use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage a fatal error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    LoadTable,
    Extract,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::LoadTable => "FAT table loading",
            PipelineStage::Extract => "cluster chain extraction",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CarveError {
    #[error("Image truncated: needed {wanted} bytes at offset {offset}, only {available} available")]
    TruncatedImage { offset: u64, wanted: u64, available: u64 },

    #[error("Malformed FAT region: {length} bytes is not a whole number of 16-bit entries")]
    MalformedFatRegion { length: u64 },

    #[error("Chain starting at cluster {start} truncated at cluster {cluster}: {reason}")]
    ChainTraversalTruncated { start: usize, cluster: usize, reason: String },

    #[error("Chain starting at cluster {start} loops back to cluster {cluster}")]
    CircularChain { start: usize, cluster: usize },

    #[error("Failed to write {}: {source}", target.display())]
    OutputWriteFailure {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<CarveError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CarveError {
    /// Wrap an error with the stage it aborted
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        CarveError::Stage { stage, source: Box::new(self) }
    }

    /// Short stable name of the error kind, used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            CarveError::TruncatedImage { .. } => "TruncatedImage",
            CarveError::MalformedFatRegion { .. } => "MalformedFatRegion",
            CarveError::ChainTraversalTruncated { .. } => "ChainTraversalTruncated",
            CarveError::CircularChain { .. } => "CircularChain",
            CarveError::OutputWriteFailure { .. } => "OutputWriteFailure",
            CarveError::Stage { source, .. } => source.kind(),
            CarveError::IoError(_) => "IoError",
            CarveError::SerializationError(_) => "SerializationError",
            CarveError::Configuration(_) => "Configuration",
        }
    }
}
