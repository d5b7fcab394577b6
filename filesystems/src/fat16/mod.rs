// FAT16 carving - table loading, chain analysis and extraction

pub mod table_loader;
pub mod chain_boundaries;
pub mod file_starts;
pub mod extractor;
pub mod carver;

pub use table_loader::{ClusterPointerTable, FatTableLoader};
pub use chain_boundaries::{ChainBoundaries, ChainBoundaryDetector};
pub use file_starts::FileStartClassifier;
pub use extractor::{trim_trailing_zeros, ClusterChainExtractor, Extraction, RecoveredFile};
pub use carver::{CarveOptions, Fat16Carver};
