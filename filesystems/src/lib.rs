// FAT16 carving - recover file content from FAT cluster chains alone

pub mod fat_common;
pub mod fat16;
pub mod image_reader;
pub mod output;

#[cfg(test)]
pub mod test_helpers;

pub use fat16::{
    CarveOptions, ChainBoundaries, ChainBoundaryDetector, ClusterChainExtractor, ClusterPointerTable,
    Fat16Carver, FatTableLoader, FileStartClassifier, RecoveredFile,
};
pub use fat_common::VolumeLayout;
pub use image_reader::{FileImage, ImageReader, ImageSource, MemoryImage};
pub use output::{DirectorySink, MemorySink, RecoverySink};
