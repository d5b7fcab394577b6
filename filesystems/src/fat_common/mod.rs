// Common FAT components shared by the carving stages

pub mod constants;
pub mod layout;

pub use constants::*;
pub use layout::*;
