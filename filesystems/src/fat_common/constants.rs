// FAT16 constants used by the carving pipeline

// FAT entry values
pub const FAT16_TERMINAL: u16 = 0xFFFF;  // End of chain marker as written by the target images

// Bytes per FAT16 table entry
pub const FAT16_ENTRY_SIZE: usize = 2;

// Size of one root directory entry
pub const DIR_ENTRY_SIZE: u64 = 32;

// Clusters 0 and 1 are reserved, data area numbering starts here
pub const FIRST_DATA_CLUSTER: usize = 2;

// Offset of the first FAT inside the image
pub const FAT_REGION_OFFSET: u64 = 0;
