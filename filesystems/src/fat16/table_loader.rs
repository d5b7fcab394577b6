// FAT16 table loader
// Decodes the first FAT of an image into cluster pointer values

use byteorder::{ByteOrder, LittleEndian};
use fatcarve_core::CarveError;
use log::{debug, info};
use std::io::{Read, Seek};

use crate::fat_common::{FAT16_ENTRY_SIZE, FAT16_TERMINAL, FAT_REGION_OFFSET};
use crate::image_reader::ImageReader;

/// Dense, read-only view of the FAT: entry `i` is the successor pointer of cluster `i`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterPointerTable {
    entries: Vec<u16>,
}

impl ClusterPointerTable {
    /// Decode raw little-endian FAT bytes
    pub fn decode(raw: &[u8]) -> Result<Self, CarveError> {
        if raw.len() % FAT16_ENTRY_SIZE != 0 {
            return Err(CarveError::MalformedFatRegion { length: raw.len() as u64 });
        }

        let mut entries = vec![0u16; raw.len() / FAT16_ENTRY_SIZE];
        LittleEndian::read_u16_into(raw, &mut entries);
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pointer stored for `cluster`, `None` outside the table
    pub fn get(&self, cluster: usize) -> Option<u16> {
        self.entries.get(cluster).copied()
    }

    pub fn is_terminal(&self, cluster: usize) -> bool {
        self.get(cluster) == Some(FAT16_TERMINAL)
    }

    pub fn entries(&self) -> &[u16] {
        &self.entries
    }
}

impl From<Vec<u16>> for ClusterPointerTable {
    fn from(entries: Vec<u16>) -> Self {
        Self { entries }
    }
}

/// Reads the FAT region from the start of an image
pub struct FatTableLoader {
    fat_size_bytes: u64,
}

impl FatTableLoader {
    pub fn new(fat_size_bytes: u64) -> Self {
        Self { fat_size_bytes }
    }

    pub fn load<R: Read + Seek>(&self, reader: &mut ImageReader<R>) -> Result<ClusterPointerTable, CarveError> {
        if self.fat_size_bytes % FAT16_ENTRY_SIZE as u64 != 0 {
            return Err(CarveError::MalformedFatRegion { length: self.fat_size_bytes });
        }

        let len = usize::try_from(self.fat_size_bytes).map_err(|_| {
            CarveError::Configuration(format!("FAT region of {} bytes is too large", self.fat_size_bytes))
        })?;

        debug!("Reading FAT region at {:#x}, size: {}", FAT_REGION_OFFSET, len);
        let raw = reader.read_exact_at(FAT_REGION_OFFSET, len)?;
        let table = ClusterPointerTable::decode(&raw)?;

        info!("Loaded FAT16 table with {} entries", table.len());
        Ok(table)
    }
}
