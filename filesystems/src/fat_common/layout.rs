// Volume layout derived from a fixed FAT16 geometry
// Image layout: [FAT 1]..[FAT n][root directory][data area]

use fatcarve_core::{CarveError, Fat16Geometry};
use super::constants::*;

/// Byte offsets and sizes computed once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeLayout {
    pub fat_size_bytes: u64,
    pub root_dir_start: u64,
    pub root_dir_size: u64,
    pub cluster_size: u64,
}

impl VolumeLayout {
    /// Calculate the layout, rejecting geometries whose sizes overflow
    pub fn from_geometry(geometry: &Fat16Geometry) -> Result<Self, CarveError> {
        geometry.validate()?;

        let overflow = |what: &str| CarveError::Configuration(format!("{} overflows", what));

        let fat_size_bytes = (geometry.fat_size_sectors as u64)
            .checked_mul(geometry.bytes_per_sector as u64)
            .ok_or_else(|| overflow("FAT size"))?;
        let root_dir_start = fat_size_bytes
            .checked_mul(geometry.fat_count as u64)
            .ok_or_else(|| overflow("root directory offset"))?;
        let root_dir_size = DIR_ENTRY_SIZE * geometry.root_entry_count as u64;
        let cluster_size = geometry.bytes_per_sector as u64 * geometry.sectors_per_cluster as u64;

        root_dir_start
            .checked_add(root_dir_size)
            .ok_or_else(|| overflow("data area offset"))?;

        Ok(Self {
            fat_size_bytes,
            root_dir_start,
            root_dir_size,
            cluster_size,
        })
    }

    /// First byte of cluster 2
    pub fn data_area_offset(&self) -> u64 {
        self.root_dir_start + self.root_dir_size
    }

    /// Image offset of `cluster`, counted from cluster 2 at the data area.
    ///
    /// Clusters 0 and 1 land just before the data area, inside the root
    /// directory. `None` when the offset would be negative or overflow.
    pub fn cluster_offset(&self, cluster: usize) -> Option<u64> {
        let base = self.data_area_offset();
        if cluster >= FIRST_DATA_CLUSTER {
            ((cluster - FIRST_DATA_CLUSTER) as u64)
                .checked_mul(self.cluster_size)?
                .checked_add(base)
        } else {
            let back = ((FIRST_DATA_CLUSTER - cluster) as u64).checked_mul(self.cluster_size)?;
            base.checked_sub(back)
        }
    }
}
