// Test helpers for building synthetic FAT16 images

use crate::fat_common::VolumeLayout;
use fatcarve_core::Fat16Geometry;

/// Table where every entry `i` points at `i + 1`, the background of the target images
pub fn sequential_table(len: usize) -> Vec<u16> {
    (1..=len).map(|next| next as u16).collect()
}

/// Tiny geometry: 32-byte FATs (16 entries), 128-byte root directory, 32-byte clusters
pub fn small_geometry() -> Fat16Geometry {
    Fat16Geometry {
        bytes_per_sector: 16,
        sectors_per_cluster: 2,
        reserved_sector_count: 1,
        fat_count: 2,
        fat_size_sectors: 2,
        root_entry_count: 4,
    }
}

/// Image holding every FAT copy, the root directory and clusters `2..end_cluster`
pub struct ImageBuilder {
    layout: VolumeLayout,
    fat_count: u64,
    bytes: Vec<u8>,
}

impl ImageBuilder {
    pub fn new(geometry: Fat16Geometry, end_cluster: usize) -> Self {
        let layout = VolumeLayout::from_geometry(&geometry).unwrap();
        let data_clusters = end_cluster.saturating_sub(2) as u64;
        let len = layout.data_area_offset() + data_clusters * layout.cluster_size;

        Self {
            layout,
            fat_count: geometry.fat_count as u64,
            bytes: vec![0u8; len as usize],
        }
    }

    pub fn layout(&self) -> VolumeLayout {
        self.layout
    }

    /// Write `entries` into every FAT copy
    pub fn set_table(&mut self, entries: &[u16]) -> &mut Self {
        assert!(entries.len() as u64 * 2 <= self.layout.fat_size_bytes, "table larger than FAT region");
        for copy in 0..self.fat_count {
            let base = (copy * self.layout.fat_size_bytes) as usize;
            for (i, value) in entries.iter().enumerate() {
                self.bytes[base + i * 2..base + i * 2 + 2].copy_from_slice(&value.to_le_bytes());
            }
        }
        self
    }

    /// Write `data` at the start of `cluster`, leaving the rest zeroed
    pub fn write_cluster(&mut self, cluster: usize, data: &[u8]) -> &mut Self {
        assert!(data.len() as u64 <= self.layout.cluster_size, "data larger than a cluster");
        let offset = self.layout.cluster_offset(cluster).unwrap() as usize;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self
    }

    /// Fill a whole cluster with one byte value
    pub fn fill_cluster(&mut self, cluster: usize, value: u8) -> &mut Self {
        let data = vec![value; self.layout.cluster_size as usize];
        self.write_cluster(cluster, &data)
    }

    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
