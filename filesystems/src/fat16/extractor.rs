// Cluster chain extraction
// Walks one chain from a file start and assembles the data area bytes it covers

use fatcarve_core::CarveError;
use log::{debug, warn};
use std::collections::HashSet;
use std::io::{Read, Seek};

use super::table_loader::ClusterPointerTable;
use crate::fat_common::{VolumeLayout, FAT16_TERMINAL};
use crate::image_reader::ImageReader;

const PREVIEW_BYTES: usize = 16;

/// Bytes carved for one file start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredFile {
    pub start_cluster: usize,
    pub clusters_read: usize,
    /// Length before trailing padding was trimmed
    pub raw_length: u64,
    pub data: Vec<u8>,
}

impl RecoveredFile {
    pub fn file_name(&self) -> String {
        format!("recovered_file_{}.dat", self.start_cluster)
    }
}

/// A carved file plus the reason its walk stopped early, if it did
#[derive(Debug)]
pub struct Extraction {
    pub file: RecoveredFile,
    pub interruption: Option<CarveError>,
}

pub struct ClusterChainExtractor<'a> {
    table: &'a ClusterPointerTable,
    layout: VolumeLayout,
    cluster_size: usize,
    trim_padding: bool,
}

impl<'a> ClusterChainExtractor<'a> {
    pub fn new(table: &'a ClusterPointerTable, layout: VolumeLayout, trim_padding: bool) -> Result<Self, CarveError> {
        let cluster_size = usize::try_from(layout.cluster_size).map_err(|_| {
            CarveError::Configuration(format!("cluster size {} is too large", layout.cluster_size))
        })?;

        Ok(Self {
            table,
            layout,
            cluster_size,
            trim_padding,
        })
    }

    /// Follow the chain from `start` until the terminal marker.
    ///
    /// The cluster whose own entry holds the terminal marker is not read.
    /// Clusters 0 and 1 are read from just before the data area like any other
    /// cluster. Leaving the table, hitting end of image or revisiting a cluster
    /// stops the walk early; the bytes gathered so far are kept and the reason
    /// is returned alongside them.
    pub fn extract<R: Read + Seek>(
        &self,
        reader: &mut ImageReader<R>,
        start: usize,
    ) -> Result<Extraction, CarveError> {
        let mut data = Vec::new();
        let mut clusters_read = 0;
        let mut visited = HashSet::new();
        let mut current = start;

        let interruption = loop {
            let pointer = match self.table.get(current) {
                Some(pointer) => pointer,
                None => {
                    break Some(self.truncated(start, current, format!(
                        "cluster lies past the end of the FAT ({} entries)",
                        self.table.len()
                    )));
                }
            };

            if pointer == FAT16_TERMINAL {
                break None;
            }

            if !visited.insert(current) {
                break Some(CarveError::CircularChain { start, cluster: current });
            }

            let offset = match self.layout.cluster_offset(current) {
                Some(offset) => offset,
                None => {
                    break Some(self.truncated(start, current, "cluster lies before the start of the image".to_string()));
                }
            };

            let chunk = reader.read_up_to(offset, self.cluster_size)?;
            let short_read = chunk.len() < self.cluster_size;
            if !chunk.is_empty() {
                data.extend_from_slice(&chunk);
                clusters_read += 1;
            }

            if short_read {
                break Some(self.truncated(start, current, format!(
                    "image ends inside the cluster at offset {:#x}",
                    offset
                )));
            }

            current = pointer as usize;
        };

        if let Some(reason) = &interruption {
            warn!("{}", reason);
        }

        let raw_length = data.len() as u64;
        if self.trim_padding {
            trim_trailing_zeros(&mut data);
        }

        debug!(
            "Cluster {}: {} clusters, {} bytes ({} after trim), starts with {}",
            start,
            clusters_read,
            raw_length,
            data.len(),
            hex::encode(&data[..data.len().min(PREVIEW_BYTES)])
        );

        Ok(Extraction {
            file: RecoveredFile {
                start_cluster: start,
                clusters_read,
                raw_length,
                data,
            },
            interruption,
        })
    }

    fn truncated(&self, start: usize, cluster: usize, reason: String) -> CarveError {
        CarveError::ChainTraversalTruncated { start, cluster, reason }
    }
}

/// Drop trailing zero bytes; an all-zero buffer becomes empty
pub fn trim_trailing_zeros(data: &mut Vec<u8>) {
    let keep = data.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
    data.truncate(keep);
}
