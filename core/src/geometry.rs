use crate::CarveError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const MAX_BYTES_PER_SECTOR: u32 = 4096;
const MAX_SECTORS_PER_CLUSTER: u32 = 128;

/// Fixed FAT16 volume geometry supplied by the caller instead of a boot sector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fat16Geometry {
    pub bytes_per_sector: u32,
    pub sectors_per_cluster: u32,
    /// Carried for reporting; the image is expected to start at the first FAT.
    pub reserved_sector_count: u32,
    pub fat_count: u32,
    pub fat_size_sectors: u32,
    pub root_entry_count: u32,
}

impl Default for Fat16Geometry {
    fn default() -> Self {
        Self {
            bytes_per_sector: 512,
            sectors_per_cluster: 4,
            reserved_sector_count: 1,
            fat_count: 2,
            fat_size_sectors: 115,
            root_entry_count: 512,
        }
    }
}

impl Fat16Geometry {
    /// Load a geometry from a JSON file, missing fields take the defaults
    pub fn from_json_file(path: &Path) -> Result<Self, CarveError> {
        let raw = std::fs::read_to_string(path)?;
        let geometry: Fat16Geometry = serde_json::from_str(&raw)?;
        debug!("Loaded geometry from {}: {:?}", path.display(), geometry);
        geometry.validate()?;
        Ok(geometry)
    }

    /// Every field must be positive and fit the range its BPB field allows
    pub fn validate(&self) -> Result<(), CarveError> {
        let fields = [
            ("bytes_per_sector", self.bytes_per_sector, MAX_BYTES_PER_SECTOR),
            ("sectors_per_cluster", self.sectors_per_cluster, MAX_SECTORS_PER_CLUSTER),
            ("reserved_sector_count", self.reserved_sector_count, u16::MAX as u32),
            ("fat_count", self.fat_count, u8::MAX as u32),
            ("fat_size_sectors", self.fat_size_sectors, u16::MAX as u32),
            ("root_entry_count", self.root_entry_count, u16::MAX as u32),
        ];

        for (name, value, max) in fields {
            if value == 0 {
                return Err(CarveError::Configuration(format!("{} must be positive", name)));
            }
            if value > max {
                return Err(CarveError::Configuration(format!(
                    "{} is {}, at most {} is supported",
                    name, value, max
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_geometry_is_valid() {
        assert!(Fat16Geometry::default().validate().is_ok());
    }

    #[test]
    fn test_zero_field_rejected() {
        let geometry = Fat16Geometry { sectors_per_cluster: 0, ..Default::default() };
        match geometry.validate() {
            Err(CarveError::Configuration(msg)) => assert!(msg.contains("sectors_per_cluster")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_fields_rejected() {
        let huge_cluster = Fat16Geometry { sectors_per_cluster: u32::MAX, ..Default::default() };
        match huge_cluster.validate() {
            Err(CarveError::Configuration(msg)) => assert!(msg.contains("sectors_per_cluster")),
            other => panic!("expected configuration error, got {:?}", other),
        }

        let big_sector = Fat16Geometry { bytes_per_sector: 8192, ..Default::default() };
        assert!(matches!(big_sector.validate(), Err(CarveError::Configuration(_))));

        let big_fat = Fat16Geometry { fat_size_sectors: 0x10000, ..Default::default() };
        assert!(matches!(big_fat.validate(), Err(CarveError::Configuration(_))));

        let largest = Fat16Geometry {
            bytes_per_sector: 4096,
            sectors_per_cluster: 128,
            fat_size_sectors: 0xFFFF,
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_oversized_json_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sectors_per_cluster": 4294967295 }}"#).unwrap();

        let result = Fat16Geometry::from_json_file(file.path());
        assert!(matches!(result, Err(CarveError::Configuration(_))));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sectors_per_cluster": 8, "fat_size_sectors": 32 }}"#).unwrap();

        let geometry = Fat16Geometry::from_json_file(file.path()).unwrap();
        assert_eq!(geometry.sectors_per_cluster, 8);
        assert_eq!(geometry.fat_size_sectors, 32);
        assert_eq!(geometry.bytes_per_sector, 512);
        assert_eq!(geometry.fat_count, 2);
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = Fat16Geometry::from_json_file(file.path());
        assert!(matches!(result, Err(CarveError::SerializationError(_))));
    }
}
