// Output sinks for recovered files and the FAT diagnostic dump

use fatcarve_core::CarveError;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::fat16::{ClusterPointerTable, RecoveredFile};

/// Destination for everything a run produces
pub trait RecoverySink: Sync {
    /// Persist one recovered file, returning where it went if it has a path
    fn persist_file(&self, file: &RecoveredFile) -> Result<Option<PathBuf>, CarveError>;

    /// Persist the decoded table, returning where it went if it was written
    fn persist_table(&self, table: &ClusterPointerTable) -> Result<Option<PathBuf>, CarveError>;
}

/// Writes `recovered_file_<start>.dat` files into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
    table_dump: Option<PathBuf>,
}

impl DirectorySink {
    /// Create the output directory if needed
    pub fn create(directory: impl Into<PathBuf>) -> Result<Self, CarveError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|source| CarveError::OutputWriteFailure {
            target: directory.clone(),
            source,
        })?;
        info!("Writing recovered files to {}", directory.display());

        Ok(Self {
            directory,
            table_dump: None,
        })
    }

    /// Also write the decoded table, one decimal value per line, to `path`
    pub fn with_table_dump(mut self, path: impl Into<PathBuf>) -> Self {
        self.table_dump = Some(path.into());
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl RecoverySink for DirectorySink {
    fn persist_file(&self, file: &RecoveredFile) -> Result<Option<PathBuf>, CarveError> {
        let path = self.directory.join(file.file_name());
        fs::write(&path, &file.data).map_err(|source| CarveError::OutputWriteFailure {
            target: path.clone(),
            source,
        })?;
        debug!("Wrote {} bytes to {}", file.data.len(), path.display());
        Ok(Some(path))
    }

    fn persist_table(&self, table: &ClusterPointerTable) -> Result<Option<PathBuf>, CarveError> {
        let Some(path) = &self.table_dump else {
            return Ok(None);
        };

        write_table_dump(path, table).map_err(|source| CarveError::OutputWriteFailure {
            target: path.clone(),
            source,
        })?;
        info!("Wrote {} FAT entries to {}", table.len(), path.display());
        Ok(Some(path.clone()))
    }
}

fn write_table_dump(path: &Path, table: &ClusterPointerTable) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for value in table.entries() {
        writeln!(out, "{}", value)?;
    }
    out.flush()
}

/// Keeps recovered files in memory, keyed by start cluster
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<BTreeMap<usize, Vec<u8>>>,
    table: Mutex<Option<Vec<u16>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recovered files
    pub fn files(&self) -> BTreeMap<usize, Vec<u8>> {
        // A panicking writer cannot leave the map half-updated, so poisoned data is still valid
        self.files.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn table(&self) -> Option<Vec<u16>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RecoverySink for MemorySink {
    fn persist_file(&self, file: &RecoveredFile) -> Result<Option<PathBuf>, CarveError> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.insert(file.start_cluster, file.data.clone());
        Ok(None)
    }

    fn persist_table(&self, table: &ClusterPointerTable) -> Result<Option<PathBuf>, CarveError> {
        let mut stored = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        *stored = Some(table.entries().to_vec());
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recovered(start: usize, data: &[u8]) -> RecoveredFile {
        RecoveredFile {
            start_cluster: start,
            clusters_read: 1,
            raw_length: data.len() as u64,
            data: data.to_vec(),
        }
    }

    #[test]
    fn test_directory_sink_names_files_by_start_cluster() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::create(dir.path().join("out")).unwrap();

        let path = sink.persist_file(&recovered(42, b"hello")).unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), "recovered_file_42.dat");
        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_table_dump_is_decimal_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("fat.txt");
        let sink = DirectorySink::create(dir.path()).unwrap().with_table_dump(&dump);

        let table = ClusterPointerTable::from(vec![65528, 65535, 3, 0]);
        assert_eq!(sink.persist_table(&table).unwrap(), Some(dump.clone()));
        assert_eq!(fs::read_to_string(&dump).unwrap(), "65528\n65535\n3\n0\n");
    }

    #[test]
    fn test_table_dump_skipped_without_path() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::create(dir.path()).unwrap();
        assert_eq!(sink.persist_table(&ClusterPointerTable::from(vec![1])).unwrap(), None);
    }

    #[test]
    fn test_unwritable_dump_is_output_failure() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::create(dir.path())
            .unwrap()
            .with_table_dump(dir.path().join("missing").join("fat.txt"));

        assert!(matches!(
            sink.persist_table(&ClusterPointerTable::from(vec![1])),
            Err(CarveError::OutputWriteFailure { .. })
        ));
    }

    #[test]
    fn test_memory_sink_keeps_files() {
        let sink = MemorySink::new();
        sink.persist_file(&recovered(7, &[1, 2])).unwrap();
        sink.persist_file(&recovered(3, &[])).unwrap();

        let files = sink.files();
        assert_eq!(files.keys().copied().collect::<Vec<_>>(), vec![3, 7]);
        assert_eq!(files[&7], vec![1, 2]);
    }

    #[test]
    fn test_memory_sink_survives_poisoned_lock() {
        let sink = std::sync::Arc::new(MemorySink::new());
        sink.persist_file(&recovered(2, b"before")).unwrap();

        let poisoner = std::sync::Arc::clone(&sink);
        let result = std::thread::spawn(move || {
            let _files = poisoner.files.lock().unwrap();
            panic!("writer died while holding the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(sink.files.is_poisoned());

        assert_eq!(sink.files()[&2], b"before".to_vec());
        sink.persist_file(&recovered(9, b"after")).unwrap();
        sink.persist_table(&ClusterPointerTable::from(vec![0xFFF8, 0xFFFF])).unwrap();
        assert_eq!(sink.files().len(), 2);
        assert_eq!(sink.table(), Some(vec![0xFFF8, 0xFFFF]));
    }
}
