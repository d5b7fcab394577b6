// Image access for the carving pipeline
// Every worker opens its own handle so reads never share a file position

use fatcarve_core::CarveError;
use log::debug;
use std::fs::File;
use std::io::{Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

/// Something that can hand out independent readers over a volume image
pub trait ImageSource: Sync {
    type Reader: Read + Seek;

    /// Open a fresh handle positioned at the start of the image
    fn open(&self) -> Result<Self::Reader, CarveError>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

/// Image stored in a file on disk
#[derive(Debug, Clone)]
pub struct FileImage {
    path: PathBuf,
}

impl FileImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for FileImage {
    type Reader = File;

    fn open(&self) -> Result<File, CarveError> {
        debug!("Opening image handle on {}", self.path.display());
        Ok(File::open(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Image held in memory
#[derive(Debug, Clone)]
pub struct MemoryImage {
    bytes: Arc<[u8]>,
}

impl MemoryImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { bytes: bytes.into() }
    }
}

impl ImageSource for MemoryImage {
    type Reader = Cursor<Arc<[u8]>>;

    fn open(&self) -> Result<Self::Reader, CarveError> {
        Ok(Cursor::new(Arc::clone(&self.bytes)))
    }

    fn describe(&self) -> String {
        format!("in-memory image ({} bytes)", self.bytes.len())
    }
}

/// Positioned reads over one image handle
pub struct ImageReader<R: Read + Seek> {
    inner: R,
}

impl<R: Read + Seek> ImageReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read exactly `len` bytes at `offset`, failing with `TruncatedImage` on a short image
    pub fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, CarveError> {
        let data = self.read_up_to(offset, len)?;
        if data.len() < len {
            return Err(CarveError::TruncatedImage {
                offset,
                wanted: len as u64,
                available: data.len() as u64,
            });
        }
        Ok(data)
    }

    /// Read at most `len` bytes at `offset`; fewer are returned only at end of image
    pub fn read_up_to(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, CarveError> {
        self.inner.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.inner.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        buffer.truncate(filled);
        Ok(buffer)
    }
}
