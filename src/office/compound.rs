//! OLE2 compound file access

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use cfb::CompoundFile;

use crate::error::{ParseError, Result};

/// Signature of every compound file
pub const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Upper bound on the size of a stream read into memory
pub const MAX_STREAM_SIZE: u64 = 64 * 1024 * 1024;

pub struct CompoundDocument {
    file: CompoundFile<BufReader<File>>,
}

impl std::fmt::Debug for CompoundDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompoundDocument").finish_non_exhaustive()
    }
}

impl CompoundDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file = CompoundFile::open(BufReader::new(file))
            .map_err(|e| ParseError::Container(format!("compound file: {}", e)))?;
        Ok(Self { file })
    }

    pub fn has_stream(&self, path: &str) -> bool {
        self.file.is_stream(path)
    }

    pub fn has_storage(&self, path: &str) -> bool {
        self.file.is_storage(path)
    }

    /// Reads at most `limit` bytes of a stream
    pub fn read_stream(&mut self, path: &str, limit: u64) -> Result<Vec<u8>> {
        let stream = self
            .file
            .open_stream(path)
            .map_err(|e| ParseError::Container(format!("stream {}: {}", path, e)))?;
        let mut data = Vec::new();
        stream.take(limit).read_to_end(&mut data)?;
        Ok(data)
    }

    /// Reads a whole stream, failing when it is larger than [`MAX_STREAM_SIZE`]
    pub fn read_full_stream(&mut self, path: &str) -> Result<Vec<u8>> {
        let data = self.read_stream(path, MAX_STREAM_SIZE + 1)?;
        if data.len() as u64 > MAX_STREAM_SIZE {
            return Err(ParseError::Unsupported(format!("stream {} is too large", path)).into());
        }
        Ok(data)
    }

    /// Names of the storages directly below `path`
    pub fn child_storages(&self, path: &str) -> Result<Vec<String>> {
        let entries = self
            .file
            .read_storage(path)
            .map_err(|e| ParseError::Container(format!("storage {}: {}", path, e)))?;
        Ok(entries
            .filter(|entry| entry.is_storage())
            .map(|entry| entry.name().to_string())
            .collect())
    }

    /// Names of every entry directly below the root storage
    pub fn root_entries(&self) -> Vec<String> {
        self.file
            .read_root_storage()
            .map(|entry| entry.name().to_string())
            .collect()
    }
}
