//! Byte sources the composer reads segment content from

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Reads the full content of a named segment source.
///
/// The composer calls [`SourceLoader::read`] exactly once per segment.
pub trait SourceLoader {
    fn read(&self, source: &Path) -> io::Result<Vec<u8>>;

    /// Loader name, used in log output
    fn name(&self) -> &'static str;
}

/// Loads segments from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn read(&self, source: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(source)
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

/// Serves segments from memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), data.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn read(&self, source: &Path) -> io::Result<Vec<u8>> {
        self.files.get(source).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such source: {}", source.display()),
            )
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
