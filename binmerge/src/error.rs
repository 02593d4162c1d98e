//! Error types for image merging

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type used throughout binmerge
pub type Result<T> = std::result::Result<T, MergeError>;

/// Errors raised while resolving manifests or composing an image
#[derive(Debug, Error)]
pub enum MergeError {
    /// A segment's source could not be opened or read
    #[error("failed to read segment '{}': {source}", .path.display())]
    SourceUnreadable { path: PathBuf, source: io::Error },

    /// The segment starts before the end of the data already placed
    #[error(
        "segment '{}' at offset 0x{offset:x} overlaps data ending at 0x{position:x}",
        .path.display()
    )]
    OffsetOrdering {
        path: PathBuf,
        offset: u64,
        position: u64,
    },

    /// The segment would end past the largest image that can be built
    #[error(
        "segment '{}' at offset 0x{offset:x} with {length} bytes exceeds the 0x{max:x} byte image limit",
        .path.display()
    )]
    ImageTooLarge {
        path: PathBuf,
        offset: u64,
        length: u64,
        max: u64,
    },

    /// The output image could not be created or written
    #[error("failed to write image '{}': {source}", .path.display())]
    DestinationUnwritable { path: PathBuf, source: io::Error },

    #[error("failed to read manifest '{}': {source}", .path.display())]
    ManifestUnreadable { path: PathBuf, source: io::Error },

    #[error("invalid manifest '{}': {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("manifest '{}' has no '{entry}' entry", .path.display())]
    MissingEntry { path: PathBuf, entry: String },

    #[error("invalid offset '{value}'")]
    InvalidOffset { value: String },

    #[error("unsupported build system '{name}'")]
    UnsupportedBuildSystem { name: String },

    #[error("cannot translate path '{path}': {reason}")]
    PathTranslation { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl MergeError {
    pub fn source_unreadable(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::SourceUnreadable {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn destination_unwritable(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::DestinationUnwritable {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid_manifest(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn invalid_offset(value: impl Into<String>) -> Self {
        Self::InvalidOffset {
            value: value.into(),
        }
    }
}
