//! Hand-written `binmerge.toml`
//!
//! ```toml
//! [[segment]]
//! offset = "0x1000"
//! file = "bootloader.bin"
//!
//! [[segment]]
//! offset = 0x10000
//! file = "app.bin"
//! ```

use super::{ManifestResolver, RawOffset, read_manifest};
use crate::error::{MergeError, Result};
use crate::segment::{Segment, SegmentSet};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const MANIFEST_NAME: &str = "binmerge.toml";

#[derive(Debug, Deserialize)]
struct CustomManifest {
    #[serde(default, rename = "segment")]
    segments: Vec<SegmentEntry>,
}

#[derive(Debug, Deserialize)]
struct SegmentEntry {
    offset: RawOffset,
    file: PathBuf,
}

/// Files are relative to the build directory
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomResolver;

impl ManifestResolver for CustomResolver {
    fn manifest_path(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(MANIFEST_NAME)
    }

    fn resolve(&self, build_dir: &Path) -> Result<SegmentSet> {
        let path = self.manifest_path(build_dir);
        let content = read_manifest(&path)?;
        let manifest: CustomManifest = toml::from_str(&content)
            .map_err(|e| MergeError::invalid_manifest(&path, e.to_string()))?;

        manifest
            .segments
            .into_iter()
            .map(|entry| -> Result<Segment> {
                Ok(Segment::new(
                    entry.offset.value()?,
                    build_dir.join(entry.file),
                ))
            })
            .collect()
    }
}
