//! `flasher_args` written by legacy make builds
//!
//! The file is the tail of an esptool command line, e.g.
//! `--flash_mode dio --flash_freq 40m 0x1000 build/bootloader/bootloader.bin
//! 0x10000 build/app.bin`. Every hex token starts an `offset file` pair;
//! everything else is a flag and is skipped.

use super::{ManifestResolver, read_manifest};
use crate::error::Result;
use crate::segment::{Segment, SegmentSet, parse_offset};
use std::path::{Path, PathBuf};

pub const MANIFEST_NAME: &str = "flasher_args";

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeResolver;

impl ManifestResolver for MakeResolver {
    fn manifest_path(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(MANIFEST_NAME)
    }

    fn resolve(&self, build_dir: &Path) -> Result<SegmentSet> {
        let path = self.manifest_path(build_dir);
        let content = read_manifest(&path)?;

        let mut segments = SegmentSet::new();
        for (offset, file) in parse_flasher_args(&content) {
            segments.push(Segment::new(offset, host_path(file)?));
        }
        Ok(segments)
    }
}

/// Pair every offset token with the token that follows it.
///
/// A trailing offset without a file is dropped.
pub fn parse_flasher_args(content: &str) -> Vec<(u64, &str)> {
    let mut pairs = Vec::new();
    let mut tokens = content.split_whitespace();

    while let Some(token) = tokens.next() {
        let Ok(offset) = parse_offset(token) else {
            continue;
        };
        match tokens.next() {
            Some(file) => pairs.push((offset, file)),
            None => warn!("offset {} has no file, ignored", token),
        }
    }

    pairs
}

/// Paths in the manifest come from the MSYS shell that ran make.
#[cfg(target_os = "windows")]
fn host_path(raw: &str) -> Result<PathBuf> {
    use crate::error::MergeError;
    use std::process::Command;

    let output = Command::new("cygpath")
        .args(["-m", raw])
        .output()
        .map_err(|e| MergeError::PathTranslation {
            path: raw.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(MergeError::PathTranslation {
            path: raw.to_string(),
            reason: format!("cygpath failed with status: {}", output.status),
        });
    }

    let translated = String::from_utf8_lossy(&output.stdout);
    Ok(PathBuf::from(translated.trim_end_matches(['\r', '\n'])))
}

#[cfg(not(target_os = "windows"))]
fn host_path(raw: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(raw))
}
