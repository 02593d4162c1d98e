//! `flasher_args.json` written by CMake builds

use super::{ManifestResolver, RawOffset, read_manifest};
use crate::error::{MergeError, Result};
use crate::segment::{Segment, SegmentSet};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const MANIFEST_NAME: &str = "flasher_args.json";

#[derive(Debug, Deserialize)]
struct FlashEntry {
    offset: RawOffset,
    file: String,
}

// Newer toolchains spell the partition table key with a dash. When both
// spellings are present the underscore one wins.
#[derive(Debug, Deserialize)]
struct FlasherArgs {
    partition_table: Option<FlashEntry>,
    #[serde(rename = "partition-table")]
    partition_table_dash: Option<FlashEntry>,
    app: Option<FlashEntry>,
    bootloader: Option<FlashEntry>,
}

/// Reads the partition table, app and bootloader entries.
///
/// File paths in the manifest are relative to the build directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmakeResolver;

impl ManifestResolver for CmakeResolver {
    fn manifest_path(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(MANIFEST_NAME)
    }

    fn resolve(&self, build_dir: &Path) -> Result<SegmentSet> {
        let path = self.manifest_path(build_dir);
        let content = read_manifest(&path)?;
        let args: FlasherArgs = serde_json::from_str(&content)
            .map_err(|e| MergeError::invalid_manifest(&path, e.to_string()))?;

        let entries = [
            (
                "partition_table",
                args.partition_table.or(args.partition_table_dash),
            ),
            ("app", args.app),
            ("bootloader", args.bootloader),
        ];

        let mut segments = SegmentSet::new();
        for (name, entry) in entries {
            let entry = entry.ok_or_else(|| MergeError::MissingEntry {
                path: path.clone(),
                entry: name.to_string(),
            })?;
            let offset = entry.offset.value()?;
            segments.push(Segment::new(offset, build_dir.join(&entry.file)));
        }

        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn resolve_json(json: &str) -> Result<SegmentSet> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_NAME), json).unwrap();
        CmakeResolver.resolve(dir.path())
    }

    #[test]
    fn test_resolve_idf_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{
            "write_flash_args": ["--flash_mode", "dio", "--flash_size", "4MB"],
            "flash_files": {"0x1000": "bootloader/bootloader.bin"},
            "bootloader": {"offset": "0x1000", "file": "bootloader/bootloader.bin", "encrypted": "false"},
            "app": {"offset": "0x10000", "file": "firmware.bin", "encrypted": "false"},
            "partition-table": {"offset": "0x8000", "file": "partition_table/partition-table.bin", "encrypted": "false"}
        }"#;
        fs::write(dir.path().join(MANIFEST_NAME), json).unwrap();

        let segments = CmakeResolver.resolve(dir.path()).unwrap();
        let sorted: Vec<(u64, PathBuf)> = segments
            .sorted()
            .into_iter()
            .map(|s| (s.offset, s.source.clone()))
            .collect();

        assert_eq!(
            sorted,
            vec![
                (0x1000, dir.path().join("bootloader/bootloader.bin")),
                (0x8000, dir.path().join("partition_table/partition-table.bin")),
                (0x10000, dir.path().join("firmware.bin")),
            ]
        );
    }

    #[test]
    fn test_underscore_partition_key() {
        let segments = resolve_json(
            r#"{
                "partition_table": {"offset": "8000", "file": "pt.bin"},
                "app": {"offset": 65536, "file": "app.bin"},
                "bootloader": {"offset": "0x1000", "file": "bl.bin"}
            }"#,
        )
        .unwrap();

        let offsets: Vec<u64> = segments.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0x8000, 0x10000, 0x1000]);
    }

    #[test]
    fn test_both_partition_keys_prefer_underscore() {
        let segments = resolve_json(
            r#"{
                "partition_table": {"offset": "0x8000", "file": "pt.bin"},
                "partition-table": {"offset": "0x9000", "file": "pt-dash.bin"},
                "app": {"offset": "0x10000", "file": "app.bin"},
                "bootloader": {"offset": "0x1000", "file": "bl.bin"}
            }"#,
        )
        .unwrap();

        let first = segments.iter().next().unwrap();
        assert_eq!(first.offset, 0x8000);
        assert!(first.source.ends_with("pt.bin"));
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_missing_app_entry() {
        let err = resolve_json(
            r#"{
                "partition_table": {"offset": "0x8000", "file": "pt.bin"},
                "bootloader": {"offset": "0x1000", "file": "bl.bin"}
            }"#,
        )
        .unwrap_err();

        match err {
            MergeError::MissingEntry { entry, .. } => assert_eq!(entry, "app"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = resolve_json("{ not json").unwrap_err();
        assert!(matches!(err, MergeError::InvalidManifest { .. }));
    }

    #[test]
    fn test_bad_offset() {
        let err = resolve_json(
            r#"{
                "partition_table": {"offset": "zz", "file": "pt.bin"},
                "app": {"offset": "0x10000", "file": "app.bin"},
                "bootloader": {"offset": "0x1000", "file": "bl.bin"}
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::InvalidOffset { .. }));
    }
}
