//! Build-system manifest resolution
//!
//! Every build system describes its flash layout differently. A
//! [`ManifestResolver`] turns one of those descriptions into the canonical
//! [`SegmentSet`] the composer works on, so nothing downstream needs to know
//! which build system produced the binaries.

use crate::error::{MergeError, Result};
use crate::segment::{SegmentSet, parse_offset};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod cmake;
pub mod custom;
pub mod make;

pub use cmake::CmakeResolver;
pub use custom::CustomResolver;
pub use make::MakeResolver;

/// Resolves a build directory into the segments to merge
pub trait ManifestResolver {
    /// Location of the manifest this resolver reads
    fn manifest_path(&self, build_dir: &Path) -> PathBuf;

    fn resolve(&self, build_dir: &Path) -> Result<SegmentSet>;
}

/// Supported build systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildSystem {
    /// CMake builds, `flasher_args.json`
    #[default]
    Cmake,
    /// Legacy make builds, `flasher_args`
    Make,
    /// Hand-written `binmerge.toml`
    Custom,
}

impl BuildSystem {
    pub fn resolver(&self) -> Box<dyn ManifestResolver> {
        match self {
            Self::Cmake => Box::new(CmakeResolver),
            Self::Make => Box::new(MakeResolver),
            Self::Custom => Box::new(CustomResolver),
        }
    }
}

impl FromStr for BuildSystem {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cmake" => Ok(Self::Cmake),
            "make" => Ok(Self::Make),
            "custom" => Ok(Self::Custom),
            _ => Err(MergeError::UnsupportedBuildSystem {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cmake => "cmake",
            Self::Make => "make",
            Self::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// Resolve the segments of `build_dir` with the resolver for `build_system`
pub fn resolve_segments(build_system: BuildSystem, build_dir: &Path) -> Result<SegmentSet> {
    let resolver = build_system.resolver();
    debug!(
        "resolving {} manifest {}",
        build_system,
        resolver.manifest_path(build_dir).display()
    );
    resolver.resolve(build_dir)
}

/// Offset as written in a structured manifest: a hex string or a plain integer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawOffset {
    Int(u64),
    Text(String),
}

impl RawOffset {
    pub(crate) fn value(&self) -> Result<u64> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Text(s) => parse_offset(s),
        }
    }
}

pub(crate) fn read_manifest(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| MergeError::ManifestUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_system_from_str() {
        assert_eq!("cmake".parse::<BuildSystem>().unwrap(), BuildSystem::Cmake);
        assert_eq!("Make".parse::<BuildSystem>().unwrap(), BuildSystem::Make);
        assert_eq!("custom".parse::<BuildSystem>().unwrap(), BuildSystem::Custom);
        assert!(matches!(
            "scons".parse::<BuildSystem>(),
            Err(MergeError::UnsupportedBuildSystem { .. })
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for bs in [BuildSystem::Cmake, BuildSystem::Make, BuildSystem::Custom] {
            assert_eq!(bs.to_string().parse::<BuildSystem>().unwrap(), bs);
        }
    }

    #[test]
    fn test_raw_offset() {
        let text: RawOffset = serde_json::from_str("\"0x8000\"").unwrap();
        assert_eq!(text.value().unwrap(), 0x8000);

        let int: RawOffset = serde_json::from_str("4096").unwrap();
        assert_eq!(int.value().unwrap(), 4096);

        let bad: RawOffset = serde_json::from_str("\"boot\"").unwrap();
        assert!(bad.value().is_err());
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_segments(BuildSystem::Cmake, dir.path()).unwrap_err();
        assert!(matches!(err, MergeError::ManifestUnreadable { .. }));
    }
}
