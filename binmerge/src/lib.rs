//! # binmerge
//!
//! Merges firmware partition binaries into one contiguous image that can be
//! flashed in a single write.
//!
//! Each input binary is placed at its absolute flash offset. Gaps between
//! binaries are filled with [`PAD_BYTE`], the erased state of NOR flash.
//! Segment lists come either from the caller or from a build system's flasher
//! manifest (see [`manifest`]).
//!
//! ## Example
//!
//! ```rust
//! use binmerge::{ImageComposer, MemoryLoader, SegmentSet};
//!
//! let loader = MemoryLoader::new()
//!     .with_file("bootloader.bin", b"XY".to_vec())
//!     .with_file("app.bin", b"AB".to_vec());
//! let segments = SegmentSet::new()
//!     .segment(0x10, "app.bin")
//!     .segment(0x0, "bootloader.bin");
//!
//! let image = ImageComposer::with_loader(Box::new(loader)).compose(&segments)?;
//! assert_eq!(image.data.len(), 0x12);
//! assert_eq!(&image.data[0x10..], b"AB");
//! # Ok::<(), binmerge::MergeError>(())
//! ```

#[macro_use]
extern crate log;

pub mod cli;
pub mod composer;
pub mod error;
pub mod manifest;
pub mod segment;
pub mod source;

// Re-export main types for convenience
pub use composer::{ComposedImage, ImageComposer, ImageLayout, MAX_IMAGE_SIZE, Placement};
pub use error::{MergeError, Result};
pub use manifest::{BuildSystem, ManifestResolver, resolve_segments};
pub use segment::{Segment, SegmentSet, parse_offset};
pub use source::{FsLoader, MemoryLoader, SourceLoader};

/// Current version of binmerge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Byte written into every gap between segments
pub const PAD_BYTE: u8 = 0xFF;
