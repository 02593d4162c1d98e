//! Image composer
//!
//! Places every segment at its absolute offset and fills the gaps between
//! them with [`PAD_BYTE`]. All sources are read and checked before anything
//! is written, so a failing segment never leaves a partial image behind.

use crate::PAD_BYTE;
use crate::error::{MergeError, Result};
use crate::segment::SegmentSet;
use crate::source::{FsLoader, SourceLoader};
use byte_unit::{Byte, UnitType};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Largest image that will be built, the whole 32-bit flash address space
pub const MAX_IMAGE_SIZE: u64 = 1 << 32;

fn image_limit() -> u64 {
    MAX_IMAGE_SIZE.min(usize::MAX as u64)
}

/// Where one segment ended up in the composed image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub offset: u64,
    /// Padding bytes inserted right before this segment
    pub fill: u64,
    pub length: u64,
    pub source: PathBuf,
}

impl Placement {
    /// First byte past the segment
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }
}

/// Placement of every segment, in ascending offset order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageLayout {
    placements: Vec<Placement>,
}

impl ImageLayout {
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Size of the composed image in bytes
    pub fn total_size(&self) -> u64 {
        self.placements.last().map(Placement::end).unwrap_or(0)
    }

    /// Padding bytes across the whole image
    pub fn total_fill(&self) -> u64 {
        self.placements.iter().map(|p| p.fill).sum()
    }

    pub fn print_info(&self) {
        println!("{:<12} {:<12} {:<12} File", "Offset", "Fill", "Length");
        for p in &self.placements {
            println!(
                "{:<12} {:<12} {:<12} {}",
                format!("0x{:x}", p.offset),
                p.fill,
                p.length,
                p.source.display()
            );
        }
        println!(
            "Image size: {} ({} bytes, {} padding)",
            human_size(self.total_size()),
            self.total_size(),
            self.total_fill()
        );
    }
}

/// A fully assembled image together with its layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedImage {
    pub data: Vec<u8>,
    pub layout: ImageLayout,
}

/// Merges segments into a single flashable image
pub struct ImageComposer {
    loader: Box<dyn SourceLoader>,
}

impl ImageComposer {
    /// Composer reading segments from the filesystem
    pub fn new() -> Self {
        Self::with_loader(Box::new(FsLoader))
    }

    pub fn with_loader(loader: Box<dyn SourceLoader>) -> Self {
        Self { loader }
    }

    /// Read every segment in offset order and work out its padding.
    fn load(&self, segments: &SegmentSet) -> Result<Vec<(Placement, Vec<u8>)>> {
        let mut loaded = Vec::with_capacity(segments.len());
        let mut pos: u64 = 0;

        for segment in segments.sorted() {
            info!(
                "file: {} offset: 0x{:x}",
                segment.source.display(),
                segment.offset
            );

            if segment.offset < pos {
                return Err(MergeError::OffsetOrdering {
                    path: segment.source.clone(),
                    offset: segment.offset,
                    position: pos,
                });
            }
            let fill = segment.offset - pos;

            let content = self
                .loader
                .read(&segment.source)
                .map_err(|e| MergeError::source_unreadable(&segment.source, e))?;
            let length = content.len() as u64;
            let end = segment
                .offset
                .checked_add(length)
                .filter(|&end| end <= image_limit())
                .ok_or_else(|| MergeError::ImageTooLarge {
                    path: segment.source.clone(),
                    offset: segment.offset,
                    length,
                    max: image_limit(),
                })?;

            debug!(
                "{} bytes from {} loader, {} bytes of padding before it",
                length,
                self.loader.name(),
                fill
            );

            pos = end;
            loaded.push((
                Placement {
                    offset: segment.offset,
                    fill,
                    length,
                    source: segment.source.clone(),
                },
                content,
            ));
        }

        Ok(loaded)
    }

    /// Compose the image in memory.
    ///
    /// Segment ends were bounded by [`MAX_IMAGE_SIZE`] and `usize` while
    /// loading, so the casts below cannot truncate.
    pub fn compose(&self, segments: &SegmentSet) -> Result<ComposedImage> {
        let loaded = self.load(segments)?;
        let total = loaded.last().map(|(p, _)| p.end()).unwrap_or(0);

        let mut data = Vec::with_capacity(total as usize);
        let mut placements = Vec::with_capacity(loaded.len());
        for (placement, content) in loaded {
            data.resize(placement.offset as usize, PAD_BYTE);
            data.extend_from_slice(&content);
            placements.push(placement);
        }

        Ok(ComposedImage {
            data,
            layout: ImageLayout { placements },
        })
    }

    /// Compose the image and stream it to a writer in offset order
    pub fn compose_to_writer<W: Write>(
        &self,
        segments: &SegmentSet,
        writer: &mut W,
    ) -> Result<ImageLayout> {
        let loaded = self.load(segments)?;

        let mut placements = Vec::with_capacity(loaded.len());
        for (placement, content) in loaded {
            io::copy(&mut io::repeat(PAD_BYTE).take(placement.fill), writer)?;
            writer.write_all(&content)?;
            placements.push(placement);
        }
        writer.flush()?;

        Ok(ImageLayout { placements })
    }

    /// Compose the image and write it to `path`.
    ///
    /// The image goes to a temporary file next to `path` first and is
    /// renamed over it once fully written; an existing file at `path` is
    /// left untouched on failure.
    pub fn compose_to_file<P: AsRef<Path>>(
        &self,
        segments: &SegmentSet,
        path: P,
    ) -> Result<ImageLayout> {
        let path = path.as_ref();
        let image = self.compose(segments)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file =
            NamedTempFile::new_in(dir).map_err(|e| MergeError::destination_unwritable(path, e))?;
        write_synced(&mut file, &image.data)
            .map_err(|e| MergeError::destination_unwritable(path, e))?;
        file.persist(path)
            .map_err(|e| MergeError::destination_unwritable(path, e.error))?;

        info!(
            "wrote {} bytes to {}",
            image.layout.total_size(),
            path.display()
        );

        Ok(image.layout)
    }
}

impl Default for ImageComposer {
    fn default() -> Self {
        Self::new()
    }
}

fn write_synced(file: &mut NamedTempFile, data: &[u8]) -> io::Result<()> {
    file.write_all(data)?;
    file.flush()?;
    file.as_file().sync_all()
}

/// Render a byte count with a binary unit, e.g. `1.50 MiB`
pub fn human_size(bytes: u64) -> String {
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{adjusted:.2}")
}
