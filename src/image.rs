//! Image buffer handling
//!
//! An [`Image`] holds the entire disk image as one contiguous byte buffer.
//! Read-only operations (list, extract, locate) map the file with `memmap2`;
//! patching loads an owned copy because the mutated buffer is rewritten to
//! disk as a whole.

use crate::codec;
use crate::error::{DisketteError, Result};
use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fixed block size of the image format, in bytes.
pub const BLOCK_SIZE: usize = 512;

#[derive(Debug)]
enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// A whole disk image, either memory-mapped read-only or owned in memory.
#[derive(Debug)]
pub struct Image {
    bytes: Backing,
    path: PathBuf,
}

impl Image {
    /// Map an image file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // Safety: the mapping is private to this process and never outlives
        // the Image that owns it.
        let map = unsafe { Mmap::map(&file)? };

        let image = Image {
            bytes: Backing::Mapped(map),
            path: path.as_ref().to_path_buf(),
        };
        image.validate()?;
        Ok(image)
    }

    /// Read an image file into an owned, mutable buffer.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(&path)?;

        let image = Image {
            bytes: Backing::Owned(bytes),
            path: path.as_ref().to_path_buf(),
        };
        image.validate()?;
        Ok(image)
    }

    /// Wrap an in-memory buffer (builder output, test fixtures).
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self> {
        let image = Image {
            bytes: Backing::Owned(bytes),
            path: PathBuf::new(),
        };
        image.validate()?;
        Ok(image)
    }

    fn validate(&self) -> Result<()> {
        let bytes = self.as_bytes();
        if bytes.len() < 2 * BLOCK_SIZE {
            return Err(DisketteError::Truncated {
                expected: 2 * BLOCK_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[..codec::MAGIC.len()] != codec::MAGIC {
            return Err(DisketteError::InvalidMagic);
        }
        codec::root_block(self)?;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.bytes {
            Backing::Mapped(map) => map,
            Backing::Owned(vec) => vec,
        }
    }

    /// Mutable view of the buffer. Fails on a read-only mapping; callers that
    /// intend to patch must construct the image with [`Image::load`].
    pub fn as_bytes_mut(&mut self) -> Result<&mut [u8]> {
        match &mut self.bytes {
            Backing::Mapped(_) => Err(DisketteError::ReadOnlyImage),
            Backing::Owned(vec) => Ok(vec),
        }
    }

    /// Number of whole blocks in the image. A trailing partial block is not
    /// addressable.
    pub fn block_count(&self) -> usize {
        self.as_bytes().len() / BLOCK_SIZE
    }

    /// Path the image was opened from; empty for in-memory images.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the full buffer to `path`. The write is all-or-nothing from
    /// the caller's point of view: any short write surfaces as an I/O error.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        file.write_all(self.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }
}
