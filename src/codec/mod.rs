//! Block codec
//!
//! Fixed-offset decoding of the on-image structures: the label block, entry
//! header blocks (files and directories) and data-block chains. All access
//! goes through 16-bit block identifiers; id `0` addresses the label block
//! and is never a valid entry.
//!
//! Layout (little-endian):
//!
//! ```text
//! Block 0 (label):      magic [4] | root id u16 | volume label [64]
//! Header block:         kind u8 | name [64] | size u32 | version u8 x3
//!                       | created u16+u8+u8 | modified ... | expires ...
//!                       | chain len u16 | chain ids u16 x len
//! Data block:           512 raw payload bytes
//! ```

pub mod name;

use crate::error::{DisketteError, Result};
use crate::image::{Image, BLOCK_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use name::{parse_name, sanitize_name, MAX_NAME_LEN, NAME_FIELD};

/// Handle addressing one block inside the image. `0` is the reserved
/// label-block sentinel, never a valid entry.
pub type BlockId = u16;

pub const MAGIC: [u8; 4] = *b"RDI\x01";

const ROOT_OFF: usize = 4;
const LABEL_OFF: usize = 6;

const KIND_OFF: usize = 0;
const NAME_OFF: usize = 1;
pub(crate) const SIZE_OFF: usize = 65;
pub(crate) const VERSION_OFF: usize = 69;
pub(crate) const CREATED_OFF: usize = 72;
pub(crate) const MODIFIED_OFF: usize = 76;
pub(crate) const EXPIRES_OFF: usize = 80;
pub(crate) const CHAIN_LEN_OFF: usize = 84;
pub(crate) const CHAIN_OFF: usize = 86;

/// Longest chain a header block can hold.
pub const MAX_CHAIN: usize = (BLOCK_SIZE - CHAIN_OFF) / 2;

pub(crate) const KIND_FILE: u8 = 0x01;
pub(crate) const KIND_DIR: u8 = 0x02;

/// Classification of an entry block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Three-component file version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Calendar date as stored in the image. Fields are displayed verbatim;
/// legacy images carry out-of-range values and the tool does not judge them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for ImageDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// Decoded per-entry metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Name with the type suffix stripped.
    pub basename: String,
    /// Type suffix (the part between tildes), empty when absent.
    pub type_suffix: String,
    /// Logical size in bytes; allocated chain capacity may be larger.
    pub size: u32,
    pub version: Version,
    pub created: ImageDate,
    pub modified: ImageDate,
    pub expires: ImageDate,
}

/// One resolved chain link: a byte span inside the image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Offset of the payload inside the image buffer.
    pub offset: usize,
    /// Usable bytes in this block.
    pub capacity: usize,
}

/// Bounds-checked view of one block. Id `0` and ids past the end of the
/// buffer are rejected.
fn block(image: &Image, id: BlockId) -> Result<&[u8]> {
    if id == 0 || (id as usize + 1) * BLOCK_SIZE > image.as_bytes().len() {
        return Err(DisketteError::InvalidBlock(id));
    }
    let start = id as usize * BLOCK_SIZE;
    Ok(&image.as_bytes()[start..start + BLOCK_SIZE])
}

fn read_u16(bytes: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([bytes[off], bytes[off + 1]])
}

fn read_u32(bytes: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

fn read_date(bytes: &[u8], off: usize) -> ImageDate {
    ImageDate {
        year: read_u16(bytes, off),
        month: bytes[off + 2],
        day: bytes[off + 3],
    }
}

/// Root directory block id from the label block.
pub fn root_block(image: &Image) -> Result<BlockId> {
    let root = read_u16(image.as_bytes(), ROOT_OFF);
    // Validate it addresses a block; the root must also decode as a
    // directory, but that is the walker's first step, not ours.
    block(image, root)?;
    Ok(root)
}

/// Volume label from the label block, trailing spaces trimmed.
pub fn volume_label(image: &Image) -> Result<String> {
    let field = &image.as_bytes()[LABEL_OFF..LABEL_OFF + NAME_FIELD];
    let label = name::decode_short_string(field).ok_or(DisketteError::NameDecode { block: 0 })?;
    Ok(label.trim_end_matches(' ').to_string())
}

/// Classify an entry block as file or directory.
pub fn classify(image: &Image, id: BlockId) -> Result<EntryKind> {
    let header = block(image, id)?;
    match header[KIND_OFF] {
        KIND_FILE => Ok(EntryKind::File),
        KIND_DIR => Ok(EntryKind::Directory),
        kind => Err(DisketteError::BadHeader {
            block: id,
            reason: format!("unknown entry kind {kind:#04x}"),
        }),
    }
}

/// Decoded raw name of an entry, type suffix included.
pub fn file_name(image: &Image, id: BlockId) -> Result<String> {
    let header = block(image, id)?;
    name::decode_short_string(&header[NAME_OFF..NAME_OFF + NAME_FIELD])
        .ok_or(DisketteError::NameDecode { block: id })
}

/// Full metadata of an entry (works for files and directories alike; a
/// directory's size is zero).
pub fn file_metadata(image: &Image, id: BlockId) -> Result<FileMetadata> {
    let raw = file_name(image, id)?;
    let (basename, type_suffix) = name::parse_name(&raw);

    let header = block(image, id)?;
    Ok(FileMetadata {
        basename: basename.to_string(),
        type_suffix: type_suffix.to_string(),
        size: read_u32(header, SIZE_OFF),
        version: Version {
            major: header[VERSION_OFF],
            minor: header[VERSION_OFF + 1],
            patch: header[VERSION_OFF + 2],
        },
        created: read_date(header, CREATED_OFF),
        modified: read_date(header, MODIFIED_OFF),
        expires: read_date(header, EXPIRES_OFF),
    })
}

/// Read and bounds-check the chain ids of a header block.
fn chain_ids(image: &Image, id: BlockId) -> Result<Vec<BlockId>> {
    let header = block(image, id)?;
    let len = read_u16(header, CHAIN_LEN_OFF) as usize;
    if len > MAX_CHAIN {
        return Err(DisketteError::BadHeader {
            block: id,
            reason: format!("chain length {len} exceeds {MAX_CHAIN}"),
        });
    }

    let mut ids = Vec::with_capacity(len);
    for i in 0..len {
        let child = read_u16(header, CHAIN_OFF + 2 * i);
        // Reject sentinel and out-of-range links up front so every consumer
        // sees a validated chain.
        block(image, child)?;
        ids.push(child);
    }
    Ok(ids)
}

/// Ordered children of a directory, in on-image order.
pub fn directory_children(image: &Image, id: BlockId) -> Result<Vec<BlockId>> {
    if classify(image, id)? != EntryKind::Directory {
        return Err(DisketteError::NotADirectory(id));
    }
    chain_ids(image, id)
}

/// Ordered data extents of a file. Total capacity is always >= the logical
/// size for a well-formed image; callers truncate at the logical size.
pub fn file_block_chain(image: &Image, id: BlockId) -> Result<Vec<Extent>> {
    if classify(image, id)? != EntryKind::File {
        return Err(DisketteError::BadHeader {
            block: id,
            reason: "entry is not a file".to_string(),
        });
    }

    let extents = chain_ids(image, id)?
        .into_iter()
        .map(|data_id| Extent {
            offset: data_id as usize * BLOCK_SIZE,
            capacity: BLOCK_SIZE,
        })
        .collect();
    Ok(extents)
}

/// Overwrite a file's content within its existing block chain.
///
/// Fails with `CapacityExceeded` (buffer untouched) when the new content does
/// not fit the allocated chain. On success the bytes are laid across the
/// chain in order, remaining slack is zero-filled and the stored logical size
/// is updated to the new length.
pub fn replace_file_content(image: &mut Image, id: BlockId, content: &[u8]) -> Result<()> {
    let extents = file_block_chain(image, id)?;
    let capacity: usize = extents.iter().map(|e| e.capacity).sum();
    if content.len() > capacity {
        return Err(DisketteError::CapacityExceeded {
            needed: content.len(),
            capacity,
        });
    }

    let header_off = id as usize * BLOCK_SIZE;
    let bytes = image.as_bytes_mut()?;

    let mut written = 0;
    for extent in &extents {
        let chunk = content.len().saturating_sub(written).min(extent.capacity);
        let dst = &mut bytes[extent.offset..extent.offset + extent.capacity];
        dst[..chunk].copy_from_slice(&content[written..written + chunk]);
        dst[chunk..].fill(0);
        written += chunk;
    }

    bytes[header_off + SIZE_OFF..header_off + SIZE_OFF + 4]
        .copy_from_slice(&(content.len() as u32).to_le_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ImageBuilder;

    fn two_level_image() -> Image {
        let mut builder = ImageBuilder::new("FIELDDISK  ");
        let root = builder.root();
        let sub = builder.add_dir(root, "Programs~Subject~");
        builder
            .file(root, "ReadMe~Text~", b"hello".to_vec())
            .version(1, 2, 3)
            .created(1983, 4, 22)
            .add();
        builder.file(sub, "Calc~Run~", vec![0xAA; 700]).add();
        Image::from_vec(builder.finish()).unwrap()
    }

    #[test]
    fn test_root_and_label() {
        let image = two_level_image();
        let root = root_block(&image).unwrap();
        assert_ne!(root, 0);
        assert_eq!(classify(&image, root).unwrap(), EntryKind::Directory);
        assert_eq!(volume_label(&image).unwrap(), "FIELDDISK");
    }

    #[test]
    fn test_directory_children_in_image_order() {
        let image = two_level_image();
        let root = root_block(&image).unwrap();
        let children = directory_children(&image, root).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(classify(&image, children[0]).unwrap(), EntryKind::Directory);
        assert_eq!(classify(&image, children[1]).unwrap(), EntryKind::File);
    }

    #[test]
    fn test_children_of_file_rejected() {
        let image = two_level_image();
        let root = root_block(&image).unwrap();
        let file = directory_children(&image, root).unwrap()[1];
        assert!(matches!(
            directory_children(&image, file).unwrap_err(),
            DisketteError::NotADirectory(_)
        ));
    }

    #[test]
    fn test_metadata_fields() {
        let image = two_level_image();
        let root = root_block(&image).unwrap();
        let file = directory_children(&image, root).unwrap()[1];

        let meta = file_metadata(&image, file).unwrap();
        assert_eq!(meta.basename, "ReadMe");
        assert_eq!(meta.type_suffix, "Text");
        assert_eq!(meta.size, 5);
        assert_eq!(meta.version.to_string(), "1.2.3");
        assert_eq!(meta.created.to_string(), "1983/04/22");
    }

    #[test]
    fn test_chain_capacity_covers_logical_size() {
        let image = two_level_image();
        let root = root_block(&image).unwrap();
        let sub = directory_children(&image, root).unwrap()[0];
        let file = directory_children(&image, sub).unwrap()[0];

        // 700 bytes need two 512-byte blocks.
        let chain = file_block_chain(&image, file).unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain.iter().map(|e| e.capacity).sum::<usize>() >= 700);
    }

    #[test]
    fn test_sentinel_block_invalid() {
        let image = two_level_image();
        assert!(matches!(
            classify(&image, 0).unwrap_err(),
            DisketteError::InvalidBlock(0)
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let image = two_level_image();
        let root = root_block(&image).unwrap();
        let mut bytes = image.as_bytes().to_vec();
        bytes[root as usize * BLOCK_SIZE] = 0x7f;
        let broken = Image::from_vec(bytes).unwrap();
        assert!(matches!(
            classify(&broken, root).unwrap_err(),
            DisketteError::BadHeader { .. }
        ));
    }

    #[test]
    fn test_replace_within_capacity() {
        let mut image = two_level_image();
        let root = root_block(&image).unwrap();
        let file = directory_children(&image, root).unwrap()[1];
        let image_len = image.as_bytes().len();

        replace_file_content(&mut image, file, b"rewritten").unwrap();
        assert_eq!(image.as_bytes().len(), image_len);

        let meta = file_metadata(&image, file).unwrap();
        assert_eq!(meta.size, 9);

        let chain = file_block_chain(&image, file).unwrap();
        let first = &image.as_bytes()[chain[0].offset..chain[0].offset + 9];
        assert_eq!(first, b"rewritten");
    }

    #[test]
    fn test_replace_over_capacity_leaves_buffer_unmodified() {
        let mut image = two_level_image();
        let root = root_block(&image).unwrap();
        let file = directory_children(&image, root).unwrap()[1];
        let before = image.as_bytes().to_vec();

        let err = replace_file_content(&mut image, file, &vec![1u8; BLOCK_SIZE + 1]).unwrap_err();
        assert!(matches!(
            err,
            DisketteError::CapacityExceeded {
                needed: 513,
                capacity: 512
            }
        ));
        assert_eq!(image.as_bytes(), &before[..]);
    }
}
