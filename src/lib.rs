//! Diskette
//!
//! Reader, extractor and patcher for legacy block-chained disk images: a
//! flat binary blob holding a directory/file tree addressed by 16-bit block
//! identifiers.
//!
//! - [`image`] - the image buffer (memory-mapped or owned) and serialization
//! - [`codec`] - fixed-offset decoding of label, header and data blocks
//! - [`walk`] - generic depth-first traversal with visitor callbacks
//! - [`list`] / [`extract`] / [`locate`] / [`patch`] - the operations built
//!   on the walker
//! - [`builder`] - authoring of well-formed synthetic images
//!
//! ## Example
//!
//! ```rust
//! use diskette::{extract, Image, ImageBuilder};
//!
//! let mut builder = ImageBuilder::new("DEMO");
//! let root = builder.root();
//! builder.add_file(root, "ReadMe~Text~", b"hello".to_vec());
//!
//! let image = Image::from_vec(builder.finish())?;
//! let dest = std::env::temp_dir().join("diskette-demo");
//! extract(&image, &dest)?;
//! assert_eq!(std::fs::read(dest.join("ReadMe~Text~"))?, b"hello");
//! # std::fs::remove_dir_all(&dest)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod codec;
pub mod error;
pub mod extract;
pub mod image;
pub mod list;
pub mod locate;
pub mod patch;
pub mod walk;

// Re-export commonly used types
pub use builder::ImageBuilder;
pub use codec::{BlockId, EntryKind, Extent, FileMetadata, ImageDate, Version};
pub use error::{DisketteError, Result};
pub use extract::extract;
pub use image::{Image, BLOCK_SIZE};
pub use list::{list, list_json, ListEntry};
pub use locate::find_file;
pub use patch::{output_path, replace_and_save, replace_file};
pub use walk::{walk, Verdict, Visitor, MAX_DEPTH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
