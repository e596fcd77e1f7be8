use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisketteError {
    #[error("Invalid magic number in label block")]
    InvalidMagic,

    #[error("Image truncated: need at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Invalid block id {0:#06x}: out of range for this image")]
    InvalidBlock(u16),

    #[error("Block {0:#06x} is not a directory")]
    NotADirectory(u16),

    #[error("Bad entry header at block {block:#06x}: {reason}")]
    BadHeader { block: u16, reason: String },

    #[error("Malformed name at block {block:#06x}")]
    NameDecode { block: u16 },

    #[error("Directory nesting exceeds {max} levels, image is likely cyclic")]
    DepthExceeded { max: usize },

    #[error("File \"{0}\" not found in image")]
    NotFound(String),

    #[error("Replacement content is {needed} bytes but the block chain holds {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Image is memory-mapped read-only; load an owned copy before patching")]
    ReadOnlyImage,

    #[error("Path {0:?} is not valid UTF-8")]
    NonUnicodePath(std::path::PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DisketteError>;
