//! Depth-first tree traversal
//!
//! The image's directory structure is not a pointer tree: every level is a
//! flat list of block ids that must be re-resolved through the codec. The
//! walker does that resolution once, in pre-order, and hands each entry to a
//! [`Visitor`]. Visitors steer the walk with a [`Verdict`]; returning an
//! error aborts the entire walk.

use crate::codec::{self, BlockId, EntryKind};
use crate::error::{DisketteError, Result};
use crate::image::Image;
use tracing::{debug, trace};

/// Nesting limit. The format carries no depth bound, so a cyclic or
/// self-referential image would otherwise recurse forever; past this depth
/// the walk fails with [`DisketteError::DepthExceeded`].
pub const MAX_DEPTH: usize = 64;

/// Visitor steering decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep walking.
    Continue,
    /// Terminate the entire walk successfully ("stop once found").
    Stop,
}

/// Per-entry callbacks. `prefix` is the host-relative path of the entry's
/// parent directory; `depth` is the parent's nesting level, starting at 0 for
/// the root. Both default to no-ops so a visitor implements only the side it
/// cares about.
pub trait Visitor {
    fn on_file(
        &mut self,
        image: &Image,
        block: BlockId,
        prefix: &str,
        depth: usize,
    ) -> Result<Verdict> {
        let _ = (image, block, prefix, depth);
        Ok(Verdict::Continue)
    }

    fn on_dir(
        &mut self,
        image: &Image,
        block: BlockId,
        prefix: &str,
        depth: usize,
    ) -> Result<Verdict> {
        let _ = (image, block, prefix, depth);
        Ok(Verdict::Continue)
    }
}

/// Walk the subtree rooted at `start` (normally the image's root directory),
/// invoking the visitor on every entry in pre-order.
///
/// A `Stop` verdict anywhere terminates the whole walk successfully; a
/// visitor error or decode failure aborts it, leaving whatever the visitor
/// already did in place.
pub fn walk<V: Visitor>(image: &Image, start: BlockId, prefix: &str, visitor: &mut V) -> Result<()> {
    walk_level(image, start, prefix, 0, visitor).map(|_| ())
}

fn walk_level<V: Visitor>(
    image: &Image,
    block: BlockId,
    prefix: &str,
    depth: usize,
    visitor: &mut V,
) -> Result<Verdict> {
    if depth >= MAX_DEPTH {
        return Err(DisketteError::DepthExceeded { max: MAX_DEPTH });
    }

    let children = codec::directory_children(image, block)?;
    debug!(entries = children.len(), dir = prefix, "processing directory");

    for (index, &child) in children.iter().enumerate() {
        trace!(index = index + 1, total = children.len(), block = child, "processing entry");

        match codec::classify(image, child)? {
            EntryKind::Directory => {
                let raw = codec::file_name(image, child)?;
                let (basename, _) = codec::parse_name(&raw);
                let path = format!("{}/{}", prefix, codec::sanitize_name(basename));

                if visitor.on_dir(image, child, prefix, depth)? == Verdict::Stop {
                    return Ok(Verdict::Stop);
                }
                if walk_level(image, child, &path, depth + 1, visitor)? == Verdict::Stop {
                    return Ok(Verdict::Stop);
                }
            }
            EntryKind::File => {
                if visitor.on_file(image, child, prefix, depth)? == Verdict::Stop {
                    return Ok(Verdict::Stop);
                }
            }
        }
    }

    trace!(dir = prefix, "directory complete");
    Ok(Verdict::Continue)
}
