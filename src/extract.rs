//! Tree extraction to the host filesystem

use crate::codec::{self, BlockId};
use crate::error::{DisketteError, Result};
use crate::image::Image;
use crate::walk::{walk, Verdict, Visitor};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, trace};

/// Visitor pair that mirrors the image tree onto the host: directories become
/// host directories, files are materialized from their block chains.
struct Extractor;

impl Visitor for Extractor {
    fn on_dir(
        &mut self,
        image: &Image,
        block: BlockId,
        prefix: &str,
        _depth: usize,
    ) -> Result<Verdict> {
        let raw = codec::file_name(image, block)?;
        let (basename, _) = codec::parse_name(&raw);
        let path = format!("{}/{}", prefix, codec::sanitize_name(basename));

        debug!(path = %path, "creating directory");
        // Non-recursive: the parent was created by an earlier callback, the
        // walk being top-down. Each directory is visited once, so an
        // already-exists failure is a real failure.
        fs::create_dir(&path)?;
        Ok(Verdict::Continue)
    }

    fn on_file(
        &mut self,
        image: &Image,
        block: BlockId,
        prefix: &str,
        _depth: usize,
    ) -> Result<Verdict> {
        // Files keep their full stored name, type suffix included; only path
        // separators are substituted.
        let name = codec::sanitize_name(&codec::file_name(image, block)?);
        let path = format!("{prefix}/{name}");

        let meta = codec::file_metadata(image, block)?;
        let chain = codec::file_block_chain(image, block)?;
        debug!(path = %path, size = meta.size, blocks = chain.len(), "writing file");

        let mut out = File::create(&path)?;
        let mut remaining = meta.size as usize;

        for (index, extent) in chain.iter().enumerate() {
            if remaining == 0 {
                // Logical size reached; trailing slack blocks are never read.
                break;
            }
            let take = remaining.min(extent.capacity);
            out.write_all(&image.as_bytes()[extent.offset..extent.offset + take])?;
            remaining -= take;

            if (index + 1) % 10 == 0 {
                trace!(
                    block = index + 1,
                    total = chain.len(),
                    written = meta.size as usize - remaining,
                    "writing chain"
                );
            }
        }

        out.flush()?;
        Ok(Verdict::Continue)
    }
}

/// Extract the whole image tree under `dest`.
///
/// `dest` itself is created (recursively) if missing; everything below it is
/// created one level at a time as the walk descends. On failure,
/// already-extracted files remain on disk.
///
/// Traversal paths are plain strings, so `dest` must be valid UTF-8; a
/// non-Unicode destination is rejected rather than silently renamed.
pub fn extract<P: AsRef<Path>>(image: &Image, dest: P) -> Result<()> {
    let dest = dest.as_ref();
    let prefix = dest
        .to_str()
        .ok_or_else(|| DisketteError::NonUnicodePath(dest.to_path_buf()))?;
    fs::create_dir_all(dest)?;

    let root = codec::root_block(image)?;
    debug!(dest = prefix, root, "extracting image");
    walk(image, root, prefix, &mut Extractor)
}
