//! Locating a file by name

use crate::codec::{self, BlockId};
use crate::error::{DisketteError, Result};
use crate::image::Image;
use crate::walk::{walk, Verdict, Visitor};
use tracing::debug;

/// On-file visitor scanning for a name match. Directories are not matchable
/// targets. `found` stays at the `0` sentinel until a match is recorded; a
/// valid match is always a nonzero id.
struct Locator<'a> {
    target: &'a str,
    found: BlockId,
}

impl Visitor for Locator<'_> {
    fn on_file(
        &mut self,
        image: &Image,
        block: BlockId,
        _prefix: &str,
        _depth: usize,
    ) -> Result<Verdict> {
        let name = codec::sanitize_name(&codec::file_name(image, block)?);
        if name == self.target {
            self.found = block;
            return Ok(Verdict::Stop);
        }
        Ok(Verdict::Continue)
    }
}

/// Scan the whole tree for a file whose stored name matches `name` and return
/// its block id, stopping at the first match.
///
/// The comparison is case-sensitive and uses the separator-substituted form
/// of the stored name, so a name extracted as `SerialXON_XOFF~Printer~` is
/// found under exactly that spelling.
pub fn find_file(image: &Image, name: &str) -> Result<BlockId> {
    let root = codec::root_block(image)?;
    let mut locator = Locator {
        target: name,
        found: 0,
    };
    walk(image, root, "", &mut locator)?;

    if locator.found == 0 {
        return Err(DisketteError::NotFound(name.to_string()));
    }
    debug!(name, block = locator.found, "located file");
    Ok(locator.found)
}
