//! Tree listing
//!
//! One row per entry, files and directories alike, in traversal order. The
//! table mode matches the historical tool's column layout; `--json` emits the
//! same rows as structured data.

use crate::codec::{self, BlockId, FileMetadata};
use crate::error::Result;
use crate::image::Image;
use crate::walk::{walk, Verdict, Visitor};
use serde::Serialize;
use std::io::{self, Write};

const NAME_WIDTH: usize = 32;
const TYPE_WIDTH: usize = 24;
const SIZE_WIDTH: usize = 16;
const VERSION_WIDTH: usize = 8;
const DATE_WIDTH: usize = 16;
const FRAME_WIDTH: usize = 128;

/// One listing row, as emitted by the JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    /// `"file"` or `"directory"`.
    pub kind: &'static str,
    /// Directory nesting level of the entry's parent, 0 at the root.
    pub depth: usize,
    #[serde(flatten)]
    pub meta: FileMetadata,
}

/// Visitor that formats one metadata row per entry. Never mutates traversal
/// state; a name that fails to decode aborts the listing, since a corrupt
/// name block means the rest of the table cannot be trusted.
struct Lister<'w, W: Write> {
    out: &'w mut W,
}

impl<W: Write> Lister<'_, W> {
    fn row(&mut self, image: &Image, block: BlockId, depth: usize) -> Result<Verdict> {
        let meta = codec::file_metadata(image, block)?;

        // Indent by two spaces per level, inside the name column.
        let indented = format!("{:indent$}{}", "", meta.basename, indent = 2 * depth);
        writeln!(
            self.out,
            "{:<NAME_WIDTH$}{:<TYPE_WIDTH$}{:<SIZE_WIDTH$}{:<VERSION_WIDTH$}{:<DATE_WIDTH$}{:<DATE_WIDTH$}{:<DATE_WIDTH$}",
            indented,
            meta.type_suffix,
            meta.size,
            meta.version.to_string(),
            meta.created.to_string(),
            meta.modified.to_string(),
            meta.expires.to_string(),
        )?;
        Ok(Verdict::Continue)
    }
}

impl<W: Write> Visitor for Lister<'_, W> {
    fn on_file(
        &mut self,
        image: &Image,
        block: BlockId,
        _prefix: &str,
        depth: usize,
    ) -> Result<Verdict> {
        self.row(image, block, depth)
    }

    fn on_dir(
        &mut self,
        image: &Image,
        block: BlockId,
        _prefix: &str,
        depth: usize,
    ) -> Result<Verdict> {
        self.row(image, block, depth)
    }
}

/// Collects rows instead of printing them.
#[derive(Default)]
struct Collector {
    entries: Vec<ListEntry>,
}

impl Collector {
    fn push(&mut self, image: &Image, block: BlockId, depth: usize, kind: &'static str) -> Result<Verdict> {
        self.entries.push(ListEntry {
            kind,
            depth,
            meta: codec::file_metadata(image, block)?,
        });
        Ok(Verdict::Continue)
    }
}

impl Visitor for Collector {
    fn on_file(
        &mut self,
        image: &Image,
        block: BlockId,
        _prefix: &str,
        depth: usize,
    ) -> Result<Verdict> {
        self.push(image, block, depth, "file")
    }

    fn on_dir(
        &mut self,
        image: &Image,
        block: BlockId,
        _prefix: &str,
        depth: usize,
    ) -> Result<Verdict> {
        self.push(image, block, depth, "directory")
    }
}

fn frame<W: Write>(out: &mut W, width: usize) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(width))
}

/// Print the banner (image name and volume label), column header and one
/// table row per entry.
pub fn list<W: Write>(image: &Image, image_name: &str, out: &mut W) -> Result<()> {
    let label = codec::volume_label(image)?;

    frame(out, image_name.len() + 2)?;
    if label.is_empty() {
        writeln!(out, "|{image_name}| - No description")?;
    } else {
        writeln!(out, "|{image_name}| - {label}")?;
    }
    frame(out, image_name.len() + 2)?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<NAME_WIDTH$}{:<TYPE_WIDTH$}{:<SIZE_WIDTH$}{:<VERSION_WIDTH$}{:<DATE_WIDTH$}{:<DATE_WIDTH$}{:<DATE_WIDTH$}",
        "File name", "File type", "File size", "Version", "Creation date", "Mod. date", "Exp. date",
    )?;
    frame(out, FRAME_WIDTH)?;

    let root = codec::root_block(image)?;
    walk(image, root, "", &mut Lister { out })
}

/// Collect every row and write them as a JSON array.
pub fn list_json<W: Write>(image: &Image, out: &mut W) -> Result<()> {
    let root = codec::root_block(image)?;
    let mut collector = Collector::default();
    walk(image, root, "", &mut collector)?;

    serde_json::to_writer_pretty(&mut *out, &collector.entries)?;
    writeln!(out)?;
    Ok(())
}
