//! Synthetic image authoring
//!
//! [`ImageBuilder`] lays out a well-formed image from scratch: a label block,
//! one header block per entry and data blocks for file content. Block ids are
//! assigned in creation order (root is always id 1), so fixtures can hold on
//! to the returned ids and compare them against codec results.
//!
//! This is the authoring counterpart of the read-side codec and the fixture
//! factory for the test suite.

use crate::codec::name::encode_short_string;
use crate::codec::{
    BlockId, CHAIN_LEN_OFF, CHAIN_OFF, CREATED_OFF, EXPIRES_OFF, KIND_DIR, KIND_FILE, MAGIC,
    MAX_CHAIN, MODIFIED_OFF, NAME_FIELD, SIZE_OFF, VERSION_OFF,
};
use crate::image::BLOCK_SIZE;

type RawDate = (u16, u8, u8);

struct Entry {
    kind: u8,
    name: [u8; NAME_FIELD],
    version: (u8, u8, u8),
    created: RawDate,
    modified: RawDate,
    expires: RawDate,
    /// Child entry ids for directories.
    children: Vec<BlockId>,
    /// Content bytes for files.
    data: Vec<u8>,
    /// Forced chain length for files; default is the minimum that fits.
    chain_blocks: Option<usize>,
}

impl Entry {
    fn new(kind: u8, name: &str) -> Self {
        Entry {
            kind,
            name: encode_short_string(name).expect("entry name is not encodable"),
            version: (1, 0, 0),
            created: (1980, 1, 1),
            modified: (1980, 1, 1),
            expires: (1980, 1, 1),
            children: Vec::new(),
            data: Vec::new(),
            chain_blocks: None,
        }
    }
}

/// Builder for well-formed synthetic images.
///
/// Entry-creating methods panic on names that cannot be encoded or when a
/// structural limit (chain length, block count) is exceeded; the builder
/// authors fixtures and valid images, it does not model corruption. Corrupt
/// images are made by mutating the finished byte vector.
pub struct ImageBuilder {
    label: String,
    entries: Vec<Entry>,
}

impl ImageBuilder {
    /// Start an image with the given volume label. The root directory (block
    /// id 1) is created implicitly, named after the trimmed label.
    pub fn new(label: &str) -> Self {
        ImageBuilder {
            label: label.to_string(),
            entries: vec![Entry::new(KIND_DIR, label.trim_end_matches(' '))],
        }
    }

    /// Block id of the implicit root directory.
    pub fn root(&self) -> BlockId {
        1
    }

    fn push_entry(&mut self, parent: BlockId, entry: Entry) -> BlockId {
        let id = (self.entries.len() + 1) as BlockId;
        self.entries.push(entry);

        let parent_entry = &mut self.entries[parent as usize - 1];
        assert_eq!(parent_entry.kind, KIND_DIR, "parent {parent} is not a directory");
        assert!(parent_entry.children.len() < MAX_CHAIN, "directory is full");
        parent_entry.children.push(id);
        id
    }

    /// Add an empty directory under `parent`.
    pub fn add_dir(&mut self, parent: BlockId, name: &str) -> BlockId {
        self.push_entry(parent, Entry::new(KIND_DIR, name))
    }

    /// Start a file under `parent`; finish with [`FileBuilder::add`].
    pub fn file<'a>(&'a mut self, parent: BlockId, name: &str, data: Vec<u8>) -> FileBuilder<'a> {
        let mut entry = Entry::new(KIND_FILE, name);
        entry.data = data;
        FileBuilder {
            builder: self,
            parent,
            entry,
        }
    }

    /// Shorthand for a file with default metadata.
    pub fn add_file(&mut self, parent: BlockId, name: &str, data: Vec<u8>) -> BlockId {
        self.file(parent, name, data).add()
    }

    /// Lay out the image and return its bytes.
    pub fn finish(self) -> Vec<u8> {
        let header_count = self.entries.len();
        let chains: Vec<usize> = self
            .entries
            .iter()
            .map(|e| {
                if e.kind != KIND_FILE {
                    return 0;
                }
                let minimum = e.data.len().div_ceil(BLOCK_SIZE);
                let blocks = e.chain_blocks.unwrap_or(minimum);
                assert!(blocks >= minimum, "chain shorter than content");
                assert!(blocks <= MAX_CHAIN, "chain length exceeds {MAX_CHAIN}");
                blocks
            })
            .collect();

        let total_blocks = 1 + header_count + chains.iter().sum::<usize>();
        assert!(total_blocks <= u16::MAX as usize, "image exceeds 65535 blocks");

        let mut bytes = vec![0u8; total_blocks * BLOCK_SIZE];

        // Label block.
        bytes[..MAGIC.len()].copy_from_slice(&MAGIC);
        bytes[4..6].copy_from_slice(&1u16.to_le_bytes());
        let label = encode_short_string(&self.label).expect("volume label is not encodable");
        bytes[6..6 + NAME_FIELD].copy_from_slice(&label);

        // Data blocks are handed out after all header blocks.
        let mut next_data = (1 + header_count) as BlockId;

        for (index, entry) in self.entries.iter().enumerate() {
            let base = (index + 1) * BLOCK_SIZE;
            let header = &mut bytes[base..base + BLOCK_SIZE];

            header[0] = entry.kind;
            header[1..1 + NAME_FIELD].copy_from_slice(&entry.name);
            header[VERSION_OFF] = entry.version.0;
            header[VERSION_OFF + 1] = entry.version.1;
            header[VERSION_OFF + 2] = entry.version.2;
            write_date(header, CREATED_OFF, entry.created);
            write_date(header, MODIFIED_OFF, entry.modified);
            write_date(header, EXPIRES_OFF, entry.expires);

            let chain: Vec<BlockId> = if entry.kind == KIND_DIR {
                entry.children.clone()
            } else {
                (0..chains[index])
                    .map(|_| {
                        let id = next_data;
                        next_data += 1;
                        id
                    })
                    .collect()
            };

            header[SIZE_OFF..SIZE_OFF + 4]
                .copy_from_slice(&(entry.data.len() as u32).to_le_bytes());
            header[CHAIN_LEN_OFF..CHAIN_LEN_OFF + 2]
                .copy_from_slice(&(chain.len() as u16).to_le_bytes());
            for (i, id) in chain.iter().enumerate() {
                header[CHAIN_OFF + 2 * i..CHAIN_OFF + 2 * i + 2]
                    .copy_from_slice(&id.to_le_bytes());
            }

            // Content, laid across the chain in order.
            for (i, chunk) in entry.data.chunks(BLOCK_SIZE).enumerate() {
                let offset = chain[i] as usize * BLOCK_SIZE;
                bytes[offset..offset + chunk.len()].copy_from_slice(chunk);
            }
        }

        bytes
    }
}

fn write_date(header: &mut [u8], off: usize, date: RawDate) {
    header[off..off + 2].copy_from_slice(&date.0.to_le_bytes());
    header[off + 2] = date.1;
    header[off + 3] = date.2;
}

/// In-progress file entry; set metadata, then [`add`](FileBuilder::add) it.
pub struct FileBuilder<'a> {
    builder: &'a mut ImageBuilder,
    parent: BlockId,
    entry: Entry,
}

impl FileBuilder<'_> {
    pub fn version(mut self, major: u8, minor: u8, patch: u8) -> Self {
        self.entry.version = (major, minor, patch);
        self
    }

    pub fn created(mut self, year: u16, month: u8, day: u8) -> Self {
        self.entry.created = (year, month, day);
        self
    }

    pub fn modified(mut self, year: u16, month: u8, day: u8) -> Self {
        self.entry.modified = (year, month, day);
        self
    }

    pub fn expires(mut self, year: u16, month: u8, day: u8) -> Self {
        self.entry.expires = (year, month, day);
        self
    }

    /// Allocate this many chain blocks instead of the minimum that fits,
    /// leaving trailing slack capacity.
    pub fn chain_blocks(mut self, blocks: usize) -> Self {
        self.entry.chain_blocks = Some(blocks);
        self
    }

    /// Attach the file to its parent and return its block id.
    pub fn add(self) -> BlockId {
        self.builder.push_entry(self.parent, self.entry)
    }
}
