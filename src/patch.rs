//! In-image file replacement

use crate::codec::{self, BlockId};
use crate::error::Result;
use crate::image::Image;
use crate::locate::find_file;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Replace the content of the file named `target_name` inside the image
/// buffer, returning the patched block id.
///
/// The new content must fit the file's existing block-chain capacity; the
/// chain is never grown. The caller decides where the mutated buffer is
/// serialized (see [`output_path`] and [`Image::save_to`]).
pub fn replace_file(image: &mut Image, target_name: &str, content: &[u8]) -> Result<BlockId> {
    let block = find_file(image, target_name)?;
    debug!(name = target_name, block, bytes = content.len(), "patching file");
    codec::replace_file_content(image, block, content)?;
    Ok(block)
}

/// Where a patched image is written: the original path with `--in-place`,
/// otherwise a `.new` sibling.
pub fn output_path(image_path: &Path, in_place: bool) -> PathBuf {
    if in_place {
        return image_path.to_path_buf();
    }
    let mut with_suffix = image_path.as_os_str().to_os_string();
    with_suffix.push(".new");
    PathBuf::from(with_suffix)
}

/// Locate `target_name`, overwrite its content and serialize the whole image.
/// Convenience wrapper used by the CLI.
pub fn replace_and_save(
    image: &mut Image,
    target_name: &str,
    content: &[u8],
    in_place: bool,
) -> Result<PathBuf> {
    let block = replace_file(image, target_name, content)?;

    let out = output_path(image.path(), in_place);
    image.save_to(&out)?;
    info!(block, out = %out.display(), "image serialized");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ImageBuilder;
    use crate::error::DisketteError;
    use crate::image::BLOCK_SIZE;

    fn fixture() -> Image {
        let mut builder = ImageBuilder::new("PATCH");
        let root = builder.root();
        builder.add_file(root, "Config~Text~", vec![b'x'; 512]);
        Image::from_vec(builder.finish()).unwrap()
    }

    #[test]
    fn test_exact_capacity_replacement() {
        let mut image = fixture();
        let before_len = image.as_bytes().len();

        let replacement = vec![b'y'; 512];
        let block = replace_file(&mut image, "Config~Text~", &replacement).unwrap();
        assert_ne!(block, 0);
        assert_eq!(image.as_bytes().len(), before_len);

        let chain = codec::file_block_chain(&image, block).unwrap();
        assert_eq!(
            &image.as_bytes()[chain[0].offset..chain[0].offset + 512],
            &replacement[..]
        );
    }

    #[test]
    fn test_oversized_replacement_rejected() {
        let mut image = fixture();
        let before = image.as_bytes().to_vec();

        let err = replace_file(&mut image, "Config~Text~", &vec![0u8; 513]).unwrap_err();
        assert!(matches!(err, DisketteError::CapacityExceeded { .. }));
        assert_eq!(image.as_bytes(), &before[..]);
    }

    #[test]
    fn test_missing_target_leaves_image_untouched() {
        let mut image = fixture();
        let before = image.as_bytes().to_vec();

        let err = replace_file(&mut image, "Absent~Text~", b"data").unwrap_err();
        assert!(matches!(err, DisketteError::NotFound(_)));
        assert_eq!(image.as_bytes(), &before[..]);
    }

    #[test]
    fn test_output_path_suffix() {
        let path = Path::new("/tmp/disk.img");
        assert_eq!(output_path(path, true), PathBuf::from("/tmp/disk.img"));
        assert_eq!(output_path(path, false), PathBuf::from("/tmp/disk.img.new"));
    }

    #[test]
    fn test_smaller_replacement_round_trips() {
        let mut image = fixture();
        let block = replace_file(&mut image, "Config~Text~", b"short").unwrap();

        let meta = codec::file_metadata(&image, block).unwrap();
        assert_eq!(meta.size, 5);

        // Slack beyond the new logical size is zeroed.
        let chain = codec::file_block_chain(&image, block).unwrap();
        let payload = &image.as_bytes()[chain[0].offset..chain[0].offset + BLOCK_SIZE];
        assert_eq!(&payload[..5], b"short");
        assert!(payload[5..].iter().all(|&b| b == 0));
    }
}
