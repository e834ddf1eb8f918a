//! # Archive Packager
//!
//! Serializes rendered images into one ZIP archive.
//!
//! Output is byte-deterministic for a given input sequence: entries are
//! stored (PNG data is already compressed), timestamps are pinned to the
//! ZIP epoch (1980-01-01) and permissions are fixed.
//!
//! Duplicate filenames follow last-write-wins: the later image's bytes
//! replace the earlier one, at the position the name first appeared.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::batch::RenderedImage;
use crate::error::ArchiveError;

/// Filename offered for download.
pub const ARCHIVE_NAME: &str = "qr_codes.zip";

/// Collapse duplicate filenames, keeping the last content at the first position.
pub fn last_write_wins<T, F>(items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut slots: Vec<T> = Vec::with_capacity(items.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let name = key(&item).to_string();
        match index.get(&name) {
            Some(&slot) => slots[slot] = item,
            None => {
                index.insert(name, slots.len());
                slots.push(item);
            }
        }
    }

    slots
}

/// Pack `images` into a ZIP archive, one entry per distinct filename.
///
/// Input may repeat filenames; they are collapsed with [`last_write_wins`]
/// here so callers other than the batch pipeline get the same archive.
/// Already-distinct input passes through unchanged.
pub fn pack(images: &[RenderedImage]) -> Result<Vec<u8>, ArchiveError> {
    let refs: Vec<&RenderedImage> = images.iter().collect();
    let entries = last_write_wins(refs, |img| img.filename.as_str());

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for image in entries {
        writer.start_file(image.filename.as_str(), options)?;
        writer.write_all(&image.png)?;
    }

    let cursor = writer.finish()?;
    tracing::debug!(entries = images.len(), bytes = cursor.get_ref().len(), "packed archive");
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use pretty_assertions::assert_eq;
    use std::io::Read;
    use zip::ZipArchive;

    fn image(name: &str, payload: &[u8]) -> RenderedImage {
        RenderedImage {
            filename: name.to_string(),
            width: 1,
            height: 1,
            pixels: RgbImage::new(1, 1),
            png: payload.to_vec(),
        }
    }

    fn read_back(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[test]
    fn test_pack_round_trip_names_and_order() {
        let bytes = pack(&[image("b.png", b"bee"), image("a.png", b"ay")]).unwrap();
        assert_eq!(
            read_back(bytes),
            vec![
                ("b.png".to_string(), b"bee".to_vec()),
                ("a.png".to_string(), b"ay".to_vec()),
            ]
        );
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let bytes = pack(&[
            image("x.png", b"first"),
            image("y.png", b"other"),
            image("x.png", b"second"),
        ])
        .unwrap();
        assert_eq!(
            read_back(bytes),
            vec![
                ("x.png".to_string(), b"second".to_vec()),
                ("y.png".to_string(), b"other".to_vec()),
            ]
        );
    }

    #[test]
    fn test_pack_is_deterministic() {
        let images = [image("a.png", b"one"), image("b.png", b"two")];
        assert_eq!(pack(&images).unwrap(), pack(&images).unwrap());
    }

    #[test]
    fn test_last_write_wins_keeps_first_position() {
        let out = last_write_wins(vec![("a", 1), ("b", 2), ("a", 3), ("c", 4)], |p| p.0);
        assert_eq!(out, vec![("a", 3), ("b", 2), ("c", 4)]);
    }
}
