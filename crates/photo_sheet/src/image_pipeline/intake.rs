use std::fs;
use std::io;
use std::path::Path;

use image::ImageFormat;
use log::{debug, warn};
use rayon::prelude::*;

use super::store::ImageHandle;

const OCTET_STREAM: &str = "application/octet-stream";

/// A raw uploaded file and the media type it was declared with.
#[derive(Clone, Debug)]
pub struct IntakeItem {
    pub name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl IntakeItem {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self { name: name.into(), media_type: media_type.into(), data }
    }

    /// Reads a file and declares its media type from the extension.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        Ok(Self::new(path.display().to_string(), media_type_for_path(path), data))
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

pub fn media_type_for_path(path: &Path) -> &'static str {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Pnm) => "image/x-portable-anymap",
        Ok(ImageFormat::Tiff) => "image/tiff",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Ico) => "image/x-icon",
        _ => OCTET_STREAM,
    }
}

/// What became of one upload batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Decoded images in submission order.
    pub images: Vec<ImageHandle>,
    /// Items whose media type is not an image.
    pub skipped: usize,
    /// Declared images that failed to decode.
    pub failed: usize,
}

enum Slot {
    Decoded(ImageHandle),
    Skipped,
    Failed,
}

/// Decodes a batch in parallel and returns the images in submission order.
///
/// `on_settled` runs once per item as soon as that item is decoded or skipped,
/// in completion order.
pub fn decode_batch<F>(items: &[IntakeItem], on_settled: F) -> BatchOutcome
where
    F: Fn(&IntakeItem) + Sync,
{
    decode_batch_with(items, decode_item, on_settled)
}

fn decode_batch_with<D, F>(items: &[IntakeItem], decode: D, on_settled: F) -> BatchOutcome
where
    D: Fn(&IntakeItem) -> Slot + Sync,
    F: Fn(&IntakeItem) + Sync,
{
    // Indexed collect: slot i always belongs to item i regardless of which
    // decode finishes first.
    let slots: Vec<Slot> = items
        .par_iter()
        .map(|item| {
            let slot = decode(item);
            on_settled(item);
            slot
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for slot in slots {
        match slot {
            Slot::Decoded(handle) => outcome.images.push(handle),
            Slot::Skipped => outcome.skipped += 1,
            Slot::Failed => outcome.failed += 1,
        }
    }

    debug!(
        "batch of {} settled: {} decoded, {} skipped, {} failed",
        items.len(),
        outcome.images.len(),
        outcome.skipped,
        outcome.failed
    );

    outcome
}

fn decode_item(item: &IntakeItem) -> Slot {
    if !item.is_image() {
        debug!("skipping {} ({})", item.name, item.media_type);
        return Slot::Skipped;
    }

    match image::load_from_memory(&item.data) {
        Ok(image) => Slot::Decoded(ImageHandle::new(item.name.as_str(), image)),
        Err(err) => {
            warn!("failed to decode {}: {err}", item.name);
            Slot::Failed
        },
    }
}
