use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::sheet::style::FillMode;

/// Axis-aligned pixel rectangle on a sheet canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(&self) -> i64 {
        self.x + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        self.y + i64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A resized image and where its top-left corner lands on the canvas.
#[derive(Clone, Debug)]
pub struct Placement {
    pub image: DynamicImage,
    pub x: i64,
    pub y: i64,
}

/// Fits `image` into a box of `scale_percent` of `cell`, centred on the cell.
///
/// Whatever falls outside the cell is cropped away before resizing, so the
/// output is never larger than the cell. Returns `None` when nothing remains
/// visible.
pub fn place(
    image: &DynamicImage,
    cell: PixelRect,
    scale_percent: f32,
    fill: FillMode,
) -> Option<Placement> {
    let (source_width, source_height) = image.dimensions();
    if cell.is_empty() || source_width == 0 || source_height == 0 || scale_percent <= 0.0 {
        return None;
    }

    let source_width = f64::from(source_width);
    let source_height = f64::from(source_height);
    let scale = f64::from(scale_percent) / 100.0;
    let box_width = (f64::from(cell.width) * scale).max(1.0);
    let box_height = (f64::from(cell.height) * scale).max(1.0);

    // Source pixels to canvas pixels.
    let factor = match fill {
        FillMode::Contain => (box_width / source_width).min(box_height / source_height),
        FillMode::Cover => (box_width / source_width).max(box_height / source_height),
    };
    let fitted_width = (source_width * factor).round().max(1.0);
    let fitted_height = (source_height * factor).round().max(1.0);

    let x = cell.x as f64 + ((f64::from(cell.width) - fitted_width) / 2.0).trunc();
    let y = cell.y as f64 + ((f64::from(cell.height) - fitted_height) / 2.0).trunc();

    let left = x.max(cell.x as f64);
    let top = y.max(cell.y as f64);
    let right = (x + fitted_width).min(cell.right() as f64);
    let bottom = (y + fitted_height).min(cell.bottom() as f64);
    if right <= left || bottom <= top {
        return None;
    }

    let visible_width = (right - left).round() as u32;
    let visible_height = (bottom - top).round() as u32;
    if visible_width == 0 || visible_height == 0 {
        return None;
    }

    let crop_left = ((left - x) / factor).floor().clamp(0.0, source_width - 1.0);
    let crop_top = ((top - y) / factor).floor().clamp(0.0, source_height - 1.0);
    let crop_right = ((right - x) / factor).ceil().clamp(crop_left + 1.0, source_width);
    let crop_bottom = ((bottom - y) / factor).ceil().clamp(crop_top + 1.0, source_height);

    let visible = image.crop_imm(
        crop_left as u32,
        crop_top as u32,
        (crop_right - crop_left) as u32,
        (crop_bottom - crop_top) as u32,
    );
    let image = visible.resize_exact(visible_width, visible_height, FilterType::CatmullRom);

    Some(Placement { image, x: left as i64, y: top as i64 })
}
