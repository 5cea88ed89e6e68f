use image::{imageops, Rgb, RgbImage};
use rayon::prelude::*;

use crate::image_pipeline::fit::{self, PixelRect};
use crate::layout::page::SHEET_PADDING_MM;

use super::render::SheetNode;

const MM_PER_INCH: f32 = 25.4;
const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

pub fn mm_to_px(mm: f32, dpi: f32) -> f32 {
    mm * dpi / MM_PER_INCH
}

/// Pixel geometry of one sheet at a given resolution.
#[derive(Clone, Copy, Debug)]
pub struct SheetGeometry {
    pub width_px: u32,
    pub height_px: u32,
    padding_px: f32,
    gap_px: f32,
    cell_width_px: f32,
    cell_height_px: f32,
    cols: usize,
}

impl SheetGeometry {
    pub fn new(sheet: &SheetNode, dpi: f32) -> Self {
        let rows = sheet.grid.rows.max(1);
        let cols = sheet.grid.cols.max(1);
        let gap_px = mm_to_px(sheet.gap_mm, dpi);
        let content_width = mm_to_px(sheet.page.content_width_mm(), dpi);
        let content_height = mm_to_px(sheet.page.content_height_mm(), dpi);

        let cell_width_px = ((content_width - (cols - 1) as f32 * gap_px) / cols as f32).max(0.0);
        let cell_height_px =
            ((content_height - (rows - 1) as f32 * gap_px) / rows as f32).max(0.0);

        Self {
            width_px: mm_to_px(sheet.page.width_mm(), dpi).round() as u32,
            height_px: mm_to_px(sheet.page.height_mm(), dpi).round() as u32,
            padding_px: mm_to_px(SHEET_PADDING_MM, dpi),
            gap_px,
            cell_width_px,
            cell_height_px,
            cols,
        }
    }

    /// Rectangle of the cell at row-major position `slot`.
    pub fn cell_rect(&self, slot: usize) -> PixelRect {
        let row = slot / self.cols;
        let col = slot % self.cols;
        let x = self.padding_px + col as f32 * (self.cell_width_px + self.gap_px);
        let y = self.padding_px + row as f32 * (self.cell_height_px + self.gap_px);
        PixelRect {
            x: x.round() as i64,
            y: y.round() as i64,
            width: self.cell_width_px.floor() as u32,
            height: self.cell_height_px.floor() as u32,
        }
    }
}

/// Draws a sheet onto a white canvas.
pub fn rasterize(sheet: &SheetNode, dpi: f32) -> RgbImage {
    let geometry = SheetGeometry::new(sheet, dpi);
    let mut canvas = RgbImage::from_pixel(geometry.width_px, geometry.height_px, PAPER);

    for (slot, cell) in sheet.cells.iter().enumerate() {
        let rect = geometry.cell_rect(slot);
        if let Some(placement) = fit::place(cell.image.image(), rect, cell.scale_percent, cell.fill)
        {
            imageops::overlay(&mut canvas, &placement.image.to_rgb8(), placement.x, placement.y);
        }
    }

    canvas
}

/// Rasterizes every sheet in parallel, keeping sheet order.
pub fn rasterize_all(sheets: &[SheetNode], dpi: f32) -> Vec<RgbImage> {
    sheets.par_iter().map(|sheet| rasterize(sheet, dpi)).collect()
}

#[cfg(test)]
mod tests {
    use image::DynamicImage;

    use super::*;
    use crate::image_pipeline::store::ImageHandle;
    use crate::layout::grid::Grid;
    use crate::layout::page::{Orientation, PageSize};
    use crate::sheet::render::CellNode;
    use crate::sheet::style::FillMode;

    // 25.4 dpi makes one pixel per millimeter.
    const DPI: f32 = 25.4;

    fn sheet(grid: Grid, gap_mm: f32, cells: usize) -> SheetNode {
        let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([0, 0, 0])));
        SheetNode {
            page: PageSize::for_orientation(Orientation::Portrait),
            grid,
            gap_mm,
            cells: (0..cells)
                .map(|index| CellNode {
                    index,
                    image: ImageHandle::new("black", black.clone()),
                    scale_percent: 100.0,
                    fill: FillMode::Cover,
                })
                .collect(),
        }
    }

    fn assert_near(actual: i64, expected: i64) {
        assert!((actual - expected).abs() <= 1, "{actual} is not within 1px of {expected}");
    }

    #[test]
    fn geometry_splits_content_area_minus_gaps() {
        let geometry = SheetGeometry::new(&sheet(Grid::new(2, 2), 10.0, 4), DPI);
        assert_near(geometry.width_px.into(), 210);
        assert_near(geometry.height_px.into(), 297);

        let first = geometry.cell_rect(0);
        assert_near(first.x, 10);
        assert_near(first.y, 10);
        assert_near(first.width.into(), 90);
        assert_near(first.height.into(), 133);

        let last = geometry.cell_rect(3);
        assert_near(last.x, 110);
        assert_near(last.y, 154);
        assert_eq!((last.width, last.height), (first.width, first.height));
    }

    #[test]
    fn huge_gap_collapses_cells() {
        let geometry = SheetGeometry::new(&sheet(Grid::new(1, 3), 200.0, 3), DPI);
        assert!(geometry.cell_rect(1).is_empty());
    }

    #[test]
    fn rasterize_paints_occupied_cells_only() {
        let canvas = rasterize(&sheet(Grid::new(2, 2), 10.0, 3), DPI);
        assert_near(canvas.width().into(), 210);
        assert_near(canvas.height().into(), 297);

        // Padding and the empty fourth cell stay white.
        assert_eq!(canvas.get_pixel(2, 2), &PAPER);
        assert_eq!(canvas.get_pixel(150, 200), &PAPER);
        // Centres of occupied cells are covered.
        assert_eq!(canvas.get_pixel(50, 70), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(150, 70), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(50, 200), &Rgb([0, 0, 0]));
    }

    #[test]
    fn rasterize_all_keeps_order() {
        let sheets = vec![sheet(Grid::new(1, 1), 0.0, 1), sheet(Grid::new(1, 1), 0.0, 0)];
        let canvases = rasterize_all(&sheets, DPI);
        assert_eq!(canvases.len(), 2);
        assert_eq!(canvases[0].get_pixel(100, 100), &Rgb([0, 0, 0]));
        assert_eq!(canvases[1].get_pixel(100, 100), &PAPER);
    }
}
