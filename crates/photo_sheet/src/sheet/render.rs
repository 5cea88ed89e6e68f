use log::debug;

use crate::image_pipeline::store::ImageHandle;
use crate::layout::grid::Grid;
use crate::layout::page::PageSize;
use crate::layout::paginate::Arrangement;

use super::style::{FillMode, StyleParams};

/// Text shown in place of sheets when there is nothing to arrange.
pub const EMPTY_PLACEHOLDER: &str = "No images uploaded";

#[derive(Clone, Debug, PartialEq)]
pub struct CellNode {
    /// Position of the image in the store.
    pub index: usize,
    pub image: ImageHandle,
    pub scale_percent: f32,
    pub fill: FillMode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SheetNode {
    pub page: PageSize,
    pub grid: Grid,
    pub gap_mm: f32,
    /// Occupied cells in row-major order; the remaining grid cells are empty.
    pub cells: Vec<CellNode>,
}

impl SheetNode {
    /// One line per grid row, `[ 3]` for an occupied cell and `[  ]` for an empty one.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        let width = self.cells.last().map_or(1, |cell| (cell.index + 1).to_string().len());
        let cols = self.grid.cols.max(1);
        (0..self.grid.rows).map(move |row| {
            (0..cols)
                .map(|col| match self.cells.get(row * cols + col) {
                    Some(cell) => format!("[{:>width$}]", cell.index + 1),
                    None => format!("[{:width$}]", ""),
                })
                .collect::<String>()
        })
    }
}

/// Visual representation of an arrangement.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RenderTree {
    /// Explicit placeholder for an empty store.
    #[default]
    Empty,
    Sheets(Vec<SheetNode>),
}

impl RenderTree {
    pub fn is_empty(&self) -> bool {
        matches!(self, RenderTree::Empty)
    }

    pub fn sheets(&self) -> &[SheetNode] {
        match self {
            RenderTree::Empty => &[],
            RenderTree::Sheets(sheets) => sheets,
        }
    }

    pub fn sheets_mut(&mut self) -> &mut [SheetNode] {
        match self {
            RenderTree::Empty => &mut [],
            RenderTree::Sheets(sheets) => sheets,
        }
    }
}

/// Turns an [`Arrangement`] into sheets of cells with default styling.
#[derive(Default)]
pub struct LayoutRenderer;

impl LayoutRenderer {
    pub fn render(&self, arrangement: &Arrangement<'_, ImageHandle>, page: PageSize) -> RenderTree {
        if arrangement.is_empty() {
            return RenderTree::Empty;
        }

        let style = StyleParams::default();
        let mut offset = 0;
        let sheets = arrangement
            .iter()
            .map(|chunk| {
                let cells = chunk
                    .items
                    .iter()
                    .enumerate()
                    .map(|(i, image)| CellNode {
                        index: offset + i,
                        image: image.clone(),
                        scale_percent: style.scale_percent,
                        fill: style.fill,
                    })
                    .collect();
                offset += chunk.items.len();
                SheetNode { page, grid: chunk.grid, gap_mm: style.gap_mm, cells }
            })
            .collect::<Vec<_>>();

        debug!("rendered {} sheets holding {offset} images", sheets.len());

        RenderTree::Sheets(sheets)
    }
}
