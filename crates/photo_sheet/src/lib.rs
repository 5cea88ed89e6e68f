//! Arrange images onto printable sheets.
//!
//! Images are split into sheets by a [`LayoutMode`], each sheet gets a near
//! square [`Grid`], and the result is rendered into a [`RenderTree`] that can
//! be restyled, rasterized and exported.

mod config;
mod controller;
mod image_pipeline;
mod layout;
mod sheet;

pub use config::{SheetConfig, EXPORT_FILENAME};
pub use controller::SheetController;
pub use image_pipeline::{
    intake::{BatchOutcome, IntakeItem},
    store::ImageHandle,
};
pub use layout::{
    grid::{solve, Grid, LayoutMode, MAX_ITEMS_PER_SHEET},
    page::{Orientation, PageSize},
    paginate::{paginate, Arrangement, Page},
};
pub use sheet::{
    export::{ExportGateway, PdfExport, PngSheets},
    render::{CellNode, LayoutRenderer, RenderTree, SheetNode, EMPTY_PLACEHOLDER},
    style::{FillMode, StyleController, StyleParams},
};

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("failed to process image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to build PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid layout mode {0:?}: expected \"auto\" or a positive count")]
    InvalidLayoutMode(String),
    #[error("invalid style: {0}")]
    InvalidStyle(String),
}
