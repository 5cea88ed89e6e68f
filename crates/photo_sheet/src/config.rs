use serde::{Deserialize, Serialize};

use crate::layout::grid::LayoutMode;
use crate::layout::page::{Orientation, PageSize};
use crate::sheet::style::StyleParams;
use crate::SheetError;

/// File name used when exporting without an explicit destination.
pub const EXPORT_FILENAME: &str = "photo-arrangement.pdf";
/// JPEG quality of the sheet images embedded in exported documents.
pub const EXPORT_JPEG_QUALITY: u8 = 98;
/// Raster resolution for export and print, twice the 96 dpi screen reference.
pub const EXPORT_DPI: f32 = 192.0;

/// Every control value needed for one layout pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub orientation: Orientation,
    pub layout: LayoutMode,
    pub style: StyleParams,
}

impl SheetConfig {
    pub fn page_size(&self) -> PageSize {
        PageSize::for_orientation(self.orientation)
    }

    pub fn validate(&self) -> Result<(), SheetError> {
        self.style.validate()
    }
}
