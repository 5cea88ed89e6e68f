use serde::{Deserialize, Serialize};

use super::render::RenderTree;
use crate::SheetError;

/// How an image occupies its cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Fit inside the cell, leaving margins on one axis.
    #[default]
    Contain,
    /// Fill the cell, cropping the overflow.
    Cover,
}

/// Cosmetic parameters that never affect pagination.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleParams {
    /// Spacing between neighbouring cells.
    pub gap_mm: f32,
    /// Size of each image relative to its cell.
    pub scale_percent: f32,
    pub fill: FillMode,
}

impl Default for StyleParams {
    fn default() -> Self {
        Self { gap_mm: 5.0, scale_percent: 100.0, fill: FillMode::Contain }
    }
}

impl StyleParams {
    pub fn validate(&self) -> Result<(), SheetError> {
        validate_gap(self.gap_mm)?;
        validate_scale(self.scale_percent)
    }
}

pub(crate) fn validate_gap(gap_mm: f32) -> Result<(), SheetError> {
    if gap_mm.is_finite() && gap_mm >= 0.0 {
        Ok(())
    } else {
        Err(SheetError::InvalidStyle(format!("gap must be a non-negative length, got {gap_mm}")))
    }
}

pub(crate) fn validate_scale(scale_percent: f32) -> Result<(), SheetError> {
    if scale_percent.is_finite() && scale_percent > 0.0 {
        Ok(())
    } else {
        Err(SheetError::InvalidStyle(format!("scale must be positive, got {scale_percent}")))
    }
}

/// Applies [`StyleParams`] to an already rendered tree.
#[derive(Default)]
pub struct StyleController;

impl StyleController {
    pub fn apply(&self, tree: &mut RenderTree, style: &StyleParams) {
        for sheet in tree.sheets_mut() {
            sheet.gap_mm = style.gap_mm;
            for cell in &mut sheet.cells {
                cell.scale_percent = style.scale_percent;
                cell.fill = style.fill;
            }
        }
    }
}
