use serde::{Deserialize, Serialize};

/// Short edge of the nominal A4 sheet in millimeters.
pub const SHEET_SHORT_EDGE_MM: f32 = 210.0;
/// Long edge of the nominal A4 sheet in millimeters.
pub const SHEET_LONG_EDGE_MM: f32 = 297.0;
/// Fixed inner padding applied on every side of a sheet.
pub const SHEET_PADDING_MM: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Physical sheet dimensions in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    width_mm: f32,
    height_mm: f32,
}

impl PageSize {
    pub fn for_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => {
                Self { width_mm: SHEET_SHORT_EDGE_MM, height_mm: SHEET_LONG_EDGE_MM }
            },
            Orientation::Landscape => {
                Self { width_mm: SHEET_LONG_EDGE_MM, height_mm: SHEET_SHORT_EDGE_MM }
            },
        }
    }

    pub fn width_mm(&self) -> f32 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f32 {
        self.height_mm
    }

    pub fn is_landscape(&self) -> bool {
        self.width_mm > self.height_mm
    }

    /// Width available to the grid once the sheet padding is removed.
    pub fn content_width_mm(&self) -> f32 {
        (self.width_mm - 2.0 * SHEET_PADDING_MM).max(0.0)
    }

    /// Height available to the grid once the sheet padding is removed.
    pub fn content_height_mm(&self) -> f32 {
        (self.height_mm - 2.0 * SHEET_PADDING_MM).max(0.0)
    }
}
