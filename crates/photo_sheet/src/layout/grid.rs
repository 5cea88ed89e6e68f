use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::page::PageSize;
use crate::SheetError;

/// Largest per-sheet count accepted for [`LayoutMode::Fixed`].
pub const MAX_ITEMS_PER_SHEET: usize = 1024;

/// How many items a sheet holds and how its grid is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LayoutModeRepr", into = "LayoutModeRepr")]
pub enum LayoutMode {
    /// Every item on a single sheet, grid picked by cell squareness.
    #[default]
    Auto,
    /// A fixed number of items per sheet with a uniform near-square grid.
    Fixed(NonZeroUsize),
}

impl LayoutMode {
    /// Number of items placed on each sheet for a store of `total` items.
    pub fn chunk_size(&self, total: usize) -> usize {
        match self {
            LayoutMode::Auto => total,
            LayoutMode::Fixed(n) => n.get(),
        }
    }
}

impl FromStr for LayoutMode {
    type Err = SheetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Ok(LayoutMode::Auto);
        }

        value
            .parse::<usize>()
            .ok()
            .and_then(fixed_mode)
            .ok_or_else(|| SheetError::InvalidLayoutMode(value.to_owned()))
    }
}

fn fixed_mode(count: usize) -> Option<LayoutMode> {
    if count > MAX_ITEMS_PER_SHEET {
        return None;
    }
    NonZeroUsize::new(count).map(LayoutMode::Fixed)
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Auto => f.write_str("auto"),
            LayoutMode::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// Config files may spell the mode as `"auto"`, `"4"` or `4`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LayoutModeRepr {
    Count(u64),
    Name(String),
}

impl TryFrom<LayoutModeRepr> for LayoutMode {
    type Error = SheetError;

    fn try_from(repr: LayoutModeRepr) -> Result<Self, Self::Error> {
        match repr {
            LayoutModeRepr::Count(count) => usize::try_from(count)
                .ok()
                .and_then(fixed_mode)
                .ok_or_else(|| SheetError::InvalidLayoutMode(count.to_string())),
            LayoutModeRepr::Name(name) => name.parse(),
        }
    }
}

impl From<LayoutMode> for LayoutModeRepr {
    fn from(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Auto => LayoutModeRepr::Name("auto".into()),
            LayoutMode::Fixed(n) => LayoutModeRepr::Count(n.get() as u64),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total cell count, saturating for grids too large to address.
    pub fn cells(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }
}

/// Picks the row/column grid for a sheet holding `item_count` items.
///
/// In fixed mode the grid only depends on the declared count, so every sheet
/// of the arrangement shares it. `item_count` must be at least one; a zero
/// count yields a single cell.
pub fn solve(item_count: usize, page: PageSize, mode: LayoutMode) -> Grid {
    match mode {
        LayoutMode::Fixed(n) => fixed_grid(n.get(), page),
        LayoutMode::Auto => auto_grid(item_count, page),
    }
}

fn fixed_grid(count: usize, page: PageSize) -> Grid {
    let cols = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    if page.is_landscape() && rows > cols {
        Grid::new(cols, rows)
    } else {
        Grid::new(rows, cols)
    }
}

fn auto_grid(count: usize, page: PageSize) -> Grid {
    // Two items read better as a single strip than as whatever the squareness
    // score picks. Candidate for folding into the score itself.
    if count == 2 {
        return if page.is_landscape() { Grid::new(1, 2) } else { Grid::new(2, 1) };
    }

    let width = f64::from(page.width_mm());
    let height = f64::from(page.height_mm());

    let mut best = Grid::new(1, 1);
    let mut best_score = f64::INFINITY;
    for cols in 1..=count {
        let rows = count.div_ceil(cols);
        let cell_ratio = (width / cols as f64) / (height / rows as f64);
        let score = (cell_ratio - 1.0).abs();
        if score < best_score {
            best_score = score;
            best = Grid::new(rows, cols);
        }
    }

    best
}
