use log::debug;

use super::grid::{self, Grid, LayoutMode};
use super::page::PageSize;

/// One sheet: its grid and the contiguous run of items placed on it.
#[derive(Debug)]
pub struct Page<'a, T> {
    pub grid: Grid,
    pub items: &'a [T],
}

impl<'a, T> Page<'a, T> {
    /// Cells left empty at the end of the grid.
    pub fn empty_cells(&self) -> usize {
        self.grid.cells().saturating_sub(self.items.len())
    }
}

impl<T> Clone for Page<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Page<'_, T> {}

/// Ordered sheets covering an item sequence exactly once.
#[derive(Debug)]
pub struct Arrangement<'a, T> {
    pages: Vec<Page<'a, T>>,
}

impl<'a, T> Arrangement<'a, T> {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page<'a, T>] {
        &self.pages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page<'a, T>> + '_ {
        self.pages.iter()
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }
}

impl<T> Default for Arrangement<'_, T> {
    fn default() -> Self {
        Self { pages: Vec::new() }
    }
}

/// Splits `items` into sheets for `mode` and solves each sheet's grid.
pub fn paginate<'a, T>(items: &'a [T], mode: LayoutMode, page: PageSize) -> Arrangement<'a, T> {
    if items.is_empty() {
        return Arrangement::default();
    }

    let chunk_size = mode.chunk_size(items.len());
    let pages: Vec<_> = items
        .chunks(chunk_size)
        .map(|chunk| {
            let count = match mode {
                LayoutMode::Auto => chunk.len(),
                LayoutMode::Fixed(n) => n.get(),
            };
            Page { grid: grid::solve(count, page, mode), items: chunk }
        })
        .collect();

    debug!("paginated {} items into {} sheets ({mode} layout)", items.len(), pages.len());

    Arrangement { pages }
}
