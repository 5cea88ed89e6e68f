use log::{debug, info};

use crate::config::SheetConfig;
use crate::image_pipeline::intake::{self, BatchOutcome, IntakeItem};
use crate::image_pipeline::store::{ImageHandle, ImageStore};
use crate::layout::grid::LayoutMode;
use crate::layout::page::Orientation;
use crate::layout::paginate;
use crate::sheet::export::ExportGateway;
use crate::sheet::render::{LayoutRenderer, RenderTree};
use crate::sheet::style::{self, FillMode, StyleController};
use crate::SheetError;

/// Owns the image store, the active configuration and the rendered sheets.
///
/// Every change goes through one of the command methods. Layout commands
/// re-paginate, style commands only restyle the existing sheets.
#[derive(Default)]
pub struct SheetController {
    store: ImageStore,
    config: SheetConfig,
    tree: RenderTree,
    renderer: LayoutRenderer,
    styler: StyleController,
}

impl SheetController {
    pub fn new(config: SheetConfig) -> Result<Self, SheetError> {
        config.validate()?;
        Ok(Self { config, ..Self::default() })
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn images(&self) -> &[ImageHandle] {
        self.store.snapshot()
    }

    pub fn render_output(&self) -> &RenderTree {
        &self.tree
    }

    /// Decodes a batch, appends it in submission order and lays out once.
    pub fn upload(&mut self, items: &[IntakeItem]) -> BatchOutcome {
        self.upload_with(items, |_| {})
    }

    /// Like [`upload`](Self::upload), reporting every settled item to `on_settled`.
    pub fn upload_with<F>(&mut self, items: &[IntakeItem], on_settled: F) -> BatchOutcome
    where
        F: Fn(&IntakeItem) + Sync,
    {
        if items.is_empty() {
            return BatchOutcome::default();
        }

        let outcome = intake::decode_batch(items, on_settled);
        info!("adding {} images ({} skipped)", outcome.images.len(), outcome.skipped);
        self.store.append(outcome.images.iter().cloned());
        self.relayout();
        outcome
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.relayout();
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.config.orientation = orientation;
        self.relayout();
    }

    /// Accepts `"auto"` or a positive count; anything else keeps the current mode.
    pub fn set_layout_mode(&mut self, value: &str) -> Result<(), SheetError> {
        let mode: LayoutMode = value.parse()?;
        self.config.layout = mode;
        self.relayout();
        Ok(())
    }

    pub fn set_gap_mm(&mut self, gap_mm: f32) -> Result<(), SheetError> {
        style::validate_gap(gap_mm)?;
        self.config.style.gap_mm = gap_mm;
        self.restyle();
        Ok(())
    }

    pub fn set_scale_percent(&mut self, scale_percent: f32) -> Result<(), SheetError> {
        style::validate_scale(scale_percent)?;
        self.config.style.scale_percent = scale_percent;
        self.restyle();
        Ok(())
    }

    pub fn set_fill(&mut self, fill: FillMode) {
        self.config.style.fill = fill;
        self.restyle();
    }

    /// Hands the current sheets to `gateway`.
    ///
    /// Returns `false` without calling the gateway when there is nothing to export.
    pub fn export(&self, gateway: &dyn ExportGateway) -> Result<bool, SheetError> {
        if self.tree.is_empty() {
            debug!("nothing to export");
            return Ok(false);
        }

        gateway.export(self.tree.sheets())?;
        Ok(true)
    }

    fn relayout(&mut self) {
        let page = self.config.page_size();
        let arrangement = paginate::paginate(self.store.snapshot(), self.config.layout, page);
        self.tree = self.renderer.render(&arrangement, page);
        self.restyle();
    }

    fn restyle(&mut self) {
        self.styler.apply(&mut self.tree, &self.config.style);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Cursor;

    use image::{DynamicImage, ImageOutputFormat};

    use super::*;
    use crate::layout::grid::Grid;
    use crate::sheet::export::PngSheets;
    use crate::sheet::render::SheetNode;

    fn png(name: &str) -> IntakeItem {
        let mut data = Vec::new();
        DynamicImage::new_rgb8(4, 4)
            .write_to(&mut Cursor::new(&mut data), ImageOutputFormat::Png)
            .unwrap();
        IntakeItem::new(name, "image/png", data)
    }

    fn batch(count: usize) -> Vec<IntakeItem> {
        (0..count).map(|i| png(&format!("{i}.png"))).collect()
    }

    #[derive(Default)]
    struct RecordingGateway {
        calls: Cell<usize>,
        sheets: Cell<usize>,
    }

    impl ExportGateway for RecordingGateway {
        fn export(&self, sheets: &[SheetNode]) -> Result<(), SheetError> {
            self.calls.set(self.calls.get() + 1);
            self.sheets.set(sheets.len());
            Ok(())
        }
    }

    #[test]
    fn starts_empty() {
        let controller = SheetController::default();
        assert!(controller.render_output().is_empty());
        assert!(controller.images().is_empty());
    }

    #[test]
    fn rejects_invalid_initial_style() {
        let mut config = SheetConfig::default();
        config.style.scale_percent = -5.0;
        assert!(SheetController::new(config).is_err());
    }

    #[test]
    fn upload_lays_out_once_in_order() {
        let mut controller = SheetController::default();
        controller.set_layout_mode("4").unwrap();

        let mut items = batch(10);
        items.insert(3, IntakeItem::new("notes.txt", "text/plain", Vec::new()));
        let outcome = controller.upload(&items);

        assert_eq!(outcome.images.len(), 10);
        assert_eq!(outcome.skipped, 1);
        let labels: Vec<_> = controller.images().iter().map(ImageHandle::label).collect();
        let expected: Vec<_> = (0..10).map(|i| format!("{i}.png")).collect();
        assert_eq!(labels, expected);

        let sheets = controller.render_output().sheets();
        let sizes: Vec<_> = sheets.iter().map(|s| s.cells.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert!(sheets.iter().all(|s| s.grid == Grid::new(2, 2)));
    }

    #[test]
    fn later_batches_append_after_earlier_ones() {
        let mut controller = SheetController::default();
        controller.upload(&[png("a.png"), png("b.png")]);
        controller.upload(&[png("c.png")]);

        let labels: Vec<_> = controller.images().iter().map(ImageHandle::label).collect();
        assert_eq!(labels, vec!["a.png", "b.png", "c.png"]);
        assert_eq!(controller.render_output().sheets()[0].cells.len(), 3);
    }

    #[test]
    fn clear_returns_to_placeholder() {
        let mut controller = SheetController::default();
        controller.upload(&batch(3));
        assert!(!controller.render_output().is_empty());

        controller.clear();
        assert!(controller.images().is_empty());
        assert_eq!(controller.render_output(), &RenderTree::Empty);
    }

    #[test]
    fn invalid_mode_keeps_previous_mode() {
        let mut controller = SheetController::default();
        controller.set_layout_mode("6").unwrap();
        controller.upload(&batch(7));

        assert!(matches!(controller.set_layout_mode("0"), Err(SheetError::InvalidLayoutMode(_))));
        assert!(controller.set_layout_mode("lots").is_err());
        assert_eq!(controller.config().layout, "6".parse().unwrap());
        assert_eq!(controller.render_output().sheets().len(), 2);
    }

    #[test]
    fn orientation_change_recomputes_grids() {
        let mut controller = SheetController::default();
        controller.upload(&batch(2));
        assert_eq!(controller.render_output().sheets()[0].grid, Grid::new(2, 1));

        controller.set_orientation(Orientation::Landscape);
        assert_eq!(controller.render_output().sheets()[0].grid, Grid::new(1, 2));
        assert!(controller.render_output().sheets()[0].page.is_landscape());
    }

    #[test]
    fn style_changes_keep_the_arrangement() {
        let mut controller = SheetController::default();
        controller.upload(&batch(5));
        let grid = controller.render_output().sheets()[0].grid;

        controller.set_gap_mm(0.0).unwrap();
        controller.set_scale_percent(75.0).unwrap();
        controller.set_fill(FillMode::Cover);

        let sheet = &controller.render_output().sheets()[0];
        assert_eq!(sheet.grid, grid);
        assert_eq!(sheet.gap_mm, 0.0);
        assert!(sheet.cells.iter().all(|c| c.scale_percent == 75.0 && c.fill == FillMode::Cover));
    }

    #[test]
    fn invalid_style_keeps_previous_values() {
        let mut controller = SheetController::default();
        controller.set_gap_mm(3.0).unwrap();
        assert!(controller.set_gap_mm(-1.0).is_err());
        assert!(controller.set_scale_percent(0.0).is_err());
        assert_eq!(controller.config().style.gap_mm, 3.0);
        assert_eq!(controller.config().style.scale_percent, 100.0);
    }

    #[test]
    fn huge_scale_still_prints() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = SheetController::default();
        controller.upload(&batch(2));
        controller.set_scale_percent(1_000_000.0).unwrap();
        controller.set_fill(FillMode::Cover);

        let sheets = PngSheets::new(dir.path());
        assert!(controller.export(&sheets).unwrap());
        let first = image::open(sheets.sheet_path(0)).unwrap();
        assert!(first.width() > 0);
    }

    #[test]
    fn export_skips_gateway_when_empty() {
        let gateway = RecordingGateway::default();
        let mut controller = SheetController::default();
        assert!(!controller.export(&gateway).unwrap());
        assert_eq!(gateway.calls.get(), 0);

        controller.set_layout_mode("2").unwrap();
        controller.upload(&batch(3));
        assert!(controller.export(&gateway).unwrap());
        assert_eq!(gateway.calls.get(), 1);
        assert_eq!(gateway.sheets.get(), 2);
    }
}
