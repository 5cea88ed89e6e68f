use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use photo_sheet::{
    ExportGateway, FillMode, IntakeItem, LayoutMode, Orientation, PdfExport, PngSheets,
    SheetConfig, SheetController, EMPTY_PLACEHOLDER, EXPORT_FILENAME,
};
use walkdir::WalkDir;

mod config;

#[derive(Parser, Debug)]
#[command(author, version, about = "Arrange images onto printable A4 sheets")]
struct Cli {
    /// TOML file with default layout and style settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show how the images would be split into sheets
    Preview(PreviewArgs),
    /// Write the arrangement as a PDF document
    Export(ExportArgs),
    /// Write one PNG per sheet, ready to print
    Print(PrintArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Image files or directories of images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    #[command(flatten)]
    settings: LayoutSettings,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Image files or directories of images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output PDF path
    #[arg(short, long, default_value = EXPORT_FILENAME)]
    output: PathBuf,
    #[command(flatten)]
    settings: LayoutSettings,
}

#[derive(Parser, Debug)]
struct PrintArgs {
    /// Image files or directories of images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output directory for sheet images
    #[arg(short, long)]
    out_dir: PathBuf,
    #[command(flatten)]
    settings: LayoutSettings,
}

/// Overrides for the config file; unset flags keep the configured value.
#[derive(Parser, Debug, Clone, Default)]
struct LayoutSettings {
    /// Sheet orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationChoice>,
    /// "auto" for a single sheet, or the number of images per sheet (at most 1024)
    #[arg(long)]
    layout: Option<String>,
    /// Spacing between images in millimeters
    #[arg(long)]
    gap: Option<f32>,
    /// Image size relative to its cell, in percent
    #[arg(long)]
    scale: Option<f32>,
    /// Whether images are letterboxed or cropped to their cell
    #[arg(long, value_enum)]
    fill: Option<FillChoice>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OrientationChoice {
    Portrait,
    Landscape,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FillChoice {
    Contain,
    Cover,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => config::load(path)?,
        None => SheetConfig::default(),
    };

    match cli.command {
        Commands::Preview(args) => preview(config, args),
        Commands::Export(args) => export(config, args),
        Commands::Print(args) => print(config, args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn preview(config: SheetConfig, args: PreviewArgs) -> Result<()> {
    let controller = load_controller(config, &args.settings, &args.inputs)?;
    let sheets = controller.render_output().sheets();
    if sheets.is_empty() {
        println!("{}", EMPTY_PLACEHOLDER);
        return Ok(());
    }

    let orientation = match controller.config().orientation {
        Orientation::Portrait => "portrait",
        Orientation::Landscape => "landscape",
    };
    for (index, sheet) in sheets.iter().enumerate() {
        println!(
            "Sheet {} of {} ({}, {}x{})",
            index + 1,
            sheets.len(),
            orientation,
            sheet.grid.rows,
            sheet.grid.cols
        );
        for row in sheet.rows() {
            println!("{}", row);
        }
    }

    Ok(())
}

fn export(config: SheetConfig, args: ExportArgs) -> Result<()> {
    let controller = load_controller(config, &args.settings, &args.inputs)?;
    let gateway = PdfExport::new(&args.output);
    write_output(&controller, &gateway, &args.output)
}

fn print(config: SheetConfig, args: PrintArgs) -> Result<()> {
    let controller = load_controller(config, &args.settings, &args.inputs)?;
    let gateway = PngSheets::new(&args.out_dir);
    write_output(&controller, &gateway, &args.out_dir)
}

fn write_output(
    controller: &SheetController,
    gateway: &dyn ExportGateway,
    target: &Path,
) -> Result<()> {
    let written = controller
        .export(gateway)
        .with_context(|| format!("failed to write {:?}", target))?;
    if written {
        println!(
            "{} sheets written to {:?}",
            controller.render_output().sheets().len(),
            target
        );
    } else {
        warn!("{}; nothing written to {:?}", EMPTY_PLACEHOLDER, target);
    }
    Ok(())
}

fn load_controller(
    mut config: SheetConfig,
    settings: &LayoutSettings,
    inputs: &[PathBuf],
) -> Result<SheetController> {
    settings.apply(&mut config)?;
    let mut controller = SheetController::new(config)?;

    let items = read_inputs(inputs)?;
    let progress = ProgressBar::new(items.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images",
        )?
        .progress_chars("=> "),
    );

    let outcome = controller.upload_with(&items, |_| progress.inc(1));
    progress.finish_and_clear();

    if outcome.failed > 0 {
        warn!("{} images could not be decoded", outcome.failed);
    }
    info!(
        "{} images arranged on {} sheets",
        controller.images().len(),
        controller.render_output().sheets().len()
    );

    Ok(controller)
}

fn read_inputs(inputs: &[PathBuf]) -> Result<Vec<IntakeItem>> {
    let mut items = Vec::new();
    for path in collect_paths(inputs)? {
        let item =
            IntakeItem::from_path(&path).with_context(|| format!("failed to read {:?}", path))?;
        items.push(item);
    }
    Ok(items)
}

/// Expands directories into their files, sorted by path; plain files keep argument order.
fn collect_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.path().to_path_buf())
                .collect();
            entries.sort();
            if entries.is_empty() {
                warn!("no files found in {:?}", input);
            }
            paths.extend(entries);
        } else if input.is_file() {
            paths.push(input.clone());
        } else {
            anyhow::bail!("input {:?} does not exist", input);
        }
    }
    Ok(paths)
}

impl LayoutSettings {
    fn apply(&self, config: &mut SheetConfig) -> Result<()> {
        if let Some(orientation) = self.orientation {
            config.orientation = orientation.to_orientation();
        }
        if let Some(layout) = &self.layout {
            config.layout = layout.parse::<LayoutMode>()?;
        }
        if let Some(gap) = self.gap {
            config.style.gap_mm = gap;
        }
        if let Some(scale) = self.scale {
            config.style.scale_percent = scale;
        }
        if let Some(fill) = self.fill {
            config.style.fill = fill.to_fill_mode();
        }
        config.validate()?;
        Ok(())
    }
}

impl OrientationChoice {
    fn to_orientation(self) -> Orientation {
        match self {
            OrientationChoice::Portrait => Orientation::Portrait,
            OrientationChoice::Landscape => Orientation::Landscape,
        }
    }
}

impl FillChoice {
    fn to_fill_mode(self) -> FillMode {
        match self {
            FillChoice::Contain => FillMode::Contain,
            FillChoice::Cover => FillMode::Cover,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use photo_sheet::StyleParams;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let mut config = SheetConfig::default();
        let settings = LayoutSettings {
            orientation: Some(OrientationChoice::Landscape),
            layout: Some("6".into()),
            gap: Some(1.5),
            scale: None,
            fill: Some(FillChoice::Cover),
        };
        settings.apply(&mut config).unwrap();

        assert_eq!(config.orientation, Orientation::Landscape);
        assert_eq!(config.layout, "6".parse().unwrap());
        assert_eq!(config.style.gap_mm, 1.5);
        assert_eq!(config.style.scale_percent, StyleParams::default().scale_percent);
        assert_eq!(config.style.fill, FillMode::Cover);
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let mut config = SheetConfig::default();
        let zero = LayoutSettings { layout: Some("0".into()), ..LayoutSettings::default() };
        assert!(zero.apply(&mut config).is_err());
        let too_many = LayoutSettings { layout: Some("1025".into()), ..LayoutSettings::default() };
        assert!(too_many.apply(&mut config).is_err());
        let negative_gap = LayoutSettings { gap: Some(-2.0), ..LayoutSettings::default() };
        assert!(negative_gap.apply(&mut config.clone()).is_err());
    }

    #[test]
    fn directories_expand_sorted_and_files_keep_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("set");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("b.png"), b"").unwrap();
        fs::write(nested.join("a.png"), b"").unwrap();
        let loose = dir.path().join("z.jpg");
        fs::write(&loose, b"").unwrap();

        let paths = collect_paths(&[loose.clone(), nested.clone()]).unwrap();
        assert_eq!(paths, vec![loose, nested.join("a.png"), nested.join("b.png")]);
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_paths(&[dir.path().join("nope.png")]).is_err());
    }
}
