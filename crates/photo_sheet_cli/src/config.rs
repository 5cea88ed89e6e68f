use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use photo_sheet::SheetConfig;

/// Reads a TOML config file such as:
///
/// ```toml
/// orientation = "landscape"
/// layout = 4
///
/// [style]
/// gap_mm = 3.0
/// scale_percent = 90.0
/// fill = "cover"
/// ```
pub fn load(path: &Path) -> Result<SheetConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read config {:?}", path))?;
    parse(&contents).with_context(|| format!("invalid config {:?}", path))
}

pub fn parse(contents: &str) -> Result<SheetConfig> {
    let config: SheetConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}
