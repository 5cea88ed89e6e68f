pub mod export;
pub mod raster;
pub mod render;
pub mod style;
