use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageFormat, RgbImage};
use log::info;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use crate::config::{EXPORT_DPI, EXPORT_JPEG_QUALITY};
use crate::SheetError;

use super::raster;
use super::render::SheetNode;

const POINTS_PER_MM: f32 = 72.0 / 25.4;
const SHEET_IMAGE_NAME: &str = "Sheet";

/// Produces a document from rendered sheets.
pub trait ExportGateway {
    fn export(&self, sheets: &[SheetNode]) -> Result<(), SheetError>;
}

/// Multi-page PDF, one page per sheet, each page a single full-bleed JPEG.
#[derive(Clone, Debug)]
pub struct PdfExport {
    path: PathBuf,
}

impl PdfExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds the in-memory document without writing it.
    pub fn document(sheets: &[SheetNode]) -> Result<Document, SheetError> {
        let canvases = raster::rasterize_all(sheets, EXPORT_DPI);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::with_capacity(sheets.len());

        for (sheet, canvas) in sheets.iter().zip(&canvases) {
            let width_pt = sheet.page.width_mm() * POINTS_PER_MM;
            let height_pt = sheet.page.height_mm() * POINTS_PER_MM;

            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(canvas.width()),
                    "Height" => i64::from(canvas.height()),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8_i64,
                    "Filter" => "DCTDecode",
                },
                encode_jpeg(canvas)?,
            ));

            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            width_pt.into(),
                            0.0_f32.into(),
                            0.0_f32.into(),
                            height_pt.into(),
                            0.0_f32.into(),
                            0.0_f32.into(),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(SHEET_IMAGE_NAME.as_bytes().to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

            let media_box: Vec<Object> =
                vec![0.0_f32.into(), 0.0_f32.into(), width_pt.into(), height_pt.into()];
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "XObject" => dictionary! { SHEET_IMAGE_NAME => image_id },
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }
}

impl ExportGateway for PdfExport {
    fn export(&self, sheets: &[SheetNode]) -> Result<(), SheetError> {
        let mut doc = Self::document(sheets)?;
        let mut writer = BufWriter::new(File::create(&self.path)?);
        doc.save_to(&mut writer)?;
        info!("exported {} sheets to {}", sheets.len(), self.path.display());
        Ok(())
    }
}

/// Print surface: one PNG per sheet, ready for the host's print dialog.
#[derive(Clone, Debug)]
pub struct PngSheets {
    dir: PathBuf,
}

impl PngSheets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn sheet_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("sheet_{:03}.png", index + 1))
    }
}

impl ExportGateway for PngSheets {
    fn export(&self, sheets: &[SheetNode]) -> Result<(), SheetError> {
        fs::create_dir_all(&self.dir)?;
        for (index, canvas) in raster::rasterize_all(sheets, EXPORT_DPI).iter().enumerate() {
            canvas.save_with_format(self.sheet_path(index), ImageFormat::Png)?;
        }
        info!("wrote {} sheets to {}", sheets.len(), self.dir.display());
        Ok(())
    }
}

fn encode_jpeg(canvas: &RgbImage) -> Result<Vec<u8>, SheetError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, EXPORT_JPEG_QUALITY).encode(
        canvas.as_raw(),
        canvas.width(),
        canvas.height(),
        ColorType::Rgb8,
    )?;
    Ok(bytes)
}
