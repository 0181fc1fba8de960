#[cfg(feature = "pdfium")]
pub mod pdfium;

use std::path::Path;

use image::DynamicImage;
use log::debug;

use crate::error::{ForensicsError, Result};

const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Produces the ordered page images of a source document.
pub trait Rasterizer {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>>;

    fn name(&self) -> &str;
}

/// A single raster image treated as a one-page document. DPI is ignored.
#[derive(Debug, Default)]
pub struct ImageRasterizer;

impl Rasterizer for ImageRasterizer {
    fn rasterize(&self, path: &Path, _dpi: u32) -> Result<Vec<DynamicImage>> {
        let image = image::open(path)?;
        debug!(
            "loaded {} as a single {}x{} page",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(vec![image])
    }

    fn name(&self) -> &str {
        "image"
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Picks a rasterizer from the file extension.
pub fn rasterizer_for(path: &Path) -> Result<Box<dyn Rasterizer + Sync>> {
    match extension_of(path).as_deref() {
        Some("pdf") => pdf_rasterizer(),
        Some(ext) if RASTER_EXTENSIONS.contains(&ext) => Ok(Box::new(ImageRasterizer)),
        Some(ext) => Err(ForensicsError::UnsupportedInput(format!(
            "unsupported file extension '.{ext}'"
        ))),
        None => Err(ForensicsError::UnsupportedInput(format!(
            "cannot determine input type of {}",
            path.display()
        ))),
    }
}

#[cfg(feature = "pdfium")]
fn pdf_rasterizer() -> Result<Box<dyn Rasterizer + Sync>> {
    Ok(Box::new(pdfium::PdfiumRasterizer))
}

#[cfg(not(feature = "pdfium"))]
fn pdf_rasterizer() -> Result<Box<dyn Rasterizer + Sync>> {
    Err(ForensicsError::UnsupportedInput(
        "PDF input requires building with the `pdfium` feature".into(),
    ))
}

/// File stem of the source, used to name every output of a run.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into())
}
