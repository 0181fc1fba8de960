use std::path::Path;

use image::DynamicImage;
use log::debug;
use pdfium_render::prelude::*;

use crate::{
    error::{ForensicsError, Result},
    raster::Rasterizer,
};

/// Renders every page of a PDF in memory through the pdfium library.
///
/// The library is loaded from `PDFIUM_DYNAMIC_LIB_PATH` when set, otherwise
/// from the system library path.
#[derive(Debug, Default)]
pub struct PdfiumRasterizer;

fn render_error(e: impl ToString) -> ForensicsError {
    ForensicsError::Rasterize(e.to_string())
}

fn create_pdfium() -> Result<Pdfium> {
    let bindings = match std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        Ok(dir) => {
            if !Path::new(&dir).exists() {
                return Err(ForensicsError::Rasterize(format!(
                    "PDFIUM_DYNAMIC_LIB_PATH is set to '{dir}' but the path does not exist"
                )));
            }
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        }
        Err(_) => Pdfium::bind_to_system_library(),
    }
    .map_err(render_error)?;

    Ok(Pdfium::new(bindings))
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        let pdfium = create_pdfium()?;
        let document = pdfium.load_pdf_from_file(path, None).map_err(render_error)?;

        let mut pages = Vec::new();
        for (i, page) in document.pages().iter().enumerate() {
            // 1 point = 1/72 inch
            let width_px = (page.width().value * dpi as f32 / 72.0).round() as i32;
            let height_px = (page.height().value * dpi as f32 / 72.0).round() as i32;

            let config = PdfRenderConfig::new()
                .set_target_width(width_px)
                .set_target_height(height_px);

            let bitmap = page.render_with_config(&config).map_err(render_error)?;
            debug!("rendered page {} at {} dpi: {}x{}", i + 1, dpi, width_px, height_px);
            pages.push(bitmap.as_image());
        }

        Ok(pages)
    }

    fn name(&self) -> &str {
        "pdfium"
    }
}
