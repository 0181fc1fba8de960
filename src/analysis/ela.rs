use std::io::Cursor;

use image::{GrayImage, ImageFormat, Rgb, RgbImage, codecs::jpeg::JpegEncoder};
use log::debug;

use crate::{
    PageImage,
    analysis::SignalExtractor,
    error::{ForensicsError, Result},
    image_utils::rgb_to_gray,
};

pub const DEFAULT_ELA_QUALITY: u8 = 90;

#[derive(Debug, Clone)]
pub struct ElaResult {
    /// Brightness-enhanced per-channel difference.
    pub enhanced: RgbImage,
    pub intensity_map: GrayImage,
    pub max_difference: u8,
    pub scale: f64,
}

pub struct ElaAnalyzer {
    quality: u8,
}

impl ElaAnalyzer {
    pub fn new(quality: u8) -> Result<Self> {
        if quality == 0 || quality > 100 {
            return Err(ForensicsError::InvalidParameter(format!(
                "ELA quality must be in 1..=100, got {quality}"
            )));
        }

        Ok(Self { quality })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn analyze(&self, rgb: &RgbImage) -> Result<ElaResult> {
        let (width, height) = rgb.dimensions();
        let recompressed = self.recompress_jpeg(rgb)?;

        if recompressed.dimensions() != (width, height) {
            return Err(ForensicsError::AnalysisFailed(format!(
                "JPEG round-trip changed dimensions from {}x{} to {}x{}",
                width,
                height,
                recompressed.width(),
                recompressed.height()
            )));
        }

        let mut difference = RgbImage::new(width, height);
        let mut max_difference = 0u8;

        for (x, y, orig) in rgb.enumerate_pixels() {
            let recomp = recompressed.get_pixel(x, y);
            let diff = Rgb([
                orig[0].abs_diff(recomp[0]),
                orig[1].abs_diff(recomp[1]),
                orig[2].abs_diff(recomp[2]),
            ]);
            max_difference = max_difference.max(diff[0]).max(diff[1]).max(diff[2]);
            difference.put_pixel(x, y, diff);
        }

        // A page that survives re-encoding untouched keeps its zero map.
        let scale = if max_difference == 0 {
            1.0
        } else {
            255.0 / max_difference as f64
        };

        let enhanced = Self::enhance(&difference, scale);
        let intensity_map = rgb_to_gray(&enhanced);

        debug!(
            "ELA q{}: max difference {}, scale {:.3}",
            self.quality, max_difference, scale
        );

        Ok(ElaResult {
            enhanced,
            intensity_map,
            max_difference,
            scale,
        })
    }

    fn recompress_jpeg(&self, rgb: &RgbImage) -> Result<RgbImage> {
        let mut buffer = Cursor::new(Vec::new());

        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        rgb.write_with_encoder(encoder)?;

        let recompressed =
            image::load_from_memory_with_format(buffer.get_ref(), ImageFormat::Jpeg)?;

        Ok(recompressed.to_rgb8())
    }

    fn enhance(difference: &RgbImage, scale: f64) -> RgbImage {
        let mut enhanced = difference.clone();

        for pixel in enhanced.pixels_mut() {
            for channel in pixel.0.iter_mut() {
                *channel = (*channel as f64 * scale).min(255.0) as u8;
            }
        }

        enhanced
    }
}

impl Default for ElaAnalyzer {
    fn default() -> Self {
        Self {
            quality: DEFAULT_ELA_QUALITY,
        }
    }
}

impl SignalExtractor for ElaAnalyzer {
    fn extract(&self, page: &PageImage) -> Result<GrayImage> {
        Ok(self.analyze(page.rgb())?.intensity_map)
    }

    fn name(&self) -> &str {
        "ela"
    }
}
