use image::GrayImage;
use log::{Level, debug, log_enabled};

use crate::{
    PageImage,
    analysis::SignalExtractor,
    error::Result,
    image_utils::{absolute_difference, gaussian_blur_3x3},
};

#[derive(Debug, Clone)]
pub struct NoiseResult {
    /// `|gray - blur(gray)|` before smoothing.
    pub residual: GrayImage,
    pub noise_map: GrayImage,
}

#[derive(Debug, Default)]
pub struct NoiseAnalyzer;

impl NoiseAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, gray: &GrayImage) -> NoiseResult {
        let residual = self.extract_residual(gray);
        // Second pass: suppress isolated spikes but keep texture boundaries.
        let noise_map = gaussian_blur_3x3(&residual);
        if log_enabled!(Level::Debug) {
            let peak = residual.iter().copied().max().unwrap_or(0);
            debug!("noise residual: peak {}", peak);
        }

        NoiseResult {
            residual,
            noise_map,
        }
    }

    fn extract_residual(&self, gray: &GrayImage) -> GrayImage {
        let blurred = gaussian_blur_3x3(gray);
        absolute_difference(gray, &blurred)
    }
}

impl SignalExtractor for NoiseAnalyzer {
    fn extract(&self, page: &PageImage) -> Result<GrayImage> {
        Ok(self.analyze(page.gray()).noise_map)
    }

    fn name(&self) -> &str {
        "noise"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_flat_image_has_no_residual() {
        let flat = GrayImage::from_pixel(16, 12, Luma([200]));
        let result = NoiseAnalyzer::new().analyze(&flat);

        assert!(result.residual.pixels().all(|p| p[0] == 0));
        assert!(result.noise_map.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_checkerboard_interior_is_uniform() {
        let checker = GrayImage::from_fn(12, 12, |x, y| {
            if (x + y) % 2 == 0 { Luma([255]) } else { Luma([0]) }
        });
        let result = NoiseAnalyzer::new().analyze(&checker);

        for y in 2..10 {
            for x in 2..10 {
                assert_eq!(result.noise_map.get_pixel(x, y)[0], 128);
            }
        }
    }

    #[test]
    fn test_single_pixel_image() {
        let tiny = GrayImage::from_pixel(1, 1, Luma([17]));
        let result = NoiseAnalyzer::new().analyze(&tiny);
        assert_eq!(result.noise_map.dimensions(), (1, 1));
        assert_eq!(result.noise_map.get_pixel(0, 0)[0], 0);
    }
}
