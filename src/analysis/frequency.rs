use image::GrayImage;
use log::debug;
use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::{
    PageImage,
    analysis::SignalExtractor,
    error::Result,
    image_utils::{array_to_gray, normalize_to_u8},
};

/// Log-magnitude spectrum of the page, laid out with the zero frequency in
/// the centre.
///
/// The spectrum is indexed by frequency, not by position, yet it is fused
/// pixel-for-pixel with the spatial maps. It acts as a page-wide texture
/// signal rather than a localised one.
#[derive(Debug, Default)]
pub struct FrequencyAnalyzer;

impl FrequencyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let (w, h) = (width as usize, height as usize);

        let mut spectrum = gray
            .pixels()
            .map(|p| Complex::new(p[0] as f64, 0.0))
            .collect::<Vec<_>>();

        fft_2d(&mut spectrum, w, h);

        let mut magnitude = Array2::zeros((h, w));
        for y in 0..h {
            for x in 0..w {
                let (sy, sx) = ((y + h / 2) % h, (x + w / 2) % w);
                magnitude[[sy, sx]] = 20.0 * (spectrum[y * w + x].norm() + 1.0).ln();
            }
        }

        debug!(
            "spectrum: log magnitude range {:.2}..{:.2}",
            magnitude.iter().cloned().fold(f64::INFINITY, f64::min),
            magnitude.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
        );

        array_to_gray(&normalize_to_u8(&magnitude))
    }
}

/// In-place forward 2D transform of a row-major `width x height` buffer.
fn fft_2d(data: &mut [Complex<f64>], width: usize, height: usize) {
    if width == 0 || height == 0 {
        return;
    }

    let mut planner = FftPlanner::new();

    // Rows are contiguous, so one call transforms all of them.
    let row_fft = planner.plan_fft_forward(width);
    row_fft.process(data);

    let col_fft = planner.plan_fft_forward(height);
    let mut column = vec![Complex::new(0.0, 0.0); height];
    for x in 0..width {
        for (y, slot) in column.iter_mut().enumerate() {
            *slot = data[y * width + x];
        }
        col_fft.process(&mut column);
        for (y, value) in column.iter().enumerate() {
            data[y * width + x] = *value;
        }
    }
}

impl SignalExtractor for FrequencyAnalyzer {
    fn extract(&self, page: &PageImage) -> Result<GrayImage> {
        Ok(self.analyze(page.gray()))
    }

    fn name(&self) -> &str {
        "fft"
    }
}
