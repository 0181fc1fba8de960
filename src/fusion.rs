use image::GrayImage;
use log::{debug, warn};
use ndarray::Array2;

use crate::{
    detection::BoundingBox,
    error::{ForensicsError, Result},
    image_utils::{box_mean, gray_to_array, min_max, normalize_unit},
};

/// The three normalized signals of a page and their unweighted mean.
///
/// Every array is `(height, width)` of the page and holds values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedMaps {
    pub ela: Array2<f64>,
    pub noise: Array2<f64>,
    pub fft: Array2<f64>,
    pub fused: Array2<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionScores {
    pub total: f64,
    pub ela: f64,
    pub noise: f64,
    pub fft: f64,
}

impl FusedMaps {
    pub fn fuse(ela: &GrayImage, noise: &GrayImage, fft: &GrayImage) -> Result<Self> {
        let expected = (ela.height() as usize, ela.width() as usize);
        for map in [noise, fft] {
            let actual = (map.height() as usize, map.width() as usize);
            if actual != expected {
                return Err(ForensicsError::DimensionMismatch { expected, actual });
            }
        }

        let ela = normalize_signal("ela", ela);
        let noise = normalize_signal("noise", noise);
        let fft = normalize_signal("fft", fft);

        let fused = (&ela + &noise + &fft) / 3.0;

        Ok(Self {
            ela,
            noise,
            fft,
            fused,
        })
    }

    /// `(height, width)`
    pub fn dim(&self) -> (usize, usize) {
        self.fused.dim()
    }

    pub fn region_scores(&self, bbox: &BoundingBox) -> RegionScores {
        RegionScores {
            total: box_mean(&self.fused, bbox),
            ela: box_mean(&self.ela, bbox),
            noise: box_mean(&self.noise, bbox),
            fft: box_mean(&self.fft, bbox),
        }
    }
}

fn normalize_signal(name: &str, map: &GrayImage) -> Array2<f64> {
    let raw = gray_to_array(map);
    let (min, max) = min_max(&raw);

    if max <= min {
        warn!("{name} map is constant ({min}); normalized to zero");
    } else {
        debug!("{name} map range {min}..{max}");
    }

    normalize_unit(&raw)
}
