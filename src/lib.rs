use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::ela::DEFAULT_ELA_QUALITY,
    detection::{FindingOrder, regions::DEFAULT_THRESHOLD},
    error::{ForensicsError, Result},
    image_utils::rgb_to_gray,
};

pub mod analysis;
pub mod detection;
pub mod error;
pub mod fusion;
pub mod image_utils;
pub mod pipeline;
pub mod raster;
pub mod report;

pub use detection::{BoundingBox, RegionFinding};
pub use fusion::FusedMaps;
pub use pipeline::{ForensicsPipeline, PageAnalysis};
pub use report::PageReport;

pub const DEFAULT_DPI: u32 = 300;

/// Settings for one pipeline instance, fixed once the pipeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dpi: u32,
    pub threshold: f64,
    pub ela_quality: u8,
    pub save_patches: bool,
    pub finding_order: FindingOrder,
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            threshold: DEFAULT_THRESHOLD,
            ela_quality: DEFAULT_ELA_QUALITY,
            save_patches: false,
            finding_order: FindingOrder::Discovery,
            parallel: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(ForensicsError::InvalidParameter(
                "dpi must be greater than 0".into(),
            ));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ForensicsError::InvalidParameter(format!(
                "threshold must be in (0, 1), got {}",
                self.threshold
            )));
        }
        if self.ela_quality == 0 || self.ela_quality > 100 {
            return Err(ForensicsError::InvalidParameter(format!(
                "ela_quality must be in 1..=100, got {}",
                self.ela_quality
            )));
        }
        Ok(())
    }
}

/// One rasterized page, with its grayscale rendition derived up front.
#[derive(Debug, Clone)]
pub struct PageImage {
    index: usize,
    rgb: RgbImage,
    gray: GrayImage,
}

impl PageImage {
    /// `index` is 1-based.
    pub fn new(index: usize, image: DynamicImage) -> Result<Self> {
        let rgb = image.to_rgb8();
        Self::from_rgb(index, rgb)
    }

    pub fn from_rgb(index: usize, rgb: RgbImage) -> Result<Self> {
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(ForensicsError::EmptyImage { width, height });
        }

        let gray = rgb_to_gray(&rgb);
        Ok(Self { index, rgb, gray })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rgb(&self) -> &RgbImage {
        &self.rgb
    }

    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.rgb.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.threshold, 0.6);
        assert_eq!(config.ela_quality, 90);
        assert!(!config.save_patches);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_out_of_range_values() {
        let bad = [
            PipelineConfig {
                dpi: 0,
                ..Default::default()
            },
            PipelineConfig {
                threshold: 0.0,
                ..Default::default()
            },
            PipelineConfig {
                threshold: 1.0,
                ..Default::default()
            },
            PipelineConfig {
                ela_quality: 0,
                ..Default::default()
            },
            PipelineConfig {
                ela_quality: 101,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(ForensicsError::InvalidParameter(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"threshold": 0.45, "finding_order": "score"}"#).unwrap();
        assert_eq!(config.threshold, 0.45);
        assert_eq!(config.finding_order, FindingOrder::Score);
        assert_eq!(config.dpi, 300);
    }

    #[test]
    fn test_page_image_rejects_empty() {
        let err = PageImage::from_rgb(1, RgbImage::new(0, 10)).unwrap_err();
        assert!(matches!(
            err,
            ForensicsError::EmptyImage {
                width: 0,
                height: 10
            }
        ));
    }

    #[test]
    fn test_page_image_derives_gray() {
        let page = PageImage::new(3, DynamicImage::new_rgba8(4, 2)).unwrap();
        assert_eq!(page.index(), 3);
        assert_eq!(page.gray().dimensions(), (4, 2));
    }
}
