use image::{Rgb, RgbImage, imageops};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use ndarray::Array2;

use crate::{
    detection::{BoundingBox, RegionFinding},
    image_utils::array_to_gray,
};

#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub border_thickness: u32,
    pub border_color: Rgb<u8>,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            border_thickness: 2,
            border_color: Rgb([255, 0, 0]),
        }
    }
}

pub struct Visualizer {
    config: VisualizationConfig,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            config: VisualizationConfig::default(),
        }
    }

    /// Fused scores in `[0, 1]` rendered through the JET colormap.
    pub fn create_heatmap(&self, fused: &Array2<f64>) -> RgbImage {
        let intensity = array_to_gray(&fused.mapv(|v| v * 255.0));
        let (width, height) = intensity.dimensions();
        let mut heatmap = RgbImage::new(width, height);

        for (x, y, pixel) in intensity.enumerate_pixels() {
            heatmap.put_pixel(x, y, jet(pixel[0]));
        }

        heatmap
    }

    /// The page with a rectangle around every finding. Each rectangle spans
    /// `(x, y)` to `(x + width, y + height)` inclusive and grows outward with
    /// the configured thickness.
    pub fn annotate(&self, original: &RgbImage, findings: &[RegionFinding]) -> RgbImage {
        let mut vis = original.clone();

        for finding in findings {
            self.draw_region_border(&mut vis, &finding.bbox);
        }

        vis
    }

    pub fn crop_region(&self, original: &RgbImage, bbox: &BoundingBox) -> RgbImage {
        imageops::crop_imm(original, bbox.x, bbox.y, bbox.width, bbox.height).to_image()
    }

    fn draw_region_border(&self, image: &mut RgbImage, bbox: &BoundingBox) {
        for t in 0..self.config.border_thickness.max(1) {
            let rect = Rect::at(bbox.x as i32 - t as i32, bbox.y as i32 - t as i32)
                .of_size(bbox.width + 1 + 2 * t, bbox.height + 1 + 2 * t);
            draw_hollow_rect_mut(image, rect, self.config.border_color);
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Blue at 0 through cyan, yellow, to red at 255.
pub fn jet(value: u8) -> Rgb<u8> {
    let t = value as f32 / 255.0;
    let channel = |center: f32| ((1.5 - (4.0 * t - center).abs()).clamp(0.0, 1.0) * 255.0) as u8;
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}
