use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, Contour, find_contours};
use log::debug;
use ndarray::Array2;

use crate::{
    detection::{BoundingBox, RegionFinding},
    error::{ForensicsError, Result},
    fusion::FusedMaps,
};

pub const DEFAULT_THRESHOLD: f64 = 0.6;

const FOREGROUND: u8 = 255;

/// Turns a fused score map into scored, gated region findings.
pub struct RegionExtractor {
    threshold: f64,
}

impl RegionExtractor {
    pub fn new(threshold: f64) -> Result<Self> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ForensicsError::InvalidParameter(format!(
                "threshold must be in (0, 1), got {threshold}"
            )));
        }

        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Pixels strictly above the threshold become foreground (255).
    pub fn binarize(&self, fused: &Array2<f64>) -> GrayImage {
        let (height, width) = fused.dim();
        let mut mask = GrayImage::new(width as u32, height as u32);

        for ((y, x), &score) in fused.indexed_iter() {
            if score > self.threshold {
                mask.put_pixel(x as u32, y as u32, Luma([FOREGROUND]));
            }
        }

        mask
    }

    /// Bounding boxes of the outermost borders of every foreground blob, in
    /// discovery order. Holes and anything nested inside them are ignored.
    pub fn external_boxes(&self, mask: &GrayImage) -> Vec<BoundingBox> {
        find_contours::<u32>(mask)
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .filter_map(contour_bounds)
            .collect()
    }

    pub fn extract(&self, maps: &FusedMaps) -> Vec<RegionFinding> {
        let mask = self.binarize(&maps.fused);
        let foreground = mask.pixels().filter(|p| p[0] == FOREGROUND).count();
        let boxes = self.external_boxes(&mask);

        let mut findings = Vec::new();
        for (i, bbox) in boxes.iter().enumerate() {
            let scores = maps.region_scores(bbox);

            // Boxes may cover background pixels, so the mask alone does not
            // guarantee the mean clears the threshold.
            if scores.total < self.threshold {
                debug!(
                    "discarding contour {} at {:?}: mean {:.3} below {}",
                    i + 1,
                    bbox,
                    scores.total,
                    self.threshold
                );
                continue;
            }

            findings.push(RegionFinding {
                index: i + 1,
                bbox: *bbox,
                total_score: scores.total,
                ela_score: scores.ela,
                noise_score: scores.noise,
                fft_score: scores.fft,
            });
        }

        debug!(
            "mask: {} foreground pixels, {} external contours, {} findings",
            foreground,
            boxes.len(),
            findings.len()
        );

        findings
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

fn contour_bounds(contour: &Contour<u32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps_from(fused: Array2<f64>) -> FusedMaps {
        FusedMaps {
            ela: fused.clone(),
            noise: fused.clone(),
            fft: fused.clone(),
            fused,
        }
    }

    fn bbox(x: u32, y: u32, width: u32, height: u32) -> BoundingBox {
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    fn fill(arr: &mut Array2<f64>, x: usize, y: usize, w: usize, h: usize, value: f64) {
        for row in y..y + h {
            for col in x..x + w {
                arr[[row, col]] = value;
            }
        }
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(RegionExtractor::new(0.0).is_err());
        assert!(RegionExtractor::new(1.0).is_err());
        assert!(RegionExtractor::new(f64::NAN).is_err());
        assert_eq!(RegionExtractor::default().threshold(), 0.6);
    }

    #[test]
    fn test_binarize_is_strict() {
        let arr = Array2::from_shape_vec((1, 3), vec![0.59, 0.6, 0.61]).unwrap();
        let mask = RegionExtractor::default().binarize(&arr);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(1, 0)[0], 0);
        assert_eq!(mask.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_two_blobs_in_discovery_order() {
        let mut fused = Array2::zeros((20, 30));
        fill(&mut fused, 20, 2, 5, 4, 0.9);
        fill(&mut fused, 3, 10, 6, 6, 0.8);

        let findings = RegionExtractor::default().extract(&maps_from(fused));

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].index, 1);
        assert_eq!(findings[0].bbox, bbox(20, 2, 5, 4));
        assert!((findings[0].total_score - 0.9).abs() < 1e-12);
        assert_eq!(findings[1].index, 2);
        assert_eq!(findings[1].bbox, bbox(3, 10, 6, 6));
        assert!((findings[1].ela_score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_holes_are_not_separate_regions() {
        let mut fused = Array2::zeros((12, 12));
        fill(&mut fused, 2, 2, 8, 8, 0.9);
        fill(&mut fused, 4, 4, 4, 4, 0.0);
        fill(&mut fused, 5, 5, 2, 2, 0.95);

        let findings = RegionExtractor::new(0.5).unwrap().extract(&maps_from(fused));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].bbox, bbox(2, 2, 8, 8));
    }

    #[test]
    fn test_sparse_contour_is_gated_but_keeps_its_index() {
        let mut fused = Array2::zeros((16, 16));
        for i in 1..7 {
            fused[[i, i]] = 0.7;
        }
        fill(&mut fused, 9, 10, 4, 4, 0.75);

        let findings = RegionExtractor::default().extract(&maps_from(fused));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].index, 2);
        assert_eq!(findings[0].bbox, bbox(9, 10, 4, 4));
    }

    #[test]
    fn test_blob_touching_page_edge() {
        let mut fused = Array2::zeros((6, 6));
        fill(&mut fused, 0, 0, 3, 6, 0.99);

        let findings = RegionExtractor::default().extract(&maps_from(fused));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].bbox, bbox(0, 0, 3, 6));
    }

    #[test]
    fn test_empty_map_has_no_findings() {
        let fused = Array2::zeros((5, 5));
        assert!(RegionExtractor::default().extract(&maps_from(fused)).is_empty());
    }
}
