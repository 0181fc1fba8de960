pub mod regions;

use serde::{Deserialize, Serialize};

/// Axis-aligned box in page pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// One connected anomaly region that passed the score gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionFinding {
    /// 1-based position of the region's contour in discovery order, counted
    /// before the score gate.
    pub index: usize,
    pub bbox: BoundingBox,
    pub total_score: f64,
    pub ela_score: f64,
    pub noise_score: f64,
    pub fft_score: f64,
}

/// How findings are ordered in a page report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingOrder {
    /// Raster order of each contour's first border pixel: top to bottom,
    /// then left to right.
    #[default]
    Discovery,
    /// Highest total score first; ties keep discovery order.
    Score,
}

impl FindingOrder {
    pub fn apply(&self, findings: &mut [RegionFinding]) {
        match self {
            FindingOrder::Discovery => findings.sort_by_key(|f| f.index),
            FindingOrder::Score => findings.sort_by(|a, b| {
                b.total_score
                    .total_cmp(&a.total_score)
                    .then(a.index.cmp(&b.index))
            }),
        }
    }
}
