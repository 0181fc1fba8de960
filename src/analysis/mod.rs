pub mod ela;
pub mod frequency;
pub mod noise;

use image::GrayImage;

use crate::{PageImage, error::Result};

/// A per-pixel anomaly signal computed from one page.
///
/// Implementations are pure: the same page always yields the same map, and
/// the map always has the page's dimensions.
pub trait SignalExtractor {
    fn extract(&self, page: &PageImage) -> Result<GrayImage>;

    fn name(&self) -> &str;
}
