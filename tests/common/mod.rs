#![allow(dead_code)]

use image::{Rgb, RgbImage};
use page_forensics::{BoundingBox, PageImage};

pub const PAGE_SIZE: u32 = 250;
pub const PATCH: BoundingBox = BoundingBox {
    x: 96,
    y: 96,
    width: 64,
    height: 64,
};
/// Sits between the flat background and the checkerboard patch scores.
pub const PATCH_THRESHOLD: f64 = 0.3;

pub fn flat_page(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

/// Mid-gray page with a pixel-level black/white checkerboard pasted into
/// `PATCH`. The patch is aligned to the 16-pixel JPEG grid so the flat
/// background survives re-encoding untouched.
pub fn checker_patch_page() -> RgbImage {
    let mut page = flat_page(PAGE_SIZE, PAGE_SIZE, 128);
    for y in PATCH.y..PATCH.bottom() {
        for x in PATCH.x..PATCH.right() {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            page.put_pixel(x, y, Rgb([v, v, v]));
        }
    }
    page
}

/// Mid-gray `size` x `size` page with uniform gray noise in `PATCH`, drawn
/// from a fixed-seed xorshift generator.
pub fn noise_patch_page(size: u32) -> RgbImage {
    let mut state: u32 = 0x9E37_79B9;
    let mut page = flat_page(size, size, 128);
    for y in PATCH.y..PATCH.bottom() {
        for x in PATCH.x..PATCH.right() {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let v = (state >> 24) as u8;
            page.put_pixel(x, y, Rgb([v, v, v]));
        }
    }
    page
}

/// Thresholds 0.05 through 0.95 in steps of 0.05.
pub fn threshold_sweep() -> Vec<f64> {
    (1..20).map(|i| i as f64 / 20.0).collect()
}

pub fn page(rgb: RgbImage) -> PageImage {
    PageImage::from_rgb(1, rgb).unwrap()
}

pub fn inside(actual: &BoundingBox, outer: &BoundingBox, margin: u32) -> bool {
    actual.x + margin >= outer.x
        && actual.y + margin >= outer.y
        && actual.right() <= outer.right() + margin
        && actual.bottom() <= outer.bottom() + margin
}

pub fn within(actual: &BoundingBox, expected: &BoundingBox, tolerance: u32) -> bool {
    actual.x.abs_diff(expected.x) <= tolerance
        && actual.y.abs_diff(expected.y) <= tolerance
        && actual.right().abs_diff(expected.right()) <= tolerance
        && actual.bottom().abs_diff(expected.bottom()) <= tolerance
}
