use image::{GrayImage, Luma, RgbImage};
use ndarray::{Array2, s};

use crate::detection::BoundingBox;

const GAUSSIAN_3X3: [[u32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];

/// BT.601 luma in 14-bit fixed point, rounded to nearest.
pub fn rgb_to_gray(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let lum = (4899 * pixel[0] as u32 + 9617 * pixel[1] as u32 + 1868 * pixel[2] as u32
            + (1 << 13))
            >> 14;
        gray.put_pixel(x, y, Luma([lum.min(255) as u8]));
    }

    gray
}

pub fn gray_to_array(image: &GrayImage) -> Array2<f64> {
    let (width, height) = image.dimensions();
    let mut arr = Array2::zeros((height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        arr[[y as usize, x as usize]] = pixel[0] as f64;
    }

    arr
}

/// Values are clamped to `[0, 255]` and truncated.
pub fn array_to_gray(arr: &Array2<f64>) -> GrayImage {
    let (height, width) = arr.dim();
    let mut image = GrayImage::new(width as u32, height as u32);

    for ((y, x), &v) in arr.indexed_iter() {
        image.put_pixel(x as u32, y as u32, Luma([v.clamp(0.0, 255.0) as u8]));
    }

    image
}

pub fn min_max(arr: &Array2<f64>) -> (f64, f64) {
    let min = arr.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = arr.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

/// Min-max stretch to `[0, 1]`. A constant (or empty) array maps to zeros.
pub fn normalize_unit(arr: &Array2<f64>) -> Array2<f64> {
    let (min, max) = min_max(arr);
    let range = max - min;

    if !range.is_finite() || range < 1e-10 {
        Array2::zeros(arr.dim())
    } else {
        arr.mapv(|v| (v - min) / range)
    }
}

pub fn normalize_to_u8(arr: &Array2<f64>) -> Array2<f64> {
    normalize_unit(arr).mapv(|v| v * 255.0)
}

/// Mirror an out-of-range coordinate back into `0..len` without repeating
/// the edge sample (`gfedcb|abcdefgh|gfedcba`).
pub fn reflect_101(i: i64, len: u32) -> u32 {
    if len == 1 {
        return 0;
    }
    let len = len as i64;
    let period = 2 * (len - 1);
    let mut i = i.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as u32
}

/// 3x3 Gaussian smoothing (sigma derived from the kernel size) with
/// reflect-101 borders. Every pixel, including the frame, is filtered.
pub fn gaussian_blur_3x3(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut sum = 0u32;

            for (ky, row) in GAUSSIAN_3X3.iter().enumerate() {
                let py = reflect_101(y as i64 + ky as i64 - 1, height);
                for (kx, &weight) in row.iter().enumerate() {
                    let px = reflect_101(x as i64 + kx as i64 - 1, width);
                    sum += image.get_pixel(px, py)[0] as u32 * weight;
                }
            }

            result.put_pixel(x, y, Luma([((sum + 8) >> 4).min(255) as u8]));
        }
    }

    result
}

pub fn absolute_difference(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let (width, height) = a.dimensions();
    let mut diff = GrayImage::new(width, height);

    for (x, y, pixel) in a.enumerate_pixels() {
        let other = b.get_pixel(x, y)[0];
        diff.put_pixel(x, y, Luma([pixel[0].abs_diff(other)]));
    }

    diff
}

/// Mean of `arr` over the rows and columns covered by `bbox`, clipped to
/// the array. An empty intersection has mean 0.
pub fn box_mean(arr: &Array2<f64>, bbox: &BoundingBox) -> f64 {
    let (height, width) = arr.dim();
    let x0 = (bbox.x as usize).min(width);
    let y0 = (bbox.y as usize).min(height);
    let x1 = (bbox.x as usize + bbox.width as usize).min(width);
    let y1 = (bbox.y as usize + bbox.height as usize).min(height);

    arr.slice(s![y0..y1, x0..x1]).mean().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_gray_uses_bt601_weights() {
        let mut rgb = RgbImage::new(3, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([0, 255, 0]));
        rgb.put_pixel(2, 0, Rgb([200, 200, 200]));

        let gray = rgb_to_gray(&rgb);
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 200);
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
        assert_eq!(reflect_101(1, 1), 0);
    }

    #[test]
    fn test_blur_preserves_flat_image() {
        let flat = GrayImage::from_pixel(7, 5, Luma([91]));
        assert_eq!(gaussian_blur_3x3(&flat), flat);
    }

    #[test]
    fn test_blur_spreads_single_spike() {
        let mut img = GrayImage::new(5, 5);
        img.put_pixel(2, 2, Luma([160]));

        let blurred = gaussian_blur_3x3(&img);
        assert_eq!(blurred.get_pixel(2, 2)[0], 40);
        assert_eq!(blurred.get_pixel(1, 2)[0], 20);
        assert_eq!(blurred.get_pixel(1, 1)[0], 10);
        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_normalize_unit_spans_zero_to_one() {
        let arr = Array2::from_shape_vec((2, 2), vec![3.0, 5.0, 7.0, 11.0]).unwrap();
        let norm = normalize_unit(&arr);
        assert_eq!(norm[[0, 0]], 0.0);
        assert_eq!(norm[[1, 1]], 1.0);
        assert!((norm[[0, 1]] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_constant_is_zero() {
        let arr = Array2::from_elem((3, 2), 42.0);
        assert!(normalize_unit(&arr).iter().all(|&v| v == 0.0));
        assert!(normalize_to_u8(&arr).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_box_mean_clips_to_array() {
        let arr = Array2::from_elem((4, 4), 0.5);
        let bbox = BoundingBox {
            x: 2,
            y: 2,
            width: 10,
            height: 10,
        };
        assert!((box_mean(&arr, &bbox) - 0.5).abs() < 1e-12);

        let outside = BoundingBox {
            x: 9,
            y: 9,
            width: 2,
            height: 2,
        };
        assert_eq!(box_mean(&arr, &outside), 0.0);
    }
}
