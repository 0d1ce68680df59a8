//! Functions to bring decoded vehicle images into the form the OCR engine reads.

use fast_image_resize::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use image::imageops;
use image::{GrayImage, RgbImage};
use rayon::prelude::*;

use crate::common::{NormalizedImage, RawImage};
use crate::error::PreprocessError;

// Fixed-point BT.601 luma weights, scaled by 2^14 (the integer weights OpenCV
// uses for its RGB to gray conversion). They sum to 16384.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;
const LUMA_ROUND: u32 = 1 << (LUMA_SHIFT - 1);

/// `Y = (4899 R + 9617 G + 1868 B + 8192) >> 14`
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32 + LUMA_ROUND) >> LUMA_SHIFT) as u8
}

/// Resizes to `target_w`x`target_h` with bilinear filtering, then reduces to a
/// single intensity channel. Same input, same output, bit for bit.
pub fn preprocess(
    raw: &RawImage,
    target_w: u32,
    target_h: u32,
) -> Result<NormalizedImage, PreprocessError> {
    if raw.is_degenerate() {
        let (width, height) = raw.dimensions();
        return Err(PreprocessError::InvalidImage { width, height });
    }
    if target_w == 0 || target_h == 0 {
        return Err(PreprocessError::InvalidImage {
            width: target_w,
            height: target_h,
        });
    }

    let resized = resize_image(&raw.image, target_w, target_h);
    Ok(NormalizedImage::new(to_intensity(&resized)))
}

fn resize_image(src: &RgbImage, target_w: u32, target_h: u32) -> RgbImage {
    if src.dimensions() == (target_w, target_h) {
        return src.clone();
    }

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));

    let mut dst = RgbImage::new(target_w, target_h);
    if let Err(err) = resizer.resize(src, &mut dst, &options) {
        log::warn!("Failed to use `fast_image_resize` ({err}). Falling back.");
        dst = imageops::resize(src, target_w, target_h, imageops::FilterType::Triangle);
    }
    dst
}

fn to_intensity(rgb: &RgbImage) -> GrayImage {
    let (w, h) = rgb.dimensions();
    let buf: Vec<u8> = rgb
        .as_raw()
        .par_chunks_exact(3)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect();

    // Length is w * h by construction of an RgbImage.
    GrayImage::from_raw(w, h, buf).unwrap_or_else(|| GrayImage::new(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(w: u32, h: u32) -> RawImage {
        RawImage::from(RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) * 3 % 256) as u8])
        }))
    }

    #[test]
    fn luma_endpoints_and_weights() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn output_has_target_size_and_one_channel() {
        let out = preprocess(&gradient(640, 480), 416, 416).unwrap();
        assert_eq!(out.dimensions(), (416, 416));
        assert_eq!(out.as_raw().len(), 416 * 416);

        let out = preprocess(&gradient(3, 2), 32, 16).unwrap();
        assert_eq!(out.dimensions(), (32, 16));
    }

    #[test]
    fn deterministic_and_non_mutating() {
        let raw = gradient(333, 217);
        let before = raw.image.clone();
        let a = preprocess(&raw, 416, 416).unwrap();
        let b = preprocess(&raw, 416, 416).unwrap();
        assert_eq!(a, b);
        assert_eq!(raw.image, before);
    }

    #[test]
    fn solid_colour_stays_solid() {
        let raw = RawImage::from(RgbImage::from_pixel(50, 20, Rgb([10, 200, 40])));
        let out = preprocess(&raw, 416, 416).unwrap();
        let expected = luma(10, 200, 40);
        // Fixed-point filter weights may round by one step.
        assert!(out.pixels().all(|p| p.0[0].abs_diff(expected) <= 1));
        assert!(out.mean_intensity().abs_diff(expected) <= 1);

        let same_size = preprocess(&raw, 50, 20).unwrap();
        assert!(same_size.pixels().all(|p| p.0[0] == expected));
    }

    #[test]
    fn one_pixel_is_enough() {
        let raw = RawImage::from(RgbImage::from_pixel(1, 1, Rgb([255, 255, 255])));
        assert!(preprocess(&raw, 416, 416).is_ok());
    }

    #[test]
    fn degenerate_input_fails_fast() {
        let raw = RawImage::from(RgbImage::new(0, 10));
        assert!(matches!(
            preprocess(&raw, 416, 416),
            Err(PreprocessError::InvalidImage { width: 0, height: 10 })
        ));
        assert!(preprocess(&gradient(4, 4), 0, 416).is_err());
    }
}
