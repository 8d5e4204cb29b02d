//! Visual descriptor extraction from crop photos
//!
//! Colour statistics are computed on 8-bit channel scales: hue in [0, 180),
//! saturation / brightness / Lab `a` in [0, 255]. Each per-pixel value is
//! quantised to an integer before averaging.

use image::{GrayImage, Luma, RgbImage};
use palette::{FromColor, Hsv, Lab, Srgb};
use shared::{meets_minimum_size, PredictionError, VisualFeatures};

use crate::config::ImageConfig;

/// Decode an uploaded image (PNG, JPEG, ...) into an RGB raster
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, PredictionError> {
    if bytes.is_empty() {
        return Err(PredictionError::InvalidImage("empty upload".to_string()));
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| PredictionError::InvalidImage(format!("cannot decode image: {}", e)))?;
    let rgb = decoded.to_rgb8();

    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(PredictionError::InvalidImage("image has zero area".to_string()));
    }
    Ok(rgb)
}

/// Warn when the image is smaller than the configured minimum.
/// Small images are still processed.
pub fn quality_check(image: &RgbImage, limits: &ImageConfig) -> Option<String> {
    if meets_minimum_size(image.width(), image.height(), limits.min_width, limits.min_height) {
        return None;
    }
    Some(format!(
        "Low-resolution image ({}x{}); at least {}x{} is recommended for reliable sub-stage detection",
        image.width(),
        image.height(),
        limits.min_width,
        limits.min_height
    ))
}

/// Per-pixel channel values on 8-bit scales
struct PixelChannels {
    hue: u8,
    saturation: u8,
    brightness: u8,
    a_channel: u8,
}

fn quantise(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn pixel_channels(r: u8, g: u8, b: u8) -> PixelChannels {
    let rgb: Srgb<f32> = Srgb::new(r, g, b).into_format();

    let hsv: Hsv = Hsv::from_color(rgb);
    // 8-bit hue is degrees / 2; 360 wraps to 0
    let hue = (hsv.hue.into_positive_degrees() / 2.0).round();
    let hue = if hue >= 180.0 { 0 } else { hue as u8 };

    let lab: Lab = Lab::from_color(rgb.into_linear());

    PixelChannels {
        hue,
        saturation: quantise(hsv.saturation * 255.0),
        brightness: quantise(hsv.value * 255.0),
        a_channel: quantise(lab.a + 128.0),
    }
}

/// Convert to grayscale with `0.299 R + 0.587 G + 0.114 B`, rounded
pub fn rgb_to_gray(image: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
        gray.put_pixel(x, y, Luma([luma.round().clamp(0.0, 255.0) as u8]));
    }
    gray
}

/// Mirror an out-of-range index without repeating the edge pixel
fn reflect_101(index: i64, len: i64) -> u32 {
    if len == 1 {
        return 0;
    }
    let mut i = index;
    if i < 0 {
        i = -i;
    }
    if i >= len {
        i = 2 * (len - 1) - i;
    }
    i as u32
}

/// Population variance of the 4-neighbour Laplacian response
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = (i64::from(gray.width()), i64::from(gray.height()));
    let count = (w * h) as f64;
    if count == 0.0 {
        return 0.0;
    }

    let at = |x: i64, y: i64| -> f64 {
        f64::from(gray.get_pixel(reflect_101(x, w), reflect_101(y, h)).0[0])
    };

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in 0..h {
        for x in 0..w {
            let response =
                at(x, y - 1) + at(x - 1, y) + at(x + 1, y) + at(x, y + 1) - 4.0 * at(x, y);
            sum += response;
            sum_sq += response * response;
        }
    }

    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}

/// Compute the five descriptors of an RGB image
pub fn extract_visual_features(image: &RgbImage) -> Result<VisualFeatures, PredictionError> {
    let pixels = u64::from(image.width()) * u64::from(image.height());
    if pixels == 0 {
        return Err(PredictionError::InvalidImage("image has zero area".to_string()));
    }

    let (mut hue, mut sat, mut bright, mut a) = (0u64, 0u64, 0u64, 0u64);
    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        let channels = pixel_channels(r, g, b);
        hue += u64::from(channels.hue);
        sat += u64::from(channels.saturation);
        bright += u64::from(channels.brightness);
        a += u64::from(channels.a_channel);
    }

    let n = pixels as f64;
    let features = VisualFeatures {
        hue: hue as f64 / n,
        saturation: sat as f64 / n,
        brightness: bright as f64 / n,
        sharpness: laplacian_variance(&rgb_to_gray(image)),
        a_channel: a as f64 / n,
    };

    tracing::debug!(
        hue = features.hue,
        saturation = features.saturation,
        brightness = features.brightness,
        sharpness = features.sharpness,
        a_channel = features.a_channel,
        "Extracted visual features"
    );

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgb};
    use std::io::Cursor;

    fn uniform(w: u32, h: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb(rgb))
    }

    #[test]
    fn test_uniform_image_has_zero_sharpness() {
        let features = extract_visual_features(&uniform(20, 10, [120, 200, 40])).unwrap();
        assert_eq!(features.sharpness, 0.0);
    }

    #[test]
    fn test_zero_area_image_rejected() {
        let result = extract_visual_features(&RgbImage::new(0, 0));
        assert!(matches!(result, Err(PredictionError::InvalidImage(_))));
        let result = extract_visual_features(&RgbImage::new(16, 0));
        assert!(matches!(result, Err(PredictionError::InvalidImage(_))));
        assert_eq!(laplacian_variance(&GrayImage::new(0, 0)), 0.0);
    }

    #[test]
    fn test_pure_red_channels() {
        let features = extract_visual_features(&uniform(8, 8, [255, 0, 0])).unwrap();
        assert_eq!(features.hue, 0.0);
        assert_eq!(features.saturation, 255.0);
        assert_eq!(features.brightness, 255.0);
        // Lab a* of sRGB red is about +80
        assert!(features.a_channel > 200.0, "a = {}", features.a_channel);
    }

    #[test]
    fn test_green_and_yellow_hue_scale() {
        let green = extract_visual_features(&uniform(4, 4, [0, 255, 0])).unwrap();
        assert_eq!(green.hue, 60.0);
        assert!(green.a_channel < 60.0);

        let yellow = extract_visual_features(&uniform(4, 4, [255, 255, 0])).unwrap();
        assert_eq!(yellow.hue, 30.0);
    }

    #[test]
    fn test_gray_pixel_is_neutral() {
        let features = extract_visual_features(&uniform(4, 4, [128, 128, 128])).unwrap();
        assert_eq!(features.saturation, 0.0);
        assert_eq!(features.brightness, 128.0);
        assert_eq!(features.a_channel, 128.0);
    }

    #[test]
    fn test_grayscale_weights() {
        let gray = rgb_to_gray(&uniform(1, 1, [255, 0, 0]));
        assert_eq!(gray.get_pixel(0, 0).0[0], 76);
        let gray = rgb_to_gray(&uniform(1, 1, [0, 255, 0]));
        assert_eq!(gray.get_pixel(0, 0).0[0], 150);
    }

    #[test]
    fn test_single_bright_pixel_laplacian() {
        // 3x3 with a single 255 centre; reflect-101 mirrors the centre row/column
        let mut gray = GrayImage::new(3, 3);
        gray.put_pixel(1, 1, Luma([255]));
        // responses: centre -1020, edge-neighbours 2*255 each (mirrored), corners 0
        let responses = [0.0, 510.0, 0.0, 510.0, -1020.0, 510.0, 0.0, 510.0, 0.0];
        let mean: f64 = responses.iter().sum::<f64>() / 9.0;
        let var: f64 = responses.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 9.0;
        assert!((laplacian_variance(&gray) - var).abs() < 1e-6);
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
    }

    #[test]
    fn test_checkerboard_is_sharper_than_flat() {
        let checker = RgbImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let sharp = extract_visual_features(&checker).unwrap();
        let flat = extract_visual_features(&uniform(16, 16, [127, 127, 127])).unwrap();
        assert!(sharp.sharpness > 1000.0);
        assert!(sharp.sharpness > flat.sharpness);
    }

    #[test]
    fn test_decode_png_round_trip() {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(uniform(5, 7, [10, 20, 30]))
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (5, 7));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_image(b""), Err(PredictionError::InvalidImage(_))));
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(PredictionError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_quality_check() {
        let limits = ImageConfig::default();
        assert!(quality_check(&uniform(100, 100, [0, 0, 0]), &limits).is_none());
        let warning = quality_check(&uniform(64, 300, [0, 0, 0]), &limits).unwrap();
        assert!(warning.contains("64x300"));
    }
}
