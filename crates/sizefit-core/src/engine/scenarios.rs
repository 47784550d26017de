//! End-to-end runs through the production codec.

use super::*;
use crate::decode::{decode_image, DecodedRaster};
use crate::encode::{encode_jpeg, encode_png};

/// xorshift32 noise, deterministic per seed.
fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// A gradient with mild grain, compressible the way a photo is.
fn photo_rgb(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let grain = noise((width * height) as usize, seed);
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let g = grain[(y * width + x) as usize] / 8;
            pixels.push(((x * 200) / width) as u8 + g);
            pixels.push(((y * 200) / height) as u8 + g);
            pixels.push((((x + y) * 100) / (width + height)) as u8 + g);
        }
    }
    pixels
}

fn photo_jpeg(width: u32, height: u32, quality: f32, seed: u32) -> Vec<u8> {
    encode_jpeg(&photo_rgb(width, height, seed), width, height, quality).unwrap()
}

fn noise_png(width: u32, height: u32, seed: u32, alpha: bool) -> Vec<u8> {
    let mut pixels = noise((width * height * 4) as usize, seed);
    if !alpha {
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }
    }
    encode_png(&DecodedRaster::new(width, height, pixels, alpha)).unwrap()
}

fn kb(bytes: usize) -> f64 {
    bytes as f64 / 1024.0
}

#[test]
fn test_scenario_direct_fit() {
    let bytes = photo_jpeg(96, 64, 0.8, 7);
    let source = SourceImage::new(bytes.clone(), "image/jpeg", "small.jpg");
    assert!(source.len() < 200 * 1024);

    let result = compress_to_target_size(&source, 200.0, TargetFormat::KeepOriginal);
    let image = result.as_success().unwrap();
    assert_eq!(image.strategy, Strategy::DirectFit);
    assert_eq!(image.bytes, bytes);
    assert_eq!((image.width, image.height), (96, 64));
}

#[test]
fn test_scenario_quality_search_keeps_dimensions() {
    let pristine = photo_jpeg(320, 240, 1.0, 11);
    let half = photo_jpeg(320, 240, 0.5, 11);
    let target_kb = kb(half.len()) * 1.1;
    assert!(pristine.len() as f64 > target_kb * 1024.0);

    let source = SourceImage::new(pristine, "image/jpeg", "photo.jpg");
    let result = compress_to_target_size(&source, target_kb, TargetFormat::KeepOriginal);
    let image = result.as_success().unwrap();
    assert_eq!(image.strategy, Strategy::QualitySearch);
    assert_eq!(image.format, ImageFormat::Jpeg);
    assert_eq!((image.width, image.height), (320, 240));
    assert!(image.size() <= image.budget);

    let decoded = decode_image(&image.bytes).unwrap();
    assert_eq!((decoded.width, decoded.height), (320, 240));
}

#[test]
fn test_scenario_lossless_shrinks_dimensions() {
    let bytes = noise_png(256, 256, 3, false);
    let source = SourceImage::new(bytes, "image/png", "noise.png");
    assert!(source.len() > 100 * 1024);

    let result = compress_to_target_size(&source, 100.0, TargetFormat::KeepOriginal);
    let image = result.as_success().unwrap();
    assert_eq!(image.strategy, Strategy::ResolutionSearch);
    assert_eq!(image.format, ImageFormat::Png);
    assert_eq!(image.fit, BudgetFit::WithinBudget);
    assert!(image.size() <= 100 * 1024);
    assert!(image.width < 256 && image.height < 256);
    assert_eq!(ImageFormat::sniff(&image.bytes), Some(ImageFormat::Png));
}

#[test]
fn test_scenario_pathological_target_terminates() {
    let bytes = noise_png(300, 250, 5, false);
    let source = SourceImage::new(bytes, "image/png", "huge.png");

    let result = compress_to_target_size(&source, 1.0, TargetFormat::KeepOriginal);
    match &result {
        ProcessedImage::Success(image) => {
            assert!(image.is_approximate() || image.size() <= 1024);
            assert!(image.size() < source.len());
        }
        ProcessedImage::Failure(failure) => {
            assert!(matches!(
                failure.kind,
                FailureKind::Exhausted | FailureKind::Timeout
            ));
        }
    }
}

#[test]
fn test_scenario_convert_to_webp_keeps_alpha() {
    let bytes = noise_png(128, 96, 9, true);
    let source = SourceImage::new(bytes, "image/png", "sprite.png");

    let result = compress_to_target_size(&source, 20.0, TargetFormat::ConvertToWebp);
    let image = result.as_success().unwrap();
    assert_eq!(image.format, ImageFormat::Webp);
    assert_eq!(image.file_name, "sprite.webp");
    assert_eq!(ImageFormat::sniff(&image.bytes), Some(ImageFormat::Webp));
    assert!(image.size() <= 20 * 1024 || image.is_approximate());

    let decoded = decode_image(&image.bytes).unwrap();
    assert!(decoded.has_alpha);
}

#[test]
fn test_scenario_batch_results_trace_to_sources() {
    let dims = [(320, 240), (240, 320), (200, 200), (400, 100), (150, 300)];
    let sources: Vec<SourceImage> = dims
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            SourceImage::new(
                photo_jpeg(w, h, 1.0, 100 + i as u32),
                "image/jpeg",
                format!("img{i}.jpg"),
            )
        })
        .collect();
    let requests: Vec<_> = sources
        .iter()
        .map(|s| CompressionRequest::new(s, 12.0, TargetFormat::KeepOriginal).unwrap())
        .collect();

    let engine = CompressionEngine::default();
    let results = engine.compress_batch(&requests);
    assert_eq!(results.len(), dims.len());

    for ((result, source), &(w, h)) in results.iter().zip(&sources).zip(&dims) {
        let image = result.as_success().unwrap();
        assert_eq!(image.file_name, source.file_name());
        assert_eq!(image.original_size, source.len());
        assert!(image.size() <= 12 * 1024 || image.is_approximate());
        assert!(image.width <= w && image.height <= h);

        let source_aspect = w as f64 / h as f64;
        let output_aspect = image.width as f64 / image.height as f64;
        assert!((source_aspect - output_aspect).abs() / source_aspect < 0.05);
    }
}
