//! Compression WASM bindings.
//!
//! This module exposes the sizefit-core engine to JavaScript.
//!
//! # Functions
//!
//! - [`compress_to_target_size`] - Compress an uploaded image to a byte budget
//! - [`release_result`] - Release a result's bytes and object URL
//! - [`default_config`] - The engine defaults as a plain JS object
//!
//! # Example
//!
//! ```typescript
//! import { compress_to_target_size, release_result } from '@sizefit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_to_target_size(bytes, file.type, file.name, 200, 'original');
//! if (result.status === 'success') {
//!   preview.src = result.url();
//! } else {
//!   console.warn(result.error_kind, result.error_message);
//! }
//! // later
//! release_result(result);
//! ```

use sizefit_core::{
    CompressionEngine, CompressionFailure, EngineConfig, FailureKind, ImageCodec, ProcessedImage,
    SourceImage, TargetFormat,
};
use wasm_bindgen::prelude::*;

use crate::types::JsProcessedImage;

#[cfg(target_arch = "wasm32")]
type EngineClock = crate::clock::JsClock;
#[cfg(not(target_arch = "wasm32"))]
type EngineClock = sizefit_core::SystemClock;

/// Compress an image to at most `target_kb` kilobytes.
///
/// # Arguments
///
/// * `bytes` - The uploaded file contents
/// * `mime_type` - The file's declared MIME type (may be empty; bytes are sniffed)
/// * `file_name` - The original file name, used to name the output
/// * `target_kb` - Size budget in kilobytes (1 KB = 1024 bytes)
/// * `format` - `"original"` to keep the source format, `"webp"` to convert to lossy WebP
/// * `config` - Optional engine configuration object; omitted fields use defaults
///
/// # Returns
///
/// A `JsProcessedImage`. This function never throws: decode failures,
/// timeouts, exhaustion and invalid arguments are all reported through the
/// result's `status`, `error_kind` and `error_message`.
#[wasm_bindgen]
pub fn compress_to_target_size(
    bytes: Vec<u8>,
    mime_type: &str,
    file_name: &str,
    target_kb: f64,
    format: &str,
    config: JsValue,
) -> JsProcessedImage {
    let source = SourceImage::new(bytes, mime_type, file_name);
    let result = match parse_config(config) {
        Ok(config) => compress_with(&source, target_kb, format, config),
        Err(message) => invalid_request(&source, message),
    };
    JsProcessedImage::from(result)
}

/// Release a result: revoke its object URL and drop its bytes.
///
/// Safe to call more than once.
#[wasm_bindgen]
pub fn release_result(result: &mut JsProcessedImage) {
    result.release();
}

/// The default engine configuration as a JS object.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&EngineConfig::default())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize config: {}", e)))
}

fn parse_config(value: JsValue) -> Result<EngineConfig, String> {
    if value.is_undefined() || value.is_null() {
        return Ok(EngineConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| format!("Invalid config: {}", e))
}

/// Run one compression with an already-parsed configuration.
pub(crate) fn compress_with(
    source: &SourceImage,
    target_kb: f64,
    format: &str,
    config: EngineConfig,
) -> ProcessedImage {
    let format = match format.parse::<TargetFormat>() {
        Ok(format) => format,
        Err(err) => return invalid_request(source, err.to_string()),
    };
    let codec = ImageCodec::new(config.resize_filter);
    match CompressionEngine::from_parts(config, codec, EngineClock::default()) {
        Ok(engine) => engine.compress_source(source, target_kb, format),
        Err(err) => invalid_request(source, format!("Invalid config: {}", err)),
    }
}

fn invalid_request(source: &SourceImage, message: String) -> ProcessedImage {
    log::warn!("{}: {}", source.file_name(), message);
    ProcessedImage::Failure(CompressionFailure::new(
        FailureKind::InvalidRequest,
        message,
        source,
    ))
}

/// Tests for compress bindings.
///
/// Functions taking or returning `JsValue` only work on wasm32 targets, so
/// the native tests go through `compress_with`.
#[cfg(test)]
mod tests {
    use super::*;
    use sizefit_core::encode::encode_png;
    use sizefit_core::{DecodedRaster, Strategy};

    fn small_png() -> Vec<u8> {
        let raster = DecodedRaster::new(16, 16, vec![180u8; 16 * 16 * 4], false);
        encode_png(&raster).unwrap()
    }

    #[test]
    fn test_compress_with_direct_fit() {
        let bytes = small_png();
        let source = SourceImage::new(bytes.clone(), "image/png", "tile.png");
        let result = compress_with(&source, 50.0, "original", EngineConfig::default());

        let image = result.as_success().unwrap();
        assert_eq!(image.strategy, Strategy::DirectFit);
        assert_eq!(image.bytes, bytes);

        let js = JsProcessedImage::from(result);
        assert_eq!(js.status(), "success");
        assert_eq!(js.strategy().as_deref(), Some("direct-fit"));
    }

    #[test]
    fn test_compress_with_unknown_format_string() {
        let source = SourceImage::new(small_png(), "image/png", "tile.png");
        let result = compress_with(&source, 50.0, "tiff", EngineConfig::default());
        assert_eq!(result.failure_kind(), Some(FailureKind::InvalidRequest));
    }

    #[test]
    fn test_compress_with_invalid_config() {
        let source = SourceImage::new(small_png(), "image/png", "tile.png");
        let config = EngineConfig {
            timeout_ms: 0,
            ..EngineConfig::default()
        };
        let result = compress_with(&source, 50.0, "original", config);
        let failure = result.as_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidRequest);
        assert!(failure.message.starts_with("Invalid config"));
    }

    #[test]
    fn test_compress_with_invalid_target() {
        let source = SourceImage::new(small_png(), "image/png", "tile.png");
        let result = compress_with(&source, -3.0, "original", EngineConfig::default());
        assert_eq!(result.failure_kind(), Some(FailureKind::InvalidRequest));
    }

    #[test]
    fn test_compress_with_garbage_bytes() {
        let source = SourceImage::new(b"GIF89a but not really".to_vec(), "", "fake.gif");
        let result = compress_with(&source, 50.0, "original", EngineConfig::default());
        assert_eq!(result.failure_kind(), Some(FailureKind::DecodeFailure));
    }

    #[test]
    fn test_compress_with_webp_conversion() {
        let source = SourceImage::new(small_png(), "image/png", "tile.png");
        // A budget below the source size forces a re-encode.
        let target_kb = (source.len() as f64 - 1.0) / 1024.0;
        let result = compress_with(&source, target_kb, "webp", EngineConfig::default());

        let image = result.as_success().unwrap();
        assert_eq!(image.format, sizefit_core::ImageFormat::Webp);
        assert_eq!(image.file_name, "tile.webp");
    }
}
