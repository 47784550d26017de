//! WASM-compatible wrapper for compression results.
//!
//! This module provides the JavaScript-facing view of a core
//! `ProcessedImage`, plus the Blob / object URL plumbing the upload UI needs.

use sizefit_core::{BudgetFit, ProcessedImage};
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, File, FilePropertyBag, Url};

/// A compression result for JavaScript.
///
/// Every call to `compress_to_target_size` returns one of these, success or
/// not; check `status` first.
///
/// # Memory Management
///
/// The compressed bytes live in WASM memory. `url()` mints at most one object
/// URL per result, created on first use. Call `release()` (or
/// `release_result(result)`) once the UI is done with the image: it revokes
/// the URL and drops the bytes. Releasing twice is harmless, and `free()`
/// releases as well.
#[wasm_bindgen]
pub struct JsProcessedImage {
    inner: ProcessedImage,
    url: Option<String>,
}

#[wasm_bindgen]
impl JsProcessedImage {
    /// `"success"` or `"error"`.
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        if self.inner.is_success() {
            "success".to_string()
        } else {
            "error".to_string()
        }
    }

    /// Compressed size in bytes; the original size for failures, 0 once
    /// released.
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    #[wasm_bindgen(getter)]
    pub fn original_size(&self) -> usize {
        self.inner.original_size()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.as_success().map_or(0, |image| image.width)
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.as_success().map_or(0, |image| image.height)
    }

    /// Output MIME type, empty for failures.
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner
            .as_success()
            .map_or_else(String::new, |image| image.mime_type().to_string())
    }

    /// Output file name (extension follows the output format).
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name().to_string()
    }

    /// Encoder quality in 0-1, `undefined` for direct fits and lossless output.
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> Option<f32> {
        self.inner.as_success().and_then(|image| image.quality)
    }

    /// True when no candidate fit and the closest one was returned instead.
    #[wasm_bindgen(getter)]
    pub fn approximate(&self) -> bool {
        self.inner
            .as_success()
            .is_some_and(|image| image.fit == BudgetFit::Approximate)
    }

    /// `"direct-fit"`, `"quality-search"` or `"resolution-search"`.
    #[wasm_bindgen(getter)]
    pub fn strategy(&self) -> Option<String> {
        self.inner
            .as_success()
            .map(|image| image.strategy.as_str().to_string())
    }

    /// Failure kind, e.g. `"decode-failure"` or `"timeout"`.
    #[wasm_bindgen(getter)]
    pub fn error_kind(&self) -> Option<String> {
        self.inner
            .failure_kind()
            .map(|kind| kind.as_str().to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        self.inner
            .as_failure()
            .map(|failure| failure.message.clone())
    }

    /// Returns the compressed bytes as a Uint8Array (a copy).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner
            .as_success()
            .map_or_else(Vec::new, |image| image.bytes.clone())
    }

    /// Object URL for the compressed image, created on first call.
    ///
    /// # Errors
    ///
    /// Returns an error for failed or released results, or if the browser
    /// refuses to create the Blob.
    pub fn url(&mut self) -> Result<String, JsValue> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        let blob = self.blob()?;
        let url = Url::create_object_url_with_blob(&blob)?;
        self.url = Some(url.clone());
        Ok(url)
    }

    /// The compressed image as a `File` carrying the output name and type.
    ///
    /// # Errors
    ///
    /// Returns an error for failed or released results.
    pub fn file(&self) -> Result<File, JsValue> {
        let image = self.payload()?;
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(image.bytes.as_slice()));
        let options = FilePropertyBag::new();
        options.set_type(image.mime_type());
        File::new_with_u8_array_sequence_and_options(&parts, &image.file_name, &options)
    }

    /// Revoke the object URL (if one was minted) and drop the bytes.
    pub fn release(&mut self) {
        self.revoke_url();
        self.inner.release();
    }
}

impl JsProcessedImage {
    fn payload(&self) -> Result<&sizefit_core::CompressedImage, JsValue> {
        match self.inner.as_success() {
            Some(image) if !image.bytes.is_empty() => Ok(image),
            Some(_) => Err(JsValue::from_str("result has been released")),
            None => Err(JsValue::from_str("compression failed; no image to export")),
        }
    }

    fn blob(&self) -> Result<Blob, JsValue> {
        let image = self.payload()?;
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(image.bytes.as_slice()));
        let options = BlobPropertyBag::new();
        options.set_type(image.mime_type());
        Blob::new_with_u8_array_sequence_and_options(&parts, &options)
    }

    fn revoke_url(&mut self) {
        if let Some(url) = self.url.take() {
            if let Err(err) = Url::revoke_object_url(&url) {
                log::warn!("failed to revoke {}: {:?}", url, err);
            }
        }
    }
}

impl From<ProcessedImage> for JsProcessedImage {
    fn from(inner: ProcessedImage) -> Self {
        Self { inner, url: None }
    }
}

impl Drop for JsProcessedImage {
    fn drop(&mut self) {
        self.revoke_url();
    }
}
