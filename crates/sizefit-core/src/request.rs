//! Compression inputs.

use thiserror::Error;

use crate::format::TargetFormat;

/// An uploaded image, read-only for the lifetime of a compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    bytes: Vec<u8>,
    mime_type: String,
    file_name: String,
}

impl SourceImage {
    /// Wrap uploaded bytes with their declared MIME type and file name.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The MIME type declared by the caller (may be empty).
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A request that cannot be run at all.
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("target size must be a positive number of kilobytes, got {0}")]
    InvalidTarget(f64),
}

/// One compression job: a source, a size budget and an output format.
#[derive(Debug, Clone, Copy)]
pub struct CompressionRequest<'a> {
    source: &'a SourceImage,
    target_kb: f64,
    format: TargetFormat,
}

impl<'a> CompressionRequest<'a> {
    /// Build a request.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::InvalidTarget` unless `target_kb` is finite and
    /// amounts to at least one byte.
    pub fn new(
        source: &'a SourceImage,
        target_kb: f64,
        format: TargetFormat,
    ) -> Result<Self, RequestError> {
        if !target_kb.is_finite() || target_kb * 1024.0 < 1.0 {
            return Err(RequestError::InvalidTarget(target_kb));
        }
        Ok(Self {
            source,
            target_kb,
            format,
        })
    }

    pub fn source(&self) -> &'a SourceImage {
        self.source
    }

    pub fn target_kb(&self) -> f64 {
        self.target_kb
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    /// The byte ceiling: `floor(target_kb * 1024)`.
    pub fn budget_bytes(&self) -> usize {
        (self.target_kb * 1024.0).floor() as usize
    }
}
