//! Compression outcomes.
//!
//! Every request produces exactly one [`ProcessedImage`]: either a
//! [`CompressedImage`] or a [`CompressionFailure`] tagged with a
//! [`FailureKind`]. Nothing escapes the engine as a panic or a bare error.

use serde::{Deserialize, Serialize};

use crate::engine::CompressError;
use crate::format::ImageFormat;
use crate::request::SourceImage;

/// Which stage produced the returned bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// The source already fit; its bytes are returned untouched.
    DirectFit,
    /// Re-encoded at the original dimensions.
    QualitySearch,
    /// Re-encoded at reduced (or re-grown) dimensions.
    ResolutionSearch,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::DirectFit => "direct-fit",
            Strategy::QualitySearch => "quality-search",
            Strategy::ResolutionSearch => "resolution-search",
        }
    }
}

/// Whether the returned bytes honor the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetFit {
    WithinBudget,
    /// Every search was exhausted; this is the smallest candidate produced.
    Approximate,
}

/// Why a request produced no image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    DecodeFailure,
    EncodeFailure,
    Timeout,
    Exhausted,
    InvalidRequest,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::DecodeFailure => "decode-failure",
            FailureKind::EncodeFailure => "encode-failure",
            FailureKind::Timeout => "timeout",
            FailureKind::Exhausted => "exhausted",
            FailureKind::InvalidRequest => "invalid-request",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully compressed image.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Source file name with its extension matched to `format`.
    pub file_name: String,
    /// Encoder quality, `None` for direct fits and lossless formats.
    pub quality: Option<f32>,
    pub strategy: Strategy,
    pub fit: BudgetFit,
    pub original_size: usize,
    pub budget: usize,
}

impl CompressedImage {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn is_approximate(&self) -> bool {
        self.fit == BudgetFit::Approximate
    }
}

/// A request that produced no image.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionFailure {
    pub kind: FailureKind,
    pub message: String,
    pub original_size: usize,
    pub file_name: String,
}

impl CompressionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>, source: &SourceImage) -> Self {
        Self {
            kind,
            message: message.into(),
            original_size: source.len(),
            file_name: source.file_name().to_string(),
        }
    }

    pub fn from_error(err: &CompressError, source: &SourceImage) -> Self {
        Self::new(err.kind(), err.to_string(), source)
    }
}

/// The single outcome of a compression request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedImage {
    Success(CompressedImage),
    Failure(CompressionFailure),
}

impl ProcessedImage {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessedImage::Success(_))
    }

    /// Bytes a download would contain: the output on success, the untouched
    /// source on failure.
    pub fn size(&self) -> usize {
        match self {
            ProcessedImage::Success(image) => image.size(),
            ProcessedImage::Failure(failure) => failure.original_size,
        }
    }

    pub fn original_size(&self) -> usize {
        match self {
            ProcessedImage::Success(image) => image.original_size,
            ProcessedImage::Failure(failure) => failure.original_size,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            ProcessedImage::Success(image) => &image.file_name,
            ProcessedImage::Failure(failure) => &failure.file_name,
        }
    }

    pub fn as_success(&self) -> Option<&CompressedImage> {
        match self {
            ProcessedImage::Success(image) => Some(image),
            ProcessedImage::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&CompressionFailure> {
        match self {
            ProcessedImage::Success(_) => None,
            ProcessedImage::Failure(failure) => Some(failure),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.as_failure().map(|failure| failure.kind)
    }

    /// Drop the payload and keep only the bookkeeping.
    ///
    /// Releasing twice is a no-op.
    pub fn release(&mut self) {
        if let ProcessedImage::Success(image) = self {
            image.bytes = Vec::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success() -> ProcessedImage {
        ProcessedImage::Success(CompressedImage {
            bytes: vec![0u8; 300],
            width: 10,
            height: 10,
            format: ImageFormat::Jpeg,
            file_name: "a.jpg".into(),
            quality: Some(0.5),
            strategy: Strategy::QualitySearch,
            fit: BudgetFit::WithinBudget,
            original_size: 900,
            budget: 512,
        })
    }

    #[test]
    fn test_success_accessors() {
        let result = success();
        assert!(result.is_success());
        assert_eq!(result.size(), 300);
        assert_eq!(result.original_size(), 900);
        assert_eq!(result.file_name(), "a.jpg");
        assert_eq!(result.failure_kind(), None);
        assert_eq!(result.as_success().unwrap().mime_type(), "image/jpeg");
    }

    #[test]
    fn test_failure_accessors() {
        let source = SourceImage::new(vec![1; 42], "image/png", "b.png");
        let result = ProcessedImage::Failure(CompressionFailure::new(
            FailureKind::Timeout,
            "too slow",
            &source,
        ));
        assert!(!result.is_success());
        assert_eq!(result.size(), 42);
        assert_eq!(result.original_size(), 42);
        assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut result = success();
        result.release();
        result.release();
        assert_eq!(result.size(), 0);
        assert_eq!(result.original_size(), 900);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(FailureKind::DecodeFailure.to_string(), "decode-failure");
        assert_eq!(Strategy::ResolutionSearch.as_str(), "resolution-search");
    }
}
