//! Image formats and their encoding capabilities.
//!
//! Every per-format decision in the engine (whether quality search applies,
//! where the adaptive search starts, how low it may go) is dispatched through
//! [`ImageFormat::capability`] and the constants on [`ImageFormat`] rather
//! than by comparing MIME strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raster formats the engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

/// How an output format responds to the quality parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatCapability {
    /// Lossy codec with a quality knob (JPEG, WebP).
    Lossy,
    /// Lossless still raster; quality has no effect (PNG).
    LosslessRaster,
    /// Palette/animation raster; quality has no effect and only the first
    /// frame is processed (GIF).
    AnimatedRaster,
}

impl FormatCapability {
    /// Whether quality search can move the encoded size at all.
    pub fn supports_quality(self) -> bool {
        matches!(self, FormatCapability::Lossy)
    }
}

impl ImageFormat {
    /// Parse a declared MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// Identify the format from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Gif => Some(ImageFormat::Gif),
            image::ImageFormat::WebP => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// Resolve the source format: the declared MIME type wins, the bytes are
    /// sniffed when it is missing or unknown.
    pub fn detect(declared_mime: &str, bytes: &[u8]) -> Option<Self> {
        Self::from_mime(declared_mime).or_else(|| Self::sniff(bytes))
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn capability(self) -> FormatCapability {
        match self {
            ImageFormat::Jpeg | ImageFormat::Webp => FormatCapability::Lossy,
            ImageFormat::Png => FormatCapability::LosslessRaster,
            ImageFormat::Gif => FormatCapability::AnimatedRaster,
        }
    }

    /// Starting quality for the adaptive-step search.
    pub fn initial_quality(self) -> f32 {
        match self {
            ImageFormat::Webp => 0.95,
            _ => 0.7,
        }
    }

    /// Lowest quality the adaptive-step search will try.
    pub fn quality_floor(self) -> f32 {
        match self {
            ImageFormat::Webp => 0.6,
            _ => 0.3,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Requested output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetFormat {
    /// Re-encode in the source's own format.
    #[default]
    KeepOriginal,
    /// Convert to lossy WebP.
    ConvertToWebp,
}

impl TargetFormat {
    /// The format a source of `source` format is encoded to.
    pub fn output_for(self, source: ImageFormat) -> ImageFormat {
        match self {
            TargetFormat::KeepOriginal => source,
            TargetFormat::ConvertToWebp => ImageFormat::Webp,
        }
    }
}

/// Unrecognized target format string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown target format: {0}")]
pub struct UnknownTargetFormat(pub String);

impl FromStr for TargetFormat {
    type Err = UnknownTargetFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "original" | "keep-original" => Ok(TargetFormat::KeepOriginal),
            "webp" | "convert-to-webp" | "convert-to-lossy" | "convert-to-lossy-webp" => {
                Ok(TargetFormat::ConvertToWebp)
            }
            _ => Err(UnknownTargetFormat(s.to_string())),
        }
    }
}

/// Replace the extension of `file_name` with the one for `format`.
///
/// The name is left untouched when the format already matches its
/// extension (so `photo.jpeg` stays `photo.jpeg`).
pub fn output_file_name(file_name: &str, format: ImageFormat) -> String {
    let (stem, ext) = match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], Some(&file_name[idx + 1..])),
        _ => (file_name, None),
    };
    if let Some(ext) = ext {
        if ImageFormat::from_extension(ext) == Some(format) {
            return file_name.to_string();
        }
    }
    format!("{}.{}", stem, format.extension())
}

impl ImageFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }
}
