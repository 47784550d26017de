//! Sizefit Core - size-targeting image compression
//!
//! This crate provides the core compression engine for Sizefit: decoding
//! uploaded images, searching encoder quality and output resolution, and
//! returning the best candidate that fits a byte budget.

pub mod clock;
pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod engine;
pub mod format;
pub mod request;
pub mod result;

pub use clock::{Clock, Deadline, DeadlineExceeded, ManualClock, SystemClock};
pub use codec::{Codec, ImageCodec};
pub use config::{
    AdaptiveConfig, BisectionConfig, ConfigError, EngineConfig, QualityStrategy, ResolutionConfig,
};
pub use decode::{DecodeError, DecodedRaster, FilterType};
pub use encode::{EncodeCandidate, EncodeError};
pub use engine::{compress_to_target_size, release_result, CompressError, CompressionEngine};
pub use format::{FormatCapability, ImageFormat, TargetFormat, UnknownTargetFormat};
pub use request::{CompressionRequest, RequestError, SourceImage};
pub use result::{
    BudgetFit, CompressedImage, CompressionFailure, FailureKind, ProcessedImage, Strategy,
};
