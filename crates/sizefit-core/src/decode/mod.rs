//! Image decoding for the compression engine.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG, GIF and WebP sources into RGBA rasters
//! - Normalizing EXIF orientation the way a browser does before drawing
//! - Detecting animated sources (processed as their first frame only)
//! - Resizing rasters for the resolution search
//!
//! # Architecture
//!
//! Rasters are owned by the compression request that decoded them and never
//! escape the engine. All operations are synchronous and single-threaded.
//!
//! # Examples
//!
//! ```ignore
//! use sizefit_core::decode::{decode_image, resize, FilterType};
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let raster = decode_image(&bytes).unwrap();
//! let half = resize(&raster, raster.width / 2, raster.height / 2, FilterType::Lanczos3).unwrap();
//! ```

mod orientation;
mod reader;
mod resize;
mod types;

pub use orientation::{read_orientation, Orientation};
pub use reader::{decode_image, is_animated};
pub use resize::{resize, scaled_dimensions};
pub use types::{DecodeError, DecodedRaster, FilterType};
