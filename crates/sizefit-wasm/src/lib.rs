//! Sizefit WASM - WebAssembly bindings for Sizefit
//!
//! This crate provides WASM bindings to expose the sizefit-core compression
//! engine to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `compress` - Size-targeting compression entry points
//! - `types` - The `JsProcessedImage` result wrapper (Blob / object URL handling)
//! - `logger` - Forwards engine logs to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_to_target_size, set_log_level } from '@sizefit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//! set_log_level('info');
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_to_target_size(bytes, file.type, file.name, 200, 'webp');
//! console.log(`${result.original_size} -> ${result.size} bytes`);
//! ```

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod clock;
mod compress;
mod logger;
mod types;

// Re-export public types
pub use compress::{compress_to_target_size, default_config, release_result};
pub use logger::set_log_level;
pub use types::JsProcessedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Warn);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
