//! Deadline clock for the browser.

use sizefit_core::Clock;

/// `Date.now()`-backed clock; `std::time::Instant` panics on wasm32.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_js_clock_advances() {
        let clock = JsClock;
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(a > 0.0);
        assert!(b >= a);
    }
}
