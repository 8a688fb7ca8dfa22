use std::cell::RefCell;

use wasm_bindgen::convert::TryFromJsValue;
use wasm_bindgen::prelude::*;


pub type JsResult<T> = Result<T, JsValue>;

// The client is single-threaded, so wrapping all mutable singletons in `thread_local!` seems ok.
thread_local! {
    static LAST_PANIC: RefCell<String> = RefCell::new(String::new());
}

// Copied from console_error_panic_hook
#[wasm_bindgen]
extern "C" {
    type Error;
    #[wasm_bindgen(constructor)]
    fn new() -> Error;
    #[wasm_bindgen(structural, method, getter)]
    fn stack(error: &Error) -> String;
}

#[wasm_bindgen]
pub fn set_panic_hook() {
    use std::panic;
    use std::sync::Once;
    static SET_HOOK: Once = Once::new();
    SET_HOOK.call_once(|| {
        panic::set_hook(Box::new(|panic_info| {
            // Log to the browser developer console. For more details see
            // https://github.com/rustwasm/console_error_panic_hook#readme
            console_error_panic_hook::hook(panic_info);

            // Keep the last panic around so that the page can show it.
            let backtrace = Error::new().stack();
            LAST_PANIC.with(|cell| *cell.borrow_mut() = format!("{}\n{}", panic_info, backtrace));
        }));
    });
}

#[wasm_bindgen]
pub fn last_panic() -> String { LAST_PANIC.with(|cell| cell.borrow().clone()) }

#[wasm_bindgen(getter_with_clone)]
pub struct RustError {
    pub message: String,
}

#[macro_export]
macro_rules! rust_error {
    ($($arg:tt)*) => {
        wasm_bindgen::JsValue::from(
            $crate::web_error_handling::RustError{ message: format!($($arg)*) }
        )
    };
}

// Failures of background work (polling, fire-and-forget requests) are only logged: the next
// tick is the retry.
pub fn log_error(context: &str, error: &JsValue) {
    let message = format!("{}: {}", context, error_message(error));
    web_sys::console::error_1(&JsValue::from_str(&message));
}

// Errors raised by this crate are `RustError` objects; anything else comes from the browser.
pub fn error_message(error: &JsValue) -> String {
    if let Some(s) = error.as_string() {
        return s;
    }
    match RustError::try_from_js_value(error.clone()) {
        Ok(rust_error) => rust_error.message,
        Err(other) => format!("{:?}", other),
    }
}

pub fn log_warning(message: &str) { web_sys::console::warn_1(&JsValue::from_str(message)); }

pub fn log_info(message: &str) { web_sys::console::log_1(&JsValue::from_str(message)); }


#[cfg(test)]
mod tests {
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn rust_error_keeps_its_message() {
        let error = crate::rust_error!("GET {} failed: HTTP {}", "/data", 502);
        assert_eq!(error_message(&error), "GET /data failed: HTTP 502");
    }

    #[wasm_bindgen_test]
    fn foreign_errors_are_still_described() {
        assert_eq!(error_message(&JsValue::from_str("NetworkError")), "NetworkError");
        assert!(!error_message(&JsValue::from(42)).is_empty());
    }
}
