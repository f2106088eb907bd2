//! Browser console

use serde::Serialize;
use wasm_bindgen::JsValue;

use super::Console;
use crate::value::Frozen;

/// Console that writes to the browser's `console.log/warn/error`
///
/// Composite arguments are handed over as plain JS objects so the developer
/// tools can expand them.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebConsole;

fn to_js_args(prefix: &str, args: &[Frozen]) -> js_sys::Array {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    let array = js_sys::Array::new();

    array.push(&JsValue::from_str(prefix));
    for arg in args {
        let value = arg
            .serialize(&serializer)
            .unwrap_or_else(|_| JsValue::from_str(&arg.to_string()));
        array.push(&value);
    }

    array
}

impl Console for WebConsole {
    fn log(&self, prefix: &str, args: &[Frozen]) {
        web_sys::console::log(&to_js_args(prefix, args));
    }

    fn warn(&self, prefix: &str, args: &[Frozen]) {
        web_sys::console::warn(&to_js_args(prefix, args));
    }

    fn error(&self, prefix: &str, args: &[Frozen]) {
        web_sys::console::error(&to_js_args(prefix, args));
    }
}
