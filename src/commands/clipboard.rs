//! Clipboard Commands
//!
//! Frontend wrapper for the async clipboard API.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["navigator", "clipboard"], js_name = writeText, catch)]
    async fn write_text(text: &str) -> Result<JsValue, JsValue>;
}

/// Copy `text` to the system clipboard
pub async fn copy_text(text: &str) -> Result<(), String> {
    write_text(text)
        .await
        .map(|_| ())
        .map_err(|e| format!("Failed to write clipboard: {:?}", e))
}
