//! Async Clipboard API backend.
//!
//! Writes through `navigator.clipboard.writeText`, which is only exposed in
//! secure contexts. The returned promise settles after the click handler has
//! finished, so the outcome is reported from a spawned future.

use js_sys::{Function, Promise, Reflect};
use rw_layout::{Action, ClipboardError, CopyBackend, CopyCompletion};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::Window;

use crate::document::describe;

/// Clipboard backend using `navigator.clipboard`.
#[derive(Debug, Clone)]
pub struct ClipboardApiBackend {
    window: Window,
}

impl ClipboardApiBackend {
    /// Create a backend for `window`.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn clipboard(&self) -> Option<JsValue> {
        let navigator = self.window.navigator();
        Reflect::get(&navigator, &JsValue::from_str("clipboard"))
            .ok()
            .filter(|clipboard| !clipboard.is_undefined() && !clipboard.is_null())
    }

    fn write_text(&self, text: &str) -> Result<Promise, ClipboardError> {
        let Some(clipboard) = self.clipboard() else {
            return Err(ClipboardError::Unavailable("navigator.clipboard is missing".to_owned()));
        };
        let write = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
            .map_err(|e| ClipboardError::Unavailable(describe(&e)))?
            .dyn_into::<Function>()
            .map_err(|_| ClipboardError::Unavailable("writeText is not a function".to_owned()))?;
        write
            .call1(&clipboard, &JsValue::from_str(text))
            .map_err(|e| ClipboardError::Unavailable(describe(&e)))?
            .dyn_into::<Promise>()
            .map_err(|_| {
                ClipboardError::Unavailable("writeText did not return a promise".to_owned())
            })
    }
}

impl CopyBackend for ClipboardApiBackend {
    fn write(&self, action: Action, text: &str, completion: CopyCompletion) {
        if action == Action::Cut {
            tracing::debug!("Cut on read-only content, copying instead");
        }

        let promise = match self.write_text(text) {
            Ok(promise) => promise,
            Err(e) => {
                completion.fail(e);
                return;
            }
        };

        wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(_) => completion.succeed(),
                Err(e) => completion.fail(ClipboardError::Unavailable(describe(&e))),
            }
        });
    }

    fn is_supported(&self) -> bool {
        self.clipboard().is_some()
    }
}
