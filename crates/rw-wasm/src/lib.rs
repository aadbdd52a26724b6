//! WebAssembly bindings for RW documentation page enhancements.
//!
//! Runs the [`rw_layout`] components against the live browser page:
//!
//! - [`WebDocument`] implements the [`rw_dom`] traits with `web-sys`
//! - [`ClipboardApiBackend`] copies through `navigator.clipboard`
//! - [`install`] wires everything from a JavaScript configuration object
//!
//! # Example
//!
//! ```javascript
//! import init, { install } from '@rw/layout';
//!
//! await init();
//!
//! const layout = install({ headersContainer: '.documentation-container' });
//! // or: install(await (await fetch('/rw.toml')).text());
//! console.log(layout.tocEntries, layout.warnings);
//! layout.destroy();
//! ```
//!
//! Configuration keys accept both camelCase and snake_case; missing keys use
//! the defaults of [`LayoutConfig`].

mod clipboard;
mod document;
#[cfg(feature = "console-logging")]
mod logging;

pub use clipboard::ClipboardApiBackend;
pub use document::WebDocument;

use std::rc::Rc;

use rw_config::{Config, LayoutConfig};
use rw_layout::{CopyBackend, InstalledLayout};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
///
/// Sets up panic messages and, with the `console-logging` feature, forwards
/// tracing output to the browser console. Called automatically by the
/// generated JavaScript.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(feature = "console-logging")]
    logging::init(tracing::Level::INFO);
}

/// Get the version of the rw-wasm library.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_owned()
}

/// Page enhancements installed by [`install`].
///
/// Call `destroy()` to detach every listener. Elements added to the page
/// stay in place.
#[wasm_bindgen]
pub struct LayoutHandle {
    layout: Option<InstalledLayout<WebDocument>>,
}

#[wasm_bindgen]
impl LayoutHandle {
    /// Table of contents entries at all depths.
    #[wasm_bindgen(getter, js_name = tocEntries)]
    pub fn toc_entries(&self) -> usize {
        self.layout.as_ref().map_or(0, |l| l.report().toc_entries)
    }

    /// Anchors added to headings and API entries.
    #[wasm_bindgen(getter)]
    pub fn anchors(&self) -> usize {
        self.layout.as_ref().map_or(0, |l| l.report().anchors)
    }

    /// Copy buttons added to code blocks.
    #[wasm_bindgen(getter, js_name = copyButtons)]
    pub fn copy_buttons(&self) -> usize {
        self.layout.as_ref().map_or(0, |l| l.report().copy_buttons)
    }

    /// Features skipped during installation, with the reason.
    #[wasm_bindgen(getter)]
    pub fn warnings(&self) -> Vec<String> {
        self.layout
            .as_ref()
            .map(|l| l.report().warnings.clone())
            .unwrap_or_default()
    }

    /// Whether the enhancements are still wired.
    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.layout.is_some()
    }

    /// Detach every listener. Calling it again does nothing.
    pub fn destroy(&mut self) {
        if let Some(layout) = self.layout.take() {
            layout.destroy();
        }
    }
}

/// Install the page enhancements.
///
/// `config` is an optional object with [`LayoutConfig`] fields, or the text
/// of an `rw.toml` file whose `[layout]` table is used. Fails on an invalid
/// configuration; missing page regions only disable the features that need
/// them and are listed in `warnings`.
#[wasm_bindgen]
pub fn install(config: JsValue) -> Result<LayoutHandle, JsError> {
    let config: LayoutConfig = if config.is_undefined() || config.is_null() {
        LayoutConfig::default()
    } else if let Some(toml) = config.as_string() {
        Config::from_toml_str(&toml)?.layout
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    let document = Rc::new(WebDocument::new()?);
    let backend: Rc<dyn CopyBackend> = Rc::new(ClipboardApiBackend::new(document.window().clone()));
    let layout = rw_layout::install(&document, &config, backend)?;

    Ok(LayoutHandle {
        layout: Some(layout),
    })
}
