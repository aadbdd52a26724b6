//! Error types for page layout installation.

use rw_config::ConfigError;
use rw_dom::DomError;

use crate::clipboard::ClipboardError;

/// Page layout error.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A required selector matched no element; the feature using it is disabled.
    #[error("{option} selector {selector:?} matched no element")]
    MissingElement {
        /// Configuration option name (e.g. "`sidebar_container`").
        option: &'static str,
        /// Selector that was queried.
        selector: String,
    },
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Document operation failed.
    #[error("Document error: {0}")]
    Dom(#[from] DomError),
    /// Clipboard collaborator error.
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),
}
