//! Error types for document access.

/// Document operation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Selector could not be parsed by the backend.
    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector {
        /// The offending selector.
        selector: String,
        /// Parser message.
        message: String,
    },
    /// Element handle does not belong to this document.
    #[error("Unknown element: {0}")]
    UnknownElement(String),
    /// Operation is not supported for this element (e.g. inline style on a non-HTML element).
    #[error("Unsupported operation on <{tag}>: {operation}")]
    Unsupported {
        /// Element tag name.
        tag: String,
        /// Operation name.
        operation: &'static str,
    },
    /// Backend (browser) reported an error.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl DomError {
    /// Create a backend error from any displayable value.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_selector_display() {
        let err = DomError::InvalidSelector {
            selector: "h2 >".to_owned(),
            message: "dangling combinator".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid selector \"h2 >\": dangling combinator"
        );
    }

    #[test]
    fn test_unsupported_display() {
        let err = DomError::Unsupported {
            tag: "svg".to_owned(),
            operation: "set_style",
        };
        assert_eq!(err.to_string(), "Unsupported operation on <svg>: set_style");
    }
}
