//! Configuration management for RW page layout.
//!
//! Parses the `[layout]` table of `rw.toml` with serde.
//!
//! Every option has a default matching the stock documentation theme, so an
//! empty table yields a working configuration. The same
//! [`LayoutConfig`] structure is accepted by the browser entry point, where
//! options may also be spelled in camelCase (`headersContainer`).
//!
//! ```toml
//! [layout]
//! headers_container = ".documentation-container"
//! sidebar_container = "#sidebar"
//! header_start_level = 2
//! ```

use serde::{Deserialize, Serialize};

/// Highest heading start level; the level below it must still exist (`h6`).
const MAX_START_LEVEL: u8 = 5;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page layout configuration.
    pub layout: LayoutConfig,
}

/// Page layout configuration.
///
/// Selectors name the page regions the enhancements read and write.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Element containing the documentation headings.
    #[serde(alias = "headersContainer")]
    pub headers_container: String,
    /// Element the table of contents is appended to.
    #[serde(alias = "sidebarContainer")]
    pub sidebar_container: String,
    /// Top heading level in the table of contents; the next level is nested under it.
    #[serde(alias = "headerStartLevel")]
    pub header_start_level: u8,
    /// Code blocks that get a copy button.
    #[serde(alias = "codeBlockSelector")]
    pub code_block_selector: String,
    /// API entries that get a deep-link anchor alongside headings.
    #[serde(alias = "apiEntrySelector")]
    pub api_entry_selector: String,
    /// Hero section above the content (optional on the page).
    #[serde(alias = "heroSelector")]
    pub hero_selector: String,
    /// Page footer (optional on the page).
    #[serde(alias = "footerSelector")]
    pub footer_selector: String,
    /// Top navigation bar (optional on the page).
    #[serde(alias = "navSelector")]
    pub nav_selector: String,
    /// Region whose top padding offsets the sidebar (optional on the page).
    #[serde(alias = "contentPaddingSelector")]
    pub content_padding_selector: String,
    /// Image source of the copy button icon.
    #[serde(alias = "clipboardIcon")]
    pub clipboard_icon: String,
    /// Tooltip shown after a successful copy.
    #[serde(alias = "copiedLabel")]
    pub copied_label: String,
    /// Tooltip shown when copying failed.
    #[serde(alias = "copyFallbackLabel")]
    pub copy_fallback_label: String,
    /// Space kept between the pinned sidebar and the footer, in pixels.
    #[serde(alias = "footerGap")]
    pub footer_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            headers_container: ".documentation-container".to_owned(),
            sidebar_container: "#sidebar".to_owned(),
            header_start_level: 2,
            code_block_selector: ".rouge-code".to_owned(),
            api_entry_selector: ".api-entry".to_owned(),
            hero_selector: ".hero-section".to_owned(),
            footer_selector: ".ac-footer".to_owned(),
            nav_selector: ".ac-nav".to_owned(),
            content_padding_selector: ".documentation-section".to_owned(),
            clipboard_icon: "clippy.svg".to_owned(),
            copied_label: "Copied!".to_owned(),
            copy_fallback_label: "Hit \u{2318}+C to copy".to_owned(),
            footer_gap: 50.0,
        }
    }
}

impl LayoutConfig {
    /// Selector for the two heading levels in the table of contents (e.g. `h2, h3`).
    #[must_use]
    pub fn heading_selector(&self) -> String {
        let start = self.header_start_level;
        format!("h{start}, h{}", start.saturating_add(1))
    }

    /// Selector for elements that receive a deep-link anchor.
    #[must_use]
    pub fn anchor_target_selector(&self) -> String {
        format!("{}, {}", self.heading_selector(), self.api_entry_selector)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a selector is empty, the start
    /// level is out of range, or the footer gap is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (value, field) in [
            (&self.headers_container, "layout.headers_container"),
            (&self.sidebar_container, "layout.sidebar_container"),
            (&self.code_block_selector, "layout.code_block_selector"),
            (&self.api_entry_selector, "layout.api_entry_selector"),
            (&self.hero_selector, "layout.hero_selector"),
            (&self.footer_selector, "layout.footer_selector"),
            (&self.nav_selector, "layout.nav_selector"),
            (
                &self.content_padding_selector,
                "layout.content_padding_selector",
            ),
        ] {
            require_non_empty(value, field)?;
        }

        if !(1..=MAX_START_LEVEL).contains(&self.header_start_level) {
            return Err(ConfigError::Validation(format!(
                "layout.header_start_level must be between 1 and {MAX_START_LEVEL}"
            )));
        }

        if !self.footer_gap.is_finite() || self.footer_gap < 0.0 {
            return Err(ConfigError::Validation(
                "layout.footer_gap must be a non-negative number".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called by [`from_toml_str`](Self::from_toml_str).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()
    }
}
