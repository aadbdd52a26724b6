//! Document abstraction for RW page enhancements.
//!
//! This crate provides the traits every page enhancement is written against,
//! so the same layout code runs in the browser and in unit tests:
//!
//! - [`Dom`] for tree queries, element creation, attributes, classes and text
//! - [`Layout`] for geometry (heights, bounding rectangles, viewport)
//! - [`Events`] for listener registration and navigation
//! - [`MemoryDocument`] for testing (behind `mock` feature flag)
//!
//! Listener registration returns a [`Listener`] guard. Dropping the guard
//! detaches the handler, so the owner of the guards controls how long page
//! enhancements stay wired.
//!
//! # Example
//!
//! ```ignore
//! use rw_dom::{Dom, MemoryDocument};
//!
//! let doc = MemoryDocument::new();
//! let heading = doc.add(doc.body(), "h2", &[("id", "intro")], "Intro");
//! assert_eq!(doc.query_selector_all("h2, h3")?, vec![heading]);
//! ```

mod dom;
mod error;
mod listener;
#[cfg(any(test, feature = "mock"))]
mod memory;
#[cfg(any(test, feature = "mock"))]
mod selector;

pub use dom::{Dom, DomEvent, EventKind, EventTarget, Events, Handler, Layout, Page, Rect, Viewport};
pub use error::DomError;
pub use listener::Listener;
#[cfg(any(test, feature = "mock"))]
pub use memory::{MemoryDocument, NodeId};
#[cfg(any(test, feature = "mock"))]
pub use selector::{Selector, SelectorError};
