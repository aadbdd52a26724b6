//! Documentation page enhancements for RW.
//!
//! Turns a rendered documentation page into a navigable one:
//!
//! - [`TableOfContents`]: nested sidebar links and a jump menu built from headings
//! - [`StickySidebar`]: pins the sidebar while scrolling, clear of the footer
//! - [`ScrollSpy`]: highlights the link of the section in view
//! - [`inject_anchors`]: `#` deep links on headings and API entries
//! - [`inject_copy_buttons`]: copy-to-clipboard buttons on code blocks
//!
//! Every component is written against the [`rw_dom`] traits, so the same code
//! runs in the browser and against [`rw_dom::MemoryDocument`] in tests.
//! [`install`] wires all of them from a [`LayoutConfig`].
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//!
//! use rw_config::LayoutConfig;
//! use rw_layout::install;
//!
//! let layout = install(&document, &LayoutConfig::default(), backend)?;
//! tracing::info!(entries = layout.report().toc_entries, "ready");
//! ```

mod anchors;
mod clipboard;
mod copy_buttons;
mod error;
mod headings;
mod install;
mod scroll_spy;
mod sticky;
#[cfg(test)]
mod testing;
mod ticks;
mod toc;

pub use anchors::{ANCHOR_CLASS, inject_anchors};
pub use clipboard::{
    Action, Clipboard, ClipboardAction, ClipboardError, ClipboardEvent, ClipboardEventKind,
    ClipboardOptions, CopyBackend, CopyCompletion, Emitter, SubscriptionId, TextResolver,
};
pub use copy_buttons::{CLIPBOARD_CLASS, CopyButton, TOOLTIP_CLASS, inject_copy_buttons};
pub use error::LayoutError;
pub use headings::{HeadingNode, collect_headings, heading_level};
pub use install::{InstallReport, InstalledLayout, install};
pub use rw_config::LayoutConfig;
pub use scroll_spy::{ACTIVE_CLASS, ScrollSpy, select_active};
pub use sticky::{FIXED_CLASS, SidebarMetrics, SidebarState, StickySidebar, compute_sidebar_state};
pub use ticks::listen_layout_ticks;
pub use toc::{
    DEPTH_MARKER, JUMP_MENU_CLASS, JumpMenuOption, LIST_CLASS, RenderedToc, TableOfContents, Toc,
    TocEntry, build_toc, render_toc,
};
