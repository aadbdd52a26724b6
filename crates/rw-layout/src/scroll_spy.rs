//! Scroll spy: highlights the table of contents link of the section in view.

use std::rc::Rc;

use rw_dom::{Dom, Listener, Page, Rect};

use crate::error::LayoutError;
use crate::headings::HeadingNode;
use crate::ticks::listen_layout_ticks;

/// Class marking the current table of contents link.
pub const ACTIVE_CLASS: &str = "active";

/// Pick the heading in focus from viewport-relative rectangles.
///
/// A heading qualifies when its top is in the upper third of the viewport
/// (negative tops included) and its bottom is still visible. The qualifying
/// heading closest to the viewport top wins; on equal distance the earlier
/// one wins. With no qualifying heading the first one is chosen. Returns
/// `None` only for an empty slice.
#[must_use]
pub fn select_active(rects: &[Rect], viewport_height: f64) -> Option<usize> {
    let focus_line = viewport_height / 3.0;
    let mut best: Option<(usize, f64)> = None;

    for (index, rect) in rects.iter().enumerate() {
        let in_focus = rect.top < focus_line && rect.bottom > 0.0 && rect.bottom < viewport_height;
        if !in_focus {
            continue;
        }
        let distance = rect.top.abs();
        if best.is_none_or(|(_, closest)| distance < closest) {
            best = Some((index, distance));
        }
    }

    best.map(|(index, _)| index)
        .or_else(|| (!rects.is_empty()).then_some(0))
}

/// Scroll spy over a sidebar's links and the headings they point to.
#[derive(Debug)]
pub struct ScrollSpy<D: Dom> {
    sidebar: D::Element,
    headings: Vec<HeadingNode<D::Element>>,
}

impl<D: Page + 'static> ScrollSpy<D> {
    /// Create a scroll spy for links inside `sidebar`.
    pub fn new(sidebar: D::Element, headings: Vec<HeadingNode<D::Element>>) -> Self {
        Self { sidebar, headings }
    }

    /// Recompute the active heading and update link classes.
    ///
    /// Returns the id of the active heading, `None` when there are no headings.
    pub fn update(&self, dom: &D) -> Result<Option<String>, LayoutError> {
        let viewport = dom.viewport()?;
        let rects: Vec<Rect> = self
            .headings
            .iter()
            .map(|heading| dom.bounding_rect(&heading.element))
            .collect();

        let Some(active) = select_active(&rects, viewport.height).map(|i| &self.headings[i]) else {
            return Ok(None);
        };

        for link in dom.query_within(&self.sidebar, "a")? {
            let target = dom.attribute(&link, "href");
            let is_active = target
                .as_deref()
                .and_then(|href| href.strip_prefix('#'))
                .is_some_and(|id| id == active.id);
            if is_active {
                dom.add_class(&link, ACTIVE_CLASS)?;
            } else {
                dom.remove_class(&link, ACTIVE_CLASS)?;
            }
        }

        Ok(Some(active.id.clone()))
    }

    /// Re-run [`update`](Self::update) on every layout tick.
    pub fn wire(self: &Rc<Self>, dom: &Rc<D>) -> Result<Vec<Listener>, LayoutError> {
        let spy = Rc::clone(self);
        listen_layout_ticks(dom, move |dom| {
            if let Err(e) = spy.update(dom) {
                tracing::warn!(error = %e, "Failed to update scroll spy");
            }
        })
    }
}

impl<D: Dom> ScrollSpy<D> {
    /// Headings being tracked.
    #[must_use]
    pub fn headings(&self) -> &[HeadingNode<D::Element>] {
        &self.headings
    }
}
