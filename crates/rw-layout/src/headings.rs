//! Heading collection.
//!
//! Gathers the headings the table of contents and scroll spy work from.

use rw_dom::Dom;

use crate::error::LayoutError;

/// A heading in the documentation content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingNode<E> {
    /// Heading element.
    pub element: E,
    /// Heading level (2 for `h2`).
    pub level: u8,
    /// Heading text content.
    pub text: String,
    /// Element id, used as the URL fragment.
    pub id: String,
}

impl<E> HeadingNode<E> {
    /// Link target for this heading (`#id`).
    #[must_use]
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }
}

/// Parse the level from a heading tag name (`h2` -> 2).
#[must_use]
pub fn heading_level(tag: &str) -> Option<u8> {
    let level: u8 = tag
        .strip_prefix('h')
        .or_else(|| tag.strip_prefix('H'))?
        .parse()
        .ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Collect headings at `start_level` and `start_level + 1` inside `container`.
///
/// Headings are returned in document order. Headings without an `id` cannot
/// be linked to and are skipped.
pub fn collect_headings<D: Dom>(
    dom: &D,
    container: &D::Element,
    start_level: u8,
) -> Result<Vec<HeadingNode<D::Element>>, LayoutError> {
    let selector = format!("h{start_level}, h{}", start_level.saturating_add(1));
    let elements = dom.query_within(container, &selector)?;

    let mut headings = Vec::with_capacity(elements.len());
    for element in elements {
        let Some(level) = heading_level(&dom.tag_name(&element)) else {
            continue;
        };
        let text = dom.text_content(&element);
        let Some(id) = dom.attribute(&element, "id").filter(|id| !id.is_empty()) else {
            tracing::debug!(text = %text, "Skipping heading without id");
            continue;
        };
        headings.push(HeadingNode {
            element,
            level,
            text,
            id,
        });
    }

    tracing::debug!(count = headings.len(), "Collected headings");
    Ok(headings)
}
