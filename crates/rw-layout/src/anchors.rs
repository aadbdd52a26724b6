//! Deep-link anchors for headings and API entries.

use rw_dom::Dom;

use crate::error::LayoutError;

/// Class of injected anchor links.
pub const ANCHOR_CLASS: &str = "anchor";

/// Add a `#` deep-link anchor to every element matching `selector` inside `container`.
///
/// Each target gets `name` set to its id and a trailing
/// `<a href="#id" class="anchor">#</a>` child. Targets that already carry an
/// anchor child are left alone, so running this twice is harmless. Targets
/// without an id are skipped.
///
/// Returns the number of anchors added.
pub fn inject_anchors<D: Dom>(
    dom: &D,
    container: &D::Element,
    selector: &str,
) -> Result<usize, LayoutError> {
    let mut added = 0;

    for target in dom.query_within(container, selector)? {
        let Some(id) = dom.attribute(&target, "id").filter(|id| !id.is_empty()) else {
            tracing::debug!(tag = %dom.tag_name(&target), "Skipping anchor target without id");
            continue;
        };
        dom.set_attribute(&target, "name", &id)?;

        if has_anchor(dom, &target) {
            continue;
        }

        let anchor = dom.create_element("a")?;
        dom.set_attribute(&anchor, "href", &format!("#{id}"))?;
        dom.add_class(&anchor, ANCHOR_CLASS)?;
        dom.set_text_content(&anchor, "#")?;
        dom.append_child(&target, &anchor)?;
        added += 1;
    }

    tracing::debug!(added, selector, "Injected anchors");
    Ok(added)
}

fn has_anchor<D: Dom>(dom: &D, target: &D::Element) -> bool {
    dom.children(target)
        .iter()
        .any(|child| dom.tag_name(child) == "a" && dom.has_class(child, ANCHOR_CLASS))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rw_dom::MemoryDocument;

    use super::*;

    const SELECTOR: &str = "h2, h3, .api-entry";

    #[test]
    fn test_inject_anchor() {
        let doc = MemoryDocument::new();
        let container = doc.add(doc.body(), "div", &[], "");
        let heading = doc.add(container, "h2", &[("id", "intro")], "Intro");

        assert_eq!(inject_anchors(&doc, &container, SELECTOR).unwrap(), 1);

        assert_eq!(doc.attribute(&heading, "name").as_deref(), Some("intro"));
        let anchors = doc.children(&heading);
        assert_eq!(anchors.len(), 1);
        assert_eq!(doc.tag_name(&anchors[0]), "a");
        assert_eq!(doc.attribute(&anchors[0], "href").as_deref(), Some("#intro"));
        assert!(doc.has_class(&anchors[0], ANCHOR_CLASS));
        assert_eq!(doc.text_content(&heading), "Intro#");
    }

    #[test]
    fn test_inject_twice_keeps_one_anchor() {
        let doc = MemoryDocument::new();
        let container = doc.add(doc.body(), "div", &[], "");
        let headings = [
            doc.add(container, "h2", &[("id", "intro")], "Intro"),
            doc.add(container, "h3", &[("id", "setup")], "Setup"),
            doc.add(container, "div", &[("id", "fn-run"), ("class", "api-entry")], "run()"),
        ];

        assert_eq!(inject_anchors(&doc, &container, SELECTOR).unwrap(), 3);
        assert_eq!(inject_anchors(&doc, &container, SELECTOR).unwrap(), 0);

        for heading in headings {
            assert_eq!(doc.query_within(&heading, "a.anchor").unwrap().len(), 1);
        }
    }

    #[test]
    fn test_skips_targets_without_id() {
        let doc = MemoryDocument::new();
        let container = doc.add(doc.body(), "div", &[], "");
        let heading = doc.add(container, "h2", &[], "Untitled");

        assert_eq!(inject_anchors(&doc, &container, SELECTOR).unwrap(), 0);
        assert!(doc.children(&heading).is_empty());
        assert_eq!(doc.attribute(&heading, "name"), None);
    }

    #[test]
    fn test_ignores_elements_outside_container() {
        let doc = MemoryDocument::new();
        let container = doc.add(doc.body(), "div", &[], "");
        let outside = doc.add(doc.body(), "h2", &[("id", "outside")], "Outside");

        inject_anchors(&doc, &container, SELECTOR).unwrap();

        assert!(doc.children(&outside).is_empty());
    }
}
