//! Copy-to-clipboard buttons on code blocks.

use std::rc::{Rc, Weak};

use rw_config::LayoutConfig;
use rw_dom::{Dom, EventKind, EventTarget, Listener, Page};

use crate::clipboard::{Clipboard, ClipboardEventKind, ClipboardOptions, CopyBackend};
use crate::error::LayoutError;

/// Class of the injected button.
pub const CLIPBOARD_CLASS: &str = "clipboard";

/// Class that makes the button tooltip visible.
pub const TOOLTIP_CLASS: &str = "hint--top";

/// Width of the button icon in pixels.
const ICON_WIDTH: &str = "13";

/// A copy button attached to a code block.
///
/// Dropping it detaches its listeners.
#[derive(Debug)]
pub struct CopyButton<E: Clone + 'static> {
    block: E,
    button: E,
    clipboard: Clipboard<E>,
    _mouse_leave: Listener,
}

impl<E: Clone + 'static> CopyButton<E> {
    /// The code block.
    #[must_use]
    pub fn block(&self) -> &E {
        &self.block
    }

    /// The button element.
    #[must_use]
    pub fn button(&self) -> &E {
        &self.button
    }

    /// Clipboard bound to the button.
    #[must_use]
    pub fn clipboard(&self) -> &Clipboard<E> {
        &self.clipboard
    }

    /// Detach listeners and release the pending clipboard action.
    pub fn destroy(self) {
        self.clipboard.destroy();
    }
}

/// Append a copy button to every code block matching the configured selector.
///
/// The copied text is read from the block when the button is clicked. Blocks
/// that already carry a copy button are skipped. When `backend` cannot copy,
/// a click shows the fallback label instead.
pub fn inject_copy_buttons<D: Page + 'static>(
    dom: &Rc<D>,
    config: &LayoutConfig,
    backend: &Rc<dyn CopyBackend>,
) -> Result<Vec<CopyButton<D::Element>>, LayoutError> {
    let blocks = dom.query_selector_all(&config.code_block_selector)?;
    let mut buttons = Vec::with_capacity(blocks.len());

    for block in blocks {
        if has_copy_button(dom.as_ref(), &block) {
            continue;
        }
        buttons.push(attach(dom, block, config, backend)?);
    }

    tracing::debug!(count = buttons.len(), "Injected copy buttons");
    Ok(buttons)
}

fn has_copy_button<D: Dom>(dom: &D, block: &D::Element) -> bool {
    dom.children(block)
        .iter()
        .any(|child| dom.tag_name(child) == "button" && dom.has_class(child, CLIPBOARD_CLASS))
}

fn attach<D: Page + 'static>(
    dom: &Rc<D>,
    block: D::Element,
    config: &LayoutConfig,
    backend: &Rc<dyn CopyBackend>,
) -> Result<CopyButton<D::Element>, LayoutError> {
    let button = dom.create_element("button")?;
    dom.add_class(&button, CLIPBOARD_CLASS)?;
    let icon = dom.create_element("img")?;
    dom.set_attribute(&icon, "src", &config.clipboard_icon)?;
    dom.set_attribute(&icon, "width", ICON_WIDTH)?;
    dom.append_child(&button, &icon)?;
    dom.append_child(&block, &button)?;

    let text = {
        let weak: Weak<D> = Rc::downgrade(dom);
        let block = block.clone();
        move || {
            weak.upgrade()
                .map(|dom| dom.text_content(&block))
                .unwrap_or_default()
        }
    };
    let clipboard = Clipboard::new(
        dom.as_ref(),
        &button,
        ClipboardOptions::copy(text),
        Rc::clone(backend),
    )?;

    let weak: Weak<D> = Rc::downgrade(dom);
    let target = button.clone();
    let mouse_leave = dom.listen(
        &EventTarget::Element(button.clone()),
        EventKind::MouseLeave,
        Rc::new(move |_| {
            if let Some(dom) = weak.upgrade() {
                let cleared = dom
                    .remove_attribute(&target, "aria-label")
                    .and_then(|()| dom.remove_class(&target, TOOLTIP_CLASS));
                if let Err(e) = cleared {
                    tracing::warn!(error = %e, "Failed to clear copy tooltip");
                }
            }
        }),
    )?;

    let weak: Weak<D> = Rc::downgrade(dom);
    let copied = config.copied_label.clone();
    clipboard.on(ClipboardEventKind::Success, move |event| {
        if let Some(dom) = weak.upgrade() {
            let shown = dom
                .add_class(&event.trigger, TOOLTIP_CLASS)
                .and_then(|()| dom.set_attribute(&event.trigger, "aria-label", &copied));
            if let Err(e) = shown {
                tracing::warn!(error = %e, "Failed to show copy confirmation");
            }
        }
    });

    let weak: Weak<D> = Rc::downgrade(dom);
    let fallback = config.copy_fallback_label.clone();
    clipboard.on(ClipboardEventKind::Error, move |event| {
        if let Some(dom) = weak.upgrade()
            && let Err(e) = dom.set_attribute(&event.trigger, "aria-label", &fallback)
        {
            tracing::warn!(error = %e, "Failed to show copy fallback");
        }
    });

    Ok(CopyButton {
        block,
        button,
        clipboard,
        _mouse_leave: mouse_leave,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;
    use rw_dom::{MemoryDocument, NodeId};

    use super::*;
    use crate::clipboard::Action;
    use crate::testing::{Outcome, RecordingBackend};

    fn page(code: &str) -> (Rc<MemoryDocument>, NodeId) {
        let doc = Rc::new(MemoryDocument::new());
        let pre = doc.add(doc.body(), "pre", &[], "");
        let block = doc.add(pre, "code", &[("class", "rouge-code")], code);
        (doc, block)
    }

    fn install(
        doc: &Rc<MemoryDocument>,
        outcome: Outcome,
    ) -> (Rc<RecordingBackend>, Vec<CopyButton<NodeId>>) {
        let backend = Rc::new(RecordingBackend::new(outcome));
        let dyn_backend: Rc<dyn CopyBackend> = Rc::clone(&backend) as Rc<dyn CopyBackend>;
        let buttons = inject_copy_buttons(doc, &LayoutConfig::default(), &dyn_backend).unwrap();
        (backend, buttons)
    }

    #[test]
    fn test_button_structure() {
        let (doc, block) = page("fn main() {}");
        let (_backend, buttons) = install(&doc, Outcome::Succeed);

        assert_eq!(buttons.len(), 1);
        let button = *buttons[0].button();
        assert_eq!(doc.parent(&button), Some(block));
        assert!(doc.has_class(&button, CLIPBOARD_CLASS));
        let icon = doc.children(&button);
        assert_eq!(icon.len(), 1);
        assert_eq!(doc.tag_name(&icon[0]), "img");
        assert_eq!(doc.attribute(&icon[0], "src").as_deref(), Some("clippy.svg"));
        assert_eq!(doc.attribute(&icon[0], "width").as_deref(), Some("13"));
    }

    #[test]
    fn test_click_copies_block_text_exactly() {
        let (doc, _block) = page("fn main() {}");
        let (backend, buttons) = install(&doc, Outcome::Succeed);
        let events = Rc::new(RefCell::new(Vec::new()));
        for kind in [ClipboardEventKind::Success, ClipboardEventKind::Error] {
            let events = Rc::clone(&events);
            buttons[0]
                .clipboard()
                .on(kind, move |event| events.borrow_mut().push((event.kind, event.text.clone())));
        }

        doc.click(*buttons[0].button());

        assert_eq!(
            *events.borrow(),
            vec![(ClipboardEventKind::Success, "fn main() {}".to_owned())]
        );
        assert_eq!(backend.writes(), vec![(Action::Copy, "fn main() {}".to_owned())]);
    }

    #[test]
    fn test_whitespace_preserved() {
        let code = "  let x = 1;\n\tlet y = 2;\n";
        let (doc, _block) = page(code);
        let (backend, buttons) = install(&doc, Outcome::Succeed);

        doc.click(*buttons[0].button());

        assert_eq!(backend.writes(), vec![(Action::Copy, code.to_owned())]);
    }

    #[test]
    fn test_text_read_at_click_time() {
        let (doc, block) = page("old");
        let (backend, buttons) = install(&doc, Outcome::Succeed);

        doc.add(block, "span", &[], " new");
        doc.click(*buttons[0].button());

        assert_eq!(backend.writes(), vec![(Action::Copy, "old new".to_owned())]);
    }

    #[test]
    fn test_success_shows_tooltip_and_mouse_leave_clears() {
        let (doc, _block) = page("fn main() {}");
        let (_backend, buttons) = install(&doc, Outcome::Succeed);
        let button = *buttons[0].button();

        doc.click(button);
        assert!(doc.has_class(&button, TOOLTIP_CLASS));
        assert_eq!(doc.attribute(&button, "aria-label").as_deref(), Some("Copied!"));

        doc.mouse_leave(button);
        assert!(!doc.has_class(&button, TOOLTIP_CLASS));
        assert_eq!(doc.attribute(&button, "aria-label"), None);
    }

    #[test]
    fn test_error_shows_fallback_without_tooltip_class() {
        let (doc, _block) = page("fn main() {}");
        let (_backend, buttons) = install(&doc, Outcome::Fail);
        let button = *buttons[0].button();

        doc.click(button);

        assert!(!doc.has_class(&button, TOOLTIP_CLASS));
        assert_eq!(
            doc.attribute(&button, "aria-label").as_deref(),
            Some("Hit \u{2318}+C to copy")
        );
    }

    #[test]
    fn test_clicking_icon_copies() {
        let (doc, _block) = page("fn main() {}");
        let (backend, buttons) = install(&doc, Outcome::Succeed);
        let icon = doc.children(buttons[0].button())[0];

        doc.click(icon);

        assert_eq!(backend.writes().len(), 1);
    }

    #[test]
    fn test_injection_is_idempotent() {
        let (doc, block) = page("fn main() {}");
        let (_backend, first) = install(&doc, Outcome::Succeed);
        let (_backend, second) = install(&doc, Outcome::Succeed);

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(doc.query_within(&block, "button.clipboard").unwrap().len(), 1);
    }

    #[test]
    fn test_unsupported_backend_shows_fallback_on_click() {
        let (doc, block) = page("fn main() {}");
        let recording = Rc::new(RecordingBackend::unsupported());
        let backend: Rc<dyn CopyBackend> = Rc::clone(&recording) as Rc<dyn CopyBackend>;

        let buttons = inject_copy_buttons(&doc, &LayoutConfig::default(), &backend).unwrap();
        assert_eq!(buttons.len(), 1);
        let button = *buttons[0].button();
        assert_eq!(doc.children(&block), vec![button]);

        doc.click(button);

        assert!(recording.writes().is_empty());
        assert!(!doc.has_class(&button, TOOLTIP_CLASS));
        assert_eq!(
            doc.attribute(&button, "aria-label").as_deref(),
            Some("Hit \u{2318}+C to copy")
        );
    }

    #[test]
    fn test_destroy_detaches_listeners() {
        let (doc, _block) = page("fn main() {}");
        let (backend, mut buttons) = install(&doc, Outcome::Succeed);
        let button = *buttons[0].button();
        assert_eq!(doc.listener_count(), 2);

        buttons.remove(0).destroy();
        doc.click(button);

        assert_eq!(doc.listener_count(), 0);
        assert!(backend.writes().is_empty());
    }
}
