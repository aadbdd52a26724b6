//! Table of contents builder.
//!
//! Builds a nested link list and a flat jump menu from collected headings and
//! appends both to the sidebar container.
//!
//! # Nesting
//!
//! Entries are placed in one left-to-right pass with a level cursor. A deeper
//! heading descends into a new list under the most recent entry, a shallower
//! heading ascends one list per level. Only two adjacent levels are expected;
//! anything else is resolved deterministically:
//!
//! - a jump of more than one level descends a single step
//! - a deeper heading with no entry to nest under stays at the current depth
//! - ascending never leaves the root list
//!
//! The cursor always equals `start_level + depth`, so the jump menu prefix
//! length matches the entry's actual nesting depth.

use std::rc::{Rc, Weak};

use rw_dom::{Dom, EventKind, EventTarget, Listener, Page};

use crate::error::LayoutError;
use crate::headings::{HeadingNode, collect_headings};
use crate::scroll_spy::ACTIVE_CLASS;

/// Prefix added to jump menu labels once per nesting level.
pub const DEPTH_MARKER: &str = "-- ";

/// Class of the nested link list (hidden on small screens).
pub const LIST_CLASS: &str = "no-mobile";

/// Class of the jump menu (shown on small screens only).
pub const JUMP_MENU_CLASS: &str = "display-on-small";

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Link text.
    pub label: String,
    /// Link target (`#id`).
    pub href: String,
    /// Nested entries.
    pub children: Vec<TocEntry>,
}

/// Flat jump menu option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JumpMenuOption {
    /// Option text, prefixed with [`DEPTH_MARKER`] per nesting level.
    pub label: String,
    /// Link target (`#id`).
    pub href: String,
    /// Nesting depth (0 for the start level).
    pub depth: usize,
}

/// Built table of contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Toc {
    /// Root entries.
    pub entries: Vec<TocEntry>,
    /// Jump menu options in document order.
    pub jump_menu: Vec<JumpMenuOption>,
}

impl Toc {
    /// Number of entries at all depths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jump_menu.len()
    }

    /// Whether the table of contents has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jump_menu.is_empty()
    }

    /// Number of nested list levels (0 when empty).
    #[must_use]
    pub fn depth(&self) -> usize {
        fn depth_of(entries: &[TocEntry]) -> usize {
            if entries.is_empty() {
                return 0;
            }
            1 + entries
                .iter()
                .map(|entry| depth_of(&entry.children))
                .max()
                .unwrap_or(0)
        }
        depth_of(&self.entries)
    }

    /// Link targets in document order.
    #[must_use]
    pub fn hrefs(&self) -> Vec<&str> {
        self.jump_menu.iter().map(|o| o.href.as_str()).collect()
    }
}

/// Build the table of contents for `headings`.
///
/// Pure and deterministic: the same headings always produce the same tree.
#[must_use]
pub fn build_toc<E>(headings: &[HeadingNode<E>], start_level: u8) -> Toc {
    let mut toc = Toc::default();
    // Index of the parent entry at each depth, from the root list down.
    let mut path: Vec<usize> = Vec::new();

    for heading in headings {
        let cursor = usize::from(start_level) + path.len();
        let level = usize::from(heading.level);

        if level > cursor {
            if level > cursor + 1 {
                tracing::debug!(
                    id = %heading.id,
                    level,
                    cursor,
                    "Heading skips a level, nesting one step"
                );
            }
            let list = list_at(&mut toc.entries, &path);
            if let Some(last) = list.len().checked_sub(1) {
                path.push(last);
            } else {
                tracing::debug!(id = %heading.id, level, "No entry to nest heading under");
            }
        } else if level < cursor {
            let keep = path.len().saturating_sub(cursor - level);
            path.truncate(keep);
        }

        let href = heading.href();
        list_at(&mut toc.entries, &path).push(TocEntry {
            label: heading.text.clone(),
            href: href.clone(),
            children: Vec::new(),
        });
        toc.jump_menu.push(JumpMenuOption {
            label: format!("{}{}", DEPTH_MARKER.repeat(path.len()), heading.text),
            href,
            depth: path.len(),
        });
    }

    toc
}

fn list_at<'a>(entries: &'a mut Vec<TocEntry>, path: &[usize]) -> &'a mut Vec<TocEntry> {
    let mut list = entries;
    for &index in path {
        list = &mut list[index].children;
    }
    list
}

/// Elements created by [`render_toc`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedToc<E> {
    /// Root `<ul>` of the link list.
    pub list: E,
    /// The `<select>` jump menu.
    pub jump_menu: E,
}

/// Render `toc` and append the link list and jump menu to `sidebar`.
pub fn render_toc<D: Dom>(
    dom: &D,
    sidebar: &D::Element,
    toc: &Toc,
) -> Result<RenderedToc<D::Element>, LayoutError> {
    let list = dom.create_element("ul")?;
    dom.add_class(&list, LIST_CLASS)?;
    render_entries(dom, &list, &toc.entries)?;

    let jump_menu = dom.create_element("select")?;
    dom.add_class(&jump_menu, JUMP_MENU_CLASS)?;
    for option in &toc.jump_menu {
        let element = dom.create_element("option")?;
        dom.set_attribute(&element, "value", &option.href)?;
        dom.set_text_content(&element, &option.label)?;
        dom.append_child(&jump_menu, &element)?;
    }

    dom.append_child(sidebar, &list)?;
    dom.append_child(sidebar, &jump_menu)?;

    Ok(RenderedToc { list, jump_menu })
}

fn render_entries<D: Dom>(
    dom: &D,
    list: &D::Element,
    entries: &[TocEntry],
) -> Result<(), LayoutError> {
    for entry in entries {
        let item = dom.create_element("li")?;
        let link = dom.create_element("a")?;
        dom.set_attribute(&link, "href", &entry.href)?;
        dom.set_text_content(&link, &entry.label)?;
        dom.append_child(&item, &link)?;

        if !entry.children.is_empty() {
            let nested = dom.create_element("ul")?;
            render_entries(dom, &nested, &entry.children)?;
            dom.append_child(&item, &nested)?;
        }

        dom.append_child(list, &item)?;
    }
    Ok(())
}

/// Sidebar table of contents wired into the page.
///
/// Clicking a link marks it active right away; choosing a jump menu option
/// navigates to its target. Dropping the value detaches both listeners.
#[derive(Debug)]
pub struct TableOfContents<D: Dom> {
    toc: Toc,
    headings: Vec<HeadingNode<D::Element>>,
    rendered: RenderedToc<D::Element>,
    _listeners: Vec<Listener>,
}

impl<D: Page + 'static> TableOfContents<D> {
    /// Collect headings from `headers`, build the table of contents into `sidebar` and wire it.
    pub fn install(
        dom: &Rc<D>,
        headers: &D::Element,
        sidebar: &D::Element,
        start_level: u8,
    ) -> Result<Self, LayoutError> {
        let headings = collect_headings(dom.as_ref(), headers, start_level)?;
        let toc = build_toc(&headings, start_level);
        let rendered = render_toc(dom.as_ref(), sidebar, &toc)?;

        let listeners = vec![
            listen_link_clicks(dom, &rendered.list)?,
            listen_jump_menu(dom, &rendered.jump_menu)?,
        ];

        tracing::debug!(
            entries = toc.len(),
            depth = toc.depth(),
            "Built table of contents"
        );

        Ok(Self {
            toc,
            headings,
            rendered,
            _listeners: listeners,
        })
    }
}

impl<D: Dom> TableOfContents<D> {
    /// The built tree and jump menu.
    #[must_use]
    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    /// Headings the table of contents links to.
    #[must_use]
    pub fn headings(&self) -> &[HeadingNode<D::Element>] {
        &self.headings
    }

    /// Root `<ul>` of the link list.
    #[must_use]
    pub fn list(&self) -> &D::Element {
        &self.rendered.list
    }

    /// The `<select>` jump menu.
    #[must_use]
    pub fn jump_menu(&self) -> &D::Element {
        &self.rendered.jump_menu
    }
}

fn listen_link_clicks<D: Page + 'static>(
    dom: &Rc<D>,
    list: &D::Element,
) -> Result<Listener, LayoutError> {
    let weak: Weak<D> = Rc::downgrade(dom);
    let scope = list.clone();
    let listener = dom.listen(
        &EventTarget::Element(list.clone()),
        EventKind::Click,
        Rc::new(move |event| {
            let (Some(dom), Some(target)) = (weak.upgrade(), event.target.as_ref()) else {
                return;
            };
            if dom.tag_name(target) != "a" {
                return;
            }
            if let Err(e) = activate_link(dom.as_ref(), &scope, target) {
                tracing::warn!(error = %e, "Failed to activate clicked link");
            }
        }),
    )?;
    Ok(listener)
}

fn activate_link<D: Dom>(
    dom: &D,
    scope: &D::Element,
    target: &D::Element,
) -> Result<(), LayoutError> {
    for link in dom.query_within(scope, "a")? {
        dom.remove_class(&link, ACTIVE_CLASS)?;
    }
    dom.add_class(target, ACTIVE_CLASS)?;
    Ok(())
}

fn listen_jump_menu<D: Page + 'static>(
    dom: &Rc<D>,
    jump_menu: &D::Element,
) -> Result<Listener, LayoutError> {
    let weak: Weak<D> = Rc::downgrade(dom);
    let select = jump_menu.clone();
    let listener = dom.listen(
        &EventTarget::Element(jump_menu.clone()),
        EventKind::Change,
        Rc::new(move |_| {
            let Some(dom) = weak.upgrade() else {
                return;
            };
            let Some(href) = dom.value(&select) else {
                return;
            };
            if let Err(e) = dom.navigate(&href) {
                tracing::warn!(error = %e, href = %href, "Failed to navigate from jump menu");
            }
        }),
    )?;
    Ok(listener)
}
