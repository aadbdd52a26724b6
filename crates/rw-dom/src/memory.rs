//! In-memory document for testing.
//!
//! Provides [`MemoryDocument`] for unit testing page enhancements without a
//! browser. Layout is not computed: tests place elements explicitly with
//! [`MemoryDocument::set_geometry`] and drive scrolling with
//! [`MemoryDocument::scroll_to`].
//!
//! Text is modelled as one text run per element rendered before its element
//! children, which is enough for headings, links and code blocks.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dom::{Dom, DomEvent, EventKind, EventTarget, Events, Handler, Layout, Rect, Viewport};
use crate::error::DomError;
use crate::listener::Listener;
use crate::selector::{Selector, SelectorContext};

/// Handle to an element of a [`MemoryDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Geometry {
    top: f64,
    height: f64,
    padding_top: f64,
}

#[derive(Debug)]
struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<(String, String)>,
    text: String,
    style: Vec<(String, String)>,
    geometry: Geometry,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            text: String::new(),
            style: Vec::new(),
            geometry: Geometry::default(),
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attributes.iter_mut().find(|(key, _)| key == name) {
            value.clone_into(&mut entry.1);
        } else {
            self.attributes.push((name.to_owned(), value.to_owned()));
        }
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }

    fn classes(&self) -> Vec<String> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }

    fn set_classes(&mut self, classes: &[String]) {
        if classes.is_empty() {
            self.remove_attribute("class");
        } else {
            self.set_attribute("class", &classes.join(" "));
        }
    }
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| DomError::UnknownElement(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| DomError::UnknownElement(id.to_string()))
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn detach(&mut self, child: NodeId) -> Result<(), DomError> {
        if let Some(old_parent) = self.node(child)?.parent {
            self.node_mut(old_parent)?.children.retain(|c| *c != child);
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = self.nodes.get(node.0).and_then(|n| n.parent);
        }
        false
    }

    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::backend(format!(
                "cannot append {child} inside itself"
            )));
        }
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Descendants of `scope` in document order (pre-order, excluding `scope`).
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(scope.0)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(id.0) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get(id.0) else {
            return String::new();
        };
        let mut text = node.text.clone();
        for child in &node.children {
            text.push_str(&self.text_content(*child));
        }
        text
    }
}

impl SelectorContext for Tree {
    type Node = NodeId;

    fn tag(&self, node: NodeId) -> &str {
        self.nodes.get(node.0).map_or("", |n| n.tag.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node.0).and_then(|n| n.attribute(name))
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }
}

struct Registration {
    id: u64,
    target: EventTarget<NodeId>,
    kind: EventKind,
    handler: Handler<NodeId>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Registration>,
}

/// In-memory document for testing.
///
/// Starts as `<html><body></body></html>` with an 800px viewport scrolled to
/// the top. Use the builder-style helpers to add content and geometry, and the
/// event helpers ([`scroll_to`](Self::scroll_to), [`click`](Self::click), ...)
/// to drive registered listeners.
///
/// # Example
///
/// ```ignore
/// use rw_dom::{Dom, MemoryDocument};
///
/// let doc = MemoryDocument::new();
/// let h2 = doc.add(doc.body(), "h2", &[("id", "intro")], "Intro");
/// doc.set_geometry(h2, 1200.0, 40.0);
/// doc.scroll_to(1000.0);
/// ```
pub struct MemoryDocument {
    tree: RefCell<Tree>,
    registry: Rc<RefCell<Registry>>,
    viewport: Cell<Viewport>,
    document_height: Cell<f64>,
    location: RefCell<Option<String>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        let mut tree = Tree { nodes: Vec::new() };
        let html = tree.push(Node::new("html"));
        let body = tree.push(Node::new("body"));
        // Fresh ids on a fresh tree cannot fail.
        let _ = tree.append(html, body);

        Self {
            tree: RefCell::new(tree),
            registry: Rc::new(RefCell::new(Registry::default())),
            viewport: Cell::new(Viewport {
                scroll_y: 0.0,
                height: 800.0,
            }),
            document_height: Cell::new(0.0),
            location: RefCell::new(None),
        }
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("nodes", &self.tree.borrow().nodes.len())
            .field("listeners", &self.listener_count())
            .field("viewport", &self.viewport.get())
            .finish_non_exhaustive()
    }
}

impl MemoryDocument {
    /// Create a new empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> NodeId {
        NodeId(0)
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        NodeId(1)
    }

    /// Append a new element with attributes and text to `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn add(
        &self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let mut node = Node::new(tag);
        for (name, value) in attributes {
            node.set_attribute(name, value);
        }
        text.clone_into(&mut node.text);
        let id = tree.push(node);
        tree.append(parent, id).unwrap();
        id
    }

    /// Place an element: document-relative top edge and height.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not belong to this document.
    pub fn set_geometry(&self, node: NodeId, top: f64, height: f64) {
        let mut tree = self.tree.borrow_mut();
        let geometry = &mut tree.node_mut(node).unwrap().geometry;
        geometry.top = top;
        geometry.height = height;
    }

    /// Set the computed `padding-top` of an element.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not belong to this document.
    pub fn set_padding_top(&self, node: NodeId, padding: f64) {
        self.tree.borrow_mut().node_mut(node).unwrap().geometry.padding_top = padding;
    }

    /// Set the total document height.
    pub fn set_document_height(&self, height: f64) {
        self.document_height.set(height);
    }

    /// Set the viewport height without dispatching `resize`.
    pub fn set_viewport_height(&self, height: f64) {
        let mut viewport = self.viewport.get();
        viewport.height = height;
        self.viewport.set(viewport);
    }

    /// Scroll to `scroll_y` and dispatch `scroll` on the document.
    pub fn scroll_to(&self, scroll_y: f64) {
        let mut viewport = self.viewport.get();
        viewport.scroll_y = scroll_y;
        self.viewport.set(viewport);
        self.dispatch(&EventTarget::Document, EventKind::Scroll);
    }

    /// Change the viewport height and dispatch `resize` on the window.
    pub fn resize(&self, height: f64) {
        self.set_viewport_height(height);
        self.dispatch(&EventTarget::Window, EventKind::Resize);
    }

    /// Dispatch `DOMContentLoaded` on the document, then `load` on the window.
    pub fn load(&self) {
        self.dispatch(&EventTarget::Document, EventKind::DomContentLoaded);
        self.dispatch(&EventTarget::Window, EventKind::Load);
    }

    /// Dispatch a bubbling `click` on `node`.
    pub fn click(&self, node: NodeId) {
        self.dispatch(&EventTarget::Element(node), EventKind::Click);
    }

    /// Dispatch `mouseleave` on `node`.
    pub fn mouse_leave(&self, node: NodeId) {
        self.dispatch(&EventTarget::Element(node), EventKind::MouseLeave);
    }

    /// Select the `index`-th `<option>` of a `<select>` and dispatch `change`.
    ///
    /// # Panics
    ///
    /// Panics if `select` does not belong to this document.
    pub fn select_option(&self, select: NodeId, index: usize) {
        {
            let mut tree = self.tree.borrow_mut();
            let options: Vec<NodeId> = tree
                .node(select)
                .unwrap()
                .children
                .iter()
                .copied()
                .filter(|child| tree.nodes[child.0].tag == "option")
                .collect();
            for (position, option) in options.into_iter().enumerate() {
                let node = tree.node_mut(option).unwrap();
                if position == index {
                    node.set_attribute("selected", "");
                } else {
                    node.remove_attribute("selected");
                }
            }
        }
        self.dispatch(&EventTarget::Element(select), EventKind::Change);
    }

    /// Last location passed to [`Events::navigate`].
    #[must_use]
    pub fn location(&self) -> Option<String> {
        self.location.borrow().clone()
    }

    /// Inline style property value.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let node = tree.nodes.get(node.0)?;
        node.style
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.clone())
    }

    /// Number of currently attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    /// Dispatch `kind` to `target`.
    ///
    /// Bubbling events dispatched to an element run the handlers of the
    /// element, then of each ancestor, then of the document. The propagation
    /// path is fixed before the first handler runs.
    pub fn dispatch(&self, target: &EventTarget<NodeId>, kind: EventKind) {
        let event = DomEvent {
            kind,
            target: match target {
                EventTarget::Element(node) => Some(*node),
                EventTarget::Window | EventTarget::Document => None,
            },
        };

        let path: Vec<EventTarget<NodeId>> = match target {
            EventTarget::Element(node) if kind.bubbles() => {
                let tree = self.tree.borrow();
                let mut path = vec![EventTarget::Element(*node)];
                let mut current = tree.parent_element(*node);
                while let Some(ancestor) = current {
                    path.push(EventTarget::Element(ancestor));
                    current = tree.parent_element(ancestor);
                }
                path.push(EventTarget::Document);
                path
            }
            other => vec![other.clone()],
        };

        for hop in &path {
            for handler in self.handlers_for(hop, kind) {
                handler(&event);
            }
        }
    }

    fn handlers_for(&self, target: &EventTarget<NodeId>, kind: EventKind) -> Vec<Handler<NodeId>> {
        self.registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.kind == kind && entry.target == *target)
            .map(|entry| Rc::clone(&entry.handler))
            .collect()
    }

    fn with_node_mut<T>(
        &self,
        element: NodeId,
        f: impl FnOnce(&mut Node) -> T,
    ) -> Result<T, DomError> {
        let mut tree = self.tree.borrow_mut();
        Ok(f(tree.node_mut(element)?))
    }

    fn parse(selector: &str) -> Result<Selector, DomError> {
        Selector::parse(selector).map_err(|e| DomError::InvalidSelector {
            selector: e.selector,
            message: e.message,
        })
    }
}

impl Dom for MemoryDocument {
    type Element = NodeId;

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Self::parse(selector)?;
        let tree = self.tree.borrow();
        let root = self.document_element();
        let mut matched: Vec<NodeId> = Vec::new();
        if selector.matches(&*tree, root) {
            matched.push(root);
        }
        matched.extend(
            tree.descendants(root)
                .into_iter()
                .filter(|node| selector.matches(&*tree, *node)),
        );
        Ok(matched)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Self::parse(selector)?;
        let tree = self.tree.borrow();
        tree.node(*scope)?;
        Ok(tree
            .descendants(*scope)
            .into_iter()
            .filter(|node| selector.matches(&*tree, *node))
            .collect())
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        Ok(self.tree.borrow_mut().push(Node::new(tag)))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.tree.borrow_mut().append(*parent, *child)
    }

    fn parent(&self, element: &NodeId) -> Option<NodeId> {
        self.tree.borrow().parent_element(*element)
    }

    fn children(&self, element: &NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .nodes
            .get(element.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn tag_name(&self, element: &NodeId) -> String {
        self.tree.borrow().tag(*element).to_owned()
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .attribute(*element, name)
            .map(str::to_owned)
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.with_node_mut(*element, |node| node.set_attribute(name, value))
    }

    fn remove_attribute(&self, element: &NodeId, name: &str) -> Result<(), DomError> {
        self.with_node_mut(*element, |node| node.remove_attribute(name))
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .nodes
            .get(element.0)
            .is_some_and(|node| node.classes().iter().any(|c| c == class))
    }

    fn add_class(&self, element: &NodeId, class: &str) -> Result<(), DomError> {
        self.with_node_mut(*element, |node| {
            let mut classes = node.classes();
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_owned());
                node.set_classes(&classes);
            }
        })
    }

    fn remove_class(&self, element: &NodeId, class: &str) -> Result<(), DomError> {
        self.with_node_mut(*element, |node| {
            let mut classes = node.classes();
            classes.retain(|c| c != class);
            node.set_classes(&classes);
        })
    }

    fn text_content(&self, element: &NodeId) -> String {
        self.tree.borrow().text_content(*element)
    }

    fn set_text_content(&self, element: &NodeId, text: &str) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        let children = std::mem::take(&mut tree.node_mut(*element)?.children);
        for child in children {
            tree.node_mut(child)?.parent = None;
        }
        text.clone_into(&mut tree.node_mut(*element)?.text);
        Ok(())
    }

    fn set_style(
        &self,
        element: &NodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), DomError> {
        self.with_node_mut(*element, |node| {
            node.style.retain(|(name, _)| name != property);
            if let Some(value) = value {
                node.style.push((property.to_owned(), value.to_owned()));
            }
        })
    }

    fn value(&self, element: &NodeId) -> Option<String> {
        let tree = self.tree.borrow();
        let node = tree.nodes.get(element.0)?;
        if node.tag != "select" {
            return node.attribute("value").map(str::to_owned);
        }
        let options: Vec<&Node> = node
            .children
            .iter()
            .filter_map(|child| tree.nodes.get(child.0))
            .filter(|child| child.tag == "option")
            .collect();
        let selected = options
            .iter()
            .find(|option| option.attribute("selected").is_some())
            .or_else(|| options.first())?;
        Some(
            selected
                .attribute("value")
                .map_or_else(|| selected.text.clone(), str::to_owned),
        )
    }
}

impl Layout for MemoryDocument {
    fn offset_height(&self, element: &NodeId) -> f64 {
        self.tree
            .borrow()
            .nodes
            .get(element.0)
            .map_or(0.0, |node| node.geometry.height)
    }

    fn bounding_rect(&self, element: &NodeId) -> Rect {
        let scroll_y = self.viewport.get().scroll_y;
        self.tree
            .borrow()
            .nodes
            .get(element.0)
            .map_or_else(Rect::default, |node| {
                let top = node.geometry.top - scroll_y;
                Rect::new(top, top + node.geometry.height)
            })
    }

    fn padding_top(&self, element: &NodeId) -> f64 {
        self.tree
            .borrow()
            .nodes
            .get(element.0)
            .map_or(0.0, |node| node.geometry.padding_top)
    }

    fn viewport(&self) -> Result<Viewport, DomError> {
        Ok(self.viewport.get())
    }

    fn document_height(&self) -> f64 {
        self.document_height.get()
    }
}

impl Events for MemoryDocument {
    fn listen(
        &self,
        target: &EventTarget<NodeId>,
        kind: EventKind,
        handler: Handler<NodeId>,
    ) -> Result<Listener, DomError> {
        if let EventTarget::Element(node) = target {
            self.tree.borrow().node(*node)?;
        }

        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push(Registration {
                id,
                target: target.clone(),
                kind,
                handler,
            });
            id
        };

        let registry = Rc::downgrade(&self.registry);
        Ok(Listener::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().entries.retain(|entry| entry.id != id);
            }
        }))
    }

    fn navigate(&self, href: &str) -> Result<(), DomError> {
        *self.location.borrow_mut() = Some(href.to_owned());
        Ok(())
    }
}
