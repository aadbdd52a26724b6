//! Document traits and shared value types.
//!
//! All methods take `&self`: documents are single-threaded and mutated through
//! interior mutability, the same way a browser `Document` handle is.

use std::fmt;
use std::rc::Rc;

use crate::error::DomError;
use crate::listener::Listener;

/// Element bounding rectangle relative to the viewport top, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Distance from viewport top to the element's top edge (negative once scrolled past).
    pub top: f64,
    /// Distance from viewport top to the element's bottom edge.
    pub bottom: f64,
}

impl Rect {
    /// Create a rectangle from its top and bottom edges.
    #[must_use]
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Rectangle height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Current scroll position and visible height of the window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    /// Vertical scroll offset of the document (`window.pageYOffset`).
    pub scroll_y: f64,
    /// Visible height (`window.innerHeight`).
    pub height: f64,
}

/// Events the page enhancements subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Window finished loading all resources.
    Load,
    /// Document finished parsing.
    DomContentLoaded,
    /// Document scrolled.
    Scroll,
    /// Window resized.
    Resize,
    /// Element clicked.
    Click,
    /// Form control value changed.
    Change,
    /// Pointer left an element.
    MouseLeave,
}

impl EventKind {
    /// DOM event type name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::Click => "click",
            Self::Change => "change",
            Self::MouseLeave => "mouseleave",
        }
    }

    /// Whether the event propagates from the target element to its ancestors.
    #[must_use]
    pub fn bubbles(self) -> bool {
        matches!(self, Self::Click | Self::Change)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a listener is attached.
#[derive(Clone, Debug, PartialEq)]
pub enum EventTarget<E> {
    /// The global window.
    Window,
    /// The document itself.
    Document,
    /// A single element.
    Element(E),
}

/// Event delivered to a handler.
#[derive(Clone, Debug, PartialEq)]
pub struct DomEvent<E> {
    /// Event type.
    pub kind: EventKind,
    /// Element the event was dispatched to, if it was dispatched to an element.
    pub target: Option<E>,
}

/// Shared event handler.
pub type Handler<E> = Rc<dyn Fn(&DomEvent<E>)>;

/// Tree access, element creation and mutation.
pub trait Dom {
    /// Element handle. Cheap to clone; equality means "same element".
    type Element: Clone + PartialEq + fmt::Debug + 'static;

    /// First element in the document matching `selector`.
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, DomError>;

    /// All elements in the document matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, DomError>;

    /// Descendants of `scope` matching `selector`, in document order.
    fn query_within(
        &self,
        scope: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, DomError>;

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> Result<Self::Element, DomError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<(), DomError>;

    /// Parent element, if any.
    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Element children in order.
    fn children(&self, element: &Self::Element) -> Vec<Self::Element>;

    /// Lowercase tag name.
    fn tag_name(&self, element: &Self::Element) -> String;

    /// Attribute value.
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Set an attribute.
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str)
    -> Result<(), DomError>;

    /// Remove an attribute (no-op when absent).
    fn remove_attribute(&self, element: &Self::Element, name: &str) -> Result<(), DomError>;

    /// Whether the element's class list contains `class`.
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    /// Add a class (no-op when present).
    fn add_class(&self, element: &Self::Element, class: &str) -> Result<(), DomError>;

    /// Remove a class (no-op when absent).
    fn remove_class(&self, element: &Self::Element, class: &str) -> Result<(), DomError>;

    /// Concatenated text of the element and its descendants.
    fn text_content(&self, element: &Self::Element) -> String;

    /// Replace the element's children with a single text node.
    fn set_text_content(&self, element: &Self::Element, text: &str) -> Result<(), DomError>;

    /// Set (`Some`) or clear (`None`) an inline style property.
    fn set_style(
        &self,
        element: &Self::Element,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), DomError>;

    /// Current value of a form control (the selected option's value for `<select>`).
    fn value(&self, element: &Self::Element) -> Option<String>;
}

/// Layout measurements.
///
/// Reading any of these forces layout in a browser, so callers measure once
/// per tick and write afterwards.
pub trait Layout: Dom {
    /// Rendered height including padding and border (`offsetHeight`).
    fn offset_height(&self, element: &Self::Element) -> f64;

    /// Bounding rectangle relative to the viewport.
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    /// Computed `padding-top` in pixels.
    fn padding_top(&self, element: &Self::Element) -> f64;

    /// Scroll offset and visible height.
    fn viewport(&self) -> Result<Viewport, DomError>;

    /// Total height of the root element.
    fn document_height(&self) -> f64;
}

/// Listener registration and navigation.
pub trait Events: Dom {
    /// Register `handler` for `kind` events on `target`.
    ///
    /// Handlers for the same target and kind run in registration order.
    /// The returned guard detaches the handler when dropped.
    fn listen(
        &self,
        target: &EventTarget<Self::Element>,
        kind: EventKind,
        handler: Handler<Self::Element>,
    ) -> Result<Listener, DomError>;

    /// Navigate the window to `href`.
    fn navigate(&self, href: &str) -> Result<(), DomError>;
}

/// A full page: tree, layout and events.
pub trait Page: Layout + Events {}

impl<T: Layout + Events> Page for T {}
