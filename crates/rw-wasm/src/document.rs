//! Browser document backed by `web-sys`.

use rw_dom::{
    Dom, DomError, DomEvent, EventKind, EventTarget, Events, Handler, Layout, Listener, Rect,
    Viewport,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlSelectElement, Window};

/// The current browser page.
#[derive(Debug, Clone)]
pub struct WebDocument {
    window: Window,
    document: Document,
}

impl WebDocument {
    /// Bind to the global `window` and its document.
    pub fn new() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or_else(|| DomError::backend("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| DomError::backend("window has no document"))?;
        Ok(Self { window, document })
    }

    /// The global window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The page document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn html_element(element: &Element) -> Option<&HtmlElement> {
        element.dyn_ref::<HtmlElement>()
    }
}

/// Describe a thrown JavaScript value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn backend_error(operation: &str, value: &JsValue) -> DomError {
    DomError::backend(format!("{operation} failed: {}", describe(value)))
}

fn selector_error(selector: &str, value: &JsValue) -> DomError {
    DomError::InvalidSelector {
        selector: selector.to_owned(),
        message: describe(value),
    }
}

fn collect_node_list(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Parse a computed pixel length (`"40px"`).
fn parse_px(value: &str) -> f64 {
    value
        .trim()
        .trim_end_matches("px")
        .parse()
        .unwrap_or(0.0)
}

impl Dom for WebDocument {
    type Element = Element;

    fn query_selector(&self, selector: &str) -> Result<Option<Element>, DomError> {
        self.document
            .query_selector(selector)
            .map_err(|e| selector_error(selector, &e))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, DomError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| selector_error(selector, &e))?;
        Ok(collect_node_list(&list))
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Result<Vec<Element>, DomError> {
        let list = scope
            .query_selector_all(selector)
            .map_err(|e| selector_error(selector, &e))?;
        Ok(collect_node_list(&list))
    }

    fn create_element(&self, tag: &str) -> Result<Element, DomError> {
        self.document
            .create_element(tag)
            .map_err(|e| backend_error("createElement", &e))
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent
            .append_child(child)
            .map(drop)
            .map_err(|e| backend_error("appendChild", &e))
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn children(&self, element: &Element) -> Vec<Element> {
        let children = element.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .collect()
    }

    fn tag_name(&self, element: &Element) -> String {
        element.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<(), DomError> {
        element
            .set_attribute(name, value)
            .map_err(|e| backend_error("setAttribute", &e))
    }

    fn remove_attribute(&self, element: &Element, name: &str) -> Result<(), DomError> {
        element
            .remove_attribute(name)
            .map_err(|e| backend_error("removeAttribute", &e))
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) -> Result<(), DomError> {
        element
            .class_list()
            .add_1(class)
            .map_err(|e| backend_error("classList.add", &e))
    }

    fn remove_class(&self, element: &Element, class: &str) -> Result<(), DomError> {
        element
            .class_list()
            .remove_1(class)
            .map_err(|e| backend_error("classList.remove", &e))
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, element: &Element, text: &str) -> Result<(), DomError> {
        element.set_text_content(Some(text));
        Ok(())
    }

    fn set_style(
        &self,
        element: &Element,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), DomError> {
        let Some(html) = Self::html_element(element) else {
            return Err(DomError::Unsupported {
                tag: self.tag_name(element),
                operation: "set_style",
            });
        };
        let style = html.style();
        match value {
            Some(value) => style
                .set_property(property, value)
                .map_err(|e| backend_error("style.setProperty", &e)),
            None => style
                .remove_property(property)
                .map(drop)
                .map_err(|e| backend_error("style.removeProperty", &e)),
        }
    }

    fn value(&self, element: &Element) -> Option<String> {
        match element.dyn_ref::<HtmlSelectElement>() {
            Some(select) => Some(select.value()),
            None => element.get_attribute("value"),
        }
    }
}

impl Layout for WebDocument {
    fn offset_height(&self, element: &Element) -> f64 {
        Self::html_element(element).map_or(0.0, |e| f64::from(e.offset_height()))
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect::new(rect.top(), rect.bottom())
    }

    fn padding_top(&self, element: &Element) -> f64 {
        match self.window.get_computed_style(element) {
            Ok(Some(style)) => style
                .get_property_value("padding-top")
                .map_or(0.0, |value| parse_px(&value)),
            Ok(None) => 0.0,
            Err(e) => {
                tracing::debug!(error = %describe(&e), "getComputedStyle failed");
                0.0
            }
        }
    }

    fn viewport(&self) -> Result<Viewport, DomError> {
        let scroll_y = self
            .window
            .scroll_y()
            .map_err(|e| backend_error("scrollY", &e))?;
        let height = self
            .window
            .inner_height()
            .map_err(|e| backend_error("innerHeight", &e))?
            .as_f64()
            .unwrap_or(0.0);
        Ok(Viewport { scroll_y, height })
    }

    fn document_height(&self) -> f64 {
        self.document
            .document_element()
            .map_or(0.0, |root| root.get_bounding_client_rect().height())
    }
}

impl Events for WebDocument {
    fn listen(
        &self,
        target: &EventTarget<Element>,
        kind: EventKind,
        handler: Handler<Element>,
    ) -> Result<Listener, DomError> {
        let (js_target, on_element): (web_sys::EventTarget, bool) = match target {
            EventTarget::Window => (self.window.clone().into(), false),
            EventTarget::Document => (self.document.clone().into(), false),
            EventTarget::Element(element) => (element.clone().into(), true),
        };

        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let target = if on_element {
                event.target().and_then(|t| t.dyn_into::<Element>().ok())
            } else {
                None
            };
            handler(&DomEvent { kind, target });
        });

        js_target
            .add_event_listener_with_callback(kind.name(), callback.as_ref().unchecked_ref())
            .map_err(|e| backend_error("addEventListener", &e))?;

        Ok(Listener::new(move || {
            let removed = js_target.remove_event_listener_with_callback(
                kind.name(),
                callback.as_ref().unchecked_ref(),
            );
            if let Err(e) = removed {
                tracing::debug!(event = %kind, error = %describe(&e), "removeEventListener failed");
            }
            drop(callback);
        }))
    }

    fn navigate(&self, href: &str) -> Result<(), DomError> {
        self.window
            .location()
            .set_href(href)
            .map_err(|e| backend_error("location.href", &e))
    }
}
