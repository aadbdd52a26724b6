//! Sticky sidebar positioning.
//!
//! Pins the sidebar to the viewport once the reader scrolls past the hero
//! section, and pulls it upward when it would otherwise overlap the footer.

use std::rc::Rc;

use rw_config::LayoutConfig;
use rw_dom::{Dom, Listener, Page};

use crate::error::LayoutError;
use crate::ticks::listen_layout_ticks;

/// Class that switches the sidebar to fixed positioning.
pub const FIXED_CLASS: &str = "fixed";

/// Measurements read on every tick, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SidebarMetrics {
    /// Hero section height.
    pub hero_height: f64,
    /// Navigation bar height.
    pub nav_height: f64,
    /// Footer height.
    pub footer_height: f64,
    /// Height of the sidebar's table of contents list.
    pub list_height: f64,
    /// Top padding of the content region.
    pub content_padding: f64,
    /// Total document height.
    pub document_height: f64,
    /// Current vertical scroll offset.
    pub scroll_offset: f64,
}

impl SidebarMetrics {
    /// Scroll offset past which the sidebar is fixed.
    #[must_use]
    pub fn scroll_threshold(&self) -> f64 {
        self.hero_height - self.nav_height + self.content_padding
    }

    /// Lowest scroll offset at which the fixed sidebar still clears the footer.
    #[must_use]
    pub fn overflow_floor(&self, footer_gap: f64) -> f64 {
        self.document_height
            - self.footer_height
            - self.list_height
            - self.content_padding
            - footer_gap
    }
}

/// Sidebar positioning for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SidebarState {
    /// Whether the sidebar carries [`FIXED_CLASS`].
    pub is_fixed: bool,
    /// Explicit `top` offset in pixels; `None` clears the inline style.
    pub top_offset_px: Option<f64>,
}

/// Decide the sidebar state for `metrics`.
///
/// The offset is only set in fixed mode and is always negative: it pulls the
/// sidebar up by exactly the distance scrolled past the overflow floor.
#[must_use]
pub fn compute_sidebar_state(metrics: &SidebarMetrics, footer_gap: f64) -> SidebarState {
    if metrics.scroll_offset <= metrics.scroll_threshold() {
        return SidebarState::default();
    }

    let floor = metrics.overflow_floor(footer_gap);
    let top_offset_px = (metrics.scroll_offset > floor).then(|| floor - metrics.scroll_offset);

    SidebarState {
        is_fixed: true,
        top_offset_px,
    }
}

/// Regions measured by the sidebar that may legitimately be absent.
#[derive(Clone, Debug)]
struct Regions<E> {
    hero: Option<E>,
    footer: Option<E>,
    nav: Option<E>,
    content_padding: Option<E>,
}

/// Sticky sidebar bound to a sidebar container and its table of contents list.
#[derive(Debug)]
pub struct StickySidebar<D: Dom> {
    sidebar: D::Element,
    list: D::Element,
    regions: Regions<D::Element>,
    footer_gap: f64,
    warnings: Vec<String>,
}

impl<D: Page + 'static> StickySidebar<D> {
    /// Resolve the decorative regions named in `config`.
    ///
    /// Missing regions measure as zero. A region whose selector the document
    /// rejects also measures as zero and is listed in
    /// [`warnings`](Self::warnings).
    pub fn new(dom: &D, sidebar: D::Element, list: D::Element, config: &LayoutConfig) -> Self {
        let mut warnings = Vec::new();
        let regions = Regions {
            hero: optional_region(dom, "hero_selector", &config.hero_selector, &mut warnings),
            footer: optional_region(dom, "footer_selector", &config.footer_selector, &mut warnings),
            nav: optional_region(dom, "nav_selector", &config.nav_selector, &mut warnings),
            content_padding: optional_region(
                dom,
                "content_padding_selector",
                &config.content_padding_selector,
                &mut warnings,
            ),
        };

        Self {
            sidebar,
            list,
            regions,
            footer_gap: config.footer_gap,
            warnings,
        }
    }

    /// Read the current measurements.
    pub fn measure(&self, dom: &D) -> Result<SidebarMetrics, LayoutError> {
        let height = |region: Option<&D::Element>| region.map_or(0.0, |e| dom.offset_height(e));
        let viewport = dom.viewport()?;

        Ok(SidebarMetrics {
            hero_height: height(self.regions.hero.as_ref()),
            nav_height: height(self.regions.nav.as_ref()),
            footer_height: height(self.regions.footer.as_ref()),
            list_height: dom.offset_height(&self.list),
            content_padding: self
                .regions
                .content_padding
                .as_ref()
                .map_or(0.0, |e| dom.padding_top(e)),
            document_height: dom.document_height(),
            scroll_offset: viewport.scroll_y,
        })
    }

    /// Measure, decide and apply the sidebar state.
    pub fn update(&self, dom: &D) -> Result<SidebarState, LayoutError> {
        let metrics = self.measure(dom)?;
        let state = compute_sidebar_state(&metrics, self.footer_gap);
        self.apply(dom, state)?;
        Ok(state)
    }

    fn apply(&self, dom: &D, state: SidebarState) -> Result<(), LayoutError> {
        if state.is_fixed {
            dom.add_class(&self.sidebar, FIXED_CLASS)?;
        } else {
            dom.remove_class(&self.sidebar, FIXED_CLASS)?;
        }
        let top = state.top_offset_px.map(|offset| format!("{offset}px"));
        dom.set_style(&self.sidebar, "top", top.as_deref())?;
        Ok(())
    }

    /// Re-run [`update`](Self::update) on every layout tick.
    pub fn wire(self: &Rc<Self>, dom: &Rc<D>) -> Result<Vec<Listener>, LayoutError> {
        let sticky = Rc::clone(self);
        listen_layout_ticks(dom, move |dom| {
            if let Err(e) = sticky.update(dom) {
                tracing::warn!(error = %e, "Failed to update sticky sidebar");
            }
        })
    }
}

impl<D: Dom> StickySidebar<D> {
    /// The sidebar container.
    #[must_use]
    pub fn sidebar(&self) -> &D::Element {
        &self.sidebar
    }

    /// Regions skipped because their selector was rejected.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

fn optional_region<D: Dom>(
    dom: &D,
    option: &'static str,
    selector: &str,
    warnings: &mut Vec<String>,
) -> Option<D::Element> {
    match dom.query_selector(selector) {
        Ok(Some(region)) => Some(region),
        Ok(None) => {
            tracing::debug!(selector, "Layout region not found, measuring as 0");
            None
        }
        Err(e) => {
            tracing::warn!(option, selector, error = %e, "Layout region skipped, measuring as 0");
            warnings.push(format!("{option}: {e}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rw_dom::{MemoryDocument, NodeId};

    use super::*;

    fn metrics(scroll_offset: f64) -> SidebarMetrics {
        SidebarMetrics {
            hero_height: 300.0,
            nav_height: 60.0,
            footer_height: 200.0,
            list_height: 500.0,
            content_padding: 40.0,
            document_height: 3000.0,
            scroll_offset,
        }
    }

    #[test]
    fn test_not_fixed_before_threshold() {
        // threshold = 300 - 60 + 40 = 280
        assert_eq!(compute_sidebar_state(&metrics(0.0), 50.0), SidebarState::default());
        assert_eq!(compute_sidebar_state(&metrics(280.0), 50.0), SidebarState::default());
    }

    #[test]
    fn test_fixed_without_offset_above_floor() {
        let state = compute_sidebar_state(&metrics(281.0), 50.0);
        assert_eq!(
            state,
            SidebarState {
                is_fixed: true,
                top_offset_px: None,
            }
        );
    }

    #[test]
    fn test_offset_pulls_sidebar_up_past_floor() {
        // floor = 3000 - 200 - 500 - 40 - 50 = 2210
        let at_floor = compute_sidebar_state(&metrics(2210.0), 50.0);
        assert_eq!(at_floor.top_offset_px, None);

        let past_floor = compute_sidebar_state(&metrics(2300.0), 50.0);
        assert!(past_floor.is_fixed);
        assert_eq!(past_floor.top_offset_px, Some(-90.0));
    }

    #[test]
    fn test_fixed_iff_past_threshold() {
        let heights = [0.0, 10.0, 55.5, 300.0, 1200.0];
        for hero in heights {
            for nav in heights {
                for padding in heights {
                    for scroll in [0.0, 5.0, 150.0, 299.0, 300.0, 301.0, 2000.0] {
                        let metrics = SidebarMetrics {
                            hero_height: hero,
                            nav_height: nav,
                            content_padding: padding,
                            scroll_offset: scroll,
                            document_height: 5000.0,
                            ..SidebarMetrics::default()
                        };
                        let state = compute_sidebar_state(&metrics, 50.0);
                        assert_eq!(state.is_fixed, scroll > hero - nav + padding);
                        if !state.is_fixed {
                            assert_eq!(state.top_offset_px, None);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_offset_never_positive() {
        for scroll in (0..40).map(|i| f64::from(i) * 100.0) {
            let state = compute_sidebar_state(&metrics(scroll), 50.0);
            if let Some(offset) = state.top_offset_px {
                assert!(offset < 0.0, "offset {offset} at scroll {scroll}");
            }
        }
    }

    fn page() -> (Rc<MemoryDocument>, NodeId, NodeId) {
        let doc = Rc::new(MemoryDocument::new());
        let nav = doc.add(doc.body(), "nav", &[("class", "ac-nav")], "");
        let hero = doc.add(doc.body(), "div", &[("class", "hero-section")], "");
        let section = doc.add(doc.body(), "div", &[("class", "documentation-section")], "");
        let sidebar = doc.add(section, "div", &[("id", "sidebar")], "");
        let list = doc.add(sidebar, "ul", &[], "");
        let footer = doc.add(doc.body(), "footer", &[("class", "ac-footer")], "");
        doc.set_geometry(nav, 0.0, 60.0);
        doc.set_geometry(hero, 60.0, 300.0);
        doc.set_padding_top(section, 40.0);
        doc.set_geometry(list, 400.0, 500.0);
        doc.set_geometry(footer, 2800.0, 200.0);
        doc.set_document_height(3000.0);
        (doc, sidebar, list)
    }

    #[test]
    fn test_update_applies_class_and_offset() {
        let (doc, sidebar, list) = page();
        let sticky = StickySidebar::new(doc.as_ref(), sidebar, list, &LayoutConfig::default());

        doc.scroll_to(1000.0);
        sticky.update(&doc).unwrap();
        assert!(doc.has_class(&sidebar, FIXED_CLASS));
        assert_eq!(doc.style(sidebar, "top"), None);

        doc.scroll_to(2300.0);
        sticky.update(&doc).unwrap();
        assert_eq!(doc.style(sidebar, "top").as_deref(), Some("-90px"));

        doc.scroll_to(0.0);
        sticky.update(&doc).unwrap();
        assert!(!doc.has_class(&sidebar, FIXED_CLASS));
        assert_eq!(doc.style(sidebar, "top"), None);
    }

    #[test]
    fn test_update_is_idempotent() {
        let (doc, sidebar, list) = page();
        let sticky = StickySidebar::new(doc.as_ref(), sidebar, list, &LayoutConfig::default());
        doc.scroll_to(2300.0);

        let first = sticky.update(&doc).unwrap();
        let second = sticky.update(&doc).unwrap();

        assert_eq!(first, second);
        assert_eq!(doc.attribute(&sidebar, "class").as_deref(), Some(FIXED_CLASS));
    }

    #[test]
    fn test_missing_regions_measure_zero() {
        let doc = Rc::new(MemoryDocument::new());
        let sidebar = doc.add(doc.body(), "div", &[("id", "sidebar")], "");
        let list = doc.add(sidebar, "ul", &[], "");
        let sticky = StickySidebar::new(doc.as_ref(), sidebar, list, &LayoutConfig::default());

        doc.scroll_to(1.0);
        let metrics = sticky.measure(&doc).unwrap();

        assert_eq!(metrics.scroll_threshold(), 0.0);
        assert!(sticky.update(&doc).unwrap().is_fixed);
    }

    #[test]
    fn test_rejected_region_selector_measures_zero() {
        let (doc, sidebar, list) = page();
        let config = LayoutConfig {
            hero_selector: "div >".to_owned(),
            ..LayoutConfig::default()
        };
        let sticky = StickySidebar::new(doc.as_ref(), sidebar, list, &config);

        let metrics = sticky.measure(&doc).unwrap();

        assert_eq!(metrics.hero_height, 0.0);
        assert_eq!(metrics.nav_height, 60.0);
        assert_eq!(sticky.warnings().len(), 1);
        assert!(sticky.warnings()[0].starts_with("hero_selector: "));
    }

    #[test]
    fn test_wired_sidebar_follows_scroll() {
        let (doc, sidebar, list) = page();
        let sticky = Rc::new(StickySidebar::new(
            doc.as_ref(),
            sidebar,
            list,
            &LayoutConfig::default(),
        ));
        let listeners = sticky.wire(&doc).unwrap();

        doc.scroll_to(500.0);
        assert!(doc.has_class(&sidebar, FIXED_CLASS));

        drop(listeners);
        doc.scroll_to(0.0);
        assert!(doc.has_class(&sidebar, FIXED_CLASS));
    }
}
