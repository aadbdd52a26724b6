//! Page layout orchestration.
//!
//! Installs every enhancement in order: table of contents, sticky sidebar,
//! scroll spy, anchors, copy buttons. A container that cannot be found or a
//! selector the document rejects only disables the features that need it.

use std::rc::Rc;

use rw_config::LayoutConfig;
use rw_dom::{Dom, Listener, Page};

use crate::anchors::inject_anchors;
use crate::clipboard::CopyBackend;
use crate::copy_buttons::{CopyButton, inject_copy_buttons};
use crate::error::LayoutError;
use crate::scroll_spy::ScrollSpy;
use crate::sticky::StickySidebar;
use crate::toc::TableOfContents;

/// Summary of what [`install`] set up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Table of contents entries at all depths.
    pub toc_entries: usize,
    /// Anchors added to headings and API entries.
    pub anchors: usize,
    /// Copy buttons added to code blocks.
    pub copy_buttons: usize,
    /// Features that were skipped, with the reason.
    pub warnings: Vec<String>,
}

/// Page enhancements wired into a document.
///
/// Owns every listener; dropping it (or calling [`destroy`](Self::destroy))
/// detaches them all and releases pending clipboard actions. Elements added
/// to the page stay in place.
#[derive(Debug)]
pub struct InstalledLayout<D: Page + 'static> {
    toc: Option<TableOfContents<D>>,
    sticky: Option<Rc<StickySidebar<D>>>,
    scroll_spy: Option<Rc<ScrollSpy<D>>>,
    copy_buttons: Vec<CopyButton<D::Element>>,
    listeners: Vec<Listener>,
    report: InstallReport,
}

impl<D: Page + 'static> InstalledLayout<D> {
    /// What was installed.
    #[must_use]
    pub fn report(&self) -> &InstallReport {
        &self.report
    }

    /// The table of contents, when both containers were found.
    #[must_use]
    pub fn toc(&self) -> Option<&TableOfContents<D>> {
        self.toc.as_ref()
    }

    /// The sticky sidebar, when the sidebar was built.
    #[must_use]
    pub fn sticky(&self) -> Option<&StickySidebar<D>> {
        self.sticky.as_deref()
    }

    /// The scroll spy, when the sidebar was built.
    #[must_use]
    pub fn scroll_spy(&self) -> Option<&ScrollSpy<D>> {
        self.scroll_spy.as_deref()
    }

    /// Injected copy buttons.
    #[must_use]
    pub fn copy_buttons(&self) -> &[CopyButton<D::Element>] {
        &self.copy_buttons
    }

    /// Detach every listener and release pending clipboard actions.
    pub fn destroy(self) {
        let Self {
            toc,
            copy_buttons,
            listeners,
            ..
        } = self;
        drop(listeners);
        for button in copy_buttons {
            button.destroy();
        }
        drop(toc);
        tracing::debug!("Destroyed page layout");
    }
}

/// Install the page enhancements described by `config` into `dom`.
///
/// Fails only on invalid configuration. A missing container, a selector the
/// document rejects or a document error disables the affected feature, is
/// logged and is listed in [`InstallReport::warnings`].
pub fn install<D: Page + 'static>(
    dom: &Rc<D>,
    config: &LayoutConfig,
    backend: Rc<dyn CopyBackend>,
) -> Result<InstalledLayout<D>, LayoutError> {
    config.validate()?;

    let mut report = InstallReport::default();
    let headers = resolve(
        dom.as_ref(),
        "headers_container",
        &config.headers_container,
        &mut report,
    );
    let sidebar = resolve(
        dom.as_ref(),
        "sidebar_container",
        &config.sidebar_container,
        &mut report,
    );

    let mut toc = None;
    let mut sticky = None;
    let mut scroll_spy = None;
    let mut listeners = Vec::new();

    if let (Some(headers), Some(sidebar)) = (&headers, &sidebar) {
        match install_sidebar(dom, headers, sidebar, config) {
            Ok(parts) => {
                report.toc_entries = parts.toc.toc().len();
                report.warnings.extend_from_slice(parts.sticky.warnings());
                listeners = parts.listeners;
                toc = Some(parts.toc);
                sticky = Some(parts.sticky);
                scroll_spy = Some(parts.scroll_spy);
            }
            Err(e) => skip_feature("sidebar", &e, &mut report),
        }
    }

    if let Some(headers) = &headers {
        match inject_anchors(dom.as_ref(), headers, &config.anchor_target_selector()) {
            Ok(count) => report.anchors = count,
            Err(e) => skip_feature("anchors", &e, &mut report),
        }
    }

    let copy_buttons = match inject_copy_buttons(dom, config, &backend) {
        Ok(buttons) => buttons,
        Err(e) => {
            skip_feature("copy buttons", &e, &mut report);
            Vec::new()
        }
    };
    report.copy_buttons = copy_buttons.len();

    tracing::info!(
        toc_entries = report.toc_entries,
        anchors = report.anchors,
        copy_buttons = report.copy_buttons,
        warnings = report.warnings.len(),
        "Installed page layout"
    );

    Ok(InstalledLayout {
        toc,
        sticky,
        scroll_spy,
        copy_buttons,
        listeners,
        report,
    })
}

/// Table of contents with the sticky sidebar and scroll spy bound to it.
struct SidebarParts<D: Page + 'static> {
    toc: TableOfContents<D>,
    sticky: Rc<StickySidebar<D>>,
    scroll_spy: Rc<ScrollSpy<D>>,
    listeners: Vec<Listener>,
}

fn install_sidebar<D: Page + 'static>(
    dom: &Rc<D>,
    headers: &D::Element,
    sidebar: &D::Element,
    config: &LayoutConfig,
) -> Result<SidebarParts<D>, LayoutError> {
    let toc = TableOfContents::install(dom, headers, sidebar, config.header_start_level)?;

    let sticky = Rc::new(StickySidebar::new(
        dom.as_ref(),
        sidebar.clone(),
        toc.list().clone(),
        config,
    ));
    let mut listeners = sticky.wire(dom)?;
    sticky.update(dom)?;

    let scroll_spy = Rc::new(ScrollSpy::new(sidebar.clone(), toc.headings().to_vec()));
    listeners.extend(scroll_spy.wire(dom)?);
    scroll_spy.update(dom)?;

    Ok(SidebarParts {
        toc,
        sticky,
        scroll_spy,
        listeners,
    })
}

/// Find the element for a required container; log and record a warning when absent.
fn resolve<D: Dom>(
    dom: &D,
    option: &'static str,
    selector: &str,
    report: &mut InstallReport,
) -> Option<D::Element> {
    let error = match dom.query_selector(selector) {
        Ok(Some(element)) => return Some(element),
        Ok(None) => LayoutError::MissingElement {
            option,
            selector: selector.to_owned(),
        },
        Err(e) => LayoutError::Dom(e),
    };
    tracing::warn!(
        option,
        selector,
        error = %error,
        "Disabling features that need this container"
    );
    report.warnings.push(error.to_string());
    None
}

fn skip_feature(feature: &'static str, error: &LayoutError, report: &mut InstallReport) {
    tracing::warn!(feature, error = %error, "Skipping page feature");
    report.warnings.push(format!("{feature}: {error}"));
}
