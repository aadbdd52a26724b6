//! Layout tick wiring.
//!
//! Sticky sidebar and scroll spy recompute their state on the same set of
//! events: window `load`, document `DOMContentLoaded`, document `scroll` and
//! window `resize`.

use std::rc::{Rc, Weak};

use rw_dom::{EventKind, EventTarget, Events, Listener};

use crate::error::LayoutError;

/// Events that trigger a layout recomputation, with their targets.
const TICK_EVENTS: [(TickTarget, EventKind); 4] = [
    (TickTarget::Window, EventKind::Load),
    (TickTarget::Document, EventKind::DomContentLoaded),
    (TickTarget::Document, EventKind::Scroll),
    (TickTarget::Window, EventKind::Resize),
];

#[derive(Clone, Copy)]
enum TickTarget {
    Window,
    Document,
}

impl TickTarget {
    fn resolve<E>(self) -> EventTarget<E> {
        match self {
            Self::Window => EventTarget::Window,
            Self::Document => EventTarget::Document,
        }
    }
}

/// Run `tick` on every layout-affecting event.
///
/// The handlers hold a weak reference to the document; once the document is
/// gone they do nothing. Dropping the returned listeners detaches them.
pub fn listen_layout_ticks<D>(
    dom: &Rc<D>,
    tick: impl Fn(&D) + 'static,
) -> Result<Vec<Listener>, LayoutError>
where
    D: Events + 'static,
{
    let tick: Rc<dyn Fn(&D)> = Rc::new(tick);
    let mut listeners = Vec::with_capacity(TICK_EVENTS.len());

    for (target, kind) in TICK_EVENTS {
        let weak: Weak<D> = Rc::downgrade(dom);
        let tick = Rc::clone(&tick);
        let listener = dom.listen(
            &target.resolve(),
            kind,
            Rc::new(move |_| {
                if let Some(dom) = weak.upgrade() {
                    tick(&dom);
                }
            }),
        )?;
        listeners.push(listener);
    }

    Ok(listeners)
}
