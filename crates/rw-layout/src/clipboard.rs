//! Clipboard collaborator.
//!
//! A [`Clipboard`] watches a trigger element. Every click creates a one-shot
//! [`ClipboardAction`] that resolves the text, hands it to a [`CopyBackend`]
//! and reports the outcome as exactly one `success` or `error` event through
//! the clipboard's [`Emitter`].
//!
//! The backend performs the actual copy. It may complete synchronously or
//! later (the browser Clipboard API is asynchronous); either way it reports
//! through the [`CopyCompletion`] it was given. A click supersedes the
//! previous action, and a superseded or released action never emits.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use rw_dom::{EventKind, EventTarget, Events, Listener};

use crate::error::LayoutError;

/// Clipboard operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Action {
    /// Copy the text.
    #[default]
    Copy,
    /// Copy the text and remove it from an editable source.
    Cut,
}

impl Action {
    /// Operation name (`copy` or `cut`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Cut => "cut",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ClipboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy" => Ok(Self::Copy),
            "cut" => Ok(Self::Cut),
            other => Err(ClipboardError::InvalidAction(other.to_owned())),
        }
    }
}

/// Clipboard error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    /// Action name other than `copy` or `cut`.
    #[error("Invalid action {0:?}, use either \"copy\" or \"cut\"")]
    InvalidAction(String),
    /// The backend could not write to the clipboard.
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Outcome event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipboardEventKind {
    /// Text reached the clipboard.
    Success,
    /// Copy failed; the reader has to copy manually.
    Error,
}

impl ClipboardEventKind {
    /// Event name (`success` or `error`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Payload of a clipboard outcome event.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipboardEvent<E> {
    /// Which outcome this is.
    pub kind: ClipboardEventKind,
    /// Operation that was attempted.
    pub action: Action,
    /// Text handed to the backend.
    pub text: String,
    /// Element that was clicked.
    pub trigger: E,
}

/// Identifies one subscription on an [`Emitter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription<K, T> {
    id: SubscriptionId,
    kind: K,
    once: bool,
    handler: Rc<dyn Fn(&T)>,
}

/// Minimal single-threaded event emitter.
///
/// Handlers for one kind run in subscription order. [`emit`](Self::emit)
/// works on a snapshot, so handlers may subscribe or unsubscribe while it runs.
pub struct Emitter<K, T> {
    next_id: Cell<u64>,
    subscriptions: RefCell<Vec<Subscription<K, T>>>,
}

impl<K, T> Default for Emitter<K, T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            subscriptions: RefCell::new(Vec::new()),
        }
    }
}

impl<K: fmt::Debug, T> fmt::Debug for Emitter<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<String> = self
            .subscriptions
            .borrow()
            .iter()
            .map(|s| format!("{:?}", s.kind))
            .collect();
        f.debug_struct("Emitter").field("subscriptions", &kinds).finish()
    }
}

impl<K: Copy + PartialEq, T> Emitter<K, T> {
    /// Create an emitter without subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to every `kind` event.
    pub fn on(&self, kind: K, handler: impl Fn(&T) + 'static) -> SubscriptionId {
        self.subscribe(kind, false, Rc::new(handler))
    }

    /// Subscribe `handler` to the next `kind` event only.
    pub fn once(&self, kind: K, handler: impl Fn(&T) + 'static) -> SubscriptionId {
        self.subscribe(kind, true, Rc::new(handler))
    }

    /// Remove one subscription, or every subscription for `kind` when `id` is `None`.
    pub fn off(&self, kind: K, id: Option<SubscriptionId>) {
        self.subscriptions
            .borrow_mut()
            .retain(|s| s.kind != kind || id.is_some_and(|id| s.id != id));
    }

    /// Run the handlers subscribed to `kind`. Returns how many ran.
    pub fn emit(&self, kind: K, payload: &T) -> usize {
        let handlers: Vec<Rc<dyn Fn(&T)>> = {
            let mut subscriptions = self.subscriptions.borrow_mut();
            let handlers = subscriptions
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| Rc::clone(&s.handler))
                .collect();
            subscriptions.retain(|s| !(s.once && s.kind == kind));
            handlers
        };

        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Number of subscriptions for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: K) -> usize {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    fn subscribe(&self, kind: K, once: bool, handler: Rc<dyn Fn(&T)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscriptions.borrow_mut().push(Subscription {
            id,
            kind,
            once,
            handler,
        });
        id
    }
}

type ClipboardEmitter<E> = Emitter<ClipboardEventKind, ClipboardEvent<E>>;

/// Completion handle passed to a [`CopyBackend`].
///
/// Uses RAII pattern - a completion dropped without being completed reports
/// an error, so every write produces exactly one outcome.
pub struct CopyCompletion {
    report: Option<Box<dyn FnOnce(Result<(), ClipboardError>)>>,
}

impl CopyCompletion {
    /// Create a completion that passes the outcome to `report`.
    pub fn new(report: impl FnOnce(Result<(), ClipboardError>) + 'static) -> Self {
        Self {
            report: Some(Box::new(report)),
        }
    }

    /// Report the outcome.
    pub fn complete(mut self, result: Result<(), ClipboardError>) {
        if let Some(report) = self.report.take() {
            report(result);
        }
    }

    /// Report success.
    pub fn succeed(self) {
        self.complete(Ok(()));
    }

    /// Report failure.
    pub fn fail(self, error: ClipboardError) {
        self.complete(Err(error));
    }
}

impl Drop for CopyCompletion {
    fn drop(&mut self) {
        if let Some(report) = self.report.take() {
            report(Err(ClipboardError::Unavailable("copy was abandoned".to_owned())));
        }
    }
}

impl fmt::Debug for CopyCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyCompletion")
            .field("pending", &self.report.is_some())
            .finish()
    }
}

/// Writes text to the system clipboard.
pub trait CopyBackend {
    /// Perform `action` on `text` and report through `completion`.
    fn write(&self, action: Action, text: &str, completion: CopyCompletion);

    /// Whether the backend can copy at all in this environment.
    ///
    /// Actions run against an unsupported backend fail without calling
    /// [`write`](Self::write).
    fn is_supported(&self) -> bool {
        true
    }
}

/// One click's clipboard operation.
pub struct ClipboardAction<E> {
    action: Action,
    text: String,
    trigger: E,
    emitter: Weak<ClipboardEmitter<E>>,
    released: Rc<Cell<bool>>,
}

impl<E: Clone + 'static> ClipboardAction<E> {
    /// Create an action that reports to `emitter`.
    pub fn new(
        action: Action,
        text: String,
        trigger: E,
        emitter: &Rc<ClipboardEmitter<E>>,
    ) -> Self {
        Self {
            action,
            text,
            trigger,
            emitter: Rc::downgrade(emitter),
            released: Rc::new(Cell::new(false)),
        }
    }

    /// Hand the text to `backend`.
    pub fn run(&self, backend: &dyn CopyBackend) {
        let released = Rc::clone(&self.released);
        let emitter = Weak::clone(&self.emitter);
        let action = self.action;
        let text = self.text.clone();
        let trigger = self.trigger.clone();

        let completion = CopyCompletion::new(move |result| {
            if released.get() {
                tracing::debug!(action = %action, "Dropping outcome of released clipboard action");
                return;
            }
            let Some(emitter) = emitter.upgrade() else {
                return;
            };
            let kind = match result {
                Ok(()) => ClipboardEventKind::Success,
                Err(e) => {
                    tracing::debug!(error = %e, action = %action, "Clipboard write failed");
                    ClipboardEventKind::Error
                }
            };
            emitter.emit(
                kind,
                &ClipboardEvent {
                    kind,
                    action,
                    text,
                    trigger,
                },
            );
        });

        if !backend.is_supported() {
            completion.fail(ClipboardError::Unavailable("clipboard is not supported".to_owned()));
            return;
        }
        backend.write(self.action, &self.text, completion);
    }

    /// Detach the action: a pending outcome will not be reported.
    pub fn release(&self) {
        self.released.set(true);
    }

    /// Whether [`release`](Self::release) was called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.get()
    }

    /// Operation.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// Resolved text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl<E: fmt::Debug> fmt::Debug for ClipboardAction<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardAction")
            .field("action", &self.action)
            .field("text", &self.text)
            .field("trigger", &self.trigger)
            .field("released", &self.released.get())
            .finish_non_exhaustive()
    }
}

/// Resolves the text to copy at click time.
pub type TextResolver = Rc<dyn Fn() -> String>;

/// Options for [`Clipboard::new`].
#[derive(Clone)]
pub struct ClipboardOptions {
    /// Operation performed on click.
    pub action: Action,
    /// Text to copy, resolved on every click.
    pub text: TextResolver,
}

impl ClipboardOptions {
    /// Copy the text returned by `text`.
    pub fn copy(text: impl Fn() -> String + 'static) -> Self {
        Self {
            action: Action::Copy,
            text: Rc::new(text),
        }
    }
}

impl fmt::Debug for ClipboardOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardOptions")
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

struct Shared<E> {
    trigger: E,
    options: ClipboardOptions,
    backend: Rc<dyn CopyBackend>,
    emitter: Rc<ClipboardEmitter<E>>,
    current: RefCell<Option<ClipboardAction<E>>>,
}

impl<E: Clone + 'static> Shared<E> {
    fn on_click(&self) {
        self.release_current();
        let action = ClipboardAction::new(
            self.options.action,
            (self.options.text)(),
            self.trigger.clone(),
            &self.emitter,
        );
        action.run(self.backend.as_ref());
        *self.current.borrow_mut() = Some(action);
    }

    fn release_current(&self) {
        if let Some(previous) = self.current.borrow_mut().take() {
            previous.release();
        }
    }
}

/// Clipboard bound to a trigger element.
///
/// Dropping it detaches the click listener and releases the current action.
pub struct Clipboard<E: Clone + 'static> {
    shared: Rc<Shared<E>>,
    _click: Listener,
}

impl<E: Clone + 'static> Clipboard<E> {
    /// Bind a clipboard to clicks on `trigger`.
    pub fn new<D>(
        dom: &D,
        trigger: &E,
        options: ClipboardOptions,
        backend: Rc<dyn CopyBackend>,
    ) -> Result<Self, LayoutError>
    where
        D: Events<Element = E>,
    {
        let shared = Rc::new(Shared {
            trigger: trigger.clone(),
            options,
            backend,
            emitter: Rc::new(Emitter::new()),
            current: RefCell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        let click = dom.listen(
            &EventTarget::Element(trigger.clone()),
            EventKind::Click,
            Rc::new(move |_| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_click();
                }
            }),
        )?;

        Ok(Self {
            shared,
            _click: click,
        })
    }

    /// Subscribe to every `kind` outcome.
    pub fn on(
        &self,
        kind: ClipboardEventKind,
        handler: impl Fn(&ClipboardEvent<E>) + 'static,
    ) -> SubscriptionId {
        self.shared.emitter.on(kind, handler)
    }

    /// Subscribe to the next `kind` outcome only.
    pub fn once(
        &self,
        kind: ClipboardEventKind,
        handler: impl Fn(&ClipboardEvent<E>) + 'static,
    ) -> SubscriptionId {
        self.shared.emitter.once(kind, handler)
    }

    /// Unsubscribe one handler, or all handlers for `kind`.
    pub fn off(&self, kind: ClipboardEventKind, id: Option<SubscriptionId>) {
        self.shared.emitter.off(kind, id);
    }

    /// The trigger element.
    #[must_use]
    pub fn trigger(&self) -> &E {
        &self.shared.trigger
    }

    /// Operation performed on click.
    #[must_use]
    pub fn action(&self) -> Action {
        self.shared.options.action
    }

    /// Detach from the trigger and release the current action.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<E: Clone + 'static> Drop for Clipboard<E> {
    fn drop(&mut self) {
        self.shared.release_current();
    }
}

impl<E: Clone + fmt::Debug + 'static> fmt::Debug for Clipboard<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clipboard")
            .field("trigger", &self.shared.trigger)
            .field("action", &self.shared.options.action)
            .field("current", &self.shared.current.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rw_dom::{MemoryDocument, NodeId};

    use super::*;
    use crate::testing::{Outcome, RecordingBackend};

    fn record(
        clipboard: &Clipboard<NodeId>,
    ) -> Rc<RefCell<Vec<(ClipboardEventKind, String)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in [ClipboardEventKind::Success, ClipboardEventKind::Error] {
            let log = Rc::clone(&log);
            clipboard.on(kind, move |event| {
                log.borrow_mut().push((event.kind, event.text.clone()));
            });
        }
        log
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("copy".parse::<Action>().unwrap(), Action::Copy);
        assert_eq!("cut".parse::<Action>().unwrap(), Action::Cut);
        assert_eq!(Action::default(), Action::Copy);

        let err = "paste".parse::<Action>().unwrap_err();
        assert_eq!(err, ClipboardError::InvalidAction("paste".to_owned()));
        assert_eq!(
            err.to_string(),
            "Invalid action \"paste\", use either \"copy\" or \"cut\""
        );
    }

    #[test]
    fn test_event_kind_names() {
        assert_eq!(ClipboardEventKind::Success.name(), "success");
        assert_eq!(ClipboardEventKind::Error.name(), "error");
    }

    #[test]
    fn test_emitter_on_once_off() {
        let emitter: Emitter<&str, i32> = Emitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let always = Rc::clone(&seen);
        let id = emitter.on("tick", move |n| always.borrow_mut().push(("on", *n)));
        let first = Rc::clone(&seen);
        emitter.once("tick", move |n| first.borrow_mut().push(("once", *n)));

        assert_eq!(emitter.emit("tick", &1), 2);
        assert_eq!(emitter.emit("tick", &2), 1);
        emitter.off("tick", Some(id));
        assert_eq!(emitter.emit("tick", &3), 0);

        assert_eq!(*seen.borrow(), vec![("on", 1), ("once", 1), ("on", 2)]);
    }

    #[test]
    fn test_emitter_off_all_for_kind() {
        let emitter: Emitter<&str, ()> = Emitter::new();
        emitter.on("a", |_| {});
        emitter.on("a", |_| {});
        emitter.on("b", |_| {});

        emitter.off("a", None);

        assert_eq!(emitter.listener_count("a"), 0);
        assert_eq!(emitter.listener_count("b"), 1);
    }

    #[test]
    fn test_emitter_handler_may_unsubscribe() {
        let emitter: Rc<Emitter<&str, ()>> = Rc::new(Emitter::new());
        let weak = Rc::downgrade(&emitter);
        emitter.on("a", move |_| {
            if let Some(emitter) = weak.upgrade() {
                emitter.off("a", None);
            }
        });

        assert_eq!(emitter.emit("a", &()), 1);
        assert_eq!(emitter.listener_count("a"), 0);
    }

    #[test]
    fn test_completion_dropped_reports_error() {
        let result = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&result);

        drop(CopyCompletion::new(move |r| *slot.borrow_mut() = Some(r)));

        assert!(matches!(
            *result.borrow(),
            Some(Err(ClipboardError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_click_emits_exactly_one_success() {
        let doc = MemoryDocument::new();
        let button = doc.add(doc.body(), "button", &[], "");
        let backend = Rc::new(RecordingBackend::new(Outcome::Succeed));
        let clipboard = Clipboard::new(
            &doc,
            &button,
            ClipboardOptions::copy(|| "fn main() {}".to_owned()),
            Rc::clone(&backend) as Rc<dyn CopyBackend>,
        )
        .unwrap();
        let log = record(&clipboard);

        doc.click(button);

        assert_eq!(
            *log.borrow(),
            vec![(ClipboardEventKind::Success, "fn main() {}".to_owned())]
        );
        assert_eq!(backend.writes(), vec![(Action::Copy, "fn main() {}".to_owned())]);
    }

    #[test]
    fn test_backend_failure_emits_error() {
        let doc = MemoryDocument::new();
        let button = doc.add(doc.body(), "button", &[], "");
        let backend: Rc<dyn CopyBackend> = Rc::new(RecordingBackend::new(Outcome::Fail));
        let clipboard = Clipboard::new(
            &doc,
            &button,
            ClipboardOptions::copy(|| "text".to_owned()),
            backend,
        )
        .unwrap();
        let log = record(&clipboard);

        doc.click(button);

        assert_eq!(*log.borrow(), vec![(ClipboardEventKind::Error, "text".to_owned())]);
    }

    #[test]
    fn test_unsupported_backend_emits_error_without_writing() {
        let doc = MemoryDocument::new();
        let button = doc.add(doc.body(), "button", &[], "");
        let backend = Rc::new(RecordingBackend::unsupported());
        let clipboard = Clipboard::new(
            &doc,
            &button,
            ClipboardOptions::copy(|| "text".to_owned()),
            Rc::clone(&backend) as Rc<dyn CopyBackend>,
        )
        .unwrap();
        let log = record(&clipboard);

        doc.click(button);

        assert_eq!(*log.borrow(), vec![(ClipboardEventKind::Error, "text".to_owned())]);
        assert!(backend.writes().is_empty());
    }

    #[test]
    fn test_text_resolved_at_click_time() {
        let doc = MemoryDocument::new();
        let button = doc.add(doc.body(), "button", &[], "");
        let source = Rc::new(RefCell::new("before".to_owned()));
        let resolver = Rc::clone(&source);
        let backend = Rc::new(RecordingBackend::new(Outcome::Succeed));
        let _clipboard = Clipboard::new(
            &doc,
            &button,
            ClipboardOptions::copy(move || resolver.borrow().clone()),
            Rc::clone(&backend) as Rc<dyn CopyBackend>,
        )
        .unwrap();

        "after".clone_into(&mut source.borrow_mut());
        doc.click(button);

        assert_eq!(backend.writes(), vec![(Action::Copy, "after".to_owned())]);
    }

    #[test]
    fn test_new_click_releases_pending_action() {
        let doc = MemoryDocument::new();
        let button = doc.add(doc.body(), "button", &[], "");
        let backend = Rc::new(RecordingBackend::new(Outcome::Defer));
        let clipboard = Clipboard::new(
            &doc,
            &button,
            ClipboardOptions::copy(|| "text".to_owned()),
            Rc::clone(&backend) as Rc<dyn CopyBackend>,
        )
        .unwrap();
        let log = record(&clipboard);

        doc.click(button);
        doc.click(button);
        backend.complete_all(true);

        // Only the second click's outcome is reported.
        assert_eq!(*log.borrow(), vec![(ClipboardEventKind::Success, "text".to_owned())]);
    }

    #[test]
    fn test_destroy_detaches_and_silences() {
        let doc = MemoryDocument::new();
        let button = doc.add(doc.body(), "button", &[], "");
        let backend = Rc::new(RecordingBackend::new(Outcome::Defer));
        let clipboard = Clipboard::new(
            &doc,
            &button,
            ClipboardOptions::copy(|| "text".to_owned()),
            Rc::clone(&backend) as Rc<dyn CopyBackend>,
        )
        .unwrap();
        let log = record(&clipboard);

        doc.click(button);
        clipboard.destroy();
        backend.complete_all(true);
        doc.click(button);

        assert!(log.borrow().is_empty());
        assert_eq!(backend.writes().len(), 1);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_once_subscription() {
        let doc = MemoryDocument::new();
        let button = doc.add(doc.body(), "button", &[], "");
        let backend: Rc<dyn CopyBackend> = Rc::new(RecordingBackend::new(Outcome::Succeed));
        let clipboard = Clipboard::new(
            &doc,
            &button,
            ClipboardOptions::copy(String::new),
            backend,
        )
        .unwrap();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        clipboard.once(ClipboardEventKind::Success, move |_| counter.set(counter.get() + 1));

        doc.click(button);
        doc.click(button);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_cut_action_reaches_backend() {
        let doc = MemoryDocument::new();
        let button = doc.add(doc.body(), "button", &[], "");
        let backend = Rc::new(RecordingBackend::new(Outcome::Succeed));
        let options = ClipboardOptions {
            action: "cut".parse().unwrap(),
            text: Rc::new(|| "x".to_owned()),
        };
        let clipboard =
            Clipboard::new(&doc, &button, options, Rc::clone(&backend) as Rc<dyn CopyBackend>)
                .unwrap();

        doc.click(button);

        assert_eq!(clipboard.action(), Action::Cut);
        assert_eq!(backend.writes(), vec![(Action::Cut, "x".to_owned())]);
    }
}
