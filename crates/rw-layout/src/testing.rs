//! Test doubles shared by the component tests.

use std::cell::{Cell, RefCell};

use crate::clipboard::{Action, ClipboardError, CopyBackend, CopyCompletion};

/// How [`RecordingBackend`] completes writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Succeed,
    Fail,
    /// Keep the completion until [`RecordingBackend::complete_all`].
    Defer,
}

/// Clipboard backend that records writes instead of touching a clipboard.
#[derive(Debug)]
pub(crate) struct RecordingBackend {
    outcome: Outcome,
    supported: Cell<bool>,
    writes: RefCell<Vec<(Action, String)>>,
    pending: RefCell<Vec<CopyCompletion>>,
}

impl RecordingBackend {
    pub(crate) fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            supported: Cell::new(true),
            writes: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn unsupported() -> Self {
        let backend = Self::new(Outcome::Succeed);
        backend.supported.set(false);
        backend
    }

    pub(crate) fn writes(&self) -> Vec<(Action, String)> {
        self.writes.borrow().clone()
    }

    /// Complete every deferred write.
    pub(crate) fn complete_all(&self, success: bool) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for completion in pending {
            if success {
                completion.succeed();
            } else {
                completion.fail(ClipboardError::Unavailable("denied".to_owned()));
            }
        }
    }
}

impl CopyBackend for RecordingBackend {
    fn write(&self, action: Action, text: &str, completion: CopyCompletion) {
        self.writes.borrow_mut().push((action, text.to_owned()));
        match self.outcome {
            Outcome::Succeed => completion.succeed(),
            Outcome::Fail => completion.fail(ClipboardError::Unavailable("denied".to_owned())),
            Outcome::Defer => self.pending.borrow_mut().push(completion),
        }
    }

    fn is_supported(&self) -> bool {
        self.supported.get()
    }
}
