//! RAII guard for registered event listeners.

use std::fmt;

/// Handle to a registered event listener.
///
/// Uses RAII pattern - dropping the handle detaches the listener.
/// Call [`release`](Self::release) to detach explicitly at a known point.
pub struct Listener {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Listener {
    /// Create a listener handle that runs `detach` exactly once.
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Create a no-op handle that does nothing on drop.
    #[must_use]
    pub fn no_op() -> Self {
        Self { detach: None }
    }

    /// Detach the listener immediately (consumes the handle).
    pub fn release(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}
