use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared stream-enabled flag.
///
/// The display loop reads it once per iteration and never owns it;
/// whoever toggles streaming (UI callbacks, a timer, a test) holds a
/// clone. Clearing the flag cancels the loop cooperatively within one
/// polling interval.
#[derive(Clone, Default)]
pub struct StreamFlag(Arc<AtomicBool>);

impl StreamFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
