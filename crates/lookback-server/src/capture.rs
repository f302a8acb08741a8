use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Whether the external capture subsystem should currently be recording.
///
/// An explicitly owned cell handed to whoever needs it rather than a module
/// singleton, so tests and embedders can hold independent instances.
/// Starts active; not persisted across restarts.
#[derive(Clone)]
pub struct CaptureFlag(Arc<AtomicBool>);

impl Default for CaptureFlag {
    fn default() -> Self {
        CaptureFlag::new(true)
    }
}

impl CaptureFlag {
    pub fn new(active: bool) -> Self {
        CaptureFlag(Arc::new(AtomicBool::new(active)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Atomically flip the flag and return the new value. Concurrent toggles
    /// serialize on the atomic, so each caller observes a distinct state.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::SeqCst)
    }
}
