use std::sync::atomic::{AtomicBool, Ordering};

use domains::ViewerHost;
use tracing::debug;

/// The terminal has no background page to freeze. Key capture decides whether
/// `left`, `right` and `esc` reach the lightbox.
#[derive(Debug, Default)]
pub struct TerminalHost {
    keys_captured: AtomicBool,
}

impl TerminalHost {
    pub fn keys_captured(&self) -> bool {
        self.keys_captured.load(Ordering::Relaxed)
    }
}

impl ViewerHost for TerminalHost {
    fn suspend_background_scroll(&self) {
        debug!("background scroll suspended");
    }

    fn restore_background_scroll(&self) {
        debug!("background scroll restored");
    }

    fn capture_keys(&self) {
        self.keys_captured.store(true, Ordering::Relaxed);
    }

    fn release_keys(&self) {
        self.keys_captured.store(false, Ordering::Relaxed);
    }
}
