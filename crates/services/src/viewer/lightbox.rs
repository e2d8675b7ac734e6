//! Full-screen pager over a resolved page list.

use std::sync::Arc;

use domains::{ImageRef, ViewerHost};
use tracing::debug;

/// Keys the lightbox reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Pointer targets inside the lightbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Previous,
    Next,
    Close,
    Thumbnail(usize),
}

/// Host effects held for as long as the lightbox is open. Dropping it gives
/// scrolling and the keyboard back, whichever way the lightbox goes away.
struct HostSession {
    host: Arc<dyn ViewerHost>,
}

impl HostSession {
    fn begin(host: Arc<dyn ViewerHost>) -> Self {
        host.suspend_background_scroll();
        host.capture_keys();
        Self { host }
    }
}

impl Drop for HostSession {
    fn drop(&mut self) {
        self.host.release_keys();
        self.host.restore_background_scroll();
    }
}

pub struct LightboxViewer {
    images: Arc<[ImageRef]>,
    current: usize,
    session: Option<HostSession>,
    host: Arc<dyn ViewerHost>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub index: usize,
    pub image: ImageRef,
    pub active: bool,
}

/// Everything needed to draw the open lightbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxFrame {
    pub index: usize,
    pub image: ImageRef,
    /// "3 / 7"
    pub position: String,
    pub has_previous: bool,
    pub has_next: bool,
    /// Empty for single-page lists.
    pub thumbnails: Vec<Thumbnail>,
}

impl LightboxViewer {
    pub fn new(images: Arc<[ImageRef]>, host: Arc<dyn ViewerHost>) -> Self {
        Self {
            images,
            current: 0,
            session: None,
            host,
        }
    }

    pub fn images(&self) -> &Arc<[ImageRef]> {
        &self.images
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Kept across close/reopen.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_image(&self) -> Option<&ImageRef> {
        self.images.get(self.current)
    }

    /// Opens at `index`, clamped to the list. Does nothing on an empty list.
    pub fn open(&mut self, index: usize) -> bool {
        let Some(last) = self.images.len().checked_sub(1) else {
            return false;
        };
        self.current = index.min(last);
        if self.session.is_none() {
            self.session = Some(HostSession::begin(Arc::clone(&self.host)));
        }
        debug!(index = self.current, total = self.images.len(), "lightbox opened");
        true
    }

    /// Opens at the page shown when the lightbox was last closed.
    pub fn reopen(&mut self) -> bool {
        self.open(self.current)
    }

    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!(index = self.current, "lightbox closed");
        }
    }

    /// Moves one page forward. Stops at the last page.
    pub fn next(&mut self) -> bool {
        if !self.is_open() || self.current + 1 >= self.images.len() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Moves one page back. Stops at the first page.
    pub fn previous(&mut self) -> bool {
        if !self.is_open() || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Thumbnail click; clamped like `open`.
    pub fn jump_to(&mut self, index: usize) -> bool {
        let Some(last) = self.images.len().checked_sub(1) else {
            return false;
        };
        if !self.is_open() {
            return false;
        }
        let target = index.min(last);
        let moved = target != self.current;
        self.current = target;
        moved
    }

    /// Returns whether the key was consumed. Keys are ignored while closed.
    pub fn handle_key(&mut self, key: ViewerKey) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            ViewerKey::Escape => {
                self.close();
                true
            }
            ViewerKey::ArrowLeft => {
                self.previous();
                true
            }
            ViewerKey::ArrowRight => {
                self.next();
                true
            }
            ViewerKey::Other => false,
        }
    }

    pub fn handle_pointer(&mut self, action: PointerAction) -> bool {
        match action {
            PointerAction::Previous => self.previous(),
            PointerAction::Next => self.next(),
            PointerAction::Close => {
                let was_open = self.is_open();
                self.close();
                was_open
            }
            PointerAction::Thumbnail(index) => self.jump_to(index),
        }
    }

    /// `None` while closed.
    pub fn frame(&self) -> Option<LightboxFrame> {
        if !self.is_open() {
            return None;
        }
        let image = self.current_image()?.clone();
        let total = self.images.len();
        let thumbnails = if total > 1 {
            self.images
                .iter()
                .enumerate()
                .map(|(index, image)| Thumbnail {
                    index,
                    image: image.clone(),
                    active: index == self.current,
                })
                .collect()
        } else {
            Vec::new()
        };
        Some(LightboxFrame {
            index: self.current,
            image,
            position: format!("{} / {}", self.current + 1, total),
            has_previous: self.current > 0,
            has_next: self.current + 1 < total,
            thumbnails,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockViewerHost, NoopHost};

    fn pages(n: usize) -> Arc<[ImageRef]> {
        (0..n).map(|i| ImageRef::new(format!("page-{i}.png"))).collect()
    }

    fn lightbox(n: usize) -> LightboxViewer {
        LightboxViewer::new(pages(n), Arc::new(NoopHost))
    }

    #[test]
    fn test_open_clamps_index() {
        let mut viewer = lightbox(3);
        assert!(viewer.open(10));
        assert_eq!(viewer.current_index(), 2);
    }

    #[test]
    fn test_open_on_empty_list_is_noop() {
        let mut viewer = lightbox(0);
        assert!(!viewer.open(0));
        assert!(!viewer.is_open());
        assert!(viewer.frame().is_none());
    }

    #[test]
    fn test_next_and_previous_stop_at_bounds() {
        let mut viewer = lightbox(3);
        viewer.open(0);
        assert!(!viewer.previous());
        assert!(!viewer.previous());
        assert_eq!(viewer.current_index(), 0);

        for _ in 0..5 {
            viewer.next();
            assert!(viewer.current_index() < 3);
        }
        assert_eq!(viewer.current_index(), 2);
        assert!(!viewer.next());
    }

    #[test]
    fn test_close_preserves_index_for_reopen() {
        let mut viewer = lightbox(5);
        viewer.open(3);
        viewer.close();
        assert!(!viewer.is_open());
        assert!(viewer.reopen());
        assert_eq!(viewer.current_index(), 3);
    }

    #[test]
    fn test_keys_ignored_while_closed() {
        let mut viewer = lightbox(3);
        assert!(!viewer.handle_key(ViewerKey::ArrowRight));
        assert_eq!(viewer.current_index(), 0);

        viewer.open(2);
        assert!(viewer.handle_key(ViewerKey::ArrowRight));
        assert_eq!(viewer.current_index(), 2);
        viewer.handle_key(ViewerKey::ArrowLeft);
        viewer.handle_key(ViewerKey::ArrowLeft);
        assert_eq!(viewer.current_index(), 0);
        assert!(!viewer.handle_key(ViewerKey::Other));
        assert!(viewer.handle_key(ViewerKey::Escape));
        assert!(!viewer.is_open());
    }

    #[test]
    fn test_thumbnail_click_jumps_and_marks_active() {
        let mut viewer = lightbox(4);
        viewer.open(0);
        assert!(viewer.handle_pointer(PointerAction::Thumbnail(2)));
        let frame = viewer.frame().unwrap();
        assert_eq!(frame.index, 2);
        assert_eq!(frame.position, "3 / 4");
        assert!(frame.has_previous && frame.has_next);
        let active: Vec<usize> = frame
            .thumbnails
            .iter()
            .filter(|t| t.active)
            .map(|t| t.index)
            .collect();
        assert_eq!(active, vec![2]);

        viewer.handle_pointer(PointerAction::Thumbnail(99));
        assert_eq!(viewer.current_index(), 3);
        assert!(!viewer.frame().unwrap().has_next);
    }

    #[test]
    fn test_single_page_has_no_thumbnail_strip() {
        let mut viewer = lightbox(1);
        viewer.open(0);
        let frame = viewer.frame().unwrap();
        assert!(frame.thumbnails.is_empty());
        assert!(!frame.has_previous && !frame.has_next);
    }

    #[test]
    fn test_host_effects_follow_open_state() {
        let mut host = MockViewerHost::new();
        host.expect_suspend_background_scroll().times(1).return_const(());
        host.expect_capture_keys().times(1).return_const(());
        host.expect_release_keys().times(1).return_const(());
        host.expect_restore_background_scroll().times(1).return_const(());

        let mut viewer = LightboxViewer::new(pages(2), Arc::new(host));
        viewer.open(0);
        viewer.open(1);
        viewer.close();
        viewer.close();
    }

    #[test]
    fn test_dropping_open_viewer_restores_host() {
        let mut host = MockViewerHost::new();
        host.expect_suspend_background_scroll().times(1).return_const(());
        host.expect_capture_keys().times(1).return_const(());
        host.expect_release_keys().times(1).return_const(());
        host.expect_restore_background_scroll().times(1).return_const(());

        let mut viewer = LightboxViewer::new(pages(2), Arc::new(host));
        viewer.open(1);
        drop(viewer);
    }
}
