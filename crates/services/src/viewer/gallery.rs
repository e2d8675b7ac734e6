//! Grid over a resolved page list, with the lightbox layered on top of it.

use std::sync::Arc;

use domains::{ImageRef, ViewerHost};

use super::lightbox::LightboxViewer;

/// The gallery and its lightbox are two regions of one state: opening the
/// lightbox leaves the grid open underneath, closing it returns to the grid.
pub struct GalleryViewer {
    title: String,
    open: bool,
    lightbox: LightboxViewer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCell {
    pub index: usize,
    pub image: ImageRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryView {
    /// The exercise has no solution yet.
    Empty { title: String },
    Grid { title: String, cells: Vec<GalleryCell> },
}

impl GalleryViewer {
    /// Starts open.
    pub fn new(title: impl Into<String>, images: Arc<[ImageRef]>, host: Arc<dyn ViewerHost>) -> Self {
        Self {
            title: title.into(),
            open: true,
            lightbox: LightboxViewer::new(images, host),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn images(&self) -> &Arc<[ImageRef]> {
        self.lightbox.images()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Closes the grid and anything stacked on it.
    pub fn close(&mut self) {
        self.lightbox.close();
        self.open = false;
    }

    /// Cell click: opens the lightbox at `index`, grid stays open.
    pub fn click(&mut self, index: usize) -> bool {
        self.open && self.lightbox.open(index)
    }

    pub fn lightbox(&self) -> &LightboxViewer {
        &self.lightbox
    }

    pub fn lightbox_mut(&mut self) -> &mut LightboxViewer {
        &mut self.lightbox
    }

    /// `None` while closed.
    pub fn view(&self) -> Option<GalleryView> {
        if !self.open {
            return None;
        }
        let title = self.title.clone();
        let images = self.images();
        if images.is_empty() {
            return Some(GalleryView::Empty { title });
        }
        let cells = images
            .iter()
            .enumerate()
            .map(|(index, image)| GalleryCell {
                index,
                image: image.clone(),
            })
            .collect();
        Some(GalleryView::Grid { title, cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::lightbox::ViewerKey;
    use domains::NoopHost;

    fn gallery(pages: &[&str]) -> GalleryViewer {
        let images: Arc<[ImageRef]> = pages.iter().map(|p| ImageRef::from(*p)).collect();
        GalleryViewer::new("Linear Algebra - TD - 2023 - #1", images, Arc::new(NoopHost))
    }

    #[test]
    fn test_click_opens_lightbox_over_open_grid() {
        let mut viewer = gallery(&["a", "b", "c"]);
        assert!(viewer.click(1));
        assert!(viewer.is_open());
        assert!(viewer.lightbox().is_open());
        assert_eq!(viewer.lightbox().current_index(), 1);
    }

    #[test]
    fn test_closing_lightbox_keeps_grid() {
        let mut viewer = gallery(&["a", "b"]);
        viewer.click(0);
        viewer.lightbox_mut().handle_key(ViewerKey::Escape);
        assert!(!viewer.lightbox().is_open());
        assert!(viewer.is_open());
        assert!(matches!(viewer.view(), Some(GalleryView::Grid { .. })));
    }

    #[test]
    fn test_closing_grid_closes_lightbox() {
        let mut viewer = gallery(&["a", "b"]);
        viewer.click(1);
        viewer.close();
        assert!(!viewer.lightbox().is_open());
        assert!(viewer.view().is_none());
        assert!(!viewer.click(0));
    }

    #[test]
    fn test_empty_list_renders_empty_state() {
        let mut viewer = gallery(&[]);
        assert_eq!(
            viewer.view(),
            Some(GalleryView::Empty {
                title: "Linear Algebra - TD - 2023 - #1".into()
            })
        );
        assert!(!viewer.click(0));
        assert!(!viewer.lightbox().is_open());
    }

    #[test]
    fn test_grid_cells_follow_page_order() {
        let viewer = gallery(&["a", "b", "c"]);
        let Some(GalleryView::Grid { cells, .. }) = viewer.view() else {
            panic!("expected a grid");
        };
        let pages: Vec<&str> = cells.iter().map(|c| c.image.as_str()).collect();
        assert_eq!(pages, vec!["a", "b", "c"]);
    }
}
