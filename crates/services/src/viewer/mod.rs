//! Gallery grid, lightbox pager and the session tying them to a resolution.

pub mod gallery;
pub mod lightbox;
pub mod session;

pub use gallery::{GalleryCell, GalleryView, GalleryViewer};
pub use lightbox::{LightboxFrame, LightboxViewer, PointerAction, Thumbnail, ViewerKey};
pub use session::ViewerSession;
