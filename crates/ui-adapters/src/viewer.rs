use askama::Template;
use services::viewer::{GalleryView, LightboxFrame};

use crate::UiError;

struct Cell<'a> {
    number: usize,
    image: &'a str,
}

struct Thumb {
    number: usize,
    active: bool,
}

#[derive(Template)]
#[template(path = "gallery.txt")]
struct GalleryTemplate<'a> {
    title: &'a str,
    cells: Vec<Cell<'a>>,
}

#[derive(Template)]
#[template(path = "lightbox.txt")]
struct LightboxTemplate<'a> {
    position: &'a str,
    image: &'a str,
    /// e.g. pixel dimensions, when the page is cached
    detail: &'a str,
    has_previous: bool,
    has_next: bool,
    thumbnails: Vec<Thumb>,
}

pub fn render_gallery(view: &GalleryView) -> Result<String, UiError> {
    let template = match view {
        GalleryView::Empty { title } => GalleryTemplate {
            title,
            cells: Vec::new(),
        },
        GalleryView::Grid { title, cells } => GalleryTemplate {
            title,
            cells: cells
                .iter()
                .map(|cell| Cell {
                    number: cell.index + 1,
                    image: cell.image.as_str(),
                })
                .collect(),
        },
    };
    Ok(template.render()?)
}

pub fn render_lightbox(frame: &LightboxFrame, detail: Option<&str>) -> Result<String, UiError> {
    let template = LightboxTemplate {
        position: &frame.position,
        image: frame.image.as_str(),
        detail: detail.unwrap_or_default(),
        has_previous: frame.has_previous,
        has_next: frame.has_next,
        thumbnails: frame
            .thumbnails
            .iter()
            .map(|thumb| Thumb {
                number: thumb.index + 1,
                active: thumb.active,
            })
            .collect(),
    };
    Ok(template.render()?)
}
