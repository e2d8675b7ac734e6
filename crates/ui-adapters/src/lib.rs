//! Plain-text rendering of the portal screens with askama templates.
//!
//! Listings are numbered from 1; the numbers are what the terminal commands
//! (`dept N`, `view N`, ...) refer to.

pub mod navigation;
pub mod viewer;

use thiserror::Error;

pub use navigation::{exercise_title, render_navigation};
pub use viewer::{render_gallery, render_lightbox};

#[derive(Error, Debug)]
pub enum UiError {
    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

pub const HELP: &str = "\
commands:
  ls                  show the current screen
  dept N | course N   open a department or course
  type td|exam        pick the exercise type
  year N              pick a year
  open N              open the solutions of exercise N
  view N              show page N full screen
  left | right | esc  page through or close the full-screen view
  thumb N             jump to page N
  close               close the gallery
  back                go up one level
  retry               reload a listing that failed
  quit";
