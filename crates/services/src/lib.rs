pub mod navigation;
pub mod preload;
pub mod request;
pub mod resolver;
pub mod viewer;

pub use navigation::{NavLevel, NavigationController, NavigationError, NavigationState, Outcome, Slot};
pub use preload::{ImagePreloadCache, PreloadBatch};
pub use request::{bounded, RequestToken, TokenSource};
pub use resolver::{ConsultationWrite, Resolution, SolutionResolver};
