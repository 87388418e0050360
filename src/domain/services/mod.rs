pub mod actions;
mod app_state;
mod canvas;
pub mod events;
mod gallery;
mod image_source;
mod session;

pub use app_state::*;
pub use canvas::*;
pub use gallery::*;
pub use image_source::*;
pub use session::*;
