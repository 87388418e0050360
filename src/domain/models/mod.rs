mod action;
mod backend;
mod event;
mod generation;
mod history;
mod image;
mod loading;
mod slash_commands;
mod status;
mod textarea;

pub use action::*;
pub use backend::*;
pub use event::*;
pub use generation::*;
pub use history::*;
pub use image::*;
pub use loading::*;
pub use slash_commands::*;
pub use status::*;
pub use textarea::*;
