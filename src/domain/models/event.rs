use anyhow::Result;
use tui_textarea::Input;

use super::ImageRef;

pub enum Event {
    GenerationResponse(u64, Result<ImageRef>),
    ImageLoaded(Result<ImageRef>),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardPaste(String),
    Notice(String),
    UIResize(),
    UIScrollDown(),
    UIScrollUp(),
    UITick(),
}
