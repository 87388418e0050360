#[cfg(test)]
#[path = "textarea_test.rs"]
mod tests;

use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

const CREATE_PLACEHOLDER: &str = "e.g., 'a cute futuristic robot in the park'";
const EDIT_PLACEHOLDER: &str = "e.g., 'make the cat wear a tiny hawaiian shirt'";

pub struct TextArea {}

impl<'a> TextArea {
    /// Prompt input. Titled `Edit` when there is a base image to work from,
    /// `Create` otherwise.
    pub fn new(has_image: bool) -> tui_textarea::TextArea<'a> {
        let mut title = "✨ Create";
        let mut placeholder = CREATE_PLACEHOLDER;
        if has_image {
            title = "✨ Edit";
            placeholder = EDIT_PLACEHOLDER;
        }

        let mut textarea = tui_textarea::TextArea::default();
        textarea.set_placeholder_text(placeholder);
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .title(title)
                .padding(Padding::new(1, 1, 0, 0)),
        );

        return textarea;
    }

    pub fn with_text(has_image: bool, text: &str) -> tui_textarea::TextArea<'a> {
        let mut textarea = TextArea::new(has_image);
        TextArea::insert_text(&mut textarea, text);

        return textarea;
    }

    /// Inserts text at the cursor. Textarea lines can't hold newlines, so
    /// multi-line text is split across lines.
    pub fn insert_text(textarea: &mut tui_textarea::TextArea<'a>, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                textarea.insert_newline();
            }
            textarea.insert_str(line);
        }
    }
}
