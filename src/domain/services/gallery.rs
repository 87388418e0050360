#[cfg(test)]
#[path = "gallery_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::Frame;

use crate::domain::models::HistoryEntry;

/// History browser. Keeps a cursor over the session's history and resolves
/// selections to entries, the session itself decides what selecting means.
#[derive(Default)]
pub struct Gallery {
    pub list_state: ListState,
}

impl Gallery {
    pub fn up(&mut self) {
        let idx = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(idx.saturating_sub(1)));
    }

    pub fn down(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }

        let next = match self.list_state.selected() {
            Some(idx) => (idx + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    /// New entries land at the top, so the cursor goes back there.
    pub fn reset_cursor(&mut self) {
        self.list_state.select(Some(0));
    }

    pub fn highlighted<'a>(&self, history: &'a [HistoryEntry]) -> Option<&'a HistoryEntry> {
        return history.get(self.list_state.selected()?);
    }

    /// Resolves a 1-based entry number as shown in the gallery.
    pub fn entry<'a>(&self, history: &'a [HistoryEntry], number: &str) -> Result<&'a HistoryEntry> {
        if history.is_empty() {
            bail!("There is no history yet. Generate something first!");
        }

        let idx = match number.trim().parse::<usize>() {
            Ok(idx) => idx,
            Err(_) => bail!(format!("{number} is not a valid history number.")),
        };
        if idx < 1 || idx > history.len() {
            bail!(format!(
                "{idx} is out of bounds, pick a number between 1 and {}.",
                history.len()
            ));
        }

        return Ok(&history[idx - 1]);
    }

    pub fn format_entry(number: usize, entry: &HistoryEntry) -> String {
        let mut prompt = entry.prompt.split('\n').next().unwrap_or("").to_string();
        if prompt.chars().count() >= 60 {
            prompt = format!("{}...", prompt.chars().take(57).collect::<String>());
        }

        return format!(
            "({number}) {prompt} - {}",
            entry.timestamp.format("%H:%M:%S")
        );
    }

    pub fn render<B: Backend>(&mut self, frame: &mut Frame<B>, rect: Rect, history: &[HistoryEntry]) {
        let items = history
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                return ListItem::new(Gallery::format_entry(idx + 1, entry));
            })
            .collect::<Vec<ListItem>>();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(format!("🕰️ Magic History ({})", history.len())),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, rect, &mut self.list_state);
    }
}
