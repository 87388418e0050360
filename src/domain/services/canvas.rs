#[cfg(test)]
#[path = "canvas_test.rs"]
mod tests;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Frame;

use super::Session;
use crate::domain::models::GenerationStatus;

pub struct Canvas {}

impl Canvas {
    /// Plain text content of the canvas, paired with whether each line is an
    /// error.
    pub fn lines(session: &Session, notice: &Option<String>) -> Vec<(String, bool)> {
        let mut lines: Vec<(String, bool)> = vec![];

        if let Some(image) = session.current_image() {
            lines.push((format!("Current image: {}", image.summary()), false));
            lines.push(("Use /save PATH to keep it, /reset to clear the canvas.".to_string(), false));
        } else {
            lines.push(("Upload a base image with /upload PATH".to_string(), false));
            lines.push((
                "or use the prompt below to generate from scratch".to_string(),
                false,
            ));
        }

        match session.status() {
            GenerationStatus::Loading => {
                lines.push(("".to_string(), false));
                lines.push((session.message().to_string(), false));
            }
            GenerationStatus::Error => {
                lines.push(("".to_string(), false));
                lines.push((format!("⚠️ {}", session.message()), true));
            }
            GenerationStatus::Idle => {}
        }

        if let Some(text) = notice {
            lines.push(("".to_string(), false));
            for line in text.split('\n') {
                lines.push((line.to_string(), false));
            }
        }

        return lines;
    }

    pub fn render<B: Backend>(
        frame: &mut Frame<B>,
        rect: Rect,
        session: &Session,
        notice: &Option<String>,
        title: &str,
    ) {
        let lines = Canvas::lines(session, notice)
            .into_iter()
            .map(|(text, is_error)| {
                if is_error {
                    return Line::from(Span::styled(text, Style::default().fg(Color::Red)));
                }
                return Line::from(text);
            })
            .collect::<Vec<Line>>();

        frame.render_widget(
            Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(Color::Yellow))
                        .title(title.to_string())
                        .padding(Padding::new(1, 1, 0, 0)),
                )
                .wrap(Wrap { trim: false }),
            rect,
        );
    }
}
