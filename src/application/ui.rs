use std::io;

use anyhow::bail;
use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::BackendName;
use crate::domain::models::Event;
use crate::domain::models::Loading;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;
use crate::domain::services::Canvas;
use crate::infrastructure::backends::BackendManager;

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    let mut has_image = app_state.session.current_image().is_some();
    let mut textarea = TextArea::with_text(has_image, app_state.session.prompt());

    #[cfg(feature = "dev")]
    {
        app_state
            .session
            .set_prompt("a cute futuristic robot in the park");
    }

    loop {
        // The textarea is only a view over the session prompt, rebuild it
        // whenever the session changed the prompt or the edit mode.
        let image_present = app_state.session.current_image().is_some();
        if image_present != has_image || textarea.lines().join("\n") != app_state.session.prompt()
        {
            has_image = image_present;
            textarea = TextArea::with_text(has_image, app_state.session.prompt());
        }

        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Min(6),
                    Constraint::Length(8),
                    Constraint::Max(4),
                ])
                .split(frame.size());

            Canvas::render(
                frame,
                layout[0],
                &app_state.session,
                &app_state.notice,
                &app_state.title,
            );
            app_state
                .gallery
                .render(frame, layout[1], app_state.session.history());

            if app_state.session.is_loading() {
                Loading::new(app_state.session.message()).render(frame, layout[2]);
            } else {
                frame.render_widget(textarea.widget(), layout[2]);
            }
        })?;

        match events.next().await? {
            Event::GenerationResponse(ticket, res) => {
                app_state.handle_generation_response(ticket, res);
            }
            Event::ImageLoaded(res) => {
                app_state.handle_image_loaded(res);
            }
            Event::Notice(text) => {
                app_state.handle_notice(text);
            }
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardEnter() => {
                if app_state.session.is_loading() {
                    continue;
                }

                let input_str = textarea.lines().join("\n");
                if app_state.handle_submit(&input_str, &tx)? {
                    break;
                }
            }
            Event::KeyboardCharInput(input) => {
                if app_state.session.is_loading() {
                    continue;
                }

                textarea.input(input);
                app_state.session.set_prompt(&textarea.lines().join("\n"));
            }
            Event::KeyboardPaste(text) => {
                if app_state.session.is_loading() {
                    continue;
                }

                TextArea::insert_text(&mut textarea, &text);
                app_state.session.set_prompt(&textarea.lines().join("\n"));
            }
            Event::UIScrollUp() => {
                app_state.gallery.up();
            }
            Event::UIScrollDown() => {
                app_state.gallery.down(app_state.session.history().len());
            }
            Event::UIResize() | Event::UITick() => (),
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let backend_name = match BackendName::parse(Config::get(ConfigKey::Backend)) {
        Some(name) => name,
        None => bail!(format!(
            "Unknown backend {}",
            Config::get(ConfigKey::Backend)
        )),
    };
    let backend = BackendManager::get(backend_name)?;
    let mut app_state = AppState::new(
        &backend,
        &Config::get(ConfigKey::Model),
        &Config::get(ConfigKey::Image),
    )
    .await?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
