#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use tokio::sync::mpsc;

use super::actions::help_text;
use super::Gallery;
use super::Session;
use crate::domain::models::Action;
use crate::domain::models::BackendBox;
use crate::domain::models::GenerationStatus;
use crate::domain::models::ImageRef;
use crate::domain::models::SlashCommand;

pub struct AppState {
    pub session: Session,
    pub gallery: Gallery,
    pub notice: Option<String>,
    pub title: String,
}

impl AppState {
    pub async fn new(backend: &BackendBox, model_name: &str, image_path: &str) -> Result<AppState> {
        let backend_name = backend.name();
        let mut app_state = AppState {
            session: Session::new(),
            gallery: Gallery::default(),
            notice: None,
            title: format!("✨ AnythingEdit - {backend_name} ({model_name})"),
        };

        if let Err(err) = backend.health_check().await {
            app_state.notice = Some(format!(
                "Hey, it looks like backend {backend_name} isn't reachable. You should double check your token and model before creating anything.\n\nError: {err}"
            ));
        }

        if !image_path.is_empty() {
            app_state
                .session
                .upload_image(&PathBuf::from(image_path))
                .await;
        }

        return Ok(app_state);
    }

    /// Handles a submitted line. Slash commands are run here, anything else is
    /// treated as the instruction for a new generation. Returns true when the
    /// app should exit.
    pub fn handle_submit(&mut self, input: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        self.notice = None;

        if let Some(command) = SlashCommand::parse(input) {
            if command.is_quit() {
                return Ok(true);
            }

            self.handle_slash_command(&command, tx)?;
            self.session.set_prompt("");
            return Ok(false);
        }

        self.session.set_prompt(input);
        if let Some(request) = self.session.begin_generation() {
            tx.send(Action::GenerateImage(request))?;
        }

        return Ok(false);
    }

    fn handle_slash_command(
        &mut self,
        command: &SlashCommand,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        if command.is_help() {
            self.notice = Some(help_text());
            return Ok(());
        }

        if command.is_reset() {
            self.session.reset();
            return Ok(());
        }

        if command.is_upload() {
            if command.args.is_empty() {
                self.notice = Some("You must specify a file with `/upload PATH`.".to_string());
                return Ok(());
            }
            tx.send(Action::UploadImage(PathBuf::from(command.arg_text())))?;
            return Ok(());
        }

        if command.is_save() {
            let image = match self.session.current_image() {
                Some(image) => image.clone(),
                None => {
                    self.notice = Some("There is no image on the canvas to save.".to_string());
                    return Ok(());
                }
            };
            if command.args.is_empty() {
                self.notice = Some("You must specify a file with `/save PATH`.".to_string());
                return Ok(());
            }
            tx.send(Action::SaveImage(image, PathBuf::from(command.arg_text())))?;
            return Ok(());
        }

        if command.is_select() {
            let history = self.session.history();
            let res = if command.args.is_empty() {
                self.gallery
                    .highlighted(history)
                    .cloned()
                    .ok_or_else(|| return anyhow!("Highlight an entry in the history first."))
            } else {
                self.gallery.entry(history, &command.arg_text()).cloned()
            };

            match res {
                Ok(entry) => self.session.select_history_entry(&entry),
                Err(err) => {
                    self.notice = Some(format!("There was an error trying to parse your command:\n\n{err}"));
                }
            }
        }

        return Ok(());
    }

    pub fn handle_generation_response(&mut self, ticket: u64, res: Result<ImageRef>) {
        let applied = self.session.complete_generation(ticket, res);
        if applied && self.session.status() == GenerationStatus::Idle {
            self.gallery.reset_cursor();
        }
    }

    pub fn handle_image_loaded(&mut self, res: Result<ImageRef>) {
        self.session.handle_upload(res);
    }

    pub fn handle_notice(&mut self, text: String) {
        self.notice = Some(text);
    }
}
