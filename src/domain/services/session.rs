#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::path::Path;

use anyhow::Result;

use super::ImageSource;
use crate::domain::models::Backend;
use crate::domain::models::BackendPrompt;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationState;
use crate::domain::models::GenerationStatus;
use crate::domain::models::HistoryEntry;
use crate::domain::models::ImageRef;
use crate::domain::models::EMPTY_PROMPT_MESSAGE;
use crate::domain::models::FALLBACK_ERROR_MESSAGE;
use crate::domain::models::LOADING_MESSAGE;

/// Generation session controller. Owns the current image, the prompt being
/// edited, the generation status and the history of results, and is the only
/// thing allowed to change them.
#[derive(Default)]
pub struct Session {
    current_image: Option<ImageRef>,
    prompt: String,
    state: GenerationState,
    history: Vec<HistoryEntry>,
    in_flight: Option<GenerationRequest>,
    last_ticket: u64,
}

impl Session {
    pub fn new() -> Session {
        return Session::default();
    }

    pub fn current_image(&self) -> Option<&ImageRef> {
        return self.current_image.as_ref();
    }

    pub fn prompt(&self) -> &str {
        return &self.prompt;
    }

    pub fn status(&self) -> GenerationStatus {
        return self.state.status;
    }

    pub fn message(&self) -> &str {
        return &self.state.message;
    }

    /// Newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        return &self.history;
    }

    pub fn is_loading(&self) -> bool {
        return self.state.status == GenerationStatus::Loading;
    }

    pub fn set_prompt(&mut self, text: &str) {
        self.prompt = text.to_string();
    }

    /// Reads an image from disk and makes it the current image.
    pub async fn upload_image(&mut self, path: &Path) {
        let res = ImageSource::read(path).await;
        self.handle_upload(res);
    }

    pub fn handle_upload(&mut self, res: Result<ImageRef>) {
        match res {
            Ok(image) => {
                tracing::debug!(image = image.summary(), "base image loaded");
                self.current_image = Some(image);
            }
            Err(err) => {
                tracing::warn!(error = ?err, "failed to load base image");

                // Loading has to stay visible until the pending response lands.
                if self.in_flight.is_none() {
                    self.state = GenerationState::error(&format!("Unable to load image: {err}"));
                }
            }
        }
    }

    /// Validates the prompt and moves to loading. Returns the request to send
    /// to the backend, or `None` when nothing should be sent, either because
    /// the prompt is empty or because another generation is still in flight.
    pub fn begin_generation(&mut self) -> Option<GenerationRequest> {
        if let Some(pending) = &self.in_flight {
            tracing::warn!(
                ticket = pending.ticket,
                "generation already in flight, ignoring request"
            );
            return None;
        }

        if self.prompt.trim().is_empty() {
            self.state = GenerationState::error(EMPTY_PROMPT_MESSAGE);
            return None;
        }

        self.state = GenerationState::loading(LOADING_MESSAGE);
        self.last_ticket += 1;

        let request = GenerationRequest {
            ticket: self.last_ticket,
            prompt: BackendPrompt::new(&self.prompt, self.current_image.clone()),
        };
        tracing::debug!(
            ticket = request.ticket,
            mime_type = request.prompt.mime_type,
            edit = request.prompt.is_edit(),
            "generation started"
        );

        self.in_flight = Some(request.clone());
        return Some(request);
    }

    /// Applies the backend's answer for `ticket`. Returns false when the
    /// ticket is no longer awaited, in which case nothing changes.
    pub fn complete_generation(&mut self, ticket: u64, res: Result<ImageRef>) -> bool {
        let request = match self.in_flight.take() {
            Some(request) if request.ticket == ticket => request,
            other => {
                self.in_flight = other;
                tracing::debug!(ticket, "discarding stale generation response");
                return false;
            }
        };

        match res {
            Ok(image) => {
                let entry = HistoryEntry::new(image.clone(), &request.prompt.text);
                tracing::info!(ticket, id = entry.id, "generation succeeded");

                self.history.insert(0, entry);
                self.current_image = Some(image);
                self.state = GenerationState::idle();
                self.prompt = "".to_string();
            }
            Err(err) => {
                tracing::error!(ticket, error = ?err, "generation failed");

                let mut message = err.to_string();
                if message.trim().is_empty() {
                    message = FALLBACK_ERROR_MESSAGE.to_string();
                }
                self.state = GenerationState::error(&message);
            }
        }

        return true;
    }

    /// Runs a full generation against `backend`: validation, the single
    /// backend call, then the resulting state transition.
    pub async fn generate(&mut self, backend: &(dyn Backend + Send + Sync)) {
        let request = match self.begin_generation() {
            Some(request) => request,
            None => return,
        };

        let res = backend.generate_image(&request.prompt).await;
        self.complete_generation(request.ticket, res);
    }

    /// Clears the canvas. A generation still in flight is forgotten and its
    /// result will be discarded.
    pub fn reset(&mut self) {
        if let Some(pending) = self.in_flight.take() {
            tracing::debug!(ticket = pending.ticket, "reset while generating");
        }

        self.current_image = None;
        self.prompt = "".to_string();
        self.state = GenerationState::idle();
    }

    pub fn select_history_entry(&mut self, entry: &HistoryEntry) {
        self.current_image = Some(entry.url.clone());
    }
}
