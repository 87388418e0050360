#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::fs;
use tokio::sync::mpsc;

use super::ImageSource;
use crate::domain::models::extension_for_mime_type;
use crate::domain::models::Action;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::GenerationRequest;
use crate::domain::models::ImageRef;
use crate::domain::models::DEFAULT_MIME_TYPE;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /upload (/u) [PATH] - Loads an image from disk as the base image to edit.
- /reset (/r) - Clears the canvas and prompt. History is kept.
- /select (/s) [NUMBER?] - Brings back an image from history. Without a NUMBER the highlighted entry is used.
- /save [PATH] - Writes the current image to disk.
- /quit /exit (/q) - Exit AnythingEdit.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Enter - Create or edit an image with the typed instruction.
- Up arrow - Move up in the history
- Down arrow - Move down in the history
- CTRL+C - Exit.
        "#;

    return text.trim().to_string();
}

/// Adds an extension matching the image when the user left it out.
pub fn output_path(path: &Path, image: &ImageRef) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }

    let mime_type = image.declared_mime_type().unwrap_or(DEFAULT_MIME_TYPE);
    return path.with_extension(extension_for_mime_type(mime_type));
}

pub async fn save_image(image: &ImageRef, path: &Path) -> Result<PathBuf> {
    let data = image.decode()?;
    let path = output_path(path, image);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(&path, data).await?;
    return Ok(path);
}

async fn generate(
    backend: Arc<BackendBox>,
    request: GenerationRequest,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let res = backend.generate_image(&request.prompt).await;
    if let Err(err) = &res {
        tracing::error!(ticket = request.ticket, error = ?err, "backend failed to generate");
    }

    // The UI may be gone by now, in which case the result is dropped.
    if tx.send(Event::GenerationResponse(request.ticket, res)).is_err() {
        tracing::debug!(ticket = request.ticket, "generation finished after shutdown");
    }

    return Ok(());
}

async fn upload(path: PathBuf, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    let res = ImageSource::read(&path).await;
    tx.send(Event::ImageLoaded(res))?;

    return Ok(());
}

async fn save(image: ImageRef, path: PathBuf, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    let notice = match save_image(&image, &path).await {
        Ok(saved) => format!("Saved image to {}", saved.to_string_lossy()),
        Err(err) => format!("Failed to save image: {err}"),
    };
    tx.send(Event::Notice(notice))?;

    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        backend: BackendBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let backend = Arc::new(backend);

        loop {
            let action = match rx.recv().await {
                Some(action) => action,
                None => return Ok(()),
            };

            match action {
                Action::GenerateImage(request) => {
                    let worker_backend = backend.clone();
                    let worker_tx = tx.clone();
                    tokio::spawn(async move {
                        return generate(worker_backend, request, worker_tx).await;
                    });
                }
                Action::SaveImage(image, path) => {
                    save(image, path, &tx).await?;
                }
                Action::UploadImage(path) => {
                    upload(path, &tx).await?;
                }
            }
        }
    }
}
