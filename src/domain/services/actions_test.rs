use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use test_utils::png_data_url_fixture;
use test_utils::png_fixture;
use tokio::fs;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::help_text;
use super::output_path;
use super::save_image;
use super::ActionsService;
use crate::domain::models::Action;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::Event;
use crate::domain::models::GenerationRequest;
use crate::domain::models::ImageRef;

struct EchoBackend {}

#[async_trait]
impl Backend for EchoBackend {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn generate_image(&self, prompt: &BackendPrompt) -> Result<ImageRef> {
        if prompt.text == "fail" {
            bail!("Gemini is not reachable");
        }
        return Ok(ImageRef::new(&format!("img://{}", prompt.text)));
    }
}

fn temp_path(name: &str) -> PathBuf {
    return std::env::temp_dir().join(format!("anythingedit-{}-{name}", Uuid::new_v4()));
}

fn start() -> (
    mpsc::UnboundedSender<Action>,
    mpsc::UnboundedReceiver<Event>,
) {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    tokio::spawn(async move {
        return ActionsService::start(Box::new(EchoBackend {}), event_tx, &mut action_rx).await;
    });

    return (action_tx, event_rx);
}

fn request(ticket: u64, text: &str) -> GenerationRequest {
    return GenerationRequest {
        ticket,
        prompt: BackendPrompt::new(text, None),
    };
}

#[test]
fn it_lists_commands_in_help() {
    let help = help_text();
    assert!(help.starts_with("COMMANDS:"));
    assert!(help.contains("/upload"));
    assert!(help.contains("/select"));
}

#[test]
fn it_keeps_given_extensions() {
    let image = ImageRef::new(&png_data_url_fixture());
    assert_eq!(output_path(Path::new("out.jpg"), &image), PathBuf::from("out.jpg"));
}

#[test]
fn it_adds_extension_from_mime_type() {
    let image = ImageRef::from_bytes("image/webp", b"RIFF");
    assert_eq!(output_path(Path::new("out"), &image), PathBuf::from("out.webp"));
}

#[tokio::test]
async fn it_saves_images() -> Result<()> {
    let path = temp_path("nested").join("out");
    let saved = save_image(&ImageRef::new(&png_data_url_fixture()), &path).await?;

    assert_eq!(saved, path.with_extension("png"));
    assert_eq!(fs::read(&saved).await?, png_fixture());

    fs::remove_dir_all(path.parent().unwrap()).await?;
    return Ok(());
}

#[tokio::test]
async fn it_refuses_to_save_urls() {
    let res = save_image(&ImageRef::new("img://abc"), &temp_path("out.png")).await;
    assert!(res.is_err());
}

#[tokio::test]
async fn it_answers_generation_requests() -> Result<()> {
    let (tx, mut rx) = start();
    tx.send(Action::GenerateImage(request(7, "robot")))?;

    match rx.recv().await.unwrap() {
        Event::GenerationResponse(ticket, res) => {
            assert_eq!(ticket, 7);
            assert_eq!(res?, ImageRef::new("img://robot"));
        }
        _ => bail!("Wrong enum"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_forwards_generation_failures() -> Result<()> {
    let (tx, mut rx) = start();
    tx.send(Action::GenerateImage(request(3, "fail")))?;

    match rx.recv().await.unwrap() {
        Event::GenerationResponse(ticket, res) => {
            assert_eq!(ticket, 3);
            insta::assert_snapshot!(res.unwrap_err().to_string(), @"Gemini is not reachable");
        }
        _ => bail!("Wrong enum"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_loads_uploads() -> Result<()> {
    let path = temp_path("cat.png");
    fs::write(&path, png_fixture()).await?;

    let (tx, mut rx) = start();
    tx.send(Action::UploadImage(path.clone()))?;

    match rx.recv().await.unwrap() {
        Event::ImageLoaded(res) => {
            assert_eq!(res?, ImageRef::new(&png_data_url_fixture()));
        }
        _ => bail!("Wrong enum"),
    }

    fs::remove_file(&path).await?;
    return Ok(());
}

#[tokio::test]
async fn it_reports_saves() -> Result<()> {
    let path = temp_path("saved.png");

    let (tx, mut rx) = start();
    tx.send(Action::SaveImage(ImageRef::new(&png_data_url_fixture()), path.clone()))?;

    match rx.recv().await.unwrap() {
        Event::Notice(text) => {
            assert_eq!(text, format!("Saved image to {}", path.to_string_lossy()));
        }
        _ => bail!("Wrong enum"),
    }

    fs::remove_file(&path).await?;
    return Ok(());
}
