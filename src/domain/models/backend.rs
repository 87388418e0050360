#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::ImageRef;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Gemini,
}

impl BackendName {
    pub fn parse(text: String) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

/// Everything a backend needs for a single generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendPrompt {
    pub text: String,
    pub base_image: Option<ImageRef>,
    pub mime_type: String,
}

impl BackendPrompt {
    pub fn new(text: &str, base_image: Option<ImageRef>) -> BackendPrompt {
        let mime_type = ImageRef::mime_type_hint(base_image.as_ref());
        return BackendPrompt {
            text: text.to_string(),
            base_image,
            mime_type,
        };
    }

    pub fn is_edit(&self) -> bool {
        return self.base_image.is_some();
    }
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used at startup to verify all configurations are available to work with
    /// the backend.
    async fn health_check(&self) -> Result<()>;

    /// Generates a new image from the prompt, editing `base_image` when one is
    /// provided. Called exactly once per submitted prompt, no retries.
    async fn generate_image(&self, prompt: &BackendPrompt) -> Result<ImageRef>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
