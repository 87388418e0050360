#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::sniff_mime_type;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::ImageRef;
use crate::domain::models::DEFAULT_MIME_TYPE;

const BLOCKED_FINISH_REASONS: [&str; 7] = [
    "SAFETY",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
    "IMAGE_RECITATION",
    "RECITATION",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
];

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentPartsBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ContentParts {
    Text(String),
    InlineData(ContentPartsBlob),
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<ContentParts>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<ContentPartsBlob>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ApiErrorDetails {
    #[serde(default)]
    message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ApiError {
    error: ApiErrorDetails,
}

impl GenerateContentResponse {
    /// Pulls the first image out of the response, turning every way Gemini
    /// can refuse into a readable error.
    fn into_image(self) -> Result<ImageRef> {
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let message = feedback
                    .block_reason_message
                    .unwrap_or_else(|| return format!("Prompt blocked: {reason}"));
                bail!(message);
            }
        }

        let candidate = match self.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => bail!("Gemini returned no candidates"),
        };

        if let Some(reason) = &candidate.finish_reason {
            if BLOCKED_FINISH_REASONS.contains(&reason.as_str()) {
                bail!(format!(
                    "Content blocked by Gemini safety filter: {reason}"
                ));
            }
        }

        let parts = candidate
            .content
            .map(|e| return e.parts)
            .unwrap_or_default();

        if let Some(blob) = parts.iter().find_map(|e| return e.inline_data.as_ref()) {
            let mut mime_type = blob.mime_type.to_string();
            if mime_type.is_empty() {
                mime_type = DEFAULT_MIME_TYPE.to_string();
            }
            return Ok(ImageRef::from_base64(&mime_type, &blob.data));
        }

        let text = parts
            .iter()
            .filter_map(|e| return e.text.as_deref())
            .collect::<Vec<&str>>()
            .join("")
            .trim()
            .to_string();

        if !text.is_empty() {
            bail!(format!("Gemini did not return an image: {text}"));
        }

        bail!("Gemini did not return an image. Try a different prompt.");
    }
}

pub struct Gemini {
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Default for Gemini {
    fn default() -> Gemini {
        return Gemini {
            url: Config::get(ConfigKey::GeminiURL),
            token: Config::get(ConfigKey::GeminiToken),
            model: Config::get(ConfigKey::Model),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

impl Gemini {
    fn model_url(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        return format!("{url}/v1beta/models/{model}", url = self.url);
    }

    /// Gemini only accepts inline image data, so addressable images are
    /// fetched first.
    async fn inline_image(&self, image: &ImageRef, mime_type: &str) -> Result<ContentPartsBlob> {
        if let Some(data) = image.base64_payload() {
            return Ok(ContentPartsBlob {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            });
        }

        let res = reqwest::Client::new().get(image.as_str()).send().await?;
        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                url = image.as_str(),
                "Failed to download base image"
            );
            bail!(format!(
                "Failed to download base image, {}",
                res.status().as_u16()
            ));
        }

        let bytes = res.bytes().await?;
        return Ok(ContentPartsBlob {
            mime_type: sniff_mime_type(&bytes).unwrap_or(mime_type).to_string(),
            data: STANDARD.encode(&bytes),
        });
    }
}

#[async_trait]
impl Backend for Gemini {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Gemini token is not defined");
        }

        let res = reqwest::Client::new()
            .get(format!(
                "{url}?key={key}",
                url = self.model_url(),
                key = self.token
            ))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "Gemini is not reachable");
                bail!("Gemini is not reachable");
            }
        };

        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            bail!("Gemini health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn generate_image(&self, prompt: &BackendPrompt) -> Result<ImageRef> {
        let mut parts = vec![];
        if let Some(image) = &prompt.base_image {
            parts.push(ContentParts::InlineData(
                self.inline_image(image, &prompt.mime_type).await?,
            ));
        }
        parts.push(ContentParts::Text(prompt.text.to_string()));

        let req = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        };

        let res = reqwest::Client::new()
            .post(format!(
                "{url}:generateContent?key={key}",
                url = self.model_url(),
                key = self.token,
            ))
            .json(&req)
            .send()
            .await?;

        let status = res.status().as_u16();
        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(
                status = status,
                body = body,
                "Failed to make generation request to Gemini"
            );

            if let Ok(api_err) = serde_json::from_str::<ApiError>(&body) {
                if !api_err.error.message.is_empty() {
                    bail!(format!(
                        "Gemini request failed, {status}: {}",
                        api_err.error.message
                    ));
                }
            }
            bail!(format!("Gemini request failed, {status}"));
        }

        let image = res.json::<GenerateContentResponse>().await?.into_image()?;
        tracing::debug!(image = image.summary(), "Gemini returned an image");

        return Ok(image);
    }
}
