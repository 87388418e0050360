#[cfg(test)]
#[path = "image_source_test.rs"]
mod tests;

use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use tokio::fs;

use crate::domain::models::mime_type_from_path;
use crate::domain::models::sniff_mime_type;
use crate::domain::models::ImageRef;

/// Turns files picked by the user into self-contained image references.
pub struct ImageSource {}

impl ImageSource {
    pub async fn read(path: &Path) -> Result<ImageRef> {
        let path_str = path.to_string_lossy().to_string();
        let data = fs::read(path)
            .await
            .with_context(|| return format!("Failed to read {path_str}"))?;

        if data.is_empty() {
            bail!(format!("{path_str} is empty"));
        }

        let mime_type = match sniff_mime_type(&data).or_else(|| return mime_type_from_path(path)) {
            Some(mime_type) => mime_type,
            None => bail!(format!("{path_str} is not a supported image (png, jpeg, gif, webp)")),
        };

        tracing::debug!(path = path_str, mime_type, size = data.len(), "read image");
        return Ok(ImageRef::from_bytes(mime_type, &data));
    }
}
