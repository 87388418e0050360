#[cfg(test)]
#[path = "image_test.rs"]
mod tests;

use std::fmt;
use std::path::Path;

use anyhow::bail;
use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// MIME type used whenever an image does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Self-contained (`data:` URL) or addressable (http/https) handle to image
/// bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: &str) -> ImageRef {
        return ImageRef(reference.to_string());
    }

    pub fn from_bytes(mime_type: &str, data: &[u8]) -> ImageRef {
        return ImageRef::from_base64(mime_type, &STANDARD.encode(data));
    }

    pub fn from_base64(mime_type: &str, data: &str) -> ImageRef {
        return ImageRef(format!("data:{mime_type};base64,{data}"));
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    pub fn is_data_url(&self) -> bool {
        return self.0.starts_with("data:");
    }

    /// The MIME type declared in the reference's metadata, if there is one.
    /// Only `data:` URLs carry this.
    pub fn declared_mime_type(&self) -> Option<&str> {
        if !self.is_data_url() {
            return None;
        }

        let header = self.0["data:".len()..].split([';', ',']).next()?;
        if header.is_empty() {
            return None;
        }

        return Some(header);
    }

    /// MIME hint sent along with a base image, falling back to
    /// `DEFAULT_MIME_TYPE` when there is no image or nothing is declared.
    pub fn mime_type_hint(image: Option<&ImageRef>) -> String {
        return image
            .and_then(|e| return e.declared_mime_type())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
    }

    pub fn base64_payload(&self) -> Option<&str> {
        if !self.is_data_url() {
            return None;
        }

        let (header, payload) = self.0.split_once(',')?;
        if !header.ends_with(";base64") {
            return None;
        }

        return Some(payload);
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        let payload = match self.base64_payload() {
            Some(payload) => payload,
            None => bail!("Image is not an embedded base64 image"),
        };

        return Ok(STANDARD.decode(payload)?);
    }

    /// Short description used by the canvas, since the reference itself can be
    /// megabytes of base64.
    pub fn summary(&self) -> String {
        if let Some(payload) = self.base64_payload() {
            let mime_type = self.declared_mime_type().unwrap_or(DEFAULT_MIME_TYPE);
            let size = payload.trim_end_matches('=').len() * 3 / 4;
            return format!("{mime_type}, {}", format_size(size));
        }

        return self.0.to_string();
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}

fn format_size(size: usize) -> String {
    if size < 1024 {
        return format!("{size} B");
    }
    if size < 1024 * 1024 {
        return format!("{:.1} KB", size as f64 / 1024.0);
    }

    return format!("{:.1} MB", size as f64 / (1024.0 * 1024.0));
}

/// Detects the image MIME type from magic bytes.
pub fn sniff_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    return None;
}

pub fn mime_type_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "png" => return Some("image/png"),
        "jpg" | "jpeg" => return Some("image/jpeg"),
        "gif" => return Some("image/gif"),
        "webp" => return Some("image/webp"),
        _ => return None,
    }
}

pub fn extension_for_mime_type(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => return "jpg",
        "image/gif" => return "gif",
        "image/webp" => return "webp",
        _ => return "png",
    }
}
