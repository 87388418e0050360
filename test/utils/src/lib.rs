#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A 1x1 transparent PNG.
pub fn png_fixture() -> Vec<u8> {
    return vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];
}

/// JPEG magic bytes padded out so format sniffing has enough to look at.
pub fn jpeg_fixture() -> Vec<u8> {
    return vec![
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00,
    ];
}

pub fn png_fixture_base64() -> String {
    return STANDARD.encode(png_fixture());
}

pub fn png_data_url_fixture() -> String {
    return format!("data:image/png;base64,{}", png_fixture_base64());
}

pub fn jpeg_data_url_fixture() -> String {
    return format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg_fixture()));
}
