//! Photo Vault - Image Codec
//!
//! Normalizes picked images to JPEG before they are stored.

use std::io::Cursor;
use image::codecs::jpeg::JpegEncoder;

use crate::error::VaultResult;

/// Decode `data` (any supported format) and re-encode it as JPEG
pub fn to_jpeg(data: &[u8], quality: u8) -> VaultResult<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let rgb = img.to_rgb8();

    let mut output = Vec::new();
    {
        let mut encoder =
            JpegEncoder::new_with_quality(Cursor::new(&mut output), quality.clamp(1, 100));
        encoder.encode_image(&rgb)?;
    }

    Ok(output)
}

/// Detect MIME type from file content
pub fn detect_mime(data: &[u8]) -> &'static str {
    if data.len() < 8 {
        return "application/octet-stream";
    }

    match &data[0..8] {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x52, 0x49, 0x46, 0x46, ..] if data.len() > 12 && &data[8..12] == b"WEBP" => "image/webp",
        _ if data.len() > 12 && &data[4..8] == b"ftyp" => match &data[8..12] {
            b"heic" | b"heix" => "image/heic",
            b"mif1" => "image/heif",
            _ => "application/octet-stream",
        },
        _ => "application/octet-stream",
    }
}
