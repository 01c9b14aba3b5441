//! `data:` URLs for embedding images and model resources.

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Data URL errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("Not a data URL")]
    MissingScheme,
    #[error("Data URL has no ',' separator")]
    MissingComma,
    #[error("Invalid base64 payload: {0}")]
    Base64(String),
}

/// Image formats accepted for before/after photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// Detect format from a file name's extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }

        None
    }

    /// Magic bytes first, then the file name.
    pub fn detect(data: &[u8], file_name: Option<&str>) -> Option<Self> {
        Self::from_magic_bytes(data).or_else(|| file_name.and_then(Self::from_file_name))
    }
}

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub data: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Build a `data:<mime>;base64,<payload>` string.
    pub fn encode(mime: &str, data: &[u8]) -> String {
        format!("data:{};base64,{}", mime, STANDARD.encode(data))
    }

    pub fn to_url(&self) -> String {
        Self::encode(&self.mime, &self.data)
    }

    /// Parse a data URL with either a base64 or a percent-encoded payload.
    pub fn parse(url: &str) -> Result<Self, DataUrlError> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or(DataUrlError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingComma)?;

        let mut params = header.split(';');
        let mime = match params.next() {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => "text/plain".to_string(),
        };
        let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

        let data = if is_base64 {
            // Tolerate whitespace from wrapped payloads.
            let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact)
                .map_err(|e| DataUrlError::Base64(e.to_string()))?
        } else {
            percent_encoding::percent_decode_str(payload).collect()
        };

        Ok(Self { mime, data })
    }

    pub fn image_format(&self) -> Option<ImageFormat> {
        ImageFormat::from_magic_bytes(&self.data)
    }
}

/// Whether a URI is already embedded.
pub fn is_data_url(uri: &str) -> bool {
    uri.trim_start().starts_with("data:")
}

/// Encode image bytes as a data URL, sniffing the MIME type.
pub fn image_data_url(data: &[u8], file_name: Option<&str>) -> String {
    let mime = ImageFormat::detect(data, file_name)
        .map(|f| f.mime_type())
        .unwrap_or("application/octet-stream");
    DataUrl::encode(mime, data)
}
