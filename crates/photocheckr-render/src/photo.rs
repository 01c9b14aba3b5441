//! Decoding photos stored as data URLs.

use crate::renderer::{RenderResult, RendererError};
use kurbo::Size;
use photocheckr_core::data_url::DataUrl;
use tiny_skia::{ColorU8, Pixmap};

/// A decoded photo ready to be drawn.
pub struct Photo {
    pixmap: Pixmap,
}

impl Photo {
    /// Decode a data URL (PNG, JPEG, WebP or GIF).
    pub fn from_data_url(url: &str) -> RenderResult<Self> {
        let data_url = DataUrl::parse(url).map_err(|e| RendererError::Decode(e.to_string()))?;
        Self::from_bytes(&data_url.data)
    }

    pub fn from_bytes(bytes: &[u8]) -> RenderResult<Self> {
        let decoded =
            ::image::load_from_memory(bytes).map_err(|e| RendererError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RendererError::Decode(format!("Invalid image size {}x{}", width, height))
        })?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(Self { pixmap })
    }

    /// Natural size in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.pixmap.width() as f64, self.pixmap.height() as f64)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// Decode a photo, logging and skipping it when it cannot be read.
pub fn decode_optional(url: Option<&str>) -> Option<Photo> {
    let url = url?;
    match Photo::from_data_url(url) {
        Ok(photo) => Some(photo),
        Err(e) => {
            log::warn!("Skipping unreadable photo: {}", e);
            None
        }
    }
}
