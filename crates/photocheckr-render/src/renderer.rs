//! Page renderer trait abstraction.

use photocheckr_core::export::{PageGeometry, PageSource};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Image decode failed: {0}")]
    Decode(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// A rasterized page. Pixels are RGBA8, not premultiplied.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub tab_name: String,
    pub rgba_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Layout the page was rendered with.
    pub geometry: PageGeometry,
}

impl RenderedPage {
    /// RGBA pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = self.rgba_data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Pixels with the alpha channel dropped.
    pub fn rgb_data(&self) -> Vec<u8> {
        self.rgba_data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }
}

/// Trait for page rendering backends.
pub trait PageRenderer {
    /// Rasterize one page at the given export quality.
    fn render_page(&mut self, page: &PageSource, quality: u32) -> RenderResult<RenderedPage>;
}
