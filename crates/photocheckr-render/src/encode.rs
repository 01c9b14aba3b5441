//! PNG encoding of rendered pages.

use crate::renderer::{RenderResult, RenderedPage, RendererError};

fn encode(data: &[u8], width: u32, height: u32, color: png::ColorType) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(format!("PNG header: {}", e)))?;
        writer
            .write_image_data(data)
            .map_err(|e| RendererError::Encode(format!("PNG data: {}", e)))?;
    }
    Ok(png_data)
}

/// Encode a page as an RGBA PNG.
pub fn encode_png(page: &RenderedPage) -> RenderResult<Vec<u8>> {
    encode(&page.rgba_data, page.width, page.height, png::ColorType::Rgba)
}

/// Encode a page as an opaque RGB PNG (for PDF embedding).
pub(crate) fn encode_rgb_png(page: &RenderedPage) -> RenderResult<Vec<u8>> {
    encode(&page.rgb_data(), page.width, page.height, png::ColorType::Rgb)
}
