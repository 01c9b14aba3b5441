//! PDF assembly: one image page per rendered page.

use crate::encode::encode_rgb_png;
use crate::renderer::{RenderResult, RenderedPage, RendererError};
use photocheckr_core::export::Orientation;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{Image, ImageTransform, Mm, PdfDocument, PdfDocumentReference};
use std::io::{BufWriter, Cursor};

/// Points to millimetres.
fn pt_to_mm(pt: f64) -> f32 {
    (pt * 25.4 / 72.0) as f32
}

/// Builds a PDF with one full-page image per rendered page.
pub struct PdfBuilder {
    doc: PdfDocumentReference,
    pages: usize,
}

impl PdfBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            doc: PdfDocument::empty(title),
            pages: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Append a page sized to the page geometry with the raster filling it.
    pub fn add_page(&mut self, page: &RenderedPage) -> RenderResult<()> {
        let size = page.geometry.page_size_pt();
        let (page_index, layer_index) = self.doc.add_page(
            Mm(pt_to_mm(size.width)),
            Mm(pt_to_mm(size.height)),
            "Layer 1",
        );
        let layer = self.doc.get_page(page_index).get_layer(layer_index);

        let png = encode_rgb_png(page)?;
        let decoder = PngDecoder::new(Cursor::new(png))
            .map_err(|e| RendererError::Encode(format!("PDF image: {}", e)))?;
        let image = Image::try_from(decoder)
            .map_err(|e| RendererError::Encode(format!("PDF image: {}", e)))?;

        // One raster pixel is 1/scale CSS pixels, and a CSS pixel is 1/96 in.
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(0.0)),
                dpi: Some((96.0 * page.geometry.scale) as f32),
                ..Default::default()
            },
        );

        self.pages += 1;
        let orientation = match page.geometry.orientation() {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        };
        log::debug!(
            "PDF page {} '{}': {:.0}x{:.0} pt {}",
            self.pages,
            page.tab_name,
            size.width,
            size.height,
            orientation
        );
        Ok(())
    }

    /// Serialize the document.
    pub fn finish(self) -> RenderResult<Vec<u8>> {
        let mut out = BufWriter::new(Vec::new());
        self.doc
            .save(&mut out)
            .map_err(|e| RendererError::Encode(format!("PDF save: {}", e)))?;
        out.into_inner()
            .map_err(|e| RendererError::Encode(format!("PDF flush: {}", e)))
    }
}
