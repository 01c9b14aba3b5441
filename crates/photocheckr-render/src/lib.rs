//! PhotoCheckr Render Library
//!
//! Rasterizes comparison pages with tiny-skia and resvg, and assembles
//! them into PDF or PNG exports.

mod encode;
mod export;
mod pdf;
mod photo;
mod renderer;
mod skia_impl;
pub mod svg;

pub use encode::encode_png;
pub use export::{
    ExportError, ExportOptions, ExportResult, PdfExport, PngExport, export_pdf, export_png,
    render_pages,
};
pub use pdf::PdfBuilder;
pub use photo::Photo;
pub use renderer::{PageRenderer, RenderResult, RenderedPage, RendererError};
pub use skia_impl::SkiaRenderer;
