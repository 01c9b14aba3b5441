//! Export of a whole session to PDF or PNG.

use crate::encode::encode_png;
use crate::pdf::PdfBuilder;
use crate::renderer::{PageRenderer, RenderedPage, RendererError};
use photocheckr_core::export::{DEFAULT_FILE_STEM, DEFAULT_QUALITY, collect_pages, export_file_name};
use photocheckr_core::workspace::Workspace;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: add photos first")]
    NothingToExport,
    #[error(transparent)]
    Render(#[from] RendererError),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Export settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Raster scale factor; side-by-side pages use twice this.
    pub quality: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

/// A finished PDF.
#[derive(Debug, Clone)]
pub struct PdfExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// A finished PNG of one page.
#[derive(Debug, Clone)]
pub struct PngExport {
    pub tab_name: String,
    pub bytes: Vec<u8>,
}

/// Render every exportable tab. The active tab is restored afterwards.
pub fn render_pages<R: PageRenderer>(
    renderer: &mut R,
    workspace: &mut Workspace,
    options: ExportOptions,
) -> ExportResult<Vec<RenderedPage>> {
    let sources = collect_pages(workspace);
    if sources.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    sources
        .iter()
        .map(|source| {
            renderer
                .render_page(source, options.quality)
                .map_err(ExportError::from)
        })
        .collect()
}

/// Render the session and assemble the PDF.
pub fn export_pdf<R: PageRenderer>(
    renderer: &mut R,
    workspace: &mut Workspace,
    options: ExportOptions,
) -> ExportResult<PdfExport> {
    let pages = render_pages(renderer, workspace, options)?;

    let title = workspace.title.trim();
    let mut builder = PdfBuilder::new(if title.is_empty() { DEFAULT_FILE_STEM } else { title });
    for page in &pages {
        builder.add_page(page)?;
    }
    let page_count = builder.page_count();
    let bytes = builder.finish()?;

    let file_name = export_file_name(&workspace.title);
    log::info!(
        "Exported {} page(s) to {} ({} bytes)",
        page_count,
        file_name,
        bytes.len()
    );
    Ok(PdfExport {
        file_name,
        bytes,
        page_count,
    })
}

/// Render the session and encode each page as PNG.
pub fn export_png<R: PageRenderer>(
    renderer: &mut R,
    workspace: &mut Workspace,
    options: ExportOptions,
) -> ExportResult<Vec<PngExport>> {
    render_pages(renderer, workspace, options)?
        .iter()
        .map(|page| {
            let bytes = encode_png(page)?;
            Ok::<_, ExportError>(PngExport {
                tab_name: page.tab_name.clone(),
                bytes,
            })
        })
        .collect()
}
