//! Export page geometry and page collection. Pixels are produced by the
//! render crate; everything here is resolution independent (CSS pixels).

use crate::shapes::Shape;
use crate::surface::AnnotationSurface;
use crate::view::{SingleSource, ViewMode};
use crate::workspace::{ImageSlot, Workspace};
use kurbo::{Rect, Size};

/// Fallback page area when neither a surface nor a photo gives a size.
pub const DEFAULT_BASE_SIZE: Size = Size::new(1200.0, 800.0);
/// Blank strip below the photos.
pub const FOOTER_HEIGHT: f64 = 40.0;
pub const DEFAULT_QUALITY: u32 = 2;
/// CSS pixels to PDF points.
pub const PX_TO_PT: f64 = 72.0 / 96.0;
pub const DEFAULT_FILE_STEM: &str = "PhotoCheckr_Export";

/// Side-by-side pages keep their width between these multiples of the height.
const SIDE_MIN_RATIO: f64 = 1.3;
const SIDE_MAX_RATIO: f64 = 1.8;

/// Notes column layout, in CSS pixels.
pub const NOTES_COLUMN_PT: f64 = 200.0;
pub const NOTES_MARGIN: f64 = 12.0;
pub const NOTES_TOP: f64 = 16.0;
pub const NOTES_LINE_HEIGHT: f64 = 18.0;
pub const NOTES_FONT_SIZE: f64 = 14.0;
/// Average glyph advance as a fraction of the font size, used for wrapping.
const NOTES_CHAR_WIDTH: f64 = 0.5;

/// Width of the notes column in CSS pixels.
pub fn notes_column_width() -> f64 {
    (NOTES_COLUMN_PT / PX_TO_PT).round()
}

/// `<title>.pdf`, or the default name when the title is blank.
pub fn export_file_name(title: &str) -> String {
    let stem = title.trim();
    let stem = if stem.is_empty() { DEFAULT_FILE_STEM } else { stem };
    format!("{}.pdf", stem)
}

/// Size of the photo area: the surface size, else the before photo's
/// natural size, else 1200×800. Each dimension falls back on its own.
pub fn base_size(surface: Option<Size>, before_natural: Option<Size>) -> Size {
    let positive = |v: f64| (v > 0.0).then_some(v);
    let width = surface
        .and_then(|s| positive(s.width))
        .or_else(|| before_natural.and_then(|s| positive(s.width)))
        .unwrap_or(DEFAULT_BASE_SIZE.width);
    let height = surface
        .and_then(|s| positive(s.height))
        .or_else(|| before_natural.and_then(|s| positive(s.height)))
        .unwrap_or(DEFAULT_BASE_SIZE.height);
    Size::new(width, height)
}

/// Keep side-by-side pages from getting too wide or too narrow.
pub fn clamp_side_by_side_width(width: f64, height: f64) -> f64 {
    (height * SIDE_MIN_RATIO)
        .max((height * SIDE_MAX_RATIO).min(width))
        .round()
}

/// Raster scale; side-by-side doubles it to keep each half sharp.
pub fn effective_scale(quality: u32, mode: ViewMode) -> f64 {
    let quality = quality.max(1) as f64;
    match mode {
        ViewMode::SideBySide => quality * 2.0,
        _ => quality,
    }
}

/// Scale `src` uniformly to fit inside `dst`, centered.
pub fn fit_contain(src: Size, dst: Rect) -> Rect {
    if src.width <= 0.0 || src.height <= 0.0 {
        return Rect::new(dst.x0, dst.y0, dst.x0, dst.y0);
    }
    let ratio = (dst.width() / src.width).min(dst.height() / src.height);
    let w = src.width * ratio;
    let h = src.height * ratio;
    let x = dst.x0 + (dst.width() - w) / 2.0;
    let y = dst.y0 + (dst.height() - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

/// Greedy word wrap using an average glyph width.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let char_width = font_size * NOTES_CHAR_WIDTH;
    let measure = |s: &str| s.chars().count() as f64 * char_width;

    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };
        if measure(&candidate) > max_width && !line.is_empty() {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Where one photo goes on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub slot: ImageSlot,
    /// Box the photo is fitted into.
    pub frame: Rect,
    /// Drawing is restricted to this rectangle.
    pub clip: Rect,
}

/// Layout of one exported page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub mode: ViewMode,
    /// Photo area size after clamping.
    pub base: Size,
    pub scale: f64,
    /// Notes column width; zero when there is no note.
    pub notes_width: f64,
}

impl PageGeometry {
    pub fn new(mode: ViewMode, base: Size, quality: u32, has_notes: bool) -> Self {
        let base = match mode {
            ViewMode::SideBySide => {
                Size::new(clamp_side_by_side_width(base.width, base.height), base.height)
            }
            _ => base,
        };
        Self {
            mode,
            base,
            scale: effective_scale(quality, mode),
            notes_width: if has_notes { notes_column_width() } else { 0.0 },
        }
    }

    /// Page size in CSS pixels (photo area, notes column and footer).
    pub fn css_size(&self) -> Size {
        Size::new(
            self.base.width + self.notes_width,
            self.base.height + FOOTER_HEIGHT,
        )
    }

    /// Raster size in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let css = self.css_size();
        (
            (css.width * self.scale).round().max(1.0) as u32,
            (css.height * self.scale).round().max(1.0) as u32,
        )
    }

    /// PDF page size in points. Derived from the CSS size so quality only
    /// changes resolution; deliberately not raster pixels × 0.75.
    pub fn page_size_pt(&self) -> Size {
        let css = self.css_size();
        Size::new(css.width * PX_TO_PT, css.height * PX_TO_PT)
    }

    pub fn orientation(&self) -> Orientation {
        let page = self.page_size_pt();
        if page.width >= page.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn photo_area(&self) -> Rect {
        Rect::from_origin_size((0.0, 0.0), self.base)
    }

    pub fn notes_area(&self) -> Option<Rect> {
        if self.notes_width <= 0.0 {
            return None;
        }
        let css = self.css_size();
        Some(Rect::new(self.base.width, 0.0, css.width, css.height))
    }

    /// Photo placements for the view mode, back to front.
    pub fn placements(&self, single_source: SingleSource, slider: u8) -> Vec<Placement> {
        let area = self.photo_area();
        match self.mode {
            ViewMode::Slider => {
                let pct = slider.min(100) as f64 / 100.0;
                vec![
                    Placement {
                        slot: ImageSlot::Before,
                        frame: area,
                        clip: area,
                    },
                    Placement {
                        slot: ImageSlot::After,
                        frame: area,
                        clip: Rect::new(0.0, 0.0, pct * area.width(), area.height()),
                    },
                ]
            }
            ViewMode::SideBySide => {
                let half = area.width() / 2.0;
                let left = Rect::new(0.0, 0.0, half, area.height());
                let right = Rect::new(half, 0.0, area.width(), area.height());
                vec![
                    Placement {
                        slot: ImageSlot::Before,
                        frame: left,
                        clip: left,
                    },
                    Placement {
                        slot: ImageSlot::After,
                        frame: right,
                        clip: right,
                    },
                ]
            }
            ViewMode::Single => {
                let slot = match single_source {
                    SingleSource::Before => ImageSlot::Before,
                    SingleSource::After => ImageSlot::After,
                };
                vec![Placement {
                    slot,
                    frame: area,
                    clip: area,
                }]
            }
        }
    }

    /// Notes text lines and their baseline-top positions.
    pub fn notes_lines(&self, text: &str) -> Vec<(f64, f64, String)> {
        let Some(area) = self.notes_area() else {
            return Vec::new();
        };
        let width = (area.width() - NOTES_MARGIN * 2.0).max(0.0);
        let x = area.x0 + NOTES_MARGIN;
        wrap_text(text.trim(), width, NOTES_FONT_SIZE)
            .into_iter()
            .enumerate()
            .map(|(i, line)| (x, NOTES_TOP + i as f64 * NOTES_LINE_HEIGHT, line))
            .collect()
    }
}

/// Everything needed to render one page, detached from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSource {
    pub tab_name: String,
    pub mode: ViewMode,
    pub single_source: SingleSource,
    pub slider: u8,
    pub before: Option<String>,
    pub after: Option<String>,
    /// Annotations of the surface shown in this mode.
    pub annotations: Vec<Shape>,
    /// Annotation coordinate space; `None` when the surface was never sized.
    pub surface_size: Option<Size>,
    pub notes: String,
}

impl PageSource {
    pub fn has_any_image(&self) -> bool {
        self.before.is_some() || self.after.is_some()
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&str> {
        match slot {
            ImageSlot::Before => self.before.as_deref(),
            ImageSlot::After => self.after.as_deref(),
        }
    }

    pub fn geometry(&self, before_natural: Option<Size>, quality: u32) -> PageGeometry {
        let base = base_size(self.surface_size, before_natural);
        PageGeometry::new(self.mode, base, quality, !self.notes.trim().is_empty())
    }
}

fn surface_size(surface: &AnnotationSurface) -> Option<Size> {
    surface
        .has_size()
        .then(|| Size::new(surface.size().0, surface.size().1))
}

fn capture_page(workspace: &Workspace, tab_id: &str) -> Option<PageSource> {
    let tab = workspace.tabs().get(tab_id)?;
    let view = workspace.view();
    let surface = workspace.active_surface();
    Some(PageSource {
        tab_name: tab.name.clone(),
        mode: view.mode(),
        single_source: view.single_source(),
        slider: view.slider(),
        before: tab.before.clone(),
        after: tab.after.clone(),
        annotations: surface.shapes().to_vec(),
        surface_size: surface_size(surface),
        notes: workspace.description().to_string(),
    })
}

/// Gather pages for export. With several tabs every tab is applied in turn
/// and the original tab is restored afterwards; tabs without photos are
/// skipped.
pub fn collect_pages(workspace: &mut Workspace) -> Vec<PageSource> {
    workspace.serialize_active_tab();

    let mut pages = Vec::new();
    if workspace.tabs().len() > 1 {
        let original = workspace.tabs().active_id().map(str::to_string);
        let ids: Vec<String> = workspace.tabs().iter().map(|t| t.id.clone()).collect();
        for id in &ids {
            if let Err(e) = workspace.apply_tab(id) {
                log::warn!("Skipping tab {}: {}", id, e);
                continue;
            }
            pages.extend(capture_page(workspace, id));
        }
        if let Some(id) = original.or_else(|| ids.first().cloned()) {
            if let Err(e) = workspace.apply_tab(&id) {
                log::error!("Failed to restore tab {}: {}", id, e);
            }
        }
    } else if let Some(id) = workspace.tabs().active_id().map(str::to_string) {
        pages.extend(capture_page(workspace, &id));
    }

    let before = pages.len();
    pages.retain(PageSource::has_any_image);
    if pages.len() < before {
        log::info!("Skipped {} page(s) without photos", before - pages.len());
    }
    pages
}
