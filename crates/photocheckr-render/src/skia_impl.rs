//! tiny-skia page renderer. Photos are drawn as pixmaps; annotations and
//! notes are rasterized from an SVG overlay with resvg.

use crate::photo::{Photo, decode_optional};
use crate::renderer::{PageRenderer, RenderResult, RenderedPage, RendererError};
use crate::svg::page_overlay;
use photocheckr_core::export::{PageSource, Placement, fit_contain};
use photocheckr_core::workspace::ImageSlot;
use resvg::usvg;
use std::sync::Arc;
use tiny_skia::{
    Color, FillRule, FilterQuality, Mask, PathBuilder, Pixmap, PixmapPaint, Rect, Transform,
};

/// CPU renderer producing export pages.
pub struct SkiaRenderer {
    /// SVG options with the font database used for text.
    options: usvg::Options<'static>,
}

impl Default for SkiaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkiaRenderer {
    /// Create a renderer using the system fonts.
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        log::debug!("Loaded {} font faces", fontdb.len());
        Self::with_fontdb(fontdb)
    }

    /// Create a renderer with a prepared font database.
    pub fn with_fontdb(fontdb: usvg::fontdb::Database) -> Self {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::new(fontdb);
        Self { options }
    }

    fn draw_photo(pixmap: &mut Pixmap, photo: &Photo, placement: &Placement, scale: f32) {
        let size = photo.size();
        let fitted = fit_contain(size, placement.frame);
        let clip = placement.clip.intersect(fitted);
        if clip.width() <= 0.0 || clip.height() <= 0.0 {
            return;
        }

        let Some(clip_rect) = Rect::from_ltrb(
            clip.x0 as f32 * scale,
            clip.y0 as f32 * scale,
            clip.x1 as f32 * scale,
            clip.y1 as f32 * scale,
        ) else {
            return;
        };
        let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height()) else {
            return;
        };
        mask.fill_path(
            &PathBuilder::from_rect(clip_rect),
            FillRule::Winding,
            true,
            Transform::identity(),
        );

        let transform = Transform::from_row(
            (fitted.width() / size.width) as f32 * scale,
            0.0,
            0.0,
            (fitted.height() / size.height) as f32 * scale,
            fitted.x0 as f32 * scale,
            fitted.y0 as f32 * scale,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, photo.pixmap().as_ref(), &paint, transform, Some(&mask));
    }
}

impl PageRenderer for SkiaRenderer {
    fn render_page(&mut self, page: &PageSource, quality: u32) -> RenderResult<RenderedPage> {
        let before = decode_optional(page.before.as_deref());
        let after = decode_optional(page.after.as_deref());

        let geometry = page.geometry(before.as_ref().map(Photo::size), quality);
        let (width, height) = geometry.pixel_size();
        let scale = geometry.scale as f32;
        log::debug!(
            "Rendering '{}' ({}) at {}x{} px",
            page.tab_name,
            page.mode.label(),
            width,
            height
        );

        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RendererError::RenderFailed(format!("Cannot allocate {}x{} page", width, height))
        })?;
        pixmap.fill(Color::WHITE);

        for placement in geometry.placements(page.single_source, page.slider) {
            let photo = match placement.slot {
                ImageSlot::Before => before.as_ref(),
                ImageSlot::After => after.as_ref(),
            };
            if let Some(photo) = photo {
                Self::draw_photo(&mut pixmap, photo, &placement, scale);
            }
        }

        let svg = page_overlay(page, &geometry);
        let tree = usvg::Tree::from_str(&svg, &self.options)
            .map_err(|e| RendererError::RenderFailed(format!("Overlay: {}", e)))?;
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        let rgba_data = pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        Ok(RenderedPage {
            tab_name: page.tab_name.clone(),
            rgba_data,
            width,
            height,
            geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::tests::solid_png_url;
    use kurbo::{Point, Size};
    use photocheckr_core::shapes::{Rectangle, Shape, ShapeStyle, SerializableColor};
    use photocheckr_core::view::{SingleSource, ViewMode};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn assert_color(rendered: &RenderedPage, x: u32, y: u32, expected: [u8; 4]) {
        let px = rendered.pixel(x, y).unwrap();
        let close = px.iter().zip(expected).all(|(a, b)| a.abs_diff(b) <= 2);
        assert!(close, "pixel ({}, {}) is {:?}, expected {:?}", x, y, px, expected);
    }

    fn renderer() -> SkiaRenderer {
        SkiaRenderer::with_fontdb(usvg::fontdb::Database::new())
    }

    fn page(mode: ViewMode) -> PageSource {
        PageSource {
            tab_name: "Comparison 1".to_string(),
            mode,
            single_source: SingleSource::Before,
            slider: 50,
            before: Some(solid_png_url(10, 10, RED)),
            after: Some(solid_png_url(10, 10, BLUE)),
            annotations: Vec::new(),
            surface_size: None,
            notes: String::new(),
        }
    }

    #[test]
    fn test_slider_page() {
        let rendered = renderer().render_page(&page(ViewMode::Slider), 1).unwrap();
        assert_eq!((rendered.width, rendered.height), (10, 50));
        // Left of the divider shows the after photo.
        assert_color(&rendered, 2, 5, BLUE);
        assert_color(&rendered, 7, 5, RED);
        // Footer strip stays white.
        assert_color(&rendered, 5, 45, WHITE);
    }

    #[test]
    fn test_side_by_side_page() {
        let rendered = renderer().render_page(&page(ViewMode::SideBySide), 1).unwrap();
        // Width clamped to 1.3 × height, scale doubled.
        assert_eq!(rendered.geometry.base, Size::new(13.0, 10.0));
        assert_eq!((rendered.width, rendered.height), (26, 100));
        assert_color(&rendered, 6, 10, RED);
        assert_color(&rendered, 19, 10, BLUE);
    }

    #[test]
    fn test_single_page_shows_chosen_source() {
        let mut source = page(ViewMode::Single);
        source.single_source = SingleSource::After;
        let rendered = renderer().render_page(&source, 1).unwrap();
        assert_color(&rendered, 5, 5, BLUE);
    }

    #[test]
    fn test_missing_photo_leaves_white() {
        let mut source = page(ViewMode::Slider);
        source.before = None;
        source.slider = 0;
        let rendered = renderer().render_page(&source, 1).unwrap();
        assert_color(&rendered, 5, 5, WHITE);
    }

    #[test]
    fn test_annotations_drawn_over_photos() {
        let mut source = page(ViewMode::Single);
        source.before = Some(solid_png_url(20, 20, WHITE));
        source.surface_size = Some(Size::new(20.0, 20.0));
        let style = ShapeStyle::stroked(SerializableColor::default_brush(), 4.0);
        let rect = Rectangle::new(Point::new(2.0, 2.0), 16.0, 16.0).with_style(style);
        source.annotations.push(Shape::Rectangle(rect));

        let rendered = renderer().render_page(&source, 1).unwrap();
        assert_color(&rendered, 2, 10, RED);
        assert_color(&rendered, 10, 10, WHITE);
    }

    #[test]
    fn test_notes_widen_page() {
        let mut source = page(ViewMode::Slider);
        source.notes = "Cracked tile".to_string();
        let rendered = renderer().render_page(&source, 1).unwrap();
        assert_eq!(rendered.width, 10 + 267);
        assert!(rendered.geometry.notes_area().is_some());
    }
}
