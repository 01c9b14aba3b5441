//! SVG overlay for a page: annotation shapes, the notes divider and the
//! note text. Rasterized on top of the photos with resvg.

use kurbo::BezPath;
use photocheckr_core::export::{NOTES_FONT_SIZE, PageGeometry, PageSource};
use photocheckr_core::shapes::{SerializableColor, Shape, ShapeStyle, Text};
use std::fmt::Write;

/// Baseline offset from the top of a line, as a fraction of the font size.
const ASCENT: f64 = 0.8;
const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";
const DIVIDER_OPACITY: f64 = 0.35;

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn paint(color: SerializableColor) -> (String, f64) {
    (color.to_hex(), color.alpha())
}

fn push_path(out: &mut String, path: &BezPath, style: &ShapeStyle) {
    let (stroke, stroke_opacity) = paint(style.stroke_color);
    let fill = match style.fill_color {
        Some(fill) if !fill.is_transparent() => {
            let (hex, alpha) = paint(fill);
            format!(r#"fill="{}" fill-opacity="{}""#, hex, alpha)
        }
        _ => r#"fill="none""#.to_string(),
    };
    let _ = writeln!(
        out,
        r#"<path d="{}" {} stroke="{}" stroke-opacity="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round" opacity="{}"/>"#,
        path.to_svg(),
        fill,
        stroke,
        stroke_opacity,
        style.stroke_width,
        style.opacity,
    );
}

fn push_text(out: &mut String, text: &Text) {
    let (fill, alpha) = paint(text.color());
    for (i, line) in text.lines().enumerate() {
        let y = text.position.y + i as f64 * text.line_height() + text.font_size * ASCENT;
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{}" fill="{}" fill-opacity="{}" opacity="{}" xml:space="preserve">{}</text>"#,
            text.position.x,
            y,
            FONT_FAMILY,
            text.font_size,
            text.font_weight.css_value(),
            fill,
            alpha,
            text.style.opacity,
            escape_xml(line),
        );
    }
}

/// Append one annotation shape.
pub fn push_shape(out: &mut String, shape: &Shape) {
    match shape {
        Shape::Text(text) => push_text(out, text),
        Shape::Arrow(arrow) => {
            push_path(out, &shape.to_path(), &arrow.style);
            let mut head = arrow.style.clone();
            head.fill_color = Some(arrow.style.stroke_color);
            push_path(out, &arrow.head_path(), &head);
        }
        other => push_path(out, &other.to_path(), other.style()),
    }
}

/// Build the overlay document for a page, sized in CSS pixels.
pub fn page_overlay(page: &PageSource, geometry: &PageGeometry) -> String {
    let css = geometry.css_size();
    let area = geometry.photo_area();
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = css.width,
        h = css.height,
    );

    if !page.annotations.is_empty() {
        // Annotations live in surface coordinates and are stretched onto the
        // photo area.
        let (sx, sy) = match page.surface_size {
            Some(size) if size.width > 0.0 && size.height > 0.0 => {
                (area.width() / size.width, area.height() / size.height)
            }
            _ => (1.0, 1.0),
        };
        let _ = writeln!(
            out,
            r#"<clipPath id="photo"><rect x="0" y="0" width="{}" height="{}"/></clipPath>"#,
            area.width(),
            area.height(),
        );
        let _ = writeln!(
            out,
            r#"<g clip-path="url(#photo)"><g transform="scale({} {})">"#,
            sx, sy
        );
        for shape in &page.annotations {
            push_shape(&mut out, shape);
        }
        out.push_str("</g></g>\n");
    }

    if let Some(notes) = geometry.notes_area() {
        let _ = writeln!(
            out,
            r##"<rect x="{}" y="0" width="1" height="{}" fill="#000000" fill-opacity="{}"/>"##,
            notes.x0,
            notes.height(),
            DIVIDER_OPACITY,
        );
        for (x, top, line) in geometry.notes_lines(&page.notes) {
            let _ = writeln!(
                out,
                r##"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="#000000" xml:space="preserve">{}</text>"##,
                x,
                top + NOTES_FONT_SIZE * ASCENT,
                FONT_FAMILY,
                NOTES_FONT_SIZE,
                escape_xml(&line),
            );
        }
    }

    out.push_str("</svg>\n");
    out
}
