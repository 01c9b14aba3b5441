//! Text label shape.

use super::{SerializableColor, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

impl FontWeight {
    /// CSS/SVG `font-weight` value.
    pub fn css_value(&self) -> &'static str {
        match self {
            FontWeight::Regular => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

/// A text shape. The text color lives in `style.fill_color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Top-left corner of the text box.
    pub position: Point,
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    pub style: ShapeStyle,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const PLACEHOLDER: &'static str = "Double-click to edit";

    pub fn new(position: Point, content: String) -> Self {
        let color = SerializableColor::default_brush();
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: FontWeight::default(),
            style: ShapeStyle {
                stroke_color: color,
                stroke_width: 0.0,
                fill_color: Some(color),
                opacity: 1.0,
            },
        }
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.style.fill_color = Some(color);
        self.style.stroke_color = color;
        self
    }

    pub fn bold(mut self) -> Self {
        self.font_weight = FontWeight::Bold;
        self
    }

    /// Text color (falls back to the stroke color).
    pub fn color(&self) -> SerializableColor {
        self.style.fill_color.unwrap_or(self.style.stroke_color)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.lines()
    }

    /// Line height used for layout.
    pub fn line_height(&self) -> f64 {
        self.font_size * 1.16
    }

    /// Approximate layout size; glyph metrics are not available here.
    pub fn approximate_size(&self) -> (f64, f64) {
        let char_width = match self.font_weight {
            FontWeight::Regular => 0.55,
            FontWeight::Bold => 0.6,
        } * self.font_size;
        let longest = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let line_count = self.lines().count().max(1);
        (longest as f64 * char_width, line_count as f64 * self.line_height())
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let (w, h) = self.approximate_size();
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + w,
            self.position.y + h,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let coeffs = affine.as_coeffs();
        let scale = (coeffs[0].abs() + coeffs[3].abs()) / 2.0;
        self.font_size *= scale;
    }
}
