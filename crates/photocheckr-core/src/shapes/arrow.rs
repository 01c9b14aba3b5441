//! Arrow shape (straight shaft with a filled triangular head).

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ShapeId,
    pub start: Point,
    /// End point (where the arrowhead points).
    pub end: Point,
    /// Length of the arrowhead along the shaft.
    pub head_length: f64,
    /// Width of the arrowhead base.
    pub head_width: f64,
    pub style: ShapeStyle,
}

impl Arrow {
    pub const DEFAULT_HEAD_LENGTH: f64 = 15.0;
    pub const DEFAULT_HEAD_WIDTH: f64 = 10.0;

    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            head_length: Self::DEFAULT_HEAD_LENGTH,
            head_width: Self::DEFAULT_HEAD_WIDTH,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Normalized direction, +x for degenerate arrows.
    pub fn direction(&self) -> Vec2 {
        let d = self.end - self.start;
        let len = d.hypot();
        if len < f64::EPSILON {
            Vec2::new(1.0, 0.0)
        } else {
            d / len
        }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }

    /// Corners of the head triangle: tip, left, right.
    pub fn head_points(&self) -> [Point; 3] {
        let dir = self.direction();
        let perp = Vec2::new(-dir.y, dir.x);
        let back = self.end - dir * self.head_length;
        let half = self.head_width / 2.0;
        [self.end, back + perp * half, back - perp * half]
    }

    /// Closed path of the arrowhead.
    pub fn head_path(&self) -> BezPath {
        let [tip, left, right] = self.head_points();
        let mut path = BezPath::new();
        path.move_to(tip);
        path.line_to(left);
        path.line_to(right);
        path.close_path();
        path
    }
}

impl ShapeTrait for Arrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let [tip, left, right] = self.head_points();
        [self.start, tip, left, right]
            .iter()
            .fold(Rect::from_points(self.start, self.start), |r, p| r.union_pt(*p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dist = super::point_to_segment_dist(point, self.start, self.end);
        if dist <= tolerance + self.style.stroke_width / 2.0 {
            return true;
        }

        fn sign(p1: Point, p2: Point, p3: Point) -> f64 {
            (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
        }

        let [tip, left, right] = self.head_points();
        let d1 = sign(point, tip, left);
        let d2 = sign(point, left, right);
        let d3 = sign(point, right, tip);
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_neg && has_pos)
    }

    /// The shaft only; the head is [`Arrow::head_path`].
    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        if self.start == self.end {
            return path;
        }
        // Stop the shaft at the head's base so the stroke doesn't poke through the tip.
        let shaft_end = self.end - self.direction() * self.head_length.min(self.length());
        path.move_to(self.start);
        path.line_to(shaft_end);
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.start = affine * self.start;
        self.end = affine * self.end;
        let scale = affine.as_coeffs();
        let factor = (scale[0].abs() + scale[3].abs()) / 2.0;
        self.head_length *= factor;
        self.head_width *= factor;
    }
}
