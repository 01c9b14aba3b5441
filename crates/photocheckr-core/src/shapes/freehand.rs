//! Freehand brush strokes.

use super::{ShapeId, ShapeStyle, ShapeTrait, point_to_polyline_dist, point_to_segment_dist};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pointer samples closer than this to the previous one are dropped while
/// drawing.
pub const MIN_SAMPLE_SPACING: f64 = 0.4;

/// A brush stroke drawn with the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Stroke samples in surface coordinates.
    pub points: Vec<Point>,
    pub style: ShapeStyle,
}

impl Freehand {
    /// Start a stroke with the brush's color and width.
    pub fn with_brush(start: Point, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            style,
        }
    }

    /// Record a pointer sample. Samples that barely moved are skipped.
    pub fn add_point(&mut self, point: Point) {
        let moved = self
            .points
            .last()
            .is_none_or(|last| last.distance(point) >= MIN_SAMPLE_SPACING);
        if moved {
            self.points.push(point);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop samples that deviate less than `tolerance` from the line through
    /// their neighbours (Ramer–Douglas–Peucker). Endpoints are kept.
    pub fn simplify(&mut self, tolerance: f64) {
        let n = self.points.len();
        if n < 3 {
            return;
        }
        let mut keep = vec![false; n];
        keep[0] = true;
        keep[n - 1] = true;

        // Explicit stack of (first, last) spans instead of recursion.
        let mut spans = vec![(0, n - 1)];
        while let Some((first, last)) = spans.pop() {
            let (a, b) = (self.points[first], self.points[last]);
            let farthest = (first + 1..last)
                .map(|i| (i, point_to_segment_dist(self.points[i], a, b)))
                .max_by(|x, y| x.1.total_cmp(&y.1));
            if let Some((i, dist)) = farthest {
                if dist > tolerance {
                    keep[i] = true;
                    spans.push((first, i));
                    spans.push((i, last));
                }
            }
        }

        let before = n;
        let mut flags = keep.into_iter();
        self.points.retain(|_| flags.next().unwrap_or(true));
        log::trace!("Simplified stroke {} -> {} points", before, self.points.len());
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.style.stroke_width / 2.0;
        match self.points.as_slice() {
            [] => false,
            [only] => only.distance(point) <= reach,
            points => point_to_polyline_dist(point, points) <= reach,
        }
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(*first);
            for p in points {
                path.line_to(*p);
            }
        }
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        for point in &mut self.points {
            *point = affine * *point;
        }
    }
}
