//! Annotation surface: the drawing layer placed over a comparison.

use crate::shapes::{
    Arrow, Ellipse, Freehand, Rectangle, SerializableColor, Shape, ShapeId, ShapeStyle, Text,
};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 100;

/// Default brush width in pixels.
pub const DEFAULT_BRUSH_WIDTH: f64 = 4.0;

/// Hit-test tolerance used when picking shapes.
const PICK_TOLERANCE: f64 = 4.0;

/// Finished brush strokes drop samples closer than this to their simplified
/// outline, in surface pixels.
pub const STROKE_SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Whether pointer input draws with the brush or selects shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawMode {
    #[default]
    Draw,
    Select,
}

/// Serialized state of a surface. This is what undo entries and tab
/// records hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SurfaceState {
    width: f64,
    height: f64,
    /// Shapes back to front.
    #[serde(default)]
    shapes: Vec<Shape>,
}

/// A stack of shapes with brush settings and JSON-snapshot history.
#[derive(Debug, Clone)]
pub struct AnnotationSurface {
    width: f64,
    height: f64,
    shapes: Vec<Shape>,
    mode: DrawMode,
    brush_color: SerializableColor,
    brush_width: f64,
    selected: Option<ShapeId>,
    stroke: Option<Freehand>,
    undo_stack: Vec<String>,
    redo_stack: Vec<String>,
    restoring: bool,
}

impl Default for AnnotationSurface {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl AnnotationSurface {
    /// Create an empty surface. Its empty state is the first undo entry.
    pub fn new(width: f64, height: f64) -> Self {
        let mut surface = Self {
            width,
            height,
            shapes: Vec::new(),
            mode: DrawMode::Draw,
            brush_color: SerializableColor::default_brush(),
            brush_width: DEFAULT_BRUSH_WIDTH,
            selected: None,
            stroke: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            restoring: false,
        };
        surface.push_undo();
        surface
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Whether the surface has a non-zero area.
    pub fn has_size(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Resize the surface. Shapes keep their coordinates.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    /// Bounding box of all shapes.
    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    // History

    fn state(&self) -> SurfaceState {
        SurfaceState {
            width: self.width,
            height: self.height,
            shapes: self.shapes.clone(),
        }
    }

    fn snapshot(&self) -> Option<String> {
        match serde_json::to_string(&self.state()) {
            Ok(json) => Some(json),
            Err(e) => {
                log::error!("Failed to snapshot annotation surface: {}", e);
                None
            }
        }
    }

    fn apply_state(&mut self, state: SurfaceState) {
        self.restoring = true;
        self.width = state.width;
        self.height = state.height;
        self.shapes = state.shapes;
        self.selected = None;
        self.stroke = None;
        self.restoring = false;
    }

    fn restore(&mut self, json: &str) {
        match serde_json::from_str::<SurfaceState>(json) {
            Ok(state) => self.apply_state(state),
            Err(e) => log::error!("Failed to restore annotation surface: {}", e),
        }
    }

    /// Push the current state onto the undo stack (call after making changes).
    pub fn push_undo(&mut self) {
        if self.restoring {
            return;
        }
        let Some(json) = self.snapshot() else { return };
        self.undo_stack.push(json);

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }

        // Clear redo stack when new changes are made
        self.redo_stack.clear();
    }

    /// Step back one state. The top of the undo stack is always the current
    /// state, so this needs at least two entries.
    pub fn undo(&mut self) -> bool {
        if self.undo_stack.len() <= 1 {
            return false;
        }
        if let Some(current) = self.undo_stack.pop() {
            self.redo_stack.push(current);
        }
        match self.undo_stack.last().cloned() {
            Some(previous) => {
                self.restore(&previous);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone state.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.restore(&next);
        self.undo_stack.push(next);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Remove every shape and start a fresh history holding the empty state.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.selected = None;
        self.stroke = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.push_undo();
    }

    /// Remove every shape and drop both stacks without recording anything.
    pub fn reset(&mut self) {
        self.shapes.clear();
        self.selected = None;
        self.stroke = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    // Serialization

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.state())
    }

    /// Replace size and shapes from a serialized surface. History is left alone.
    pub fn load_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let state: SurfaceState = serde_json::from_str(json)?;
        self.apply_state(state);
        Ok(())
    }

    // Brush and mode

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        if mode == DrawMode::Draw {
            self.selected = None;
        }
        self.mode = mode;
    }

    pub fn brush_color(&self) -> SerializableColor {
        self.brush_color
    }

    pub fn brush_width(&self) -> f64 {
        self.brush_width
    }

    pub fn set_brush_width(&mut self, width: f64) {
        self.brush_width = width.max(1.0);
    }

    /// Set the brush color and recolor the selected shape, if any.
    pub fn apply_color(&mut self, color: SerializableColor) {
        self.brush_color = color;
        let Some(id) = self.selected else { return };
        if let Some(shape) = self.shapes.iter_mut().find(|s| s.id() == id) {
            shape.recolor(color);
            self.push_undo();
        }
    }

    // Freehand drawing

    /// Start a brush stroke. Ignored in select mode.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.mode != DrawMode::Draw {
            return;
        }
        let style = ShapeStyle::stroked(self.brush_color, self.brush_width);
        self.stroke = Some(Freehand::with_brush(point, style));
    }

    pub fn extend_stroke(&mut self, point: Point) {
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.add_point(point);
        }
    }

    /// Finish the current stroke, simplify it and commit it as a shape.
    pub fn end_stroke(&mut self) -> Option<ShapeId> {
        let mut stroke = self.stroke.take()?;
        if stroke.points.is_empty() {
            return None;
        }
        stroke.simplify(STROKE_SIMPLIFY_TOLERANCE);
        let id = stroke.id;
        self.shapes.push(Shape::Freehand(stroke));
        self.push_undo();
        Some(id)
    }

    /// The stroke being drawn right now.
    pub fn active_stroke(&self) -> Option<&Freehand> {
        self.stroke.as_ref()
    }

    // Shapes

    fn add_and_select(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.shapes.push(shape);
        self.mode = DrawMode::Select;
        self.selected = Some(id);
        self.push_undo();
        id
    }

    /// Add a shape as-is and record it.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.shapes.push(shape);
        self.push_undo();
        id
    }

    /// Add the editable placeholder text in the brush color.
    pub fn add_text(&mut self) -> ShapeId {
        let text = Text::new(Point::new(50.0, 50.0), Text::PLACEHOLDER.to_string())
            .with_color(self.brush_color)
            .bold();
        self.add_and_select(Shape::Text(text))
    }

    pub fn add_circle(&mut self) -> ShapeId {
        let circle = Ellipse::circle_at(Point::new(60.0, 60.0), 30.0)
            .with_style(ShapeStyle::stroked(self.brush_color, 2.0));
        self.add_and_select(Shape::Ellipse(circle))
    }

    pub fn add_rect(&mut self) -> ShapeId {
        let rect = Rectangle::new(Point::new(60.0, 60.0), 100.0, 60.0)
            .with_style(ShapeStyle::stroked(self.brush_color, 2.0));
        self.add_and_select(Shape::Rectangle(rect))
    }

    pub fn add_arrow(&mut self) -> ShapeId {
        let arrow = Arrow::new(Point::new(50.0, 100.0), Point::new(150.0, 100.0))
            .with_style(ShapeStyle::stroked(self.brush_color, 2.0));
        self.add_and_select(Shape::Arrow(arrow))
    }

    /// Replace the content of a text shape.
    pub fn edit_text(&mut self, id: ShapeId, content: &str) -> bool {
        let Some(Shape::Text(text)) = self.shapes.iter_mut().find(|s| s.id() == id) else {
            return false;
        };
        text.content = content.to_string();
        self.push_undo();
        true
    }

    // Selection

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    /// Select a shape by id. Returns false for unknown ids.
    pub fn select(&mut self, id: ShapeId) -> bool {
        if self.get_shape(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// Select the topmost shape under `point`.
    pub fn select_at(&mut self, point: Point) -> Option<ShapeId> {
        self.selected = self
            .shapes
            .iter()
            .rev()
            .find(|s| s.hit_test(point, PICK_TOLERANCE))
            .map(Shape::id);
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Move, scale or otherwise transform the selected shape.
    pub fn transform_selected(&mut self, affine: Affine) -> bool {
        let Some(id) = self.selected else { return false };
        let Some(shape) = self.shapes.iter_mut().find(|s| s.id() == id) else {
            return false;
        };
        shape.transform(affine);
        self.push_undo();
        true
    }

    pub fn delete_selected(&mut self) -> Option<Shape> {
        let id = self.selected.take()?;
        let index = self.shapes.iter().position(|s| s.id() == id)?;
        let removed = self.shapes.remove(index);
        self.push_undo();
        Some(removed)
    }
}
