//! Shape definitions for the whiteboard.
//!
//! Every shape is an axis-aligned box in world space. Gestures are bounded to
//! that box, so hit testing and resizing work the same way for all kinds.

mod ellipse;
mod rectangle;
mod text;

pub use ellipse::Ellipse;
pub use rectangle::Rectangle;
pub use text::Text;

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum shape width in world units.
pub const MIN_W: f64 = 20.0;
/// Minimum shape height in world units.
pub const MIN_H: f64 = 20.0;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Optional paint properties. Missing values are left to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
    /// Stroke color (None = no stroke).
    #[serde(default)]
    pub stroke_color: Option<SerializableColor>,
    /// Stroke width in world units.
    #[serde(default)]
    pub stroke_width: Option<f64>,
}

/// Discriminant of [`Shape`], used by snapshots and the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Text,
}

/// Partially specified shape. `None` fields are backfilled with per-kind defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeDraft {
    pub position: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub fill_color: Option<SerializableColor>,
    pub stroke_color: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub color: Option<SerializableColor>,
}

impl ShapeDraft {
    /// Draft placed at a world position.
    pub fn at(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Set the requested size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Resolve position and size against defaults, clamping to the minimum size.
    pub(crate) fn frame(&self, position: Point, size: Size) -> (Point, f64, f64) {
        let pick = |value: Option<f64>, fallback: f64| {
            value.filter(|v| v.is_finite()).unwrap_or(fallback)
        };
        let position = self
            .position
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .unwrap_or(position);
        (
            position,
            pick(self.width, size.width).max(MIN_W),
            pick(self.height, size.height).max(MIN_H),
        )
    }

    /// Resolve the style against defaults, field by field.
    pub(crate) fn style(&self, defaults: ShapeStyle) -> ShapeStyle {
        ShapeStyle {
            fill_color: self.fill_color.or(defaults.fill_color),
            stroke_color: self.stroke_color.or(defaults.stroke_color),
            stroke_width: self.stroke_width.or(defaults.stroke_width),
        }
    }
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Replace the bounding box. Callers are responsible for the size floor.
    fn set_bounds(&mut self, bounds: Rect);

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Text content, if any.
    fn text(&self) -> Option<&str>;

    /// Overwrite the text content.
    fn set_text(&mut self, text: Option<String>);

    /// Move the shape by a world-space delta.
    fn translate(&mut self, delta: Vec2) {
        let bounds = self.bounds();
        self.set_bounds(bounds + delta);
    }

    /// Check if a point (in world coordinates) hits this shape's box.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Text(Text),
}

impl Shape {
    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Text(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Text(s) => s,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::Text(_) => ShapeKind::Text,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.as_trait().id()
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.as_trait_mut().set_bounds(bounds);
    }

    pub fn style(&self) -> &ShapeStyle {
        self.as_trait().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.as_trait_mut().style_mut()
    }

    pub fn text(&self) -> Option<&str> {
        self.as_trait().text()
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.as_trait_mut().set_text(text);
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_trait_mut().translate(delta);
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_trait().hit_test(point, tolerance)
    }
}
