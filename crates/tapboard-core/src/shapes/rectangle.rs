//! Rectangle shape.

use super::{MIN_H, MIN_W, SerializableColor, ShapeDraft, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rectangle shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
    /// Optional label.
    #[serde(default)]
    pub text: Option<String>,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Rectangle {
    pub const DEFAULT_POSITION: Point = Point::new(100.0, 100.0);
    pub const DEFAULT_SIZE: Size = Size::new(160.0, 100.0);

    /// Create a new rectangle with default style.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: width.max(MIN_W),
            height: height.max(MIN_H),
            text: None,
            style: Self::default_style(),
        }
    }

    /// Build a rectangle from a partial draft.
    pub fn from_draft(draft: &ShapeDraft) -> Self {
        let (position, width, height) = draft.frame(Self::DEFAULT_POSITION, Self::DEFAULT_SIZE);
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            text: draft.text.clone(),
            style: draft.style(Self::default_style()),
        }
    }

    /// Toolbar style for new rectangles.
    pub fn default_style() -> ShapeStyle {
        ShapeStyle {
            fill_color: Some(SerializableColor::rgb(0xE3, 0xF2, 0xFD)),
            stroke_color: Some(SerializableColor::rgb(0x1E, 0x88, 0xE5)),
            stroke_width: Some(2.0),
        }
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.position = bounds.origin();
        self.width = bounds.width();
        self.height = bounds.height();
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }
}
