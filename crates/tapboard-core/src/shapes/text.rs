//! Text shape.

use super::{SerializableColor, ShapeDraft, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text box. The box is explicit and resizable like any other shape;
/// the renderer wraps text inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Top-left corner of the text box.
    pub position: Point,
    /// Width of the text box.
    pub width: f64,
    /// Height of the text box.
    pub height: f64,
    /// The text content.
    #[serde(default)]
    pub text: Option<String>,
    /// Font size in pixels.
    pub font_size: f64,
    /// Glyph color.
    pub color: SerializableColor,
    /// Style properties (box fill and border).
    pub style: ShapeStyle,
}

impl Text {
    pub const DEFAULT_POSITION: Point = Point::new(120.0, 120.0);
    pub const DEFAULT_SIZE: Size = Size::new(200.0, 60.0);
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const DEFAULT_CONTENT: &'static str = "Text";

    /// Create a new text shape.
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: Self::DEFAULT_SIZE.width,
            height: Self::DEFAULT_SIZE.height,
            text: Some(content.into()),
            font_size: Self::DEFAULT_FONT_SIZE,
            color: SerializableColor::black(),
            style: ShapeStyle::default(),
        }
    }

    /// Build a text shape from a partial draft.
    pub fn from_draft(draft: &ShapeDraft) -> Self {
        let (position, width, height) = draft.frame(Self::DEFAULT_POSITION, Self::DEFAULT_SIZE);
        let font_size = draft
            .font_size
            .filter(|size| size.is_finite() && *size > 0.0)
            .unwrap_or(Self::DEFAULT_FONT_SIZE);
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            text: Some(
                draft
                    .text
                    .clone()
                    .unwrap_or_else(|| Self::DEFAULT_CONTENT.to_string()),
            ),
            font_size,
            color: draft.color.unwrap_or_else(SerializableColor::black),
            style: draft.style(ShapeStyle::default()),
        }
    }

    /// Get the text content, empty when unset.
    pub fn content(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

impl ShapeTrait for Text {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_creation() {
        let text = Text::new(Point::new(100.0, 100.0), "Hello");
        assert_eq!(text.content(), "Hello");
        assert!((text.font_size - Text::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_empty_draft() {
        let text = Text::from_draft(&ShapeDraft::default());
        assert_eq!(text.content(), Text::DEFAULT_CONTENT);
        assert_eq!(text.color, SerializableColor::black());
        assert!(text.style.fill_color.is_none());
        assert!((text.width - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_draft_rejects_bad_font_size() {
        let draft = ShapeDraft {
            font_size: Some(-4.0),
            ..ShapeDraft::default()
        };
        let text = Text::from_draft(&draft);
        assert!((text.font_size - Text::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clearing_text() {
        let mut text = Text::new(Point::ZERO, "x");
        text.set_text(None);
        assert_eq!(text.content(), "");
    }
}
