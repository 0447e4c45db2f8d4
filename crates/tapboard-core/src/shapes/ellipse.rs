//! Ellipse shape.

use super::{MIN_H, MIN_W, SerializableColor, ShapeDraft, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Ellipse as KurboEllipse, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ellipse inscribed in its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    /// Top-left corner of the bounding box.
    pub position: Point,
    /// Width of the bounding box.
    pub width: f64,
    /// Height of the bounding box.
    pub height: f64,
    /// Optional label.
    #[serde(default)]
    pub text: Option<String>,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Ellipse {
    pub const DEFAULT_POSITION: Point = Point::new(140.0, 140.0);
    pub const DEFAULT_SIZE: Size = Size::new(140.0, 100.0);

    /// Create a new ellipse from its bounding box.
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

    /// Build an ellipse from a partial draft.
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

    /// Toolbar style for new ellipses.
    pub fn default_style() -> ShapeStyle {
        ShapeStyle {
            fill_color: Some(SerializableColor::rgb(0xFC, 0xE4, 0xEC)),
            stroke_color: Some(SerializableColor::rgb(0xD8, 0x1B, 0x60)),
            stroke_width: Some(2.0),
        }
    }

    /// Center point.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Get as a kurbo Ellipse.
    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::from_rect(self.bounds())
    }
}

impl ShapeTrait for Ellipse {
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
    fn test_ellipse_creation() {
        let ellipse = Ellipse::new(Point::new(20.0, 30.0), 60.0, 40.0);
        assert!((ellipse.center().x - 50.0).abs() < f64::EPSILON);
        assert!((ellipse.center().y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_clamps_size() {
        let ellipse = Ellipse::new(Point::ZERO, 60.0, 1.0);
        assert!((ellipse.width - 60.0).abs() < f64::EPSILON);
        assert!((ellipse.height - MIN_H).abs() < f64::EPSILON);
    }

    #[test]
    fn test_kurbo_radii_follow_box() {
        let ellipse = Ellipse::new(Point::ZERO, 60.0, 40.0);
        let radii = ellipse.as_kurbo().radii();
        assert!((radii.x - 30.0).abs() < 1e-9);
        assert!((radii.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_uses_box() {
        // Gestures are bounded to the box, so the corner counts.
        let ellipse = Ellipse::new(Point::ZERO, 60.0, 40.0);
        assert!(ellipse.hit_test(Point::new(1.0, 1.0), 0.0));
        assert!(!ellipse.hit_test(Point::new(61.0, 1.0), 0.0));
    }

    #[test]
    fn test_from_draft_keeps_text() {
        let ellipse = Ellipse::from_draft(&ShapeDraft::default().with_text("hi"));
        assert_eq!(ellipse.text(), Some("hi"));
        assert_eq!(ellipse.position, Ellipse::DEFAULT_POSITION);
    }
}
