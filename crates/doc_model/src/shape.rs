//! Shapes drawn by editing surfaces
//!
//! Shapes are visual primitives that exist only in the tree and its
//! projections. They have no markup representation, so they are wrapped in
//! [`ViewOnly`] wherever they enter the document: the DOCX writer skips them
//! and reports a `shape-not-persisted` fidelity warning.

use crate::Color;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Kinds of shapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Line,
    Arrow,
    Image,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Line => "line",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Image => "image",
        }
    }
}

/// A shape with its styling metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shape {
    pub kind: ShapeKind,
    /// Width in points
    pub width: f32,
    /// Height in points
    pub height: f32,
    /// Border width in points
    pub border_width: Option<f32>,
    pub border_color: Option<Color>,
    pub fill: Option<Color>,
    pub stroke_color: Option<Color>,
    /// Image source (URL or data URI) for image shapes
    pub image_source: Option<String>,
}

impl Shape {
    pub fn new(kind: ShapeKind, width: f32, height: f32) -> Self {
        Self {
            kind,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }
}

/// Marks a value that editing surfaces can display but the package format
/// cannot store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewOnly<T>(T);

impl<T> ViewOnly<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ViewOnly<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for ViewOnly<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_only_is_transparent_in_json() {
        let shape = ViewOnly::new(Shape::new(ShapeKind::Circle, 10.0, 10.0));
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["kind"], "circle");
        let back: ViewOnly<Shape> = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, ShapeKind::Circle);
    }

    #[test]
    fn test_view_only_deref_mut() {
        let mut shape = ViewOnly::new(Shape::default());
        shape.width = 42.0;
        assert_eq!(shape.into_inner().width, 42.0);
    }
}
