//! Border definitions shared by paragraphs, tables and cells

use crate::Color;
use serde::{Deserialize, Serialize};

/// Border line style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderStyle {
    /// Explicitly no border
    None,
    #[default]
    Single,
    Double,
    Dotted,
    Dashed,
    Thick,
}

impl BorderStyle {
    /// Parse a `w:val` border style
    pub fn from_xml(value: &str) -> Self {
        match value {
            "nil" | "none" => BorderStyle::None,
            "double" | "triple" => BorderStyle::Double,
            "dotted" | "dotDash" | "dotDotDash" => BorderStyle::Dotted,
            "dashed" | "dashSmallGap" => BorderStyle::Dashed,
            "thick" => BorderStyle::Thick,
            _ => BorderStyle::Single,
        }
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            BorderStyle::None => "nil",
            BorderStyle::Single => "single",
            BorderStyle::Double => "double",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Thick => "thick",
        }
    }
}

/// A single border edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub style: BorderStyle,
    /// Line width in points
    pub width: f32,
    /// Line color, `None` meaning automatic
    pub color: Option<Color>,
}

impl Default for Border {
    fn default() -> Self {
        Self::single(0.5, Color::BLACK)
    }
}

impl Border {
    /// A single line of the given width and color
    pub fn single(width: f32, color: Color) -> Self {
        Self {
            style: BorderStyle::Single,
            width,
            color: Some(color),
        }
    }

    /// An explicit "no border" edge
    pub fn none() -> Self {
        Self {
            style: BorderStyle::None,
            width: 0.0,
            color: None,
        }
    }
}

/// Which edge of a box a border belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderSide {
    Top,
    Bottom,
    Left,
    Right,
    InsideHorizontal,
    InsideVertical,
}

impl BorderSide {
    /// Map a border element local name (`top`, `start`, `insideH`, ...)
    pub fn from_xml(name: &str) -> Option<Self> {
        match name {
            "top" => Some(BorderSide::Top),
            "bottom" => Some(BorderSide::Bottom),
            "left" | "start" => Some(BorderSide::Left),
            "right" | "end" => Some(BorderSide::Right),
            "insideH" => Some(BorderSide::InsideHorizontal),
            "insideV" => Some(BorderSide::InsideVertical),
            _ => None,
        }
    }
}

/// Four-sided borders for paragraphs and cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Borders {
    pub top: Option<Border>,
    pub bottom: Option<Border>,
    pub left: Option<Border>,
    pub right: Option<Border>,
}

impl Borders {
    /// All four sides the same
    pub fn all(border: Border) -> Self {
        Self {
            top: Some(border),
            bottom: Some(border),
            left: Some(border),
            right: Some(border),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }

    /// Set one side; inside edges are ignored for four-sided borders
    pub fn set(&mut self, side: BorderSide, border: Border) {
        match side {
            BorderSide::Top => self.top = Some(border),
            BorderSide::Bottom => self.bottom = Some(border),
            BorderSide::Left => self.left = Some(border),
            BorderSide::Right => self.right = Some(border),
            BorderSide::InsideHorizontal | BorderSide::InsideVertical => {}
        }
    }

    /// Sides in markup order with their element names
    pub fn sides(&self) -> [(&'static str, Option<Border>); 4] {
        [
            ("top", self.top),
            ("left", self.left),
            ("bottom", self.bottom),
            ("right", self.right),
        ]
    }
}

/// Table-level borders, including the inside grid lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TableBorders {
    pub top: Option<Border>,
    pub bottom: Option<Border>,
    pub left: Option<Border>,
    pub right: Option<Border>,
    pub inside_horizontal: Option<Border>,
    pub inside_vertical: Option<Border>,
}

impl TableBorders {
    /// All six edges the same
    pub fn all(border: Border) -> Self {
        Self {
            top: Some(border),
            bottom: Some(border),
            left: Some(border),
            right: Some(border),
            inside_horizontal: Some(border),
            inside_vertical: Some(border),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sides().iter().all(|(_, b)| b.is_none())
    }

    pub fn set(&mut self, side: BorderSide, border: Border) {
        match side {
            BorderSide::Top => self.top = Some(border),
            BorderSide::Bottom => self.bottom = Some(border),
            BorderSide::Left => self.left = Some(border),
            BorderSide::Right => self.right = Some(border),
            BorderSide::InsideHorizontal => self.inside_horizontal = Some(border),
            BorderSide::InsideVertical => self.inside_vertical = Some(border),
        }
    }

    /// Fill every side that is unset here from `other`
    pub fn fill_missing(&mut self, other: &TableBorders) {
        self.top = self.top.or(other.top);
        self.bottom = self.bottom.or(other.bottom);
        self.left = self.left.or(other.left);
        self.right = self.right.or(other.right);
        self.inside_horizontal = self.inside_horizontal.or(other.inside_horizontal);
        self.inside_vertical = self.inside_vertical.or(other.inside_vertical);
    }

    /// Overwrite sides defined in `other`
    pub fn overlay(&mut self, other: &TableBorders) {
        let mut merged = *other;
        merged.fill_missing(self);
        *self = merged;
    }

    /// Sides in markup order with their element names
    pub fn sides(&self) -> [(&'static str, Option<Border>); 6] {
        [
            ("top", self.top),
            ("left", self.left),
            ("bottom", self.bottom),
            ("right", self.right),
            ("insideH", self.inside_horizontal),
            ("insideV", self.inside_vertical),
        ]
    }

    /// The four outer edges as cell borders
    pub fn outer(&self) -> Borders {
        Borders {
            top: self.top,
            bottom: self.bottom,
            left: self.left,
            right: self.right,
        }
    }
}
