//! Paragraph - a block of runs with paragraph-level formatting

use crate::{Borders, Color, Run};
use serde::{Deserialize, Serialize};

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse a `w:jc` value
    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" | "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

/// How a line spacing value is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineRule {
    /// Proportional: 12pt is single spacing
    #[default]
    Auto,
    Exact,
    AtLeast,
}

impl LineRule {
    pub fn from_xml(value: &str) -> Self {
        match value {
            "exact" => LineRule::Exact,
            "atLeast" => LineRule::AtLeast,
            _ => LineRule::Auto,
        }
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            LineRule::Auto => "auto",
            LineRule::Exact => "exact",
            LineRule::AtLeast => "atLeast",
        }
    }
}

/// Line spacing in points together with its rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSpacing {
    pub value: f32,
    pub rule: LineRule,
}

impl LineSpacing {
    /// Multiple of single spacing (1.0 = single, 2.0 = double)
    pub fn multiple(lines: f32) -> Self {
        Self {
            value: lines * 12.0,
            rule: LineRule::Auto,
        }
    }

    pub fn exact(points: f32) -> Self {
        Self {
            value: points,
            rule: LineRule::Exact,
        }
    }
}

/// Paragraph spacing in points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    pub before: Option<f32>,
    pub after: Option<f32>,
    pub line: Option<LineSpacing>,
}

impl Spacing {
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none() && self.line.is_none()
    }
}

/// Paragraph indentation in points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Indent {
    pub left: Option<f32>,
    pub right: Option<f32>,
    /// First line indent (negative for hanging)
    pub first_line: Option<f32>,
}

impl Indent {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.first_line.is_none()
    }
}

/// Kind of list a paragraph belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListKind {
    Bullet,
    Numbered,
}

/// List membership of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    pub kind: ListKind,
    /// Nesting level, 0-based
    pub level: u8,
}

impl ListInfo {
    pub fn bullet(level: u8) -> Self {
        Self {
            kind: ListKind::Bullet,
            level,
        }
    }

    pub fn numbered(level: u8) -> Self {
        Self {
            kind: ListKind::Numbered,
            level,
        }
    }
}

/// Highest heading level the model represents
pub const MAX_HEADING_LEVEL: u8 = 6;

/// A paragraph of runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Option<Alignment>,
    pub spacing: Spacing,
    pub indent: Indent,
    /// Heading level 1-6
    pub heading_level: Option<u8>,
    pub list: Option<ListInfo>,
    pub page_break_before: bool,
    pub background: Option<Color>,
    pub borders: Borders,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph holding a single plain text run
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::text(text)],
            ..Default::default()
        }
    }

    /// A heading paragraph; the level is clamped to 1-6
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        let mut paragraph = Self::with_text(text);
        paragraph.set_heading_level(Some(level));
        paragraph
    }

    pub fn set_heading_level(&mut self, level: Option<u8>) {
        self.heading_level = level.map(|l| l.clamp(1, MAX_HEADING_LEVEL));
    }

    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_list(mut self, list: ListInfo) -> Self {
        self.list = Some(list);
        self
    }

    /// Concatenated plain text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::plain_text).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level.is_some()
    }
}
