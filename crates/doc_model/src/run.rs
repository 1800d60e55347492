//! Runs - contiguous spans of uniformly formatted inline content

use crate::Color;
use serde::{Deserialize, Serialize};

/// A run: one piece of inline content with one formatting record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// What the run displays
    pub content: RunContent,
    /// Character formatting
    #[serde(default)]
    pub format: RunFormat,
    /// Hyperlink wrapping this run, if any
    #[serde(default)]
    pub hyperlink: Option<Hyperlink>,
}

impl Run {
    /// Create a plain text run
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(RunContent::Text(text.into()))
    }

    /// Create an image run
    pub fn image(image: ImageRef) -> Self {
        Self::with_content(RunContent::Image(image))
    }

    /// Create a field run (page number / total pages)
    pub fn field(kind: FieldKind) -> Self {
        Self::with_content(RunContent::Field(kind))
    }

    fn with_content(content: RunContent) -> Self {
        Self {
            content,
            format: RunFormat::default(),
            hyperlink: None,
        }
    }

    /// Replace the formatting record
    pub fn with_format(mut self, format: RunFormat) -> Self {
        self.format = format;
        self
    }

    /// Wrap the run in a hyperlink
    pub fn with_hyperlink(mut self, hyperlink: Hyperlink) -> Self {
        self.hyperlink = Some(hyperlink);
        self
    }

    /// Text content, if this is a text run
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            RunContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Plain-text rendering used for search and previews
    pub fn plain_text(&self) -> &str {
        match &self.content {
            RunContent::Text(text) => text,
            RunContent::Image(_) => "",
            RunContent::Field(FieldKind::PageNumber) => "#",
            RunContent::Field(FieldKind::TotalPages) => "##",
        }
    }
}

/// Inline content of a run; exactly one kind per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunContent {
    Text(String),
    Image(ImageRef),
    Field(FieldKind),
}

/// Page fields that are recomputed at layout time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    PageNumber,
    TotalPages,
}

impl FieldKind {
    /// Field instruction keyword
    pub fn instruction(&self) -> &'static str {
        match self {
            FieldKind::PageNumber => "PAGE",
            FieldKind::TotalPages => "NUMPAGES",
        }
    }

    /// Recognise a field from its instruction text (`" PAGE \* MERGEFORMAT "`)
    pub fn from_instruction(instruction: &str) -> Option<Self> {
        let keyword = instruction.split_whitespace().next()?;
        match keyword.to_ascii_uppercase().as_str() {
            "PAGE" => Some(FieldKind::PageNumber),
            "NUMPAGES" | "SECTIONPAGES" => Some(FieldKind::TotalPages),
            _ => None,
        }
    }
}

/// An embedded image
///
/// An image whose package target could not be read keeps its extent but has
/// empty `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type, e.g. `image/png`
    pub content_type: String,
    /// Display width in points
    pub width: f32,
    /// Display height in points
    pub height: f32,
    /// Alternative text
    #[serde(default)]
    pub description: Option<String>,
}

impl ImageRef {
    pub fn new(data: Vec<u8>, content_type: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            data,
            content_type: content_type.into(),
            width,
            height,
            description: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// File extension used for the media part
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpeg",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            "image/svg+xml" => "svg",
            "image/x-emf" | "image/emf" => "emf",
            "image/x-wmf" | "image/wmf" => "wmf",
            _ => "png",
        }
    }

    /// MIME type for a media file extension
    pub fn content_type_for_extension(extension: &str) -> &'static str {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tif" | "tiff" => "image/tiff",
            "svg" => "image/svg+xml",
            "emf" => "image/x-emf",
            "wmf" => "image/x-wmf",
            _ => "image/png",
        }
    }
}

/// Hyperlink target of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperlink {
    /// External URL, or `#bookmark` for an in-document anchor
    pub url: String,
    pub tooltip: Option<String>,
}

impl Hyperlink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Anchor name when this link points inside the document
    pub fn anchor(&self) -> Option<&str> {
        self.url.strip_prefix('#')
    }
}

/// Character formatting
///
/// Toggles are tri-state: `None` means "not specified here", which lets a
/// table style fill the gap without overriding an explicit "off".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFormat {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub strikethrough: Option<bool>,
    pub all_caps: Option<bool>,
    pub small_caps: Option<bool>,
    pub underline: Option<UnderlineStyle>,
    pub vertical_align: Option<VerticalAlign>,
    pub font: Option<String>,
    /// Font size in points, half-point resolution
    pub font_size: Option<f32>,
    pub color: Option<Color>,
    pub highlight: Option<Highlight>,
}

impl RunFormat {
    pub fn is_empty(&self) -> bool {
        *self == RunFormat::default()
    }

    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    pub fn is_italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }

    /// Builder helper for bold text
    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Default::default()
        }
    }
}

/// Underline line styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnderlineStyle {
    Single,
    Double,
    Thick,
    Dotted,
    Dash,
    Wave,
    Words,
}

impl UnderlineStyle {
    /// Parse a `w:u w:val`; `none` yields `None`
    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "none" => None,
            "double" => Some(UnderlineStyle::Double),
            "thick" => Some(UnderlineStyle::Thick),
            "dotted" | "dottedHeavy" => Some(UnderlineStyle::Dotted),
            "dash" | "dashLong" | "dashedHeavy" | "dotDash" | "dotDotDash" => Some(UnderlineStyle::Dash),
            "wave" | "wavyDouble" | "wavyHeavy" => Some(UnderlineStyle::Wave),
            "words" => Some(UnderlineStyle::Words),
            _ => Some(UnderlineStyle::Single),
        }
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            UnderlineStyle::Single => "single",
            UnderlineStyle::Double => "double",
            UnderlineStyle::Thick => "thick",
            UnderlineStyle::Dotted => "dotted",
            UnderlineStyle::Dash => "dash",
            UnderlineStyle::Wave => "wave",
            UnderlineStyle::Words => "words",
        }
    }
}

/// Superscript or subscript; the enum makes the two mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlign {
    Superscript,
    Subscript,
}

impl VerticalAlign {
    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "superscript" => Some(VerticalAlign::Superscript),
            "subscript" => Some(VerticalAlign::Subscript),
            _ => None,
        }
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            VerticalAlign::Superscript => "superscript",
            VerticalAlign::Subscript => "subscript",
        }
    }
}

/// The fixed highlight palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Highlight {
    Yellow,
    Green,
    Cyan,
    Magenta,
    Blue,
    Red,
    DarkBlue,
    DarkCyan,
    DarkGreen,
    DarkMagenta,
    DarkRed,
    DarkYellow,
    DarkGray,
    LightGray,
    Black,
    White,
}

impl Highlight {
    /// Parse a `w:highlight w:val`; `none` and unknown names yield `None`
    pub fn from_xml(value: &str) -> Option<Self> {
        let highlight = match value {
            "yellow" => Highlight::Yellow,
            "green" => Highlight::Green,
            "cyan" => Highlight::Cyan,
            "magenta" => Highlight::Magenta,
            "blue" => Highlight::Blue,
            "red" => Highlight::Red,
            "darkBlue" => Highlight::DarkBlue,
            "darkCyan" => Highlight::DarkCyan,
            "darkGreen" => Highlight::DarkGreen,
            "darkMagenta" => Highlight::DarkMagenta,
            "darkRed" => Highlight::DarkRed,
            "darkYellow" => Highlight::DarkYellow,
            "darkGray" | "darkGrey" => Highlight::DarkGray,
            "lightGray" | "lightGrey" => Highlight::LightGray,
            "black" => Highlight::Black,
            "white" => Highlight::White,
            _ => return None,
        };
        Some(highlight)
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            Highlight::Yellow => "yellow",
            Highlight::Green => "green",
            Highlight::Cyan => "cyan",
            Highlight::Magenta => "magenta",
            Highlight::Blue => "blue",
            Highlight::Red => "red",
            Highlight::DarkBlue => "darkBlue",
            Highlight::DarkCyan => "darkCyan",
            Highlight::DarkGreen => "darkGreen",
            Highlight::DarkMagenta => "darkMagenta",
            Highlight::DarkRed => "darkRed",
            Highlight::DarkYellow => "darkYellow",
            Highlight::DarkGray => "darkGray",
            Highlight::LightGray => "lightGray",
            Highlight::Black => "black",
            Highlight::White => "white",
        }
    }

    /// Display color of the highlight
    pub fn color(&self) -> Color {
        match self {
            Highlight::Yellow => Color::rgb(0xFF, 0xFF, 0x00),
            Highlight::Green => Color::rgb(0x00, 0xFF, 0x00),
            Highlight::Cyan => Color::rgb(0x00, 0xFF, 0xFF),
            Highlight::Magenta => Color::rgb(0xFF, 0x00, 0xFF),
            Highlight::Blue => Color::rgb(0x00, 0x00, 0xFF),
            Highlight::Red => Color::rgb(0xFF, 0x00, 0x00),
            Highlight::DarkBlue => Color::rgb(0x00, 0x00, 0x80),
            Highlight::DarkCyan => Color::rgb(0x00, 0x80, 0x80),
            Highlight::DarkGreen => Color::rgb(0x00, 0x80, 0x00),
            Highlight::DarkMagenta => Color::rgb(0x80, 0x00, 0x80),
            Highlight::DarkRed => Color::rgb(0x80, 0x00, 0x00),
            Highlight::DarkYellow => Color::rgb(0x80, 0x80, 0x00),
            Highlight::DarkGray => Color::rgb(0x80, 0x80, 0x80),
            Highlight::LightGray => Color::rgb(0xC0, 0xC0, 0xC0),
            Highlight::Black => Color::BLACK,
            Highlight::White => Color::WHITE,
        }
    }
}

/// Serde adapter storing binary payloads as base64 strings
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_instruction() {
        assert_eq!(FieldKind::from_instruction(" PAGE "), Some(FieldKind::PageNumber));
        assert_eq!(
            FieldKind::from_instruction("NUMPAGES \\* MERGEFORMAT"),
            Some(FieldKind::TotalPages)
        );
        assert_eq!(FieldKind::from_instruction("TOC \\o"), None);
        assert_eq!(FieldKind::from_instruction("   "), None);
    }

    #[test]
    fn test_highlight_round_trip_names() {
        for name in ["yellow", "darkBlue", "lightGray", "white"] {
            assert_eq!(Highlight::from_xml(name).map(|h| h.to_xml()), Some(name));
        }
        assert_eq!(Highlight::from_xml("none"), None);
    }

    #[test]
    fn test_underline_none_is_absent() {
        assert_eq!(UnderlineStyle::from_xml("none"), None);
        assert_eq!(UnderlineStyle::from_xml("single"), Some(UnderlineStyle::Single));
        assert_eq!(UnderlineStyle::from_xml("dottedHeavy"), Some(UnderlineStyle::Dotted));
    }

    #[test]
    fn test_image_extension_mapping() {
        let img = ImageRef::new(vec![1, 2, 3], "image/jpeg", 10.0, 10.0);
        assert_eq!(img.extension(), "jpeg");
        assert_eq!(ImageRef::content_type_for_extension("JPG"), "image/jpeg");
        assert_eq!(ImageRef::content_type_for_extension("png"), "image/png");
    }

    #[test]
    fn test_image_bytes_serialize_as_base64() {
        let run = Run::image(ImageRef::new(vec![0xDE, 0xAD], "image/png", 1.0, 2.0));
        let json = serde_json::to_string(&run).unwrap();
        assert!(json.contains("\"3q0=\""));
        let back: Run = serde_json::from_str(&json).unwrap();
        assert_eq!(back, run);
    }

    #[test]
    fn test_hyperlink_anchor() {
        assert_eq!(Hyperlink::new("#intro").anchor(), Some("intro"));
        assert_eq!(Hyperlink::new("https://example.com").anchor(), None);
    }
}
