//! Table style catalog parsed from styles.xml
//!
//! Only `w:type="table"` styles are kept. Each style contributes a set of
//! conditional formatting regions; the inheritance chain is not merged
//! here but by the [`TableStyleResolver`](crate::docx::TableStyleResolver).

use crate::docx::error::DocxResult;
use crate::docx::reader::XmlParser;
use crate::docx::theme::ThemePalette;
use doc_model::{Border, BorderSide, BorderStyle, Color, TableBorders};
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;

/// Conditional formatting regions of a table style
///
/// Declaration order is the markup order used when writing styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionRegion {
    WholeTable,
    FirstRow,
    LastRow,
    FirstCol,
    LastCol,
    Band1Vert,
    Band2Vert,
    Band1Horz,
    Band2Horz,
    NeCell,
    NwCell,
    SeCell,
    SwCell,
}

impl ConditionRegion {
    pub fn from_xml(value: &str) -> Option<Self> {
        let region = match value {
            "wholeTable" => ConditionRegion::WholeTable,
            "firstRow" => ConditionRegion::FirstRow,
            "lastRow" => ConditionRegion::LastRow,
            "firstCol" => ConditionRegion::FirstCol,
            "lastCol" => ConditionRegion::LastCol,
            "band1Vert" => ConditionRegion::Band1Vert,
            "band2Vert" => ConditionRegion::Band2Vert,
            "band1Horz" => ConditionRegion::Band1Horz,
            "band2Horz" => ConditionRegion::Band2Horz,
            "neCell" => ConditionRegion::NeCell,
            "nwCell" => ConditionRegion::NwCell,
            "seCell" => ConditionRegion::SeCell,
            "swCell" => ConditionRegion::SwCell,
            _ => return None,
        };
        Some(region)
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            ConditionRegion::WholeTable => "wholeTable",
            ConditionRegion::FirstRow => "firstRow",
            ConditionRegion::LastRow => "lastRow",
            ConditionRegion::FirstCol => "firstCol",
            ConditionRegion::LastCol => "lastCol",
            ConditionRegion::Band1Vert => "band1Vert",
            ConditionRegion::Band2Vert => "band2Vert",
            ConditionRegion::Band1Horz => "band1Horz",
            ConditionRegion::Band2Horz => "band2Horz",
            ConditionRegion::NeCell => "neCell",
            ConditionRegion::NwCell => "nwCell",
            ConditionRegion::SeCell => "seCell",
            ConditionRegion::SwCell => "swCell",
        }
    }
}

/// Formatting a table style applies to one region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub cell_shading: Option<Color>,
    pub text_color: Option<Color>,
    pub bold: Option<bool>,
    pub borders: TableBorders,
}

impl Condition {
    pub fn is_empty(&self) -> bool {
        *self == Condition::default()
    }

    /// Take every field from `other` that is unset here
    pub fn merge_from(&mut self, other: &Condition) {
        self.cell_shading = self.cell_shading.or(other.cell_shading);
        self.text_color = self.text_color.or(other.text_color);
        self.bold = self.bold.or(other.bold);
        self.borders.fill_missing(&other.borders);
    }

    /// Overwrite with every field `other` defines
    pub fn overlay(&mut self, other: &Condition) {
        let mut merged = other.clone();
        merged.merge_from(self);
        *self = merged;
    }
}

/// One table style definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableStyleDefinition {
    pub style_id: String,
    pub name: Option<String>,
    pub based_on: Option<String>,
    pub conditions: BTreeMap<ConditionRegion, Condition>,
}

impl TableStyleDefinition {
    pub fn new(style_id: impl Into<String>) -> Self {
        Self {
            style_id: style_id.into(),
            ..Default::default()
        }
    }

    pub fn based_on(mut self, parent: impl Into<String>) -> Self {
        self.based_on = Some(parent.into());
        self
    }

    pub fn with_condition(mut self, region: ConditionRegion, condition: Condition) -> Self {
        self.conditions.insert(region, condition);
        self
    }

    pub fn condition(&self, region: ConditionRegion) -> Option<&Condition> {
        self.conditions.get(&region)
    }

    fn condition_mut(&mut self, region: ConditionRegion) -> &mut Condition {
        self.conditions.entry(region).or_default()
    }
}

/// All table styles of a document, keyed by style id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableStyleCatalog {
    styles: BTreeMap<String, TableStyleDefinition>,
}

/// Which property group of a style the parser is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyGroup {
    None,
    Run,
    Table,
    Cell,
}

impl TableStyleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse styles.xml, resolving theme colors through `theme`
    pub fn parse(content: &str, theme: &ThemePalette) -> DocxResult<Self> {
        let mut catalog = Self::new();
        let mut reader = XmlParser::from_string_trimmed(content);
        let mut buf = Vec::new();

        let mut current: Option<TableStyleDefinition> = None;
        let mut region = ConditionRegion::WholeTable;
        let mut group = PropertyGroup::None;
        let mut in_borders = false;

        loop {
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => return Err(XmlParser::markup_error(&reader, "styles", e)),
            };
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_start = matches!(event, Event::Start(_));
                    let name = e.local_name();
                    let name = name.as_ref();

                    if name == b"style" {
                        let is_table = XmlParser::get_attribute(e, "type").as_deref() == Some("table");
                        current = match (is_table, XmlParser::get_attribute(e, "styleId")) {
                            (true, Some(id)) if is_start => Some(TableStyleDefinition::new(id)),
                            _ => None,
                        };
                        region = ConditionRegion::WholeTable;
                        group = PropertyGroup::None;
                    } else if let Some(style) = current.as_mut() {
                        match name {
                            b"name" => style.name = XmlParser::val(e),
                            b"basedOn" => style.based_on = XmlParser::val(e),
                            b"tblStylePr" if is_start => {
                                if let Some(r) = XmlParser::get_attribute(e, "type")
                                    .as_deref()
                                    .and_then(ConditionRegion::from_xml)
                                {
                                    region = r;
                                }
                            }
                            b"rPr" if is_start => group = PropertyGroup::Run,
                            b"tblPr" if is_start => group = PropertyGroup::Table,
                            b"tcPr" if is_start => group = PropertyGroup::Cell,
                            b"tblBorders" | b"tcBorders" if is_start => in_borders = true,
                            _ => {
                                // uiPriority, tblInd, tblCellMar and the like define no region
                                let mut parsed = Condition::default();
                                apply_property(&mut parsed, group, in_borders, name, e, theme);
                                if !parsed.is_empty() {
                                    style.condition_mut(region).overlay(&parsed);
                                }
                            }
                        }
                    }
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"style" => {
                        if let Some(style) = current.take() {
                            catalog.insert(style);
                        }
                    }
                    b"tblStylePr" => region = ConditionRegion::WholeTable,
                    b"rPr" | b"tblPr" | b"tcPr" => group = PropertyGroup::None,
                    b"tblBorders" | b"tcBorders" => in_borders = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        tracing::debug!(count = catalog.len(), "table styles parsed");
        Ok(catalog)
    }

    pub fn insert(&mut self, style: TableStyleDefinition) {
        self.styles.insert(style.style_id.clone(), style);
    }

    pub fn get(&self, style_id: &str) -> Option<&TableStyleDefinition> {
        self.styles.get(style_id)
    }

    pub fn contains(&self, style_id: &str) -> bool {
        self.styles.contains_key(style_id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableStyleDefinition> {
        self.styles.values()
    }
}

fn apply_property(
    condition: &mut Condition,
    group: PropertyGroup,
    in_borders: bool,
    name: &[u8],
    e: &BytesStart,
    theme: &ThemePalette,
) {
    match group {
        PropertyGroup::Run => match name {
            b"b" => {
                condition.bold = Some(XmlParser::parse_toggle(XmlParser::val(e).as_deref()));
            }
            b"color" => condition.text_color = parse_color(e, theme),
            _ => {}
        },
        PropertyGroup::Table | PropertyGroup::Cell => {
            if in_borders {
                if let Some((side, border)) = parse_border(e, theme) {
                    condition.borders.set(side, border);
                }
            } else if name == b"shd" {
                if let Some(fill) = parse_shading(e, theme) {
                    condition.cell_shading = Some(fill);
                }
            }
        }
        PropertyGroup::None => {}
    }
}

/// `w:color` with its theme attribute group
pub(crate) fn parse_color(e: &BytesStart, theme: &ThemePalette) -> Option<Color> {
    theme.resolve_attributes(
        XmlParser::val(e).as_deref(),
        XmlParser::get_attribute(e, "themeColor").as_deref(),
        XmlParser::get_attribute(e, "themeTint").as_deref(),
        XmlParser::get_attribute(e, "themeShade").as_deref(),
    )
}

/// Fill color of a `w:shd` element
pub(crate) fn parse_shading(e: &BytesStart, theme: &ThemePalette) -> Option<Color> {
    theme.resolve_attributes(
        XmlParser::get_attribute(e, "fill").as_deref(),
        XmlParser::get_attribute(e, "themeFill").as_deref(),
        XmlParser::get_attribute(e, "themeFillTint").as_deref(),
        XmlParser::get_attribute(e, "themeFillShade").as_deref(),
    )
}

/// A border side element (`w:top`, `w:insideH`, ...) inside a borders group
pub(crate) fn parse_border(e: &BytesStart, theme: &ThemePalette) -> Option<(BorderSide, Border)> {
    let side = BorderSide::from_xml(&XmlParser::local_name(e))?;
    let style = XmlParser::val(e)
        .map(|v| BorderStyle::from_xml(&v))
        .unwrap_or_default();
    let width = XmlParser::get_attribute(e, "sz")
        .and_then(|v| XmlParser::parse_eighth_points(&v))
        .unwrap_or(0.5);
    let color = parse_color(e, theme);

    let border = if style == BorderStyle::None {
        Border::none()
    } else {
        Border { style, width, color }
    };
    Some((side, border))
}
