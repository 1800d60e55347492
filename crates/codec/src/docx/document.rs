//! Markup reader for document.xml, header and footer parts
//!
//! A single forward pass over quick-xml events. Parser state is an explicit
//! stack of [`Context`] values, pushed on start tags and popped on end tags;
//! builders for paragraphs, runs, tables and drawings live inside the
//! context that owns them and are folded into their parent when popped.
//!
//! Elements are matched by local name only. Anything unrecognised becomes a
//! transparent container, so unknown extensions are skipped without losing
//! the content nested inside them.
//!
//! Chart drawings are emitted as placeholders carrying only their
//! relationship id; the reader never opens chart parts itself.

use crate::docx::error::DocxResult;
use crate::docx::fidelity::{FidelityTracker, FidelityWarning};
use crate::docx::numbering::{DefaultNumbering, NumberingResolver};
use crate::docx::reader::{unclosed_error, XmlParser};
use crate::docx::relationships::Relationships;
use crate::docx::styles::{parse_border, parse_color, parse_shading};
use crate::docx::theme::ThemePalette;
use doc_model::{
    Alignment, CellVerticalAlign, ChartFrame, Element, FieldKind, Highlight, Hyperlink, ImageRef,
    Indent, LineRule, LineSpacing, ListInfo, Paragraph, Run, RunContent, RunFormat, Table,
    TableCell, TableLook, TableRow, UnderlineStyle, VerticalAlign,
};
use quick_xml::events::{BytesStart, Event};
use regex_lite::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Image bytes by relationship id
pub type ImageMap = HashMap<String, Vec<u8>>;

/// Content of one parsed part
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPart {
    pub elements: Vec<Element>,
    /// Relationship id of the default header, from the section properties
    pub header_id: Option<String>,
    /// Relationship id of the default footer
    pub footer_id: Option<String>,
}

fn heading_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)^heading([1-6])$").ok())
        .as_ref()
}

/// Heading level encoded in a paragraph style id (`Heading2` -> 2)
pub fn heading_level_for_style(style_id: &str) -> Option<u8> {
    let captures = heading_pattern()?.captures(style_id)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Convert a `w:w`/`w:type` width pair to points
///
/// Percentages (`pct`, fiftieths of a percent or a `%` suffixed value)
/// are taken of `basis`.
fn parse_width(e: &BytesStart, basis: f32) -> Option<f32> {
    let value = XmlParser::get_attribute(e, "w")?;
    let value = value.trim();
    match XmlParser::get_attribute(e, "type").as_deref() {
        Some("pct") => match value.strip_suffix('%') {
            Some(percent) => percent.trim().parse::<f32>().ok().map(|p| basis * p / 100.0),
            None => value.parse::<f32>().ok().map(|v| basis * v / 5000.0),
        },
        Some("auto") | Some("nil") => None,
        _ => XmlParser::parse_twips(value).filter(|w| *w > 0.0),
    }
}

/// A CSS length from a VML `style` attribute, in points
fn parse_css_length(value: &str) -> Option<f32> {
    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f32 = number.trim().parse().ok()?;
    let factor = match unit {
        "pt" => 1.0,
        "in" => 72.0,
        "cm" => 72.0 / 2.54,
        "mm" => 72.0 / 25.4,
        "pc" => 12.0,
        "px" | "" => 0.75,
        _ => return None,
    };
    Some(number * factor)
}

fn vml_size(style: &str) -> (Option<f32>, Option<f32>) {
    let mut width = None;
    let mut height = None;
    for declaration in style.split(';') {
        if let Some((key, value)) = declaration.split_once(':') {
            match key.trim() {
                "width" => width = parse_css_length(value),
                "height" => height = parse_css_length(value),
                _ => {}
            }
        }
    }
    (width, height)
}

fn parse_look(e: &BytesStart) -> TableLook {
    let flag = |name: &str| {
        XmlParser::get_attribute(e, name).map(|v| XmlParser::parse_toggle(Some(&v)))
    };
    let explicit = [
        flag("firstRow"),
        flag("lastRow"),
        flag("firstColumn"),
        flag("lastColumn"),
        flag("noHBand"),
        flag("noVBand"),
    ];

    if explicit.iter().any(Option::is_some) {
        let [first_row, last_row, first_column, last_column, no_h_band, no_v_band] =
            explicit.map(|v| v.unwrap_or(false));
        return TableLook {
            first_row,
            last_row,
            first_column,
            last_column,
            banded_rows: !no_h_band,
            banded_columns: !no_v_band,
        };
    }

    XmlParser::val(e)
        .and_then(|v| u32::from_str_radix(v.trim(), 16).ok())
        .map(TableLook::from_bitmask)
        .unwrap_or_default()
}

fn apply_run_property(format: &mut RunFormat, name: &[u8], e: &BytesStart, theme: &ThemePalette) {
    let toggle = || XmlParser::parse_toggle(XmlParser::val(e).as_deref());
    match name {
        b"b" => format.bold = Some(toggle()),
        b"i" => format.italic = Some(toggle()),
        b"strike" | b"dstrike" => {
            if format.strikethrough != Some(true) {
                format.strikethrough = Some(toggle());
            }
        }
        b"caps" => format.all_caps = Some(toggle()),
        b"smallCaps" => format.small_caps = Some(toggle()),
        b"u" => {
            let value = XmlParser::val(e).unwrap_or_else(|| "single".to_string());
            format.underline = UnderlineStyle::from_xml(&value);
        }
        b"vertAlign" => {
            format.vertical_align = XmlParser::val(e).and_then(|v| VerticalAlign::from_xml(&v));
        }
        b"rFonts" => {
            if let Some(font) = XmlParser::get_attribute(e, "ascii")
                .or_else(|| XmlParser::get_attribute(e, "hAnsi"))
                .or_else(|| XmlParser::get_attribute(e, "cs"))
            {
                format.font = Some(font);
            }
        }
        b"sz" => {
            if let Some(size) = XmlParser::val(e).and_then(|v| XmlParser::parse_half_points(&v)) {
                format.font_size = Some(size);
            }
        }
        b"color" => format.color = parse_color(e, theme),
        b"highlight" => {
            format.highlight = XmlParser::val(e).and_then(|v| Highlight::from_xml(&v));
        }
        _ => {}
    }
}

/// A complex field (`w:fldChar` begin ... end) being read
#[derive(Debug, Default)]
struct ComplexField {
    /// Nesting depth; only the outermost field is interpreted
    depth: u32,
    instruction: String,
    kind: Option<FieldKind>,
    separated: bool,
    /// Formatting of the run holding the begin marker
    format: RunFormat,
}

#[derive(Debug, Default)]
struct ParagraphBuilder {
    paragraph: Paragraph,
    style_id: Option<String>,
    outline_level: Option<u8>,
    charts: Vec<ChartFrame>,
    field: Option<ComplexField>,
}

impl ParagraphBuilder {
    fn has_content(&self) -> bool {
        !self.paragraph.runs.is_empty() || !self.charts.is_empty()
    }

    /// Runs are dropped while reading a field instruction, and while
    /// reading the cached result of a field that becomes a field run
    fn suppresses_runs(&self) -> bool {
        self.field
            .as_ref()
            .is_some_and(|f| !f.separated || f.kind.is_some())
    }

    fn push_field(&mut self, kind: FieldKind, format: RunFormat) {
        self.paragraph.runs.push(Run::field(kind).with_format(format));
    }
}

#[derive(Debug, Default)]
struct RunBuilder {
    format: RunFormat,
    pieces: Vec<RunContent>,
    text: String,
}

impl RunBuilder {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.pieces
                .push(RunContent::Text(std::mem::take(&mut self.text)));
        }
    }

    fn push_image(&mut self, image: ImageRef) {
        self.flush_text();
        self.pieces.push(RunContent::Image(image));
    }

    fn has_content(&self) -> bool {
        !self.text.is_empty() || !self.pieces.is_empty()
    }
}

#[derive(Debug, Default)]
struct TableBuilder {
    table: Table,
    /// Origin `(row, cell index)` of an open vertical merge, by grid column
    merges: HashMap<usize, (usize, usize)>,
}

#[derive(Debug, Default)]
struct RowBuilder {
    row: TableRow,
    /// Next grid column
    column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerticalMerge {
    Restart,
    Continue,
}

#[derive(Debug)]
struct CellBuilder {
    cell: TableCell,
    merge: Option<VerticalMerge>,
}

#[derive(Debug, Default)]
struct DrawingBuilder {
    width: f32,
    height: f32,
    relationship_id: Option<String>,
    is_chart: bool,
    description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BorderTarget {
    Paragraph,
    Table,
    Cell,
}

/// One level of the parser stack
#[derive(Debug)]
enum Context {
    Body,
    Paragraph(Box<ParagraphBuilder>),
    ParagraphProperties,
    Numbering { num_id: Option<u32>, level: u8 },
    Borders(BorderTarget),
    Hyperlink(Option<Hyperlink>),
    SimpleField {
        kind: Option<FieldKind>,
        format: Option<RunFormat>,
    },
    Run(RunBuilder),
    RunProperties,
    Text,
    InstructionText,
    Table(Box<TableBuilder>),
    TableProperties,
    TableGrid,
    Row(RowBuilder),
    RowProperties,
    Cell(Box<CellBuilder>),
    CellProperties,
    Drawing(DrawingBuilder),
    Picture(DrawingBuilder),
    Section,
    /// A table inside a table cell; its structure is flattened
    NestedTable,
    /// Subtree ignored entirely
    Skip,
    /// Transparent element; children are read as if it were absent
    Container,
}

/// What the innermost context is, for dispatching property elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    Skip,
    Paragraph,
    ParagraphProperties,
    Numbering,
    Borders(BorderTarget),
    Run,
    RunProperties,
    Table,
    TableProperties,
    TableGrid,
    Row,
    RowProperties,
    Cell,
    CellProperties,
    Section,
    Other,
}

/// Elements whose whole subtree is ignored
const SKIPPED: &[&[u8]] = &[
    b"txbxContent",
    b"txbx",
    b"textbox",
    b"Fallback",
    b"del",
    b"moveFrom",
    b"delText",
    b"pPrChange",
    b"rPrChange",
    b"tblPrChange",
    b"trPrChange",
    b"tcPrChange",
    b"sectPrChange",
    b"tblGridChange",
];

/// Event-driven reader for WordprocessingML body parts
pub struct MarkupReader<'a> {
    part_name: &'a str,
    relationships: &'a Relationships,
    theme: &'a ThemePalette,
    images: Option<&'a ImageMap>,
    numbering: &'a dyn NumberingResolver,
    nominal_width: f32,
}

impl<'a> MarkupReader<'a> {
    /// Nominal content width used for percentage widths: 6.5in
    pub const DEFAULT_NOMINAL_WIDTH: f32 = 468.0;

    pub fn new(part_name: &'a str, relationships: &'a Relationships, theme: &'a ThemePalette) -> Self {
        Self {
            part_name,
            relationships,
            theme,
            images: None,
            numbering: &DefaultNumbering,
            nominal_width: Self::DEFAULT_NOMINAL_WIDTH,
        }
    }

    /// Image bytes by relationship id; without a map images are read as
    /// empty references and no warnings are raised
    pub fn with_images(mut self, images: &'a ImageMap) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_numbering(mut self, numbering: &'a dyn NumberingResolver) -> Self {
        self.numbering = numbering;
        self
    }

    pub fn with_nominal_width(mut self, width: f32) -> Self {
        self.nominal_width = width;
        self
    }

    /// Parse a part, recording degradations in `fidelity`
    ///
    /// Malformed XML fails the whole part with `InvalidMarkup`.
    pub fn parse(&self, content: &str, fidelity: &mut FidelityTracker) -> DocxResult<ParsedPart> {
        let mut reader = XmlParser::from_string(content);
        let mut session = Session::new(self, fidelity);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let context = session.open(&e);
                    session.stack.push(context);
                }
                Ok(Event::Empty(e)) => {
                    let context = session.open(&e);
                    session.close(context);
                }
                Ok(Event::End(_)) => {
                    if let Some(context) = session.stack.pop() {
                        session.close(context);
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|err| XmlParser::markup_error(&reader, self.part_name, err))?;
                    session.text(&text);
                }
                Ok(Event::CData(t)) => {
                    let text = String::from_utf8_lossy(&t).into_owned();
                    session.text(&text);
                }
                Ok(Event::Eof) => break,
                Err(err) => return Err(XmlParser::markup_error(&reader, self.part_name, err)),
                _ => {}
            }
        }

        if !session.stack.is_empty() {
            return Err(unclosed_error(self.part_name, session.stack.len()));
        }

        tracing::debug!(
            part = self.part_name,
            elements = session.part.elements.len(),
            "part parsed"
        );
        Ok(session.part)
    }
}

/// Mutable state of one parse
struct Session<'r, 'a> {
    reader: &'r MarkupReader<'a>,
    fidelity: &'r mut FidelityTracker,
    stack: Vec<Context>,
    part: ParsedPart,
}

impl<'r, 'a> Session<'r, 'a> {
    fn new(reader: &'r MarkupReader<'a>, fidelity: &'r mut FidelityTracker) -> Self {
        Self {
            reader,
            fidelity,
            stack: Vec::new(),
            part: ParsedPart::default(),
        }
    }

    fn parent(&self) -> Parent {
        match self.stack.last() {
            Some(Context::Skip) => Parent::Skip,
            Some(Context::Paragraph(_)) => Parent::Paragraph,
            Some(Context::ParagraphProperties) => Parent::ParagraphProperties,
            Some(Context::Numbering { .. }) => Parent::Numbering,
            Some(Context::Borders(target)) => Parent::Borders(*target),
            Some(Context::Run(_)) => Parent::Run,
            Some(Context::RunProperties) => Parent::RunProperties,
            Some(Context::Table(_)) => Parent::Table,
            Some(Context::TableProperties) => Parent::TableProperties,
            Some(Context::TableGrid) => Parent::TableGrid,
            Some(Context::Row(_)) => Parent::Row,
            Some(Context::RowProperties) => Parent::RowProperties,
            Some(Context::Cell(_)) => Parent::Cell,
            Some(Context::CellProperties) => Parent::CellProperties,
            Some(Context::Section) => Parent::Section,
            _ => Parent::Other,
        }
    }

    fn paragraph_mut(&mut self) -> Option<&mut ParagraphBuilder> {
        self.stack.iter_mut().rev().find_map(|c| match c {
            Context::Paragraph(p) => Some(&mut **p),
            _ => None,
        })
    }

    fn run_mut(&mut self) -> Option<&mut RunBuilder> {
        self.stack.iter_mut().rev().find_map(|c| match c {
            Context::Run(r) => Some(r),
            _ => None,
        })
    }

    fn table_mut(&mut self) -> Option<&mut TableBuilder> {
        self.stack.iter_mut().rev().find_map(|c| match c {
            Context::Table(t) => Some(&mut **t),
            _ => None,
        })
    }

    fn row_mut(&mut self) -> Option<&mut RowBuilder> {
        self.stack.iter_mut().rev().find_map(|c| match c {
            Context::Row(r) => Some(r),
            _ => None,
        })
    }

    fn cell_mut(&mut self) -> Option<&mut CellBuilder> {
        self.stack.iter_mut().rev().find_map(|c| match c {
            Context::Cell(cell) => Some(&mut **cell),
            _ => None,
        })
    }

    fn drawing_mut(&mut self) -> Option<&mut DrawingBuilder> {
        self.stack.iter_mut().rev().find_map(|c| match c {
            Context::Drawing(d) | Context::Picture(d) => Some(d),
            _ => None,
        })
    }

    fn in_picture(&self) -> bool {
        self.stack.iter().any(|c| matches!(c, Context::Picture(_)))
    }

    fn in_drawing(&self) -> bool {
        self.stack.iter().any(|c| matches!(c, Context::Drawing(_)))
    }

    fn in_table(&self) -> bool {
        self.stack
            .iter()
            .any(|c| matches!(c, Context::Table(_) | Context::NestedTable))
    }

    fn in_nested_table(&self) -> bool {
        self.stack.iter().any(|c| matches!(c, Context::NestedTable))
    }

    fn in_cell(&self) -> bool {
        self.stack.iter().any(|c| matches!(c, Context::Cell(_)))
    }

    /// Decide the context for a start tag, applying leaf properties on the way
    fn open(&mut self, e: &BytesStart) -> Context {
        let name = e.local_name();
        let name = name.as_ref();
        let parent = self.parent();

        if parent == Parent::Skip || SKIPPED.iter().any(|s| *s == name) {
            return Context::Skip;
        }

        if self.in_drawing() || self.in_picture() {
            self.open_drawing_child(name, e);
            return Context::Container;
        }

        match parent {
            Parent::ParagraphProperties => return self.open_paragraph_property(name, e),
            Parent::Numbering => {
                self.apply_numbering(name, e);
                return Context::Container;
            }
            Parent::Borders(target) => {
                self.apply_border(target, e);
                return Context::Container;
            }
            Parent::RunProperties => {
                let theme = self.reader.theme;
                if let Some(run) = self.run_mut() {
                    apply_run_property(&mut run.format, name, e, theme);
                }
                return Context::Container;
            }
            Parent::TableProperties => return self.open_table_property(name, e),
            Parent::TableGrid => {
                if name == b"gridCol" {
                    let width = XmlParser::get_attribute(e, "w")
                        .and_then(|v| XmlParser::parse_twips(&v))
                        .unwrap_or(0.0);
                    if let Some(table) = self.table_mut() {
                        table.table.grid.push(width);
                    }
                }
                return Context::Container;
            }
            Parent::RowProperties => {
                self.apply_row_property(name, e);
                return Context::Container;
            }
            Parent::CellProperties => return self.open_cell_property(name, e),
            Parent::Section => {
                self.apply_section_reference(name, e);
                return Context::Container;
            }
            Parent::Run => {
                if let Some(context) = self.open_run_child(name, e) {
                    return context;
                }
            }
            _ => {}
        }

        match name {
            b"body" => Context::Body,
            b"p" => Context::Paragraph(Box::default()),
            b"pPr" if parent == Parent::Paragraph => Context::ParagraphProperties,
            b"r" => Context::Run(RunBuilder::default()),
            b"hyperlink" => Context::Hyperlink(self.hyperlink_target(e)),
            b"fldSimple" => Context::SimpleField {
                kind: XmlParser::get_attribute(e, "instr")
                    .and_then(|instr| FieldKind::from_instruction(&instr)),
                format: None,
            },
            b"tbl" if self.in_table() => {
                self.fidelity.add_warning(FidelityWarning::nested_table());
                Context::NestedTable
            }
            b"tbl" => Context::Table(Box::default()),
            _ if self.in_nested_table() => Context::Container,
            b"tblPr" if parent == Parent::Table => Context::TableProperties,
            b"tblGrid" if parent == Parent::Table => Context::TableGrid,
            b"tr" if parent == Parent::Table => Context::Row(RowBuilder::default()),
            b"trPr" if parent == Parent::Row => Context::RowProperties,
            b"tc" if parent == Parent::Row => Context::Cell(Box::new(CellBuilder {
                cell: TableCell {
                    paragraphs: Vec::new(),
                    ..Default::default()
                },
                merge: None,
            })),
            b"tcPr" if parent == Parent::Cell => Context::CellProperties,
            b"sectPr" => Context::Section,
            b"rPr" => Context::Skip,
            _ => Context::Container,
        }
    }

    fn open_run_child(&mut self, name: &[u8], e: &BytesStart) -> Option<Context> {
        let context = match name {
            b"rPr" => Context::RunProperties,
            b"t" => Context::Text,
            b"instrText" => Context::InstructionText,
            b"tab" => {
                self.push_run_text("\t");
                Context::Container
            }
            b"cr" => {
                self.push_run_text("\n");
                Context::Container
            }
            b"br" => {
                self.line_break(XmlParser::get_attribute(e, "type").as_deref());
                Context::Container
            }
            b"fldChar" => {
                self.field_char(XmlParser::get_attribute(e, "fldCharType").as_deref());
                Context::Container
            }
            b"drawing" => Context::Drawing(DrawingBuilder::default()),
            b"pict" => Context::Picture(DrawingBuilder::default()),
            _ => return None,
        };
        Some(context)
    }

    fn open_drawing_child(&mut self, name: &[u8], e: &BytesStart) {
        let Some(drawing) = self.drawing_mut() else {
            return;
        };
        match name {
            b"extent" => {
                if let Some(cx) = XmlParser::get_attribute(e, "cx").and_then(|v| XmlParser::parse_emu(&v)) {
                    drawing.width = cx;
                }
                if let Some(cy) = XmlParser::get_attribute(e, "cy").and_then(|v| XmlParser::parse_emu(&v)) {
                    drawing.height = cy;
                }
            }
            b"docPr" => {
                drawing.description = XmlParser::get_attribute(e, "descr")
                    .or_else(|| XmlParser::get_attribute(e, "title"))
                    .filter(|d| !d.is_empty());
            }
            b"graphicData" => {
                drawing.is_chart = XmlParser::get_attribute(e, "uri")
                    .is_some_and(|uri| uri.contains("chart"));
            }
            b"blip" => {
                if drawing.relationship_id.is_none() {
                    drawing.relationship_id = XmlParser::get_attribute(e, "embed")
                        .or_else(|| XmlParser::get_attribute(e, "link"));
                }
            }
            b"chart" => {
                drawing.relationship_id = XmlParser::get_attribute(e, "id");
            }
            b"shape" | b"rect" => {
                if let Some(style) = XmlParser::get_attribute(e, "style") {
                    let (width, height) = vml_size(&style);
                    drawing.width = width.unwrap_or(drawing.width);
                    drawing.height = height.unwrap_or(drawing.height);
                }
            }
            b"imagedata" => {
                if drawing.relationship_id.is_none() {
                    drawing.relationship_id = XmlParser::get_attribute(e, "id");
                }
                if drawing.description.is_none() {
                    drawing.description = XmlParser::get_attribute(e, "title").filter(|t| !t.is_empty());
                }
            }
            _ => {}
        }
    }

    fn open_paragraph_property(&mut self, name: &[u8], e: &BytesStart) -> Context {
        match name {
            b"numPr" => {
                return Context::Numbering {
                    num_id: None,
                    level: 0,
                }
            }
            b"pBdr" => return Context::Borders(BorderTarget::Paragraph),
            b"rPr" => return Context::Skip,
            b"sectPr" => return Context::Section,
            _ => {}
        }

        let theme = self.reader.theme;
        let Some(builder) = self.paragraph_mut() else {
            return Context::Container;
        };
        let paragraph = &mut builder.paragraph;
        match name {
            b"pStyle" => builder.style_id = XmlParser::val(e),
            b"jc" => paragraph.alignment = XmlParser::val(e).and_then(|v| Alignment::from_xml(&v)),
            b"spacing" => {
                let twips = |attr: &str| {
                    XmlParser::get_attribute(e, attr).and_then(|v| XmlParser::parse_twips(&v))
                };
                if let Some(before) = twips("before") {
                    paragraph.spacing.before = Some(before);
                }
                if let Some(after) = twips("after") {
                    paragraph.spacing.after = Some(after);
                }
                if let Some(line) = twips("line") {
                    let rule = XmlParser::get_attribute(e, "lineRule")
                        .map(|r| LineRule::from_xml(&r))
                        .unwrap_or_default();
                    paragraph.spacing.line = Some(LineSpacing { value: line, rule });
                }
            }
            b"ind" => {
                let twips = |attrs: &[&str]| {
                    attrs
                        .iter()
                        .find_map(|a| XmlParser::get_attribute(e, a))
                        .and_then(|v| XmlParser::parse_twips(&v))
                };
                let indent: &mut Indent = &mut paragraph.indent;
                if let Some(left) = twips(&["left", "start"]) {
                    indent.left = Some(left);
                }
                if let Some(right) = twips(&["right", "end"]) {
                    indent.right = Some(right);
                }
                if let Some(first) = twips(&["firstLine"]) {
                    indent.first_line = Some(first);
                }
                if let Some(hanging) = twips(&["hanging"]) {
                    indent.first_line = Some(-hanging);
                }
            }
            b"pageBreakBefore" => {
                paragraph.page_break_before = XmlParser::parse_toggle(XmlParser::val(e).as_deref());
            }
            b"shd" => paragraph.background = parse_shading(e, theme),
            b"outlineLvl" => builder.outline_level = XmlParser::val(e).and_then(|v| v.parse().ok()),
            _ => {}
        }
        Context::Container
    }

    fn apply_numbering(&mut self, name: &[u8], e: &BytesStart) {
        let value = XmlParser::val(e).and_then(|v| v.trim().parse::<u32>().ok());
        if let Some(Context::Numbering { num_id, level }) = self.stack.last_mut() {
            match name {
                b"ilvl" => *level = value.map_or(0, |v| v.min(8) as u8),
                b"numId" => *num_id = value,
                _ => {}
            }
        }
    }

    fn apply_border(&mut self, target: BorderTarget, e: &BytesStart) {
        let Some((side, border)) = parse_border(e, self.reader.theme) else {
            return;
        };
        match target {
            BorderTarget::Paragraph => {
                if let Some(p) = self.paragraph_mut() {
                    p.paragraph.borders.set(side, border);
                }
            }
            BorderTarget::Table => {
                if let Some(t) = self.table_mut() {
                    t.table.borders.set(side, border);
                }
            }
            BorderTarget::Cell => {
                if let Some(c) = self.cell_mut() {
                    c.cell.borders.set(side, border);
                }
            }
        }
    }

    fn open_table_property(&mut self, name: &[u8], e: &BytesStart) -> Context {
        if name == b"tblBorders" {
            return Context::Borders(BorderTarget::Table);
        }
        let nominal = self.reader.nominal_width;
        let Some(builder) = self.table_mut() else {
            return Context::Container;
        };
        let table = &mut builder.table;
        match name {
            b"tblStyle" => table.style_id = XmlParser::val(e),
            b"tblW" => table.width = parse_width(e, nominal),
            b"jc" => table.alignment = XmlParser::val(e).and_then(|v| Alignment::from_xml(&v)),
            b"tblLook" => table.look = parse_look(e),
            b"tblCaption" => table.caption = XmlParser::val(e),
            b"tblDescription" => table.summary = XmlParser::val(e),
            _ => {}
        }
        Context::Container
    }

    fn apply_row_property(&mut self, name: &[u8], e: &BytesStart) {
        let Some(builder) = self.row_mut() else {
            return;
        };
        match name {
            b"tblHeader" => {
                builder.row.is_header = XmlParser::parse_toggle(XmlParser::val(e).as_deref());
            }
            b"trHeight" => {
                builder.row.height = XmlParser::val(e).and_then(|v| XmlParser::parse_twips(&v));
            }
            b"gridBefore" => {
                let skipped = XmlParser::val(e).and_then(|v| v.trim().parse::<usize>().ok());
                builder.column += skipped.unwrap_or(0);
            }
            _ => {}
        }
    }

    fn open_cell_property(&mut self, name: &[u8], e: &BytesStart) -> Context {
        if name == b"tcBorders" {
            return Context::Borders(BorderTarget::Cell);
        }
        let theme = self.reader.theme;
        let basis = self
            .table_mut()
            .and_then(|t| t.table.width)
            .unwrap_or(self.reader.nominal_width);
        let Some(builder) = self.cell_mut() else {
            return Context::Container;
        };
        let cell = &mut builder.cell;
        match name {
            b"gridSpan" => {
                cell.column_span = XmlParser::val(e)
                    .and_then(|v| v.trim().parse::<u32>().ok())
                    .unwrap_or(1)
                    .max(1);
            }
            b"vMerge" => {
                builder.merge = match XmlParser::val(e).as_deref() {
                    Some("restart") => Some(VerticalMerge::Restart),
                    _ => Some(VerticalMerge::Continue),
                };
            }
            b"tcW" => cell.width = parse_width(e, basis),
            b"shd" => cell.background = parse_shading(e, theme),
            b"vAlign" => {
                cell.vertical_align = XmlParser::val(e).and_then(|v| CellVerticalAlign::from_xml(&v));
            }
            _ => {}
        }
        Context::Container
    }

    fn apply_section_reference(&mut self, name: &[u8], e: &BytesStart) {
        let slot = match name {
            b"headerReference" => &mut self.part.header_id,
            b"footerReference" => &mut self.part.footer_id,
            _ => return,
        };
        let Some(id) = XmlParser::get_attribute(e, "id") else {
            return;
        };
        let is_default = XmlParser::get_attribute(e, "type")
            .map_or(true, |t| t == "default");
        if is_default || slot.is_none() {
            *slot = Some(id);
        }
    }

    fn hyperlink_target(&self, e: &BytesStart) -> Option<Hyperlink> {
        let hyperlink = if let Some(id) = XmlParser::get_attribute(e, "id") {
            Hyperlink::new(self.reader.relationships.get_target(&id)?)
        } else {
            Hyperlink::new(format!("#{}", XmlParser::get_attribute(e, "anchor")?))
        };
        Some(match XmlParser::get_attribute(e, "tooltip") {
            Some(tooltip) => hyperlink.with_tooltip(tooltip),
            None => hyperlink,
        })
    }

    fn push_run_text(&mut self, text: &str) {
        if let Some(run) = self.run_mut() {
            run.text.push_str(text);
        }
    }

    fn line_break(&mut self, kind: Option<&str>) {
        if kind == Some("page") {
            let run_empty = self.run_mut().map_or(true, |r| !r.has_content());
            if let Some(paragraph) = self.paragraph_mut() {
                if run_empty && !paragraph.has_content() {
                    paragraph.paragraph.page_break_before = true;
                    return;
                }
            }
        }
        self.push_run_text("\n");
    }

    fn field_char(&mut self, kind: Option<&str>) {
        let format = self.run_mut().map(|r| r.format.clone()).unwrap_or_default();
        let Some(paragraph) = self.paragraph_mut() else {
            return;
        };
        match kind {
            Some("begin") => match paragraph.field.as_mut() {
                Some(field) => field.depth += 1,
                None => {
                    paragraph.field = Some(ComplexField {
                        depth: 1,
                        format,
                        ..Default::default()
                    })
                }
            },
            Some("separate") => {
                let Some(field) = paragraph.field.as_mut() else {
                    return;
                };
                if field.depth == 1 && !field.separated {
                    field.separated = true;
                    field.kind = FieldKind::from_instruction(&field.instruction);
                    if let Some(kind) = field.kind {
                        let format = field.format.clone();
                        paragraph.push_field(kind, format);
                    }
                }
            }
            Some("end") => {
                let Some(field) = paragraph.field.as_mut() else {
                    return;
                };
                if field.depth > 1 {
                    field.depth -= 1;
                    return;
                }
                let pending = if field.separated {
                    None
                } else {
                    FieldKind::from_instruction(&field.instruction)
                };
                if let Some(field) = paragraph.field.take() {
                    if let Some(kind) = pending {
                        paragraph.push_field(kind, field.format);
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        match self.stack.last() {
            Some(Context::Text) => self.push_run_text(text),
            Some(Context::InstructionText) => {
                if let Some(field) = self.paragraph_mut().and_then(|p| p.field.as_mut()) {
                    if field.depth == 1 {
                        field.instruction.push_str(text);
                    }
                }
            }
            _ => {}
        }
    }

    /// Fold a popped context into its parent
    fn close(&mut self, context: Context) {
        match context {
            Context::Paragraph(builder) => self.finish_paragraph(*builder),
            Context::Numbering { num_id, level } => {
                let resolver = self.reader.numbering;
                if let (Some(num_id), Some(p)) = (num_id.filter(|id| *id > 0), self.paragraph_mut()) {
                    p.paragraph.list = Some(ListInfo {
                        kind: resolver.list_kind(num_id, level),
                        level,
                    });
                }
            }
            Context::SimpleField {
                kind: Some(kind),
                format,
            } => {
                if let Some(p) = self.paragraph_mut() {
                    p.push_field(kind, format.unwrap_or_default());
                }
            }
            Context::Run(run) => self.finish_run(run),
            Context::Table(builder) => {
                self.part.elements.push(Element::Table(builder.table));
            }
            Context::Row(builder) => {
                if let Some(table) = self.table_mut() {
                    table.table.rows.push(builder.row);
                }
            }
            Context::Cell(builder) => self.finish_cell(*builder),
            Context::Drawing(drawing) | Context::Picture(drawing) => self.finish_drawing(drawing),
            _ => {}
        }
    }

    fn finish_paragraph(&mut self, builder: ParagraphBuilder) {
        let ParagraphBuilder {
            mut paragraph,
            style_id,
            outline_level,
            charts,
            ..
        } = builder;

        let level = style_id
            .as_deref()
            .and_then(heading_level_for_style)
            .or_else(|| outline_level.filter(|l| *l <= 5).map(|l| l + 1));
        paragraph.set_heading_level(level);

        if let Some(cell) = self.cell_mut() {
            cell.cell.paragraphs.push(paragraph);
            return;
        }

        let chart_only = paragraph.runs.is_empty() && !charts.is_empty();
        if !chart_only {
            self.part.elements.push(Element::Paragraph(paragraph));
        }
        self.part
            .elements
            .extend(charts.into_iter().map(Element::Chart));
    }

    fn finish_run(&mut self, mut run: RunBuilder) {
        run.flush_text();

        let simple_field = self.stack.iter_mut().rev().find_map(|c| match c {
            Context::SimpleField { kind: Some(_), format } => Some(format),
            _ => None,
        });
        if let Some(format) = simple_field {
            if format.is_none() {
                *format = Some(run.format);
            }
            return;
        }

        let hyperlink = self.stack.iter().rev().find_map(|c| match c {
            Context::Hyperlink(link) => Some(link.clone()),
            _ => None,
        });
        let hyperlink = hyperlink.flatten();

        let Some(paragraph) = self.paragraph_mut() else {
            return;
        };
        if paragraph.suppresses_runs() {
            return;
        }
        for content in run.pieces {
            paragraph.paragraph.runs.push(Run {
                content,
                format: run.format.clone(),
                hyperlink: hyperlink.clone(),
            });
        }
    }

    fn finish_cell(&mut self, builder: CellBuilder) {
        let CellBuilder { mut cell, merge } = builder;
        if cell.paragraphs.is_empty() {
            cell.paragraphs.push(Paragraph::new());
        }
        let span = cell.column_span.max(1) as usize;

        let Some(row) = self.row_mut() else {
            return;
        };
        let column = row.column;
        row.column += span;

        if merge == Some(VerticalMerge::Continue) {
            if let Some(table) = self.table_mut() {
                if let Some(&(r, i)) = table.merges.get(&column) {
                    if let Some(origin) = table.table.cell_mut(r, i) {
                        origin.row_span += 1;
                    }
                }
            }
            return;
        }

        let index = row.row.cells.len();
        row.row.cells.push(cell);

        if let Some(table) = self.table_mut() {
            let row_index = table.table.rows.len();
            table.merges.retain(|c, _| *c < column || *c >= column + span);
            if merge == Some(VerticalMerge::Restart) {
                table.merges.insert(column, (row_index, index));
            }
        }
    }

    fn finish_drawing(&mut self, drawing: DrawingBuilder) {
        let Some(relationship_id) = drawing.relationship_id else {
            return;
        };

        if drawing.is_chart {
            if self.in_cell() {
                self.fidelity.add_warning(FidelityWarning::chart_in_table());
                return;
            }
            let frame = ChartFrame::placeholder(relationship_id, drawing.width, drawing.height);
            match self.paragraph_mut() {
                Some(p) => p.charts.push(frame),
                None => self.part.elements.push(Element::Chart(frame)),
            }
            return;
        }

        let mut image = self.load_image(&relationship_id, drawing.width, drawing.height);
        image.description = drawing.description;
        if let Some(run) = self.run_mut() {
            run.push_image(image);
        } else if let Some(p) = self.paragraph_mut() {
            if !p.suppresses_runs() {
                p.paragraph.runs.push(Run::image(image));
            }
        }
    }

    fn load_image(&mut self, relationship_id: &str, width: f32, height: f32) -> ImageRef {
        let reader = self.reader;
        let target = reader
            .relationships
            .get_target(relationship_id)
            .unwrap_or(relationship_id);
        let extension = target.rsplit_once('.').map_or("", |(_, ext)| ext);
        let content_type = ImageRef::content_type_for_extension(extension);

        let Some(images) = reader.images else {
            return ImageRef::new(Vec::new(), content_type, width, height);
        };
        match images.get(relationship_id) {
            Some(data) => ImageRef::new(data.clone(), content_type, width, height),
            None => {
                self.fidelity
                    .add_warning(FidelityWarning::image_unreadable(target));
                ImageRef::new(Vec::new(), content_type, width, height)
            }
        }
    }
}
