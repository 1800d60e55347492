//! Document.xml writer
//!
//! Walks the element list in order and emits WordprocessingML. Images,
//! hyperlinks, charts, the header and the footer get relationship ids as they
//! are encountered, after the ids reserved for styles, settings and
//! numbering. Parts referenced from the document (media, chart parts, header
//! and footer with their own manifests) are returned next to the markup.

use crate::docx::error::DocxResult;
use crate::docx::fidelity::{FidelityTracker, FidelityWarning};
use crate::docx::namespaces;
use crate::docx::numbering::num_id_for;
use crate::docx::reader::{escape_xml, to_emu, to_eighth_points, to_half_points, to_twips};
use crate::docx::relationship_types;
use crate::docx::relationships::{rels_path_for, Relationships, TargetMode};
use crate::docx::tables_writer::TableWriter;
use charts::DrawingMLWriter;
use doc_model::{
    Border, BorderStyle, ChartContent, ChartFrame, Document, Element, FieldKind, HeaderFooter,
    Hyperlink, ImageRef, Paragraph, Run, RunContent, RunFormat,
};

/// Ids `rId1..rId3` belong to styles, settings and numbering
pub const RESERVED_IDS: u32 = 3;
pub const STYLES_ID: &str = "rId1";
pub const SETTINGS_ID: &str = "rId2";
pub const NUMBERING_ID: &str = "rId3";

/// Letter, in twips
const PAGE_WIDTH: u32 = 12240;
const PAGE_HEIGHT: u32 = 15840;
const PAGE_MARGIN: u32 = 1440;

/// What a satellite part holds, deciding its content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Media,
    Chart,
    Header,
    Footer,
    Relationships,
}

/// A part written next to document.xml
#[derive(Debug, Clone, PartialEq)]
pub struct SatellitePart {
    /// Package path (`word/media/image1.png`)
    pub path: String,
    pub content: Vec<u8>,
    pub kind: PartKind,
}

/// Result of writing the main document part
#[derive(Debug, Clone)]
pub struct MarkupOutput {
    pub document: String,
    /// Relationships of document.xml, without the reserved ids
    pub relationships: Relationships,
    pub parts: Vec<SatellitePart>,
    pub fidelity: FidelityTracker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderFooterKind {
    Header,
    Footer,
}

impl HeaderFooterKind {
    fn root(&self) -> &'static str {
        match self {
            HeaderFooterKind::Header => "w:hdr",
            HeaderFooterKind::Footer => "w:ftr",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            HeaderFooterKind::Header => "header",
            HeaderFooterKind::Footer => "footer",
        }
    }
}

/// Writer for document.xml and the parts it references
pub struct MarkupWriter {
    parts: Vec<SatellitePart>,
    fidelity: FidelityTracker,
    image_count: u32,
    chart_count: u32,
    /// Last `wp:docPr` id handed out
    drawing_count: u32,
}

impl MarkupWriter {
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            fidelity: FidelityTracker::new(),
            image_count: 0,
            chart_count: 0,
            drawing_count: 0,
        }
    }

    /// Generate document.xml content with its satellite parts
    pub fn write(mut self, document: &Document) -> DocxResult<MarkupOutput> {
        let mut rels = Relationships::with_reserved(RESERVED_IDS);

        let mut body = String::new();
        for element in &document.elements {
            self.write_element(&mut body, &mut rels, element)?;
        }

        let header_id = match &document.header {
            Some(header) => Some(self.write_header_footer(&mut rels, header, HeaderFooterKind::Header)?),
            None => None,
        };
        let footer_id = match &document.footer {
            Some(footer) => Some(self.write_header_footer(&mut rels, footer, HeaderFooterKind::Footer)?),
            None => None,
        };

        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str("<w:document");
        push_namespaces(&mut xml);
        xml.push_str("><w:body>");
        xml.push_str(&body);
        write_section_properties(&mut xml, header_id.as_deref(), footer_id.as_deref());
        xml.push_str("</w:body></w:document>");

        tracing::debug!(
            elements = document.elements.len(),
            relationships = rels.len(),
            parts = self.parts.len(),
            "document part written"
        );

        Ok(MarkupOutput {
            document: xml,
            relationships: rels,
            parts: self.parts,
            fidelity: self.fidelity,
        })
    }

    fn write_element(&mut self, xml: &mut String, rels: &mut Relationships, element: &Element) -> DocxResult<()> {
        match element {
            Element::Paragraph(paragraph) => self.write_paragraph(xml, rels, paragraph),
            Element::Table(table) => TableWriter::new()
                .write_table(xml, table, |xml, paragraph| self.write_paragraph(xml, rels, paragraph)),
            Element::Chart(frame) => self.write_chart(xml, rels, frame),
            Element::Shape(shape) => {
                self.fidelity
                    .add_warning(FidelityWarning::shape_not_persisted(shape.kind.name()));
                Ok(())
            }
        }
    }

    fn write_header_footer(
        &mut self,
        rels: &mut Relationships,
        content: &HeaderFooter,
        kind: HeaderFooterKind,
    ) -> DocxResult<String> {
        let file = format!("{}1.xml", kind.name());
        let path = format!("word/{}", file);
        let mut part_rels = Relationships::new();

        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push('<');
        xml.push_str(kind.root());
        push_namespaces(&mut xml);
        xml.push('>');
        if content.paragraphs.is_empty() {
            xml.push_str("<w:p/>");
        }
        for paragraph in &content.paragraphs {
            self.write_paragraph(&mut xml, &mut part_rels, paragraph)?;
        }
        xml.push_str(&format!("</{}>", kind.root()));

        if !part_rels.is_empty() {
            self.parts.push(SatellitePart {
                path: rels_path_for(&path),
                content: part_rels.to_xml().into_bytes(),
                kind: PartKind::Relationships,
            });
        }
        self.parts.push(SatellitePart {
            path,
            content: xml.into_bytes(),
            kind: match kind {
                HeaderFooterKind::Header => PartKind::Header,
                HeaderFooterKind::Footer => PartKind::Footer,
            },
        });

        let rel_type = match kind {
            HeaderFooterKind::Header => relationship_types::HEADER,
            HeaderFooterKind::Footer => relationship_types::FOOTER,
        };
        Ok(rels.add(rel_type, &file, TargetMode::Internal))
    }

    /// Write a paragraph element
    pub(crate) fn write_paragraph(
        &mut self,
        xml: &mut String,
        rels: &mut Relationships,
        paragraph: &Paragraph,
    ) -> DocxResult<()> {
        xml.push_str("<w:p>");
        write_paragraph_properties(xml, paragraph);

        // Consecutive runs sharing a hyperlink go into one w:hyperlink
        let mut index = 0;
        while index < paragraph.runs.len() {
            let run = &paragraph.runs[index];
            match &run.hyperlink {
                Some(link) => {
                    let end = paragraph.runs[index..]
                        .iter()
                        .position(|r| r.hyperlink.as_ref() != Some(link))
                        .map_or(paragraph.runs.len(), |offset| index + offset);
                    self.write_hyperlink(xml, rels, link, &paragraph.runs[index..end])?;
                    index = end;
                }
                None => {
                    self.write_run(xml, rels, run)?;
                    index += 1;
                }
            }
        }

        xml.push_str("</w:p>");
        Ok(())
    }

    fn write_hyperlink(
        &mut self,
        xml: &mut String,
        rels: &mut Relationships,
        link: &Hyperlink,
        runs: &[Run],
    ) -> DocxResult<()> {
        // An empty url or a bare "#" has no target; the runs go out unwrapped
        let target = match link.anchor() {
            Some("") => None,
            Some(anchor) => Some(format!(r#" w:anchor="{}""#, escape_xml(anchor))),
            None if link.url.trim().is_empty() => None,
            None => {
                let id = rels.add(relationship_types::HYPERLINK, &link.url, TargetMode::External);
                Some(format!(r#" r:id="{}""#, id))
            }
        };
        let Some(target) = target else {
            for run in runs {
                self.write_run(xml, rels, run)?;
            }
            return Ok(());
        };

        xml.push_str("<w:hyperlink");
        xml.push_str(&target);
        if let Some(tooltip) = &link.tooltip {
            xml.push_str(&format!(r#" w:tooltip="{}""#, escape_xml(tooltip)));
        }
        xml.push_str(r#" w:history="1">"#);
        for run in runs {
            self.write_run(xml, rels, run)?;
        }
        xml.push_str("</w:hyperlink>");
        Ok(())
    }

    fn write_run(&mut self, xml: &mut String, rels: &mut Relationships, run: &Run) -> DocxResult<()> {
        match &run.content {
            RunContent::Text(text) => {
                xml.push_str("<w:r>");
                write_run_properties(xml, &run.format);
                write_text(xml, text);
                xml.push_str("</w:r>");
            }
            RunContent::Field(kind) => write_field(xml, *kind, &run.format),
            RunContent::Image(image) => {
                if image.is_empty() {
                    self.fidelity.add_warning(FidelityWarning::empty_image_skipped());
                    return Ok(());
                }
                let id = self.add_image(rels, image);
                xml.push_str("<w:r>");
                write_run_properties(xml, &run.format);
                self.write_picture(xml, &id, image);
                xml.push_str("</w:r>");
            }
        }
        Ok(())
    }

    fn add_image(&mut self, rels: &mut Relationships, image: &ImageRef) -> String {
        self.image_count += 1;
        let file = format!("media/image{}.{}", self.image_count, image.extension());
        self.parts.push(SatellitePart {
            path: format!("word/{}", file),
            content: image.data.clone(),
            kind: PartKind::Media,
        });
        rels.add(relationship_types::IMAGE, &file, TargetMode::Internal)
    }

    fn next_drawing_id(&mut self) -> u32 {
        self.drawing_count += 1;
        self.drawing_count
    }

    fn write_picture(&mut self, xml: &mut String, rel_id: &str, image: &ImageRef) {
        let drawing_id = self.next_drawing_id();
        let cx = to_emu(image.width);
        let cy = to_emu(image.height);
        let name = format!("Picture {}", drawing_id);

        xml.push_str("<w:drawing>");
        write_inline_start(xml, cx, cy, drawing_id, &name, image.description.as_deref());
        xml.push_str(r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#);
        xml.push_str(&format!(r#"<a:graphic><a:graphicData uri="{}">"#, namespaces::PIC));
        xml.push_str("<pic:pic>");
        xml.push_str(&format!(
            r#"<pic:nvPicPr><pic:cNvPr id="{}" name="{}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            drawing_id,
            escape_xml(&name)
        ));
        xml.push_str(&format!(
            r#"<pic:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            rel_id
        ));
        xml.push_str(&format!(
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            cx, cy
        ));
        xml.push_str("</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>");
    }

    /// A chart is written as its own paragraph holding the chart drawing
    fn write_chart(&mut self, xml: &mut String, rels: &mut Relationships, frame: &ChartFrame) -> DocxResult<()> {
        let chart = match &frame.content {
            ChartContent::Resolved(chart) => chart,
            ChartContent::Unresolved { relationship_id } => {
                self.fidelity
                    .add_warning(FidelityWarning::chart_unresolved(relationship_id));
                return Ok(());
            }
        };

        let chart_xml = DrawingMLWriter::new().write(chart)?;
        self.chart_count += 1;
        let file = format!("charts/chart{}.xml", self.chart_count);
        self.parts.push(SatellitePart {
            path: format!("word/{}", file),
            content: chart_xml.into_bytes(),
            kind: PartKind::Chart,
        });
        let rel_id = rels.add(relationship_types::CHART, &file, TargetMode::Internal);

        let drawing_id = self.next_drawing_id();
        let name = format!("Chart {}", drawing_id);
        xml.push_str("<w:p><w:r><w:drawing>");
        write_inline_start(
            xml,
            to_emu(frame.width),
            to_emu(frame.height),
            drawing_id,
            &name,
            chart.title.as_deref(),
        );
        xml.push_str("<wp:cNvGraphicFramePr/>");
        xml.push_str(&format!(
            r#"<a:graphic><a:graphicData uri="{}"><c:chart r:id="{}"/></a:graphicData></a:graphic>"#,
            namespaces::C,
            rel_id
        ));
        xml.push_str("</wp:inline></w:drawing></w:r></w:p>");
        Ok(())
    }
}

impl Default for MarkupWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn push_namespaces(xml: &mut String) {
    xml.push_str(&format!(
        r#" xmlns:w="{}" xmlns:r="{}" xmlns:wp="{}" xmlns:a="{}" xmlns:pic="{}" xmlns:c="{}""#,
        namespaces::W,
        namespaces::R,
        namespaces::WP,
        namespaces::A,
        namespaces::PIC,
        namespaces::C,
    ));
}

fn write_inline_start(xml: &mut String, cx: i64, cy: i64, id: u32, name: &str, description: Option<&str>) {
    xml.push_str(r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#);
    xml.push_str(&format!(r#"<wp:extent cx="{}" cy="{}"/>"#, cx, cy));
    xml.push_str(r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#);
    xml.push_str(&format!(r#"<wp:docPr id="{}" name="{}""#, id, escape_xml(name)));
    if let Some(description) = description {
        xml.push_str(&format!(r#" descr="{}""#, escape_xml(description)));
    }
    xml.push_str("/>");
}

fn write_section_properties(xml: &mut String, header_id: Option<&str>, footer_id: Option<&str>) {
    xml.push_str("<w:sectPr>");
    if let Some(id) = header_id {
        xml.push_str(&format!(r#"<w:headerReference w:type="default" r:id="{}"/>"#, id));
    }
    if let Some(id) = footer_id {
        xml.push_str(&format!(r#"<w:footerReference w:type="default" r:id="{}"/>"#, id));
    }
    xml.push_str(&format!(r#"<w:pgSz w:w="{}" w:h="{}"/>"#, PAGE_WIDTH, PAGE_HEIGHT));
    xml.push_str(&format!(
        r#"<w:pgMar w:top="{0}" w:right="{0}" w:bottom="{0}" w:left="{0}" w:header="720" w:footer="720" w:gutter="0"/>"#,
        PAGE_MARGIN
    ));
    xml.push_str("</w:sectPr>");
}

/// Write one border edge (`w:top`, `w:insideH`, ...)
pub(crate) fn write_border(xml: &mut String, tag: &str, border: &Border) {
    if border.style == BorderStyle::None {
        xml.push_str(&format!(r#"<w:{} w:val="nil"/>"#, tag));
        return;
    }
    let color = border.color.map_or_else(|| "auto".to_string(), |c| c.to_hex());
    xml.push_str(&format!(
        r#"<w:{} w:val="{}" w:sz="{}" w:space="0" w:color="{}"/>"#,
        tag,
        border.style.to_xml(),
        to_eighth_points(border.width),
        color
    ));
}

fn write_paragraph_properties(xml: &mut String, paragraph: &Paragraph) {
    let mut props = String::new();

    if let Some(level) = paragraph.heading_level {
        props.push_str(&format!(r#"<w:pStyle w:val="Heading{}"/>"#, level));
    } else if paragraph.list.is_some() {
        props.push_str(r#"<w:pStyle w:val="ListParagraph"/>"#);
    }

    if paragraph.page_break_before {
        props.push_str("<w:pageBreakBefore/>");
    }

    if let Some(list) = paragraph.list {
        props.push_str(&format!(
            r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
            list.level,
            num_id_for(list.kind)
        ));
    }

    if !paragraph.borders.is_empty() {
        props.push_str("<w:pBdr>");
        for (tag, border) in paragraph.borders.sides() {
            if let Some(border) = border {
                write_border(&mut props, tag, &border);
            }
        }
        props.push_str("</w:pBdr>");
    }

    if let Some(color) = paragraph.background {
        props.push_str(&format!(
            r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
            color.to_hex()
        ));
    }

    let spacing = &paragraph.spacing;
    if !spacing.is_empty() {
        props.push_str("<w:spacing");
        if let Some(before) = spacing.before {
            props.push_str(&format!(r#" w:before="{}""#, to_twips(before)));
        }
        if let Some(after) = spacing.after {
            props.push_str(&format!(r#" w:after="{}""#, to_twips(after)));
        }
        if let Some(line) = spacing.line {
            props.push_str(&format!(
                r#" w:line="{}" w:lineRule="{}""#,
                to_twips(line.value),
                line.rule.to_xml()
            ));
        }
        props.push_str("/>");
    }

    let indent = &paragraph.indent;
    if !indent.is_empty() {
        props.push_str("<w:ind");
        if let Some(left) = indent.left {
            props.push_str(&format!(r#" w:left="{}""#, to_twips(left)));
        }
        if let Some(right) = indent.right {
            props.push_str(&format!(r#" w:right="{}""#, to_twips(right)));
        }
        match indent.first_line {
            Some(first) if first < 0.0 => {
                props.push_str(&format!(r#" w:hanging="{}""#, to_twips(-first)));
            }
            Some(first) => props.push_str(&format!(r#" w:firstLine="{}""#, to_twips(first))),
            None => {}
        }
        props.push_str("/>");
    }

    if let Some(alignment) = paragraph.alignment {
        props.push_str(&format!(r#"<w:jc w:val="{}"/>"#, alignment.to_xml()));
    }

    if !props.is_empty() {
        xml.push_str("<w:pPr>");
        xml.push_str(&props);
        xml.push_str("</w:pPr>");
    }
}

fn push_toggle(props: &mut String, tag: &str, value: Option<bool>) {
    match value {
        Some(true) => props.push_str(&format!("<w:{}/>", tag)),
        Some(false) => props.push_str(&format!(r#"<w:{} w:val="0"/>"#, tag)),
        None => {}
    }
}

fn write_run_properties(xml: &mut String, format: &RunFormat) {
    if format.is_empty() {
        return;
    }
    let mut props = String::new();

    if let Some(font) = &format.font {
        let font = escape_xml(font);
        props.push_str(&format!(
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
            font
        ));
    }
    push_toggle(&mut props, "b", format.bold);
    push_toggle(&mut props, "i", format.italic);
    push_toggle(&mut props, "caps", format.all_caps);
    push_toggle(&mut props, "smallCaps", format.small_caps);
    push_toggle(&mut props, "strike", format.strikethrough);
    if let Some(color) = format.color {
        props.push_str(&format!(r#"<w:color w:val="{}"/>"#, color.to_hex()));
    }
    if let Some(size) = format.font_size {
        let half_points = to_half_points(size);
        props.push_str(&format!(
            r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
            half_points
        ));
    }
    if let Some(highlight) = format.highlight {
        props.push_str(&format!(r#"<w:highlight w:val="{}"/>"#, highlight.to_xml()));
    }
    if let Some(underline) = format.underline {
        props.push_str(&format!(r#"<w:u w:val="{}"/>"#, underline.to_xml()));
    }
    if let Some(align) = format.vertical_align {
        props.push_str(&format!(r#"<w:vertAlign w:val="{}"/>"#, align.to_xml()));
    }

    xml.push_str("<w:rPr>");
    xml.push_str(&props);
    xml.push_str("</w:rPr>");
}

fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) || text.contains("  ")
}

fn push_text_segment(xml: &mut String, segment: &str) {
    if segment.is_empty() {
        return;
    }
    if needs_preserve(segment) {
        xml.push_str(r#"<w:t xml:space="preserve">"#);
    } else {
        xml.push_str("<w:t>");
    }
    xml.push_str(&escape_xml(segment));
    xml.push_str("</w:t>");
}

/// Text with `\n` as line breaks and `\t` as tabs
fn write_text(xml: &mut String, text: &str) {
    let mut segment_start = 0;
    for (index, c) in text.char_indices() {
        let marker = match c {
            '\n' => "<w:br/>",
            '\t' => "<w:tab/>",
            _ => continue,
        };
        push_text_segment(xml, &text[segment_start..index]);
        xml.push_str(marker);
        segment_start = index + c.len_utf8();
    }
    push_text_segment(xml, &text[segment_start..]);
}

/// begin / instruction / separate / cached value / end
fn write_field(xml: &mut String, kind: FieldKind, format: &RunFormat) {
    let mut run = |inner: &str| {
        xml.push_str("<w:r>");
        write_run_properties(xml, format);
        xml.push_str(inner);
        xml.push_str("</w:r>");
    };
    run(r#"<w:fldChar w:fldCharType="begin"/>"#);
    run(&format!(
        r#"<w:instrText xml:space="preserve"> {} </w:instrText>"#,
        kind.instruction()
    ));
    run(r#"<w:fldChar w:fldCharType="separate"/>"#);
    run("<w:t>1</w:t>");
    run(r#"<w:fldChar w:fldCharType="end"/>"#);
}
