//! styles.xml writer
//!
//! Emits document defaults, the paragraph styles the markup writer refers to
//! (`Normal`, `Heading1`-`Heading6`, `ListParagraph`) and one table style
//! per style id used by a table in the document.

use crate::docx::document_writer::write_border;
use crate::docx::namespaces;
use crate::docx::reader::{escape_xml, to_half_points};
use crate::docx::styles::{Condition, ConditionRegion, TableStyleCatalog, TableStyleDefinition};
use crate::settings::WriteSettings;
use doc_model::{Document, MAX_HEADING_LEVEL};
use std::collections::BTreeSet;

/// Font sizes of heading levels 1-6, in points
const HEADING_SIZES: [f32; 6] = [16.0, 13.0, 12.0, 11.0, 11.0, 11.0];
const HEADING_COLOR: &str = "2F5496";

/// Base of every table style, with the default cell margins
const TABLE_NORMAL: &str = concat!(
    r#"<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/>"#,
    r#"<w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/>"#,
    r#"<w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/>"#,
    r#"</w:tblCellMar></w:tblPr></w:style>"#,
);

/// Plain grid with single borders on every edge
const TABLE_GRID: &str = concat!(
    r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:basedOn w:val="TableNormal"/>"#,
    r#"<w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style>"#,
);

const BUILTIN_TABLE_STYLES: [(&str, &str); 2] = [("TableNormal", TABLE_NORMAL), ("TableGrid", TABLE_GRID)];

/// Writer for styles.xml
pub struct StylesWriter<'a> {
    settings: &'a WriteSettings,
    table_styles: Option<&'a TableStyleCatalog>,
}

impl<'a> StylesWriter<'a> {
    pub fn new(settings: &'a WriteSettings) -> Self {
        Self {
            settings,
            table_styles: None,
        }
    }

    /// Take table style definitions from `catalog` instead of writing stubs
    pub fn with_table_styles(mut self, catalog: &'a TableStyleCatalog) -> Self {
        self.table_styles = Some(catalog);
        self
    }

    /// Generate styles.xml for `document`
    pub fn write(&self, document: &Document) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<w:styles xmlns:w="{}">"#, namespaces::W));

        self.write_doc_defaults(&mut xml);
        write_paragraph_styles(&mut xml);
        for (style_id, markup) in BUILTIN_TABLE_STYLES {
            match self.table_styles.and_then(|catalog| catalog.get(style_id)) {
                Some(definition) => write_table_style_definition(&mut xml, definition),
                None => xml.push_str(markup),
            }
        }

        for style_id in used_table_styles(document) {
            self.write_table_style(&mut xml, &style_id);
        }

        xml.push_str("</w:styles>");
        xml
    }

    fn write_doc_defaults(&self, xml: &mut String) {
        let font = escape_xml(&self.settings.default_font);
        let size = to_half_points(self.settings.default_font_size);
        xml.push_str("<w:docDefaults><w:rPrDefault><w:rPr>");
        xml.push_str(&format!(
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:eastAsia="{0}" w:cs="{0}"/>"#,
            font
        ));
        xml.push_str(&format!(r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, size));
        xml.push_str(r#"<w:lang w:val="en-US"/>"#);
        xml.push_str("</w:rPr></w:rPrDefault>");
        xml.push_str(r#"<w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#);
        xml.push_str("</w:docDefaults>");
    }

    fn write_table_style(&self, xml: &mut String, style_id: &str) {
        match self.table_styles.and_then(|catalog| catalog.get(style_id)) {
            Some(definition) => write_table_style_definition(xml, definition),
            None => {
                // Referenced but unknown: a named stub keeps the reference valid
                xml.push_str(&format!(
                    r#"<w:style w:type="table" w:customStyle="1" w:styleId="{0}"><w:name w:val="{0}"/><w:basedOn w:val="TableNormal"/></w:style>"#,
                    escape_xml(style_id)
                ));
            }
        }
    }
}

/// Distinct table style ids in document order of first use
fn used_table_styles(document: &Document) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut ids = Vec::new();
    for table in document.tables() {
        if let Some(id) = &table.style_id {
            let builtin = BUILTIN_TABLE_STYLES.iter().any(|(builtin, _)| *builtin == id.as_str());
            if !builtin && seen.insert(id.clone()) {
                ids.push(id.clone());
            }
        }
    }
    ids
}

fn write_paragraph_styles(xml: &mut String) {
    xml.push_str(r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#);

    for level in 1..=MAX_HEADING_LEVEL {
        let size = to_half_points(HEADING_SIZES[usize::from(level - 1)]);
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="Heading{0}"><w:name w:val="heading {0}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>"#,
            level
        ));
        xml.push_str(&format!(
            r#"<w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="240" w:after="0"/><w:outlineLvl w:val="{}"/></w:pPr>"#,
            level - 1
        ));
        xml.push_str(&format!(
            r#"<w:rPr><w:b/><w:color w:val="{0}"/><w:sz w:val="{1}"/><w:szCs w:val="{1}"/></w:rPr></w:style>"#,
            HEADING_COLOR, size
        ));
    }

    xml.push_str(r#"<w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:uiPriority w:val="34"/><w:qFormat/><w:pPr><w:ind w:left="720"/><w:contextualSpacing/></w:pPr></w:style>"#);
}

fn write_table_style_definition(xml: &mut String, definition: &TableStyleDefinition) {
    let id = escape_xml(&definition.style_id);
    let name = definition
        .name
        .as_deref()
        .map_or_else(|| id.clone(), escape_xml);
    xml.push_str(&format!(
        r#"<w:style w:type="table" w:styleId="{}"><w:name w:val="{}"/>"#,
        id, name
    ));
    if let Some(parent) = &definition.based_on {
        xml.push_str(&format!(r#"<w:basedOn w:val="{}"/>"#, escape_xml(parent)));
    }

    if let Some(whole) = definition.condition(ConditionRegion::WholeTable) {
        write_condition_run(xml, whole);
        xml.push_str("<w:tblPr>");
        if !whole.borders.is_empty() {
            xml.push_str("<w:tblBorders>");
            for (tag, border) in whole.borders.sides() {
                if let Some(border) = border {
                    write_border(xml, tag, &border);
                }
            }
            xml.push_str("</w:tblBorders>");
        }
        xml.push_str("</w:tblPr>");
        if let Some(fill) = whole.cell_shading {
            xml.push_str(&format!(
                r#"<w:tcPr><w:shd w:val="clear" w:color="auto" w:fill="{}"/></w:tcPr>"#,
                fill.to_hex()
            ));
        }
    }

    for (region, condition) in &definition.conditions {
        if *region == ConditionRegion::WholeTable || condition.is_empty() {
            continue;
        }
        xml.push_str(&format!(r#"<w:tblStylePr w:type="{}">"#, region.to_xml()));
        write_condition_run(xml, condition);
        if !condition.borders.is_empty() || condition.cell_shading.is_some() {
            xml.push_str("<w:tcPr>");
            if !condition.borders.is_empty() {
                xml.push_str("<w:tcBorders>");
                for (tag, border) in condition.borders.sides() {
                    if let Some(border) = border {
                        write_border(xml, tag, &border);
                    }
                }
                xml.push_str("</w:tcBorders>");
            }
            if let Some(fill) = condition.cell_shading {
                xml.push_str(&format!(
                    r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                    fill.to_hex()
                ));
            }
            xml.push_str("</w:tcPr>");
        }
        xml.push_str("</w:tblStylePr>");
    }

    xml.push_str("</w:style>");
}

fn write_condition_run(xml: &mut String, condition: &Condition) {
    if condition.bold.is_none() && condition.text_color.is_none() {
        return;
    }
    xml.push_str("<w:rPr>");
    match condition.bold {
        Some(true) => xml.push_str("<w:b/>"),
        Some(false) => xml.push_str(r#"<w:b w:val="0"/>"#),
        None => {}
    }
    if let Some(color) = condition.text_color {
        xml.push_str(&format!(r#"<w:color w:val="{}"/>"#, color.to_hex()));
    }
    xml.push_str("</w:rPr>");
}
