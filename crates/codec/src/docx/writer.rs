//! Package assembly for the write path
//!
//! Collects every part of a new package: the document markup with its
//! satellites, styles, settings, numbering when lists exist, core
//! properties, the content type table and both relationship manifests.

use crate::docx::content_type_values;
use crate::docx::content_types::ContentTypes;
use crate::docx::core_properties::{write_core_properties, CORE_PROPERTIES_PATH};
use crate::docx::document_writer::{
    MarkupWriter, PartKind, NUMBERING_ID, SETTINGS_ID, STYLES_ID,
};
use crate::docx::error::DocxResult;
use crate::docx::fidelity::FidelityTracker;
use crate::docx::namespaces;
use crate::docx::numbering::NumberingWriter;
use crate::docx::package::PackageEntries;
use crate::docx::relationship_types;
use crate::docx::relationships::create_root_rels;
use crate::docx::styles::TableStyleCatalog;
use crate::docx::styles_writer::StylesWriter;
use crate::settings::WriteSettings;
use doc_model::{Document, ImageRef};

pub(crate) const DOCUMENT_PATH: &str = "word/document.xml";
const DOCUMENT_RELS_PATH: &str = "word/_rels/document.xml.rels";
const STYLES_PATH: &str = "word/styles.xml";
const SETTINGS_PATH: &str = "word/settings.xml";
const NUMBERING_PATH: &str = "word/numbering.xml";

/// Builds the entry set of a DOCX package from a document
pub struct DocxWriter<'s> {
    settings: &'s WriteSettings,
    table_styles: Option<&'s TableStyleCatalog>,
}

impl<'s> DocxWriter<'s> {
    pub fn new(settings: &'s WriteSettings) -> Self {
        Self {
            settings,
            table_styles: None,
        }
    }

    /// Write full definitions for table styles found in `catalog`
    pub fn with_table_styles(mut self, catalog: &'s TableStyleCatalog) -> Self {
        self.table_styles = Some(catalog);
        self
    }

    /// Produce all package entries for `document`
    pub fn write(&self, document: &Document) -> DocxResult<(PackageEntries, FidelityTracker)> {
        let output = MarkupWriter::new().write(document)?;
        let has_lists = document.has_lists();
        let write_core = self.settings.write_core_properties;

        let mut entries = PackageEntries::new();
        let mut content_types = ContentTypes::new();

        entries.insert(DOCUMENT_PATH, output.document);
        content_types.add_override(DOCUMENT_PATH, content_type_values::DOCUMENT);

        let mut styles = StylesWriter::new(self.settings);
        if let Some(catalog) = self.table_styles {
            styles = styles.with_table_styles(catalog);
        }
        entries.insert(STYLES_PATH, styles.write(document));
        content_types.add_override(STYLES_PATH, content_type_values::STYLES);

        entries.insert(SETTINGS_PATH, write_settings_part());
        content_types.add_override(SETTINGS_PATH, content_type_values::SETTINGS);

        let mut rels = output.relationships;
        rels.insert(STYLES_ID, relationship_types::STYLES, "styles.xml");
        rels.insert(SETTINGS_ID, relationship_types::SETTINGS, "settings.xml");
        if has_lists {
            entries.insert(NUMBERING_PATH, NumberingWriter::new().write());
            content_types.add_override(NUMBERING_PATH, content_type_values::NUMBERING);
            rels.insert(NUMBERING_ID, relationship_types::NUMBERING, "numbering.xml");
        }
        entries.insert(DOCUMENT_RELS_PATH, rels.to_xml());

        for part in output.parts {
            match part.kind {
                PartKind::Media => {
                    if let Some((_, extension)) = part.path.rsplit_once('.') {
                        content_types.add_default(
                            extension,
                            ImageRef::content_type_for_extension(extension),
                        );
                    }
                }
                PartKind::Chart => content_types.add_override(&part.path, content_type_values::CHART),
                PartKind::Header => content_types.add_override(&part.path, content_type_values::HEADER),
                PartKind::Footer => content_types.add_override(&part.path, content_type_values::FOOTER),
                PartKind::Relationships => {}
            }
            entries.insert(part.path, part.content);
        }

        if write_core {
            entries.insert(CORE_PROPERTIES_PATH, write_core_properties(&document.properties));
            content_types.add_override(CORE_PROPERTIES_PATH, content_type_values::CORE_PROPERTIES);
        }
        entries.insert("_rels/.rels", create_root_rels(write_core).to_xml());
        entries.insert("[Content_Types].xml", content_types.to_xml());

        if !output.fidelity.is_empty() {
            for warning in output.fidelity.warnings() {
                tracing::warn!(code = %warning.code, count = warning.count, "{}", warning.message);
            }
        }
        tracing::debug!(entries = entries.len(), lists = has_lists, "package assembled");

        Ok((entries, output.fidelity))
    }
}

fn write_settings_part() -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:settings xmlns:w="{}">"#, namespaces::W));
    xml.push_str(r#"<w:zoom w:percent="100"/>"#);
    xml.push_str(r#"<w:defaultTabStop w:val="720"/>"#);
    xml.push_str(r#"<w:characterSpacingControl w:val="doNotCompress"/>"#);
    xml.push_str(r#"<w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat>"#);
    xml.push_str("</w:settings>");
    xml
}
