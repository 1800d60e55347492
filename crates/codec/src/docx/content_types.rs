//! [Content_Types].xml parsing and generation

use crate::docx::content_type_values;
use crate::docx::error::DocxResult;
use crate::docx::reader::{escape_xml, XmlParser};
use quick_xml::events::Event;
use std::collections::BTreeMap;

/// The content type table of a package
///
/// Both maps are ordered so the generated part is byte-stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentTypes {
    /// Default content types by lowercase extension ("png" -> "image/png")
    pub defaults: BTreeMap<String, String>,
    /// Override content types by absolute part name ("/word/document.xml" -> "...")
    pub overrides: BTreeMap<String, String>,
}

fn normalize_part_name(part_name: &str) -> String {
    if part_name.starts_with('/') {
        part_name.to_string()
    } else {
        format!("/{}", part_name)
    }
}

impl ContentTypes {
    /// Content types with the `rels` and `xml` defaults every package needs
    pub fn new() -> Self {
        let mut ct = Self::default();
        ct.add_default("rels", content_type_values::RELATIONSHIPS);
        ct.add_default("xml", content_type_values::XML);
        ct
    }

    /// Parse [Content_Types].xml from its content
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut result = Self::default();
        let mut reader = XmlParser::from_string_trimmed(content);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match e.local_name().as_ref() {
                        b"Default" => {
                            if let (Some(ext), Some(ct)) = (
                                XmlParser::get_attribute(e, "Extension"),
                                XmlParser::get_attribute(e, "ContentType"),
                            ) {
                                result.add_default(&ext, &ct);
                            }
                        }
                        b"Override" => {
                            if let (Some(part), Some(ct)) = (
                                XmlParser::get_attribute(e, "PartName"),
                                XmlParser::get_attribute(e, "ContentType"),
                            ) {
                                result.add_override(&part, &ct);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XmlParser::markup_error(&reader, "[Content_Types].xml", e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    /// Content type for a part: override first, then extension default
    pub fn get_content_type(&self, path: &str) -> Option<&str> {
        if let Some(ct) = self.overrides.get(&normalize_part_name(path)) {
            return Some(ct);
        }

        let (_, ext) = path.rsplit_once('.')?;
        self.defaults
            .get(&ext.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }

    /// Add an override for a specific part
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        self.overrides
            .insert(normalize_part_name(part_name), content_type.to_string());
    }

    /// Generate XML content for [Content_Types].xml
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);

        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            ));
        }

        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(part),
                escape_xml(ct)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types_creation() {
        let ct = ContentTypes::new();
        assert!(ct.defaults.contains_key("rels"));
        assert!(ct.defaults.contains_key("xml"));
    }

    #[test]
    fn test_content_types_parsing() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="JPEG" ContentType="image/jpeg"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

        let ct = ContentTypes::parse(xml).unwrap();
        assert_eq!(ct.get_content_type("word/styles.xml"), Some("application/xml"));
        assert_eq!(ct.get_content_type("word/media/photo.jpeg"), Some("image/jpeg"));
        assert_eq!(
            ct.get_content_type("word/document.xml"),
            Some(content_type_values::DOCUMENT)
        );
        assert_eq!(ct.get_content_type("word/media/noext"), None);
    }

    #[test]
    fn test_output_is_sorted_and_round_trips() {
        let mut original = ContentTypes::new();
        original.add_override("word/styles.xml", content_type_values::STYLES);
        original.add_override("/word/document.xml", content_type_values::DOCUMENT);
        original.add_default("png", "image/png");

        let xml = original.to_xml();
        let doc_pos = xml.find("/word/document.xml").unwrap();
        let styles_pos = xml.find("/word/styles.xml").unwrap();
        assert!(doc_pos < styles_pos);

        assert_eq!(ContentTypes::parse(&xml).unwrap(), original);
    }
}
