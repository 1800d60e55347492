//! docProps/core.xml: title, author, language and timestamps

use crate::docx::error::DocxResult;
use crate::docx::namespaces;
use crate::docx::reader::{escape_xml, XmlParser};
use chrono::{DateTime, SecondsFormat, Utc};
use doc_model::DocumentProperties;
use quick_xml::events::Event;

/// Package path of the core properties part
pub const CORE_PROPERTIES_PATH: &str = "docProps/core.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Creator,
    Language,
    Created,
    Modified,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"creator" => Some(Field::Creator),
            b"language" => Some(Field::Language),
            b"created" => Some(Field::Created),
            b"modified" => Some(Field::Modified),
            _ => None,
        }
    }
}

/// W3CDTF timestamp; unparsable values are dropped
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value.trim()) {
        Ok(time) => Some(time.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(value, error = %e, "ignoring unparsable core property timestamp");
            None
        }
    }
}

/// Parse core.xml into document properties
pub fn parse_core_properties(content: &str) -> DocxResult<DocumentProperties> {
    let mut reader = XmlParser::from_string_trimmed(content);
    let mut buf = Vec::new();
    let mut properties = DocumentProperties::default();
    let mut current: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => current = Field::from_local_name(e.local_name().as_ref()),
            Ok(Event::Text(t)) => {
                if let Some(field) = current {
                    let text = t
                        .unescape()
                        .map_err(|err| XmlParser::markup_error(&reader, CORE_PROPERTIES_PATH, err))?
                        .into_owned();
                    match field {
                        Field::Title => properties.title = Some(text),
                        Field::Creator => properties.author = Some(text),
                        Field::Language => properties.language = Some(text),
                        Field::Created => properties.created = parse_timestamp(&text),
                        Field::Modified => properties.modified = parse_timestamp(&text),
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlParser::markup_error(&reader, CORE_PROPERTIES_PATH, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(properties)
}

/// Generate core.xml; only properties that are set are written
pub fn write_core_properties(properties: &DocumentProperties) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<cp:coreProperties xmlns:cp="{}" xmlns:dc="{}" xmlns:dcterms="{}" xmlns:xsi="{}">"#,
        namespaces::CP,
        namespaces::DC,
        namespaces::DCTERMS,
        namespaces::XSI
    ));

    let text_fields = [
        ("dc:title", &properties.title),
        ("dc:creator", &properties.author),
        ("dc:language", &properties.language),
    ];
    for (tag, value) in text_fields {
        if let Some(value) = value {
            xml.push_str(&format!("<{0}>{1}</{0}>", tag, escape_xml(value)));
        }
    }

    let timestamps = [
        ("dcterms:created", properties.created),
        ("dcterms:modified", properties.modified),
    ];
    for (tag, value) in timestamps {
        if let Some(time) = value {
            xml.push_str(&format!(
                r#"<{0} xsi:type="dcterms:W3CDTF">{1}</{0}>"#,
                tag,
                time.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
    }

    xml.push_str("</cp:coreProperties>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_core_properties() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="cp" xmlns:dc="dc" xmlns:dcterms="dcterms" xmlns:xsi="xsi">
  <dc:title>Quarterly &amp; Annual</dc:title>
  <dc:creator>J. Doe</dc:creator>
  <cp:lastModifiedBy>Someone Else</cp:lastModifiedBy>
  <dc:language>en-GB</dc:language>
  <dcterms:created xsi:type="dcterms:W3CDTF">2024-03-01T09:30:00Z</dcterms:created>
  <dcterms:modified xsi:type="dcterms:W3CDTF">2024-03-02T10:00:00+02:00</dcterms:modified>
</cp:coreProperties>"#;
        let props = parse_core_properties(xml).unwrap();
        assert_eq!(props.title.as_deref(), Some("Quarterly & Annual"));
        assert_eq!(props.author.as_deref(), Some("J. Doe"));
        assert_eq!(props.language.as_deref(), Some("en-GB"));
        assert_eq!(props.created, Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()));
        assert_eq!(props.modified, Some(Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap()));
    }

    #[test]
    fn test_bad_timestamp_is_dropped() {
        let xml = r#"<cp:coreProperties xmlns:cp="cp" xmlns:dcterms="d"><dcterms:created>yesterday</dcterms:created></cp:coreProperties>"#;
        let props = parse_core_properties(xml).unwrap();
        assert!(props.created.is_none());
    }

    #[test]
    fn test_write_then_parse() {
        let props = DocumentProperties {
            title: Some("Report <draft>".into()),
            author: Some("Ann".into()),
            language: None,
            created: Some(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()),
            modified: None,
        };
        let xml = write_core_properties(&props);
        assert!(xml.contains("<dc:title>Report &lt;draft&gt;</dc:title>"));
        assert!(xml.contains("2023-12-31T23:59:59Z"));
        assert!(!xml.contains("dc:language"));
        assert!(!xml.contains("dcterms:modified"));
        assert_eq!(parse_core_properties(&xml).unwrap(), props);
    }

    #[test]
    fn test_malformed_core_properties() {
        assert!(parse_core_properties("<cp:coreProperties><dc:title>x</cp:coreProperties>").is_err());
    }
}
