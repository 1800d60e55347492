//! XML parsing utilities shared by the part readers

use crate::docx::error::{DocxError, DocxResult};
use quick_xml::events::BytesStart;
use quick_xml::Reader;

/// Helpers over quick-xml events
///
/// Producers disagree on namespace prefixes, so element and attribute
/// lookups compare local names only.
pub struct XmlParser;

impl XmlParser {
    /// A reader for a part whose text content matters; whitespace is kept
    pub fn from_string(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);
        reader
    }

    /// A reader for structural parts where whitespace-only text is noise
    pub fn from_string_trimmed(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        reader
    }

    /// Local element name (prefix stripped) as an owned string
    pub fn local_name(event: &BytesStart) -> String {
        String::from_utf8_lossy(event.local_name().as_ref()).into_owned()
    }

    /// Attribute value by local name, ignoring any prefix
    pub fn get_attribute(event: &BytesStart, name: &str) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.local_name().as_ref() == name.as_bytes())
            .map(|a| match a.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
            })
    }

    /// Attribute value by exact qualified name (`r:id`, `xml:space`)
    pub fn get_qualified_attribute(event: &BytesStart, qname: &str) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == qname.as_bytes())
            .map(|a| String::from_utf8_lossy(&a.value).into_owned())
    }

    /// The `w:val` attribute
    pub fn val(event: &BytesStart) -> Option<String> {
        Self::get_attribute(event, "val")
    }

    /// Twips (1/20 point) to points
    pub fn parse_twips(value: &str) -> Option<f32> {
        value.trim().parse::<f32>().ok().map(|v| v / 20.0)
    }

    /// Half-points (font sizes) to points
    pub fn parse_half_points(value: &str) -> Option<f32> {
        value.trim().parse::<f32>().ok().map(|v| v / 2.0)
    }

    /// Eighths of a point (border widths) to points
    pub fn parse_eighth_points(value: &str) -> Option<f32> {
        value.trim().parse::<f32>().ok().map(|v| v / 8.0)
    }

    /// EMUs (914400 per inch) to points
    pub fn parse_emu(value: &str) -> Option<f32> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .map(|v| (v * 72.0 / 914_400.0) as f32)
    }

    /// Toggle property value; an absent `w:val` means on
    pub fn parse_toggle(value: Option<&str>) -> bool {
        match value {
            None => true,
            Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes"),
        }
    }

    /// Two hex digits as used by `themeTint`/`themeShade`
    pub fn parse_hex_byte(value: &str) -> Option<u8> {
        u8::from_str_radix(value.trim(), 16).ok()
    }

    /// Wrap a quick-xml failure with the byte position it occurred at
    pub fn markup_error(reader: &Reader<&[u8]>, part: &str, err: quick_xml::Error) -> DocxError {
        DocxError::InvalidMarkup(format!(
            "{} at position {}: {}",
            part,
            reader.error_position(),
            err
        ))
    }
}

/// Escape XML special characters for text and attribute content
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// Points to twips, rounded
pub fn to_twips(points: f32) -> i64 {
    (points * 20.0).round() as i64
}

/// Points to half-points, rounded
pub fn to_half_points(points: f32) -> i64 {
    (points * 2.0).round() as i64
}

/// Points to eighths of a point, rounded
pub fn to_eighth_points(points: f32) -> i64 {
    (points * 8.0).round() as i64
}

/// Points to EMUs, rounded
pub fn to_emu(points: f32) -> i64 {
    (f64::from(points) * 914_400.0 / 72.0).round() as i64
}

/// Read a whole part, failing with `InvalidMarkup` on malformed XML
pub fn check_well_formed(content: &str, part: &str) -> DocxResult<()> {
    let mut reader = XmlParser::from_string_trimmed(content);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(_)) => depth += 1,
            Ok(quick_xml::events::Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(quick_xml::events::Event::Eof) => {
                return if depth == 0 {
                    Ok(())
                } else {
                    Err(unclosed_error(part, depth))
                };
            }
            Ok(_) => {}
            Err(e) => return Err(XmlParser::markup_error(&reader, part, e)),
        }
        buf.clear();
    }
}

/// Error for a part that ends with elements still open
pub fn unclosed_error(part: &str, open: usize) -> DocxError {
    DocxError::InvalidMarkup(format!(
        "{}: unexpected end of input with {} unclosed element(s)",
        part, open
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    fn first_start(xml: &str) -> BytesStart<'static> {
        let mut reader = XmlParser::from_string_trimmed(xml);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => return e.into_owned(),
                Event::Eof => panic!("no element"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_parse_twips() {
        assert_eq!(XmlParser::parse_twips("1440"), Some(72.0));
        assert_eq!(XmlParser::parse_twips("720"), Some(36.0));
        assert_eq!(XmlParser::parse_twips("wide"), None);
    }

    #[test]
    fn test_parse_half_points() {
        assert_eq!(XmlParser::parse_half_points("24"), Some(12.0));
        assert_eq!(XmlParser::parse_half_points("21"), Some(10.5));
    }

    #[test]
    fn test_parse_emu() {
        assert!((XmlParser::parse_emu("914400").unwrap() - 72.0).abs() < 0.001);
        assert!((XmlParser::parse_emu("5486400").unwrap() - 432.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_toggle() {
        assert!(XmlParser::parse_toggle(None));
        assert!(XmlParser::parse_toggle(Some("1")));
        assert!(XmlParser::parse_toggle(Some("true")));
        assert!(!XmlParser::parse_toggle(Some("0")));
        assert!(!XmlParser::parse_toggle(Some("false")));
    }

    #[test]
    fn test_attribute_lookup_ignores_prefix() {
        let start = first_start(r#"<w:pStyle w:val="Heading1" r:id="rId4"/>"#);
        assert_eq!(XmlParser::local_name(&start), "pStyle");
        assert_eq!(XmlParser::val(&start).as_deref(), Some("Heading1"));
        assert_eq!(XmlParser::get_attribute(&start, "id").as_deref(), Some("rId4"));
        assert_eq!(
            XmlParser::get_qualified_attribute(&start, "r:id").as_deref(),
            Some("rId4")
        );
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(to_twips(72.0), 1440);
        assert_eq!(to_half_points(10.5), 21);
        assert_eq!(to_emu(72.0), 914_400);
        assert_eq!(to_eighth_points(0.5), 4);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_well_formed_check() {
        assert!(check_well_formed("<a><b/></a>", "test.xml").is_ok());
        assert!(matches!(
            check_well_formed("<a><b></a>", "test.xml"),
            Err(DocxError::InvalidMarkup(msg)) if msg.contains("test.xml")
        ));
    }
}
