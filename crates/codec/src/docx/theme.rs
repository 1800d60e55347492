//! Theme color palette (`word/theme/theme1.xml`)
//!
//! Only the color scheme is read. Everything else in the theme (fonts,
//! effects, background fills) is ignored.

use crate::docx::error::DocxResult;
use crate::docx::reader::XmlParser;
use doc_model::Color;
use quick_xml::events::Event;

/// The twelve color scheme slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeSlot {
    Dark1,
    Light1,
    Dark2,
    Light2,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Hyperlink,
    FollowedHyperlink,
}

impl ThemeSlot {
    pub const ALL: [ThemeSlot; 12] = [
        ThemeSlot::Dark1,
        ThemeSlot::Light1,
        ThemeSlot::Dark2,
        ThemeSlot::Light2,
        ThemeSlot::Accent1,
        ThemeSlot::Accent2,
        ThemeSlot::Accent3,
        ThemeSlot::Accent4,
        ThemeSlot::Accent5,
        ThemeSlot::Accent6,
        ThemeSlot::Hyperlink,
        ThemeSlot::FollowedHyperlink,
    ];

    /// Element name inside `a:clrScheme`
    pub fn scheme_name(&self) -> &'static str {
        match self {
            ThemeSlot::Dark1 => "dk1",
            ThemeSlot::Light1 => "lt1",
            ThemeSlot::Dark2 => "dk2",
            ThemeSlot::Light2 => "lt2",
            ThemeSlot::Accent1 => "accent1",
            ThemeSlot::Accent2 => "accent2",
            ThemeSlot::Accent3 => "accent3",
            ThemeSlot::Accent4 => "accent4",
            ThemeSlot::Accent5 => "accent5",
            ThemeSlot::Accent6 => "accent6",
            ThemeSlot::Hyperlink => "hlink",
            ThemeSlot::FollowedHyperlink => "folHlink",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Map a theme color name, or one of its aliases, to a slot
    ///
    /// Matching is case-insensitive. `text1`/`background1` and friends are
    /// the names used by `w:themeColor` attributes.
    pub fn from_name(name: &str) -> Option<Self> {
        let slot = match name.to_ascii_lowercase().as_str() {
            "dk1" | "dark1" | "text1" | "tx1" => ThemeSlot::Dark1,
            "lt1" | "light1" | "background1" | "bg1" => ThemeSlot::Light1,
            "dk2" | "dark2" | "text2" | "tx2" => ThemeSlot::Dark2,
            "lt2" | "light2" | "background2" | "bg2" => ThemeSlot::Light2,
            "accent1" => ThemeSlot::Accent1,
            "accent2" => ThemeSlot::Accent2,
            "accent3" => ThemeSlot::Accent3,
            "accent4" => ThemeSlot::Accent4,
            "accent5" => ThemeSlot::Accent5,
            "accent6" => ThemeSlot::Accent6,
            "hlink" | "hyperlink" => ThemeSlot::Hyperlink,
            "folhlink" | "followedhyperlink" => ThemeSlot::FollowedHyperlink,
            _ => return None,
        };
        Some(slot)
    }
}

/// RGB fallback for a system color that carries no `lastClr`
pub fn system_color_default(name: &str) -> Color {
    let hex = match name {
        "windowText" | "menuText" | "captionText" | "btnText" | "infoText" => "000000",
        "window" | "menu" | "highlightText" | "btnHighlight" => "FFFFFF",
        "btnFace" | "menuBar" | "3dLight" => "F0F0F0",
        "btnShadow" | "3dDkShadow" => "A0A0A0",
        "grayText" => "6D6D6D",
        "highlight" | "hotLight" => "0078D7",
        "activeCaption" => "99B4D1",
        "inactiveCaption" => "BFCDDB",
        "infoBk" => "FFFFE1",
        "windowFrame" => "646464",
        _ => "000000",
    };
    Color::from_hex(hex).unwrap_or(Color::BLACK)
}

/// The resolved 12-slot palette of a theme
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemePalette {
    slots: [Option<Color>; 12],
}

impl ThemePalette {
    /// An empty palette; every lookup returns `None`
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `a:clrScheme` of a theme part
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut palette = Self::new();
        let mut reader = XmlParser::from_string_trimmed(content);
        let mut buf = Vec::new();
        let mut in_scheme = false;
        let mut current: Option<ThemeSlot> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = XmlParser::local_name(e);
                    if name == "clrScheme" {
                        in_scheme = true;
                    } else if in_scheme {
                        if current.is_none() {
                            current = ThemeSlot::ALL
                                .iter()
                                .copied()
                                .find(|s| s.scheme_name() == name);
                        } else if let Some(slot) = current {
                            palette.read_color_element(slot, &name, e);
                        }
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if let Some(slot) = current {
                        let name = XmlParser::local_name(e);
                        palette.read_color_element(slot, &name, e);
                    }
                }
                Ok(Event::End(ref e)) => {
                    let name = e.local_name();
                    let name = name.as_ref();
                    if name == b"clrScheme" {
                        in_scheme = false;
                        current = None;
                    } else if current.is_some_and(|s| s.scheme_name().as_bytes() == name) {
                        current = None;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XmlParser::markup_error(&reader, "theme", e)),
                _ => {}
            }
            buf.clear();
        }

        tracing::debug!(
            slots = palette.slots.iter().filter(|s| s.is_some()).count(),
            "theme palette parsed"
        );
        Ok(palette)
    }

    fn read_color_element(
        &mut self,
        slot: ThemeSlot,
        name: &str,
        e: &quick_xml::events::BytesStart,
    ) {
        if self.get(slot).is_some() {
            return;
        }
        let color = match name {
            "srgbClr" => XmlParser::val(e).and_then(|v| Color::from_hex(&v)),
            "sysClr" => Some(
                XmlParser::get_attribute(e, "lastClr")
                    .and_then(|v| Color::from_hex(&v))
                    .unwrap_or_else(|| {
                        system_color_default(&XmlParser::val(e).unwrap_or_default())
                    }),
            ),
            _ => None,
        };
        if let Some(color) = color {
            self.set(slot, color);
        }
    }

    pub fn set(&mut self, slot: ThemeSlot, color: Color) {
        self.slots[slot.index()] = Some(color);
    }

    pub fn get(&self, slot: ThemeSlot) -> Option<Color> {
        self.slots[slot.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Resolve a theme color reference to RGB
    ///
    /// `shade` darkens and `tint` lightens; when both are given only the
    /// shade is applied. Returns `None` for unknown names or empty slots.
    pub fn resolve(&self, name: &str, tint: Option<u8>, shade: Option<u8>) -> Option<Color> {
        let base = self.get(ThemeSlot::from_name(name)?)?;
        Some(match (shade, tint) {
            (Some(shade), _) => base.shaded(shade),
            (None, Some(tint)) => base.tinted(tint),
            (None, None) => base,
        })
    }

    /// Resolve the `color`/`themeColor`/`themeTint`/`themeShade` attribute
    /// group of a run color or shading element
    ///
    /// A theme reference that resolves wins over the literal value; `auto`
    /// and unparsable literals yield `None`.
    pub fn resolve_attributes(
        &self,
        literal: Option<&str>,
        theme_color: Option<&str>,
        theme_tint: Option<&str>,
        theme_shade: Option<&str>,
    ) -> Option<Color> {
        if let Some(name) = theme_color {
            let tint = theme_tint.and_then(XmlParser::parse_hex_byte);
            let shade = theme_shade.and_then(XmlParser::parse_hex_byte);
            if let Some(color) = self.resolve(name, tint, shade) {
                return Some(color);
            }
        }
        literal
            .filter(|v| !v.eq_ignore_ascii_case("auto"))
            .and_then(Color::from_hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window"/></a:lt1>
      <a:dk2><a:srgbClr val="44546A"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="4472C4"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst><a:solidFill><a:srgbClr val="123456"/></a:solidFill></a:fillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#;

    fn palette() -> ThemePalette {
        ThemePalette::parse(THEME).unwrap()
    }

    #[test]
    fn test_parse_all_slots() {
        let p = palette();
        for slot in ThemeSlot::ALL {
            assert!(p.get(slot).is_some(), "missing {:?}", slot);
        }
        assert_eq!(p.get(ThemeSlot::Accent1), Color::from_hex("4472C4"));
        assert_eq!(p.get(ThemeSlot::Dark1), Some(Color::BLACK));
        // sysClr without lastClr falls back to the system default
        assert_eq!(p.get(ThemeSlot::Light1), Some(Color::WHITE));
    }

    #[test]
    fn test_colors_outside_scheme_ignored() {
        let p = palette();
        assert!(!ThemeSlot::ALL
            .iter()
            .any(|s| p.get(*s) == Color::from_hex("123456")));
    }

    #[test]
    fn test_aliases_case_insensitive() {
        let p = palette();
        assert_eq!(p.resolve("Text1", None, None), p.get(ThemeSlot::Dark1));
        assert_eq!(p.resolve("BACKGROUND1", None, None), p.get(ThemeSlot::Light1));
        assert_eq!(p.resolve("text2", None, None), p.get(ThemeSlot::Dark2));
        assert_eq!(p.resolve("background2", None, None), p.get(ThemeSlot::Light2));
        assert_eq!(p.resolve("hyperlink", None, None), p.get(ThemeSlot::Hyperlink));
        assert_eq!(
            p.resolve("followedHyperlink", None, None),
            p.get(ThemeSlot::FollowedHyperlink)
        );
        assert_eq!(p.resolve("accent7", None, None), None);
    }

    #[test]
    fn test_shade_takes_priority() {
        let p = palette();
        let shaded = p.resolve("accent1", None, Some(0x80));
        assert_eq!(p.resolve("accent1", Some(0x80), Some(0x80)), shaded);
    }

    #[test]
    fn test_empty_palette_resolves_nothing() {
        let p = ThemePalette::new();
        assert!(p.is_empty());
        assert_eq!(p.resolve("accent1", None, None), None);
    }

    #[test]
    fn test_attribute_group() {
        let p = palette();
        assert_eq!(
            p.resolve_attributes(Some("FF0000"), Some("accent1"), None, None),
            Color::from_hex("4472C4")
        );
        assert_eq!(
            p.resolve_attributes(Some("FF0000"), Some("unknown"), None, None),
            Color::from_hex("FF0000")
        );
        assert_eq!(p.resolve_attributes(Some("auto"), None, None, None), None);
        assert_eq!(
            p.resolve_attributes(None, Some("accent1"), None, Some("00")),
            Some(Color::BLACK)
        );
    }

    fn slot_name() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5",
            "accent6", "hlink", "folHlink", "text1", "background1",
        ])
    }

    proptest! {
        #[test]
        fn prop_resolution_is_deterministic(name in slot_name(), tint in any::<u8>()) {
            let p = palette();
            let first = p.resolve(name, Some(tint), None);
            let _ = p.resolve("accent2", None, Some(tint));
            prop_assert_eq!(first, p.resolve(name, Some(tint), None));
        }

        #[test]
        fn prop_boundaries(name in slot_name()) {
            let p = palette();
            let base = p.resolve(name, None, None).unwrap();
            prop_assert_eq!(p.resolve(name, None, Some(255)), Some(base));
            prop_assert_eq!(p.resolve(name, Some(255), None), Some(base));
            prop_assert_eq!(p.resolve(name, None, Some(0)), Some(Color::BLACK));
            prop_assert_eq!(p.resolve(name, Some(0), None), Some(Color::WHITE));
        }

        #[test]
        fn prop_shade_never_lightens(name in slot_name(), shade in any::<u8>()) {
            let p = palette();
            let base = p.resolve(name, None, None).unwrap();
            let shaded = p.resolve(name, None, Some(shade)).unwrap();
            prop_assert!(shaded.r <= base.r && shaded.g <= base.g && shaded.b <= base.b);
        }
    }
}
