// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Thin event writer for package XML parts.

use std::borrow::Cow;
use std::io::Cursor;

use folio_core::{FolioError, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Writes one XML part. Every write error is an assembly failure.
pub(crate) struct PartWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl PartWriter {
    /// Start a standalone UTF-8 part with its XML declaration.
    pub(crate) fn new() -> Result<Self> {
        let mut part = Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        };
        part.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(part)
    }

    pub(crate) fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let attrs = safe_attributes(attrs);
        self.write(Event::Start(
            BytesStart::new(name).with_attributes(attrs.iter().map(|(k, v)| (*k, v.as_ref()))),
        ))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let attrs = safe_attributes(attrs);
        self.write(Event::Empty(
            BytesStart::new(name).with_attributes(attrs.iter().map(|(k, v)| (*k, v.as_ref()))),
        ))
    }

    /// Escaped character data. Characters XML 1.0 cannot carry are dropped.
    pub(crate) fn text(&mut self, text: &str) -> Result<()> {
        let text = xml_safe(text);
        self.write(Event::Text(BytesText::new(&text)))
    }

    /// `<name attrs>text</name>`
    pub(crate) fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<()> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| FolioError::Package(format!("XML write failed: {e}")))
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

/// Attribute values go through the same character filter as text.
fn safe_attributes<'a>(attrs: &[(&'a str, &'a str)]) -> Vec<(&'a str, Cow<'a, str>)> {
    attrs.iter().map(|(key, value)| (*key, xml_safe(value))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(build: impl FnOnce(&mut PartWriter) -> Result<()>) -> String {
        let mut part = PartWriter::new().unwrap();
        build(&mut part).unwrap();
        String::from_utf8(part.finish()).unwrap()
    }

    #[test]
    fn declaration_is_standalone_utf8() {
        let xml = render(|_| Ok(()));
        assert_eq!(
            xml,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#
        );
    }

    #[test]
    fn text_is_escaped() {
        let xml = render(|p| p.text_element("w:t", &[], "a < b & c"));
        assert!(xml.ends_with("<w:t>a &lt; b &amp; c</w:t>"));
    }

    #[test]
    fn control_characters_are_dropped() {
        let xml = render(|p| p.text_element("w:t", &[], "bell\u{7}\ttab"));
        assert!(xml.ends_with("<w:t>bell\ttab</w:t>"));
    }

    #[test]
    fn attributes_keep_their_order() {
        let xml = render(|p| p.empty("w:ind", &[("w:left", "720"), ("w:hanging", "360")]));
        assert!(xml.ends_with(r#"<w:ind w:left="720" w:hanging="360"/>"#));
    }

    #[test]
    fn control_characters_are_dropped_from_attributes() {
        let xml = render(|p| {
            p.empty("Relationship", &[("Target", "https://example.com/a\u{1}b")])
        });
        assert!(xml.ends_with(r#"<Relationship Target="https://example.com/ab"/>"#));
        assert!(!xml.contains('\u{1}'));
    }
}
