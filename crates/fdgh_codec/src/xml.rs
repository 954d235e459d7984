//! Conversion between [`Document`] trees and XML text.

use std::io::Write;

use quick_xml::{
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};
use tracing::instrument;

use crate::{
    document::{Document, Element},
    error::{Error, Result},
};

fn xml_error(error: impl std::fmt::Display) -> Error {
    Error::Xml(error.to_string())
}

impl Document {
    /// Render the document as indented XML with a UTF-8 declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut out = Vec::new();
        self.write_xml(&mut out)?;
        String::from_utf8(out).map_err(xml_error)
    }

    /// Write the document as indented XML with a UTF-8 declaration.
    pub fn write_xml<W: Write>(&self, writer: W) -> Result<()> {
        let mut xml = Writer::new_with_indent(writer, b' ', 2);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_error)?;
        write_element(&mut xml, &self.root)?;
        xml.into_inner().write_all(b"\n")?;
        Ok(())
    }

    /// Parse XML text into a document.
    ///
    /// Text made only of whitespace is treated as formatting and dropped, unless it is inside a
    /// CDATA section; any other text is kept exactly as written. Comments and processing
    /// instructions are ignored.
    #[instrument(skip_all, fields(len = xml.len()), err)]
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::Xml(format!("{e} (at byte {})", reader.error_position()))
            })?;

            match event {
                Event::Start(start) => stack.push(start_element(&start)?),
                Event::Empty(start) => {
                    let element = start_element(&start)?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unbalanced end tag".to_owned()))?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(xml_error)?;
                    if !text.trim().is_empty() {
                        append_text(&mut stack, &text);
                    }
                }
                Event::CData(data) => {
                    let raw = data.into_inner();
                    let text = std::str::from_utf8(&raw).map_err(xml_error)?;
                    append_text(&mut stack, text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::Xml(format!("element <{}> is never closed", open.name)));
        }

        root.map(Document::new)
            .ok_or_else(|| Error::Xml("document has no root element".to_owned()))
    }
}

fn write_element<W: Write>(xml: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        xml.write_event(Event::Empty(start)).map_err(xml_error)?;
        return Ok(());
    }

    xml.write_event(Event::Start(start)).map_err(xml_error)?;
    // Whitespace-only text would read back as indentation
    match &element.text {
        Some(text) if text.trim().is_empty() => xml
            .write_event(Event::CData(BytesCData::new(text.as_str())))
            .map_err(xml_error)?,
        Some(text) => xml
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)?,
        None => {}
    }
    for child in &element.children {
        write_element(xml, child)?;
    }
    xml.write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(xml_error)?;

    Ok(())
}

fn start_element(start: &BytesStart) -> Result<Element> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref()).map_err(xml_error)?;
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_error)?;
        let value = attr.unescape_value().map_err(xml_error)?;
        element.set_attr(key, value);
    }

    Ok(element)
}

fn close_element(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(Error::Xml(format!(
                "second root element <{}>",
                element.name
            )))
        }
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        match &mut current.text {
            Some(existing) => existing.push_str(text),
            None => current.set_text(text),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};

    use crate::document::{Document, Element};
    use crate::error::{Error, Result};

    fn sample() -> Document {
        Document::new(
            Element::new("fdgh")
                .with_attr("endian", "big")
                .with_child(
                    Element::new("worldmap")
                        .with_attr("value", "2")
                        .with_child(Element::new("room").with_text("Cave & Sea")),
                )
                .with_child(
                    Element::new("rooms")
                        .with_child(Element::new("room").with_attr("name", "<odd> \"name\""))
                        .with_child(Element::new("room").with_attr("name", "empty").with_child(Element::new("asset"))),
                ),
        )
    }

    #[test]
    fn write_indented() -> Result<()> {
        let expected = r#"<?xml version="1.0" encoding="utf-8"?>
<fdgh endian="big">
  <worldmap value="2">
    <room>Cave &amp; Sea</room>
  </worldmap>
  <rooms>
    <room name="&lt;odd&gt; &quot;name&quot;"/>
    <room name="empty">
      <asset/>
    </room>
  </rooms>
</fdgh>
"#;
        assert_str_eq!(sample().to_xml_string()?, expected);
        Ok(())
    }

    #[test]
    fn text_round_trip() -> Result<()> {
        let document = sample();
        let parsed = Document::from_xml_str(&document.to_xml_string()?)?;
        assert_eq!(parsed, document);
        Ok(())
    }

    #[test]
    fn parse_keeps_significant_whitespace() -> Result<()> {
        let document = Document::from_xml_str(
            "<a>\n  <b> padded </b>\n  <c><![CDATA[x<y]]></c>\n  <d>   </d>\n</a>",
        )?;

        let root = &document.root;
        assert_eq!(root.text, None);
        assert_eq!(root.child("b").map(Element::text), Some(" padded "));
        assert_eq!(root.child("c").map(Element::text), Some("x<y"));
        assert_eq!(root.child("d").and_then(|d| d.text.clone()), None);
        Ok(())
    }

    #[test]
    fn whitespace_text_survives_as_cdata() -> Result<()> {
        let document = Document::new(
            Element::new("assets")
                .with_child(Element::new("asset").with_text("  "))
                .with_child(Element::new("asset").with_text("\t")),
        );

        let text = document.to_xml_string()?;
        assert!(text.contains("<![CDATA[  ]]>"), "{text}");
        assert_eq!(Document::from_xml_str(&text)?, document);
        Ok(())
    }

    #[test]
    fn parse_prefixed_names() -> Result<()> {
        let document = Document::from_xml_str(r#"<ns:a ns:b="1"><ns:c/></ns:a>"#)?;
        assert_eq!(document.root.name, "ns:a");
        assert_eq!(document.root.attr("ns:b"), Some("1"));
        assert!(document.root.child("ns:c").is_some());
        Ok(())
    }

    #[test]
    fn reject_malformed_text() {
        for xml in ["", "<a>", "<a></b>", "<a/><b/>", "<a x=\"1\" x=\"2\"/>"] {
            assert!(
                matches!(Document::from_xml_str(xml), Err(Error::Xml(_))),
                "{xml:?} should not parse"
            );
        }
    }
}
