//! Raw XML node types for round-trip preservation

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::xml::{collect_attrs, element_name, local_part};

/// Raw XML node, kept verbatim for everything the document model does not interpret
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawXmlNode {
    /// Element node
    Element(RawXmlElement),
    /// Text node (unescaped)
    Text(String),
    /// Comment node (as written)
    Comment(String),
}

/// Raw XML element with attributes and children
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawXmlElement {
    /// Qualified element name, e.g. `w:pageBreakBefore`
    pub name: String,
    /// Attributes as unescaped (name, value) pairs
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<RawXmlNode>,
    /// Whether this was a self-closing element
    pub self_closing: bool,
}

impl RawXmlElement {
    /// Create a new empty (self-closing) element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Read a complete element, starting right after its start tag
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let name = element_name(start);
        let attributes = collect_attrs(start)?;
        let keep_blank = preserves_space(&name, &attributes);

        let mut children = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let child = Self::from_reader(reader, &e)?;
                    children.push(RawXmlNode::Element(child));
                }
                Event::Empty(e) => {
                    children.push(RawXmlNode::Element(Self::from_empty(&e)?));
                }
                Event::Text(t) => {
                    let text = t.unescape()?.into_owned();
                    if keep_blank || !text.trim().is_empty() {
                        children.push(RawXmlNode::Text(text));
                    }
                }
                Event::CData(c) => {
                    children.push(RawXmlNode::Text(String::from_utf8_lossy(&c).into_owned()));
                }
                Event::Comment(c) => {
                    children.push(RawXmlNode::Comment(String::from_utf8_lossy(&c).into_owned()));
                }
                Event::End(e) => {
                    if e.name().as_ref() == name.as_bytes() {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(Error::MalformedDocument(format!(
                        "unexpected end of input inside <{}>",
                        name
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            name,
            attributes,
            children,
            self_closing: false,
        })
    }

    /// Create from an empty element tag
    pub fn from_empty(e: &BytesStart) -> Result<Self> {
        Ok(Self {
            name: element_name(e),
            attributes: collect_attrs(e)?,
            children: Vec::new(),
            self_closing: true,
        })
    }

    /// Local part of the element name (`pStyle` for `w:pStyle`)
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Look up an attribute by qualified name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The `w:val` attribute (common in OOXML)
    pub fn w_val(&self) -> Option<&str> {
        self.attr("w:val").or_else(|| self.attr("val"))
    }

    /// Write element to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for child in &self.children {
                child.write_to(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        }

        Ok(())
    }

    /// Add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: RawXmlElement) -> Self {
        self.children.push(RawXmlNode::Element(child));
        self
    }
}

impl RawXmlNode {
    /// The element, if this node is one
    pub fn as_element(&self) -> Option<&RawXmlElement> {
        match self {
            RawXmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Write node to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RawXmlNode::Element(e) => e.write_to(writer),
            RawXmlNode::Text(t) => {
                writer.write_event(Event::Text(BytesText::new(t)))?;
                Ok(())
            }
            RawXmlNode::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?;
                Ok(())
            }
        }
    }
}

/// Text-bearing elements whose whitespace-only content is significant
fn preserves_space(name: &str, attributes: &[(String, String)]) -> bool {
    matches!(
        local_part(name),
        "t" | "delText" | "instrText" | "delInstrText"
    ) || attributes
        .iter()
        .any(|(key, value)| key == "xml:space" && value == "preserve")
}
