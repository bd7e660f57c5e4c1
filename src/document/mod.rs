//! Document model for the main document part (word/document.xml)
//!
//! The tree is built fresh from markup, mutated in place by the edit layer and
//! serialized back. Everything the model does not interpret is kept as raw XML
//! so that a parse/serialize cycle preserves the document structurally.

mod body;
mod paragraph;
mod properties;
mod run;

pub use body::{BlockContent, Body};
pub use paragraph::{InlineContainer, Paragraph, ParagraphContent};
pub use properties::PropertyBag;
pub use run::{Run, RunContent};

use crate::error::{Error, Result};
use crate::xml::{self, collect_attrs, element_name, w_local, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// XML declaration of the part
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// Parsed main document part
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// XML declaration, if the source had one
    declaration: Option<Declaration>,
    /// Root element name (`w:document`)
    root_name: String,
    /// Root attributes, namespace declarations included
    root_attributes: Vec<(String, String)>,
    /// Root children before the body (e.g. `w:background`)
    leading: Vec<RawXmlNode>,
    /// Document body
    pub body: Body,
    /// Root children after the body
    trailing: Vec<RawXmlNode>,
}

impl Document {
    /// Parse the markup of the main document part.
    ///
    /// Fails with [`Error::MalformedDocument`] if the markup is not well-formed
    /// or the root does not bind `w:` to WordprocessingML.
    pub fn parse(markup: &str) -> Result<Self> {
        let markup = markup.strip_prefix('\u{feff}').unwrap_or(markup);
        parse_document_xml(markup).map_err(Error::into_malformed)
    }

    /// Parse from raw part bytes (UTF-8)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let markup = std::str::from_utf8(bytes).map_err(|e| Error::from(e).into_malformed())?;
        Self::parse(markup)
    }

    /// Serialize back to markup
    pub fn to_xml(&self) -> Result<String> {
        serialize_document_xml(self).map_err(Error::into_malformed)
    }

    /// Serialize back to part bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_xml().map(String::into_bytes)
    }

    /// Get all paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.paragraphs()
    }

    /// Get paragraph count
    pub fn paragraph_count(&self) -> usize {
        self.body.paragraphs().count()
    }

    /// Get all text in the document, one line per paragraph
    pub fn text(&self) -> String {
        self.body
            .paragraphs()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse document.xml content
fn parse_document_xml(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut declaration = None;

    // Prolog up to the root start tag
    let root = loop {
        match reader.read_event_into(&mut buf)? {
            Event::Decl(d) => declaration = Some(read_declaration(&d)?),
            Event::Start(e) => break e.into_owned(),
            Event::Empty(_) => {
                return Err(Error::MalformedDocument("empty root element".into()));
            }
            Event::Text(t) if !t.unescape()?.trim().is_empty() => {
                return Err(Error::MalformedDocument("text before root element".into()));
            }
            Event::Eof => return Err(Error::MalformedDocument("no root element".into())),
            _ => {}
        }
        buf.clear();
    };
    buf.clear();

    if w_local(root.name()) != b"document" {
        return Err(Error::MalformedDocument(format!(
            "unexpected root element <{}>",
            element_name(&root)
        )));
    }
    let root_attributes = collect_attrs(&root)?;
    if !xml::binds_wordprocessing_ml(&root_attributes) {
        return Err(Error::MalformedDocument(
            "root element does not declare the WordprocessingML namespace".into(),
        ));
    }

    let mut leading = Vec::new();
    let mut trailing = Vec::new();
    let mut body = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if w_local(e.name()) == b"body" {
                    body = Some(Body::from_reader(&mut reader)?);
                } else {
                    let raw = RawXmlNode::Element(RawXmlElement::from_reader(&mut reader, &e)?);
                    if body.is_some() {
                        trailing.push(raw);
                    } else {
                        leading.push(raw);
                    }
                }
            }
            Event::Empty(e) => {
                if w_local(e.name()) == b"body" {
                    body = Some(Body::default());
                } else {
                    let raw = RawXmlNode::Element(RawXmlElement::from_empty(&e)?);
                    if body.is_some() {
                        trailing.push(raw);
                    } else {
                        leading.push(raw);
                    }
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(Error::MalformedDocument(
                    "unexpected end of input inside the root element".into(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }
    buf.clear();

    // Nothing but comments and whitespace may follow the root
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(_) | Event::Empty(_) | Event::End(_) => {
                return Err(Error::MalformedDocument(
                    "content after the root element".into(),
                ))
            }
            Event::Text(t) if !t.unescape()?.trim().is_empty() => {
                return Err(Error::MalformedDocument("text after the root element".into()));
            }
            _ => {}
        }
        buf.clear();
    }

    let body = body.ok_or_else(|| Error::MalformedDocument("missing w:body element".into()))?;

    Ok(Document {
        declaration,
        root_name: element_name(&root),
        root_attributes,
        leading,
        body,
        trailing,
    })
}

fn read_declaration(decl: &BytesDecl) -> Result<Declaration> {
    let text = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();
    Ok(Declaration {
        version: text(&decl.version()?),
        encoding: decl.encoding().transpose()?.map(|e| text(&e)),
        standalone: decl.standalone().transpose()?.map(|s| text(&s)),
    })
}

/// Serialize a document to document.xml content
fn serialize_document_xml(doc: &Document) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    if let Some(decl) = &doc.declaration {
        writer.write_event(Event::Decl(BytesDecl::new(
            &decl.version,
            decl.encoding.as_deref(),
            decl.standalone.as_deref(),
        )))?;
    }

    let mut root = BytesStart::new(doc.root_name.as_str());
    for (key, value) in &doc.root_attributes {
        root.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    for node in &doc.leading {
        node.write_to(&mut writer)?;
    }
    doc.body.write_to(&mut writer)?;
    for node in &doc.trailing {
        node.write_to(&mut writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new(doc.root_name.as_str())))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| Error::MalformedDocument(e.to_string()))
}
