//! Document body and block-level content

use crate::document::Paragraph;
use crate::error::{Error, Result};
use crate::xml::{w_local, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Block-level content in a document body
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockContent {
    /// Paragraph
    Paragraph(Paragraph),
    /// Tables, content controls, ... (preserved for round-trip)
    Unknown(RawXmlNode),
}

/// Document body (w:body)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Body {
    /// Block-level content in reading order
    pub content: Vec<BlockContent>,
    /// Section properties (last sectPr in body)
    pub section_properties: Option<RawXmlNode>,
}

impl Body {
    /// Parse body from XML reader (after w:body start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut body = Body::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match w_local(e.name()) {
                    b"p" => {
                        let para = Paragraph::from_reader(reader, &e)?;
                        body.content.push(BlockContent::Paragraph(para));
                    }
                    b"sectPr" => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        body.section_properties = Some(RawXmlNode::Element(raw));
                    }
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        body.content.push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::Empty(e) => match w_local(e.name()) {
                    b"p" => {
                        let para = Paragraph::from_empty(&e)?;
                        body.content.push(BlockContent::Paragraph(para));
                    }
                    b"sectPr" => {
                        let raw = RawXmlElement::from_empty(&e)?;
                        body.section_properties = Some(RawXmlNode::Element(raw));
                    }
                    _ => {
                        let raw = RawXmlElement::from_empty(&e)?;
                        body.content.push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::Comment(c) => {
                    let comment = String::from_utf8_lossy(&c).into_owned();
                    body.content.push(BlockContent::Unknown(RawXmlNode::Comment(comment)));
                }
                Event::End(e) => {
                    if w_local(e.name()) == b"body" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(Error::MalformedDocument(
                        "unexpected end of input inside <w:body>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(body)
    }

    /// Paragraph at a block index
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        match self.content.get(index)? {
            BlockContent::Paragraph(p) => Some(p),
            BlockContent::Unknown(_) => None,
        }
    }

    /// Mutable paragraph at a block index
    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        match self.content.get_mut(index)? {
            BlockContent::Paragraph(p) => Some(p),
            BlockContent::Unknown(_) => None,
        }
    }

    /// All paragraphs with their block indices, in reading order
    pub fn indexed_paragraphs(&self) -> impl DoubleEndedIterator<Item = (usize, &Paragraph)> {
        self.content.iter().enumerate().filter_map(|(i, c)| match c {
            BlockContent::Paragraph(p) => Some((i, p)),
            BlockContent::Unknown(_) => None,
        })
    }

    /// Get all paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.indexed_paragraphs().map(|(_, p)| p)
    }

    /// Insert a block right after `index` (or at the end if `index` is past it)
    pub fn insert_after(&mut self, index: usize, block: BlockContent) {
        let at = (index + 1).min(self.content.len());
        self.content.insert(at, block);
    }

    /// Remove the block at `index`
    pub fn remove(&mut self, index: usize) -> Option<BlockContent> {
        (index < self.content.len()).then(|| self.content.remove(index))
    }

    /// Add a paragraph
    pub fn add_paragraph(&mut self, para: Paragraph) {
        self.content.push(BlockContent::Paragraph(para));
    }

    /// Write body to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:body")))?;

        for content in &self.content {
            content.write_to(writer)?;
        }

        if let Some(sect_pr) = &self.section_properties {
            sect_pr.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:body")))?;
        Ok(())
    }
}

impl BlockContent {
    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            BlockContent::Paragraph(para) => para.write_to(writer),
            BlockContent::Unknown(node) => node.write_to(writer),
        }
    }
}

impl From<Paragraph> for BlockContent {
    fn from(para: Paragraph) -> Self {
        BlockContent::Paragraph(para)
    }
}
