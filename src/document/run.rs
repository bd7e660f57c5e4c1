//! Run element (w:r) - a contiguous run of text with uniform formatting

use crate::document::PropertyBag;
use crate::error::{Error, Result};
use crate::xml::{collect_attrs, w_local, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Run element (w:r)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Run {
    /// Run properties (w:rPr), carried verbatim
    pub properties: Option<PropertyBag>,
    /// Run content
    pub content: Vec<RunContent>,
    /// Attributes (w:rsid* etc.)
    pub attributes: Vec<(String, String)>,
}

/// Content within a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunContent {
    /// Text (w:t)
    Text(String),
    /// Tab (w:tab), one `\t` of text
    Tab,
    /// Anything else (breaks, fields, drawings); no text
    Unknown(RawXmlNode),
}

impl RunContent {
    /// Length of the text this item contributes, in bytes
    pub fn text_len(&self) -> usize {
        match self {
            RunContent::Text(t) => t.len(),
            RunContent::Tab => 1,
            RunContent::Unknown(_) => 0,
        }
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RunContent::Text(text) => {
                let mut start = BytesStart::new("w:t");
                if needs_preserve(text) {
                    start.push_attribute(("xml:space", "preserve"));
                }
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("w:t")))?;
            }
            RunContent::Tab => {
                writer.write_event(Event::Empty(BytesStart::new("w:tab")))?;
            }
            RunContent::Unknown(node) => node.write_to(writer)?,
        }
        Ok(())
    }
}

impl Run {
    /// Create a new run with text
    pub fn new(text: impl Into<String>) -> Self {
        Run {
            content: vec![RunContent::Text(text.into())],
            ..Default::default()
        }
    }

    /// Create a new run with text and copied properties
    pub fn styled(text: impl Into<String>, properties: Option<PropertyBag>) -> Self {
        Run {
            properties: properties.filter(|p| !p.is_empty()),
            ..Run::new(text)
        }
    }

    /// Parse from reader (after w:r start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut run = Run {
            attributes: collect_attrs(start)?,
            ..Default::default()
        };
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match w_local(e.name()) {
                    b"rPr" => {
                        run.properties = PropertyBag::from_reader(reader, &e)?;
                    }
                    b"t" => {
                        let text = read_text_content(reader)?;
                        run.content.push(RunContent::Text(text));
                    }
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        run.content.push(RunContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::Empty(e) => match w_local(e.name()) {
                    b"rPr" => {}
                    b"t" => run.content.push(RunContent::Text(String::new())),
                    b"tab" => run.content.push(RunContent::Tab),
                    _ => {
                        let raw = RawXmlElement::from_empty(&e)?;
                        run.content.push(RunContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::End(e) => {
                    if w_local(e.name()) == b"r" {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(Error::MalformedDocument(
                        "unexpected end of input inside <w:r>".into(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(run)
    }

    /// Create from empty element
    pub fn from_empty(start: &BytesStart) -> Result<Self> {
        Ok(Run {
            attributes: collect_attrs(start)?,
            ..Default::default()
        })
    }

    /// Get all text in this run
    pub fn text(&self) -> String {
        let mut result = String::new();
        for content in &self.content {
            match content {
                RunContent::Text(t) => result.push_str(t),
                RunContent::Tab => result.push('\t'),
                RunContent::Unknown(_) => {}
            }
        }
        result
    }

    /// Length of [`Run::text`] in bytes
    pub fn text_len(&self) -> usize {
        self.content.iter().map(RunContent::text_len).sum()
    }

    /// Whether the run holds nothing at all (no text, no other content)
    pub fn is_blank(&self) -> bool {
        self.content.iter().all(|c| matches!(c, RunContent::Text(t) if t.is_empty()))
    }

    /// Check if bold
    pub fn bold(&self) -> bool {
        self.properties.as_ref().is_some_and(PropertyBag::is_bold)
    }

    /// Get underline type
    pub fn underline(&self) -> Option<&str> {
        self.properties.as_ref()?.underline()
    }

    /// Split at a byte offset into the run's text.
    ///
    /// Both halves keep this run's properties and attributes. Text items that
    /// straddle the offset are cut (snapped back to a char boundary); other
    /// content goes to the side it sits on. Empty text pieces are dropped.
    pub fn split_at(&self, offset: usize) -> (Run, Run) {
        let mut before = Run {
            content: Vec::new(),
            ..self.clone()
        };
        let mut after = before.clone();
        let mut pos = 0;

        for item in &self.content {
            let len = item.text_len();
            match item {
                RunContent::Text(text) if pos < offset && pos + len > offset => {
                    let cut = floor_char_boundary(text, offset - pos);
                    let (head, tail) = text.split_at(cut);
                    if !head.is_empty() {
                        before.content.push(RunContent::Text(head.to_string()));
                    }
                    if !tail.is_empty() {
                        after.content.push(RunContent::Text(tail.to_string()));
                    }
                }
                RunContent::Text(text) if text.is_empty() => {}
                _ if pos + len <= offset && (len > 0 || pos < offset) => {
                    before.content.push(item.clone());
                }
                _ => after.content.push(item.clone()),
            }
            pos += len;
        }

        (before, after)
    }

    /// Replace the text in `start..end` (byte offsets into [`Run::text`]).
    ///
    /// Only text items are edited; the replacement lands in the first text
    /// item touching the range. Returns whether the replacement was placed.
    pub(crate) fn replace_text(&mut self, start: usize, end: usize, replacement: &str) -> bool {
        let mut pos = 0;
        let mut placed = false;

        for item in &mut self.content {
            let len = item.text_len();
            if let RunContent::Text(text) = item {
                let overlaps = pos < end && pos + len > start;
                let touches = !placed && pos <= start && start <= pos + len;
                if overlaps || touches {
                    let a = start.saturating_sub(pos).min(len);
                    let b = end.saturating_sub(pos).min(len);
                    let mut edited = String::with_capacity(len + replacement.len());
                    edited.push_str(&text[..a]);
                    if !placed {
                        edited.push_str(replacement);
                        placed = true;
                    }
                    edited.push_str(&text[b..]);
                    *text = edited;
                }
            }
            pos += len;
        }

        placed
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:r");
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.properties.is_none() && self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(props) = &self.properties {
            props.write_to(writer)?;
        }
        for content in &self.content {
            content.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:r")))?;

        Ok(())
    }
}

/// Whether a `w:t` needs `xml:space="preserve"` to keep its whitespace
fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains("  ")
}

/// Largest char boundary in `text` that is `<= index`
fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Read text content from w:t element
fn read_text_content<R: BufRead>(reader: &mut Reader<R>) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(e) => {
                if w_local(e.name()) == b"t" {
                    break;
                }
            }
            Event::Eof => {
                return Err(Error::MalformedDocument(
                    "unexpected end of input inside <w:t>".into(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
