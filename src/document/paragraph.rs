//! Paragraph element (w:p)

use crate::document::{PropertyBag, Run};
use crate::error::{Error, Result};
use crate::xml::{collect_attrs, element_name, local_part, w_local, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Inline elements whose runs belong to the paragraph text
const CONTAINERS: &[&[u8]] = &[
    b"hyperlink",
    b"smartTag",
    b"customXml",
    b"fldSimple",
    b"sdt",
    b"sdtContent",
    b"ins",
    b"dir",
    b"bdo",
];

/// Paragraph element (w:p)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Paragraph properties (w:pPr), carried verbatim
    pub properties: Option<PropertyBag>,
    /// Inline content in document order
    pub content: Vec<ParagraphContent>,
    /// Attributes (w:rsid*, w14:paraId, ...)
    pub attributes: Vec<(String, String)>,
}

/// Content within a paragraph
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParagraphContent {
    /// Text run
    Run(Run),
    /// Hyperlink, smart tag, simple field, content control, ...
    Container(InlineContainer),
    /// Bookmarks, proofing marks, comments, ... (preserved)
    Unknown(RawXmlNode),
}

/// Inline element wrapping runs (w:hyperlink, w:smartTag, w:fldSimple, w:sdt, ...)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineContainer {
    /// Qualified element name, e.g. `w:hyperlink`
    pub name: String,
    /// Attributes (r:id, w:anchor, w:instr, ...)
    pub attributes: Vec<(String, String)>,
    /// Nested inline content
    pub content: Vec<ParagraphContent>,
}

impl ParagraphContent {
    /// Length of the text this item contributes to [`Paragraph::text`]
    pub fn text_len(&self) -> usize {
        match self {
            ParagraphContent::Run(run) => run.text_len(),
            ParagraphContent::Container(container) => container.text_len(),
            ParagraphContent::Unknown(_) => 0,
        }
    }

    /// Runs in this item, nested ones included, in document order
    pub fn runs(&self) -> Box<dyn Iterator<Item = &Run> + '_> {
        match self {
            ParagraphContent::Run(run) => Box::new(std::iter::once(run)),
            ParagraphContent::Container(container) => {
                Box::new(container.content.iter().flat_map(|c| c.runs()))
            }
            ParagraphContent::Unknown(_) => Box::new(std::iter::empty()),
        }
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            ParagraphContent::Run(run) => run.write_to(writer),
            ParagraphContent::Container(container) => container.write_to(writer),
            ParagraphContent::Unknown(node) => node.write_to(writer),
        }
    }
}

impl From<Run> for ParagraphContent {
    fn from(run: Run) -> Self {
        ParagraphContent::Run(run)
    }
}

impl From<InlineContainer> for ParagraphContent {
    fn from(container: InlineContainer) -> Self {
        ParagraphContent::Container(container)
    }
}

impl InlineContainer {
    /// Parse from reader (after the start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let name = element_name(start);
        let attributes = collect_attrs(start)?;
        let content = read_content(reader, local_part(&name).as_bytes(), None)?;
        Ok(InlineContainer {
            name,
            attributes,
            content,
        })
    }

    /// Create from empty element
    pub fn from_empty(start: &BytesStart) -> Result<Self> {
        Ok(InlineContainer {
            name: element_name(start),
            attributes: collect_attrs(start)?,
            content: Vec::new(),
        })
    }

    /// Local element name, e.g. `hyperlink`
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Whether the element must stay whole when its paragraph is split:
    /// fields, content controls and tracked insertions are never duplicated
    pub fn is_atomic(&self) -> bool {
        matches!(self.local_name(), "fldSimple" | "sdt" | "ins")
    }

    /// Length of the text of the nested runs in bytes
    pub fn text_len(&self) -> usize {
        self.content.iter().map(ParagraphContent::text_len).sum()
    }

    /// Same element and attributes around other content
    pub fn with_content(&self, content: Vec<ParagraphContent>) -> Self {
        InlineContainer {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            content,
        }
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for content in &self.content {
            content.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;

        Ok(())
    }
}

/// Read inline content up to `</w:{end}>`.
///
/// A `w:pPr` child is parsed into `properties` when one is given and kept
/// raw otherwise.
fn read_content<R: BufRead>(
    reader: &mut Reader<R>,
    end: &[u8],
    mut properties: Option<&mut Option<PropertyBag>>,
) -> Result<Vec<ParagraphContent>> {
    let mut content = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match w_local(e.name()) {
                b"pPr" if properties.is_some() => {
                    let bag = PropertyBag::from_reader(reader, &e)?;
                    if let Some(slot) = properties.as_mut() {
                        **slot = bag;
                    }
                }
                b"r" => content.push(ParagraphContent::Run(Run::from_reader(reader, &e)?)),
                local if CONTAINERS.contains(&local) => {
                    let container = InlineContainer::from_reader(reader, &e)?;
                    content.push(ParagraphContent::Container(container));
                }
                _ => {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    content.push(ParagraphContent::Unknown(RawXmlNode::Element(raw)));
                }
            },
            Event::Empty(e) => match w_local(e.name()) {
                b"pPr" if properties.is_some() => {}
                b"r" => content.push(ParagraphContent::Run(Run::from_empty(&e)?)),
                local if CONTAINERS.contains(&local) => {
                    let container = InlineContainer::from_empty(&e)?;
                    content.push(ParagraphContent::Container(container));
                }
                _ => {
                    let raw = RawXmlElement::from_empty(&e)?;
                    content.push(ParagraphContent::Unknown(RawXmlNode::Element(raw)));
                }
            },
            Event::Comment(c) => {
                let comment = String::from_utf8_lossy(&c).into_owned();
                content.push(ParagraphContent::Unknown(RawXmlNode::Comment(comment)));
            }
            Event::End(e) => {
                if w_local(e.name()) == end {
                    break;
                }
            }
            Event::Eof => {
                return Err(Error::MalformedDocument(format!(
                    "unexpected end of input inside <w:{}>",
                    String::from_utf8_lossy(end)
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(content)
}

/// Rewrite `start..end` across `content`, advancing `pos` past it
fn replace_in(
    content: &mut [ParagraphContent],
    (start, end): (usize, usize),
    replacement: &str,
    pos: &mut usize,
    placed: &mut bool,
) {
    for item in content {
        match item {
            ParagraphContent::Run(run) => {
                let len = run.text_len();
                let overlaps = *pos < end && *pos + len > start;
                let insertion_point =
                    start == end && !*placed && *pos <= start && start <= *pos + len;
                if overlaps || insertion_point {
                    let piece = if *placed { "" } else { replacement };
                    let local_start = start.saturating_sub(*pos).min(len);
                    let local_end = end.saturating_sub(*pos).min(len);
                    *placed |= run.replace_text(local_start, local_end, piece);
                }
                *pos += len;
            }
            ParagraphContent::Container(container) => {
                replace_in(&mut container.content, (start, end), replacement, pos, placed);
            }
            ParagraphContent::Unknown(_) => {}
        }
    }
}

impl Paragraph {
    /// Create a paragraph from properties and runs
    pub fn with_runs(properties: Option<PropertyBag>, runs: impl IntoIterator<Item = Run>) -> Self {
        Paragraph {
            properties,
            content: runs.into_iter().map(ParagraphContent::Run).collect(),
            attributes: Vec::new(),
        }
    }

    /// Parse paragraph from reader (after w:p start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let attributes = collect_attrs(start)?;
        let mut properties = None;
        let content = read_content(reader, b"p", Some(&mut properties))?;

        Ok(Paragraph {
            properties,
            content,
            attributes,
        })
    }

    /// Create from empty element
    pub fn from_empty(start: &BytesStart) -> Result<Self> {
        Ok(Paragraph {
            attributes: collect_attrs(start)?,
            ..Default::default()
        })
    }

    /// Concatenated text of all runs, including those inside hyperlinks and
    /// other inline containers
    pub fn text(&self) -> String {
        self.runs().map(Run::text).collect()
    }

    /// Length of [`Paragraph::text`] in bytes
    pub fn text_len(&self) -> usize {
        self.content.iter().map(ParagraphContent::text_len).sum()
    }

    /// All runs in document order, nested ones included
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().flat_map(|c| c.runs())
    }

    /// First run, if any
    pub fn first_run(&self) -> Option<&Run> {
        self.runs().next()
    }

    /// Style ID from the paragraph properties
    pub fn style(&self) -> Option<&str> {
        self.properties.as_ref()?.style_id()
    }

    /// Replace the inline content (runs and everything between them).
    ///
    /// Blank runs without properties are dropped so no empty `w:r` is emitted.
    pub fn replace_content(&mut self, content: Vec<ParagraphContent>) {
        self.content = content
            .into_iter()
            .filter(|c| match c {
                ParagraphContent::Run(run) => run.properties.is_some() || !run.is_blank(),
                ParagraphContent::Container(_) | ParagraphContent::Unknown(_) => true,
            })
            .collect();
    }

    /// Rewrite the text in `start..end` (byte offsets into [`Paragraph::text`]),
    /// keeping the formatting of the run where the range begins
    pub fn replace_text(&mut self, start: usize, end: usize, replacement: &str) -> bool {
        let mut pos = 0;
        let mut placed = false;
        replace_in(&mut self.content, (start, end), replacement, &mut pos, &mut placed);
        placed
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:p");
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
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_para(xml: &str) -> Paragraph {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) => return Paragraph::from_reader(&mut reader, &e).unwrap(),
                Event::Empty(e) => return Paragraph::from_empty(&e).unwrap(),
                Event::Eof => panic!("no paragraph"),
                _ => {}
            }
            buf.clear();
        }
    }

    fn write_para(para: &Paragraph) -> String {
        let mut writer = Writer::new(Vec::new());
        para.write_to(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_text_spans_runs_not_bookmarks() {
        let para = parse_para(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>1. </w:t></w:r><w:bookmarkStart w:id="0" w:name="defs"/><w:r><w:t>Definitions</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>"#,
        );

        assert_eq!(para.text(), "1. Definitions");
        assert_eq!(para.text_len(), 14);
        assert_eq!(para.style(), Some("Heading1"));
        assert_eq!(para.runs().count(), 2);
        assert_eq!(para.content.len(), 4);
    }

    #[test]
    fn test_write_keeps_inline_order() {
        let xml = r#"<w:p w:rsidR="001"><w:r><w:t>A</w:t></w:r><w:proofErr w:type="spellStart"/><w:r><w:t>B</w:t></w:r></w:p>"#;
        assert_eq!(write_para(&parse_para(xml)), xml);
    }

    #[test]
    fn test_empty_paragraph() {
        let para = parse_para(r#"<w:p w:rsidR="002"/>"#);
        assert_eq!(para.text(), "");
        assert_eq!(write_para(&para), r#"<w:p w:rsidR="002"/>"#);

        let with_empty_props = parse_para("<w:p><w:pPr/></w:p>");
        assert_eq!(with_empty_props.properties, None);
    }

    #[test]
    fn test_replace_content_drops_blank_runs() {
        let mut para = parse_para("<w:p><w:r><w:t>old</w:t></w:r></w:p>");
        para.replace_content(vec![
            Run::new("").into(),
            Run::new("new").into(),
            Run::new("").into(),
        ]);
        assert_eq!(para.text(), "new");
        assert_eq!(para.runs().count(), 1);
    }

    #[test]
    fn test_replace_text_spanning_runs() {
        let mut para = parse_para(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>1</w:t></w:r><w:r><w:t>2. Term</w:t></w:r></w:p>"#,
        );
        assert!(para.replace_text(0, 2, "13"));
        assert_eq!(para.text(), "13. Term");
        let runs: Vec<_> = para.runs().collect();
        assert_eq!(runs[0].text(), "13");
        assert!(runs[0].bold());
        assert_eq!(runs[1].text(), ". Term");
    }

    #[test]
    fn test_text_includes_inline_containers() {
        let para = parse_para(
            r#"<w:p><w:r><w:t xml:space="preserve">1. </w:t></w:r><w:hyperlink r:id="rId4" w:history="1"><w:r><w:rPr><w:rStyle w:val="Hyperlink"/></w:rPr><w:t>Definitions</w:t></w:r></w:hyperlink><w:smartTag w:element="place"><w:r><w:t xml:space="preserve"> here</w:t></w:r></w:smartTag></w:p>"#,
        );

        assert_eq!(para.text(), "1. Definitions here");
        assert_eq!(para.text_len(), 19);
        assert_eq!(para.runs().count(), 3);
        assert_eq!(para.content.len(), 3);
        match &para.content[1] {
            ParagraphContent::Container(link) => {
                assert_eq!(link.local_name(), "hyperlink");
                assert!(!link.is_atomic());
                assert_eq!(link.text_len(), 11);
            }
            other => panic!("expected a hyperlink, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_content_control_text() {
        let xml = r#"<w:p><w:sdt><w:sdtPr><w:alias w:val="Clause"/></w:sdtPr><w:sdtContent><w:r><w:t>11. Notices</w:t></w:r></w:sdtContent></w:sdt><w:fldSimple w:instr=" PAGE "><w:r><w:t>2</w:t></w:r></w:fldSimple></w:p>"#;
        let para = parse_para(xml);

        assert_eq!(para.text(), "11. Notices2");
        assert_eq!(write_para(&para), xml);
        assert!(para.content.iter().all(|c| matches!(c, ParagraphContent::Container(c) if c.is_atomic())));
    }

    #[test]
    fn test_foreign_prefix_is_not_a_run() {
        let xml = r#"<w:p><x:r xmlns:x="urn:other"><x:t>hidden</x:t></x:r><w:r><w:t>shown</w:t></w:r></w:p>"#;
        let para = parse_para(xml);

        assert_eq!(para.text(), "shown");
        assert!(matches!(para.content[0], ParagraphContent::Unknown(_)));
        assert_eq!(write_para(&para), xml);
    }

    #[test]
    fn test_replace_text_inside_hyperlink() {
        let mut para = parse_para(
            r#"<w:p><w:hyperlink w:anchor="s9"><w:r><w:t>9</w:t></w:r></w:hyperlink><w:r><w:t>. Fees</w:t></w:r></w:p>"#,
        );
        assert!(para.replace_text(0, 1, "10"));
        assert_eq!(para.text(), "10. Fees");
        assert_eq!(
            write_para(&para),
            r#"<w:p><w:hyperlink w:anchor="s9"><w:r><w:t>10</w:t></w:r></w:hyperlink><w:r><w:t>. Fees</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_replace_text_after_leading_space() {
        let mut para = parse_para(r#"<w:p><w:r><w:t xml:space="preserve">  9) Fees</w:t></w:r></w:p>"#);
        assert!(para.replace_text(2, 3, "10"));
        assert_eq!(para.text(), "  10) Fees");
    }
}
