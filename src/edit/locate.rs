//! Anchor lookup over the flat paragraph/run text stream

use crate::document::{Body, Paragraph};
use crate::error::{Error, Result};
use log::debug;
use std::ops::Range;

/// What follows the number of a section label
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    /// `11.`
    Period,
    /// `11)`
    Paren,
    /// `11 ` or `11\t`
    Whitespace,
}

/// Leading numeric label of a paragraph, e.g. `11.` in `"11. Term"`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionLabel {
    /// Parsed number
    pub number: u32,
    /// Byte range of the digits in the paragraph text
    pub digits: Range<usize>,
    /// Delimiter after the digits
    pub delimiter: Delimiter,
    /// Byte offset just past the delimiter
    pub end: usize,
}

impl SectionLabel {
    /// Parse the label at the start of `text` (leading whitespace skipped).
    ///
    /// Multi-level labels such as `1.2.` are not labels.
    pub fn parse(text: &str) -> Option<Self> {
        let lead = text.len() - text.trim_start().len();
        let rest = &text[lead..];
        let count = rest.bytes().take_while(u8::is_ascii_digit).count();
        if count == 0 {
            return None;
        }
        let number = rest[..count].parse().ok()?;

        let mut tail = rest[count..].chars();
        let first = tail.next()?;
        let second = tail.next();
        let delimiter = match first {
            '.' if second.is_some_and(|c| c.is_ascii_digit()) => return None,
            '.' => Delimiter::Period,
            ')' => Delimiter::Paren,
            c if c.is_whitespace() => Delimiter::Whitespace,
            _ => return None,
        };

        Some(SectionLabel {
            number,
            digits: lead..lead + count,
            delimiter,
            end: lead + count + first.len_utf8(),
        })
    }

    /// Whether the label has punctuation (`N.` or `N)`), as headings do
    pub fn is_punctuated(&self) -> bool {
        matches!(self.delimiter, Delimiter::Period | Delimiter::Paren)
    }

    /// Byte offset just past the delimiter and any whitespace after it
    pub fn content_start(&self, text: &str) -> usize {
        let rest = &text[self.end..];
        self.end + (rest.len() - rest.trim_start().len())
    }
}

/// Whether the paragraph starts with a punctuated section label
pub fn is_numbered(paragraph: &Paragraph) -> bool {
    SectionLabel::parse(&paragraph.text()).is_some_and(|l| l.is_punctuated())
}

/// First paragraph whose text contains `search` (case-sensitive)
pub fn find_heading(body: &Body, search: &str) -> Result<usize> {
    if search.is_empty() {
        return Err(Error::AnchorNotFound("empty heading search".into()));
    }
    body.indexed_paragraphs()
        .find(|(_, p)| p.text().contains(search))
        .map(|(index, _)| {
            debug!("heading {:?} found at block {}", search, index);
            index
        })
        .ok_or_else(|| Error::AnchorNotFound(format!("heading containing {:?}", search)))
}

/// The paragraph holding the content of section `number`: the **first**
/// paragraph labelled `number`, or the first whose trimmed text starts with
/// `fallback` (case-insensitive). A blank fallback matches nothing.
pub fn find_section(body: &Body, number: u32, fallback: Option<&str>) -> Result<usize> {
    let fallback = fallback
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_lowercase);

    for (index, para) in body.indexed_paragraphs() {
        let text = para.text();
        let labelled = SectionLabel::parse(&text).is_some_and(|l| l.number == number);
        let by_text = fallback
            .as_deref()
            .is_some_and(|prefix| text.trim().to_lowercase().starts_with(prefix));
        if labelled || by_text {
            debug!("section {} matched at block {}: {:?}", number, index, text);
            return Ok(index);
        }
    }

    Err(Error::AnchorNotFound(format!("section {}", number)))
}

/// The heading of section `number` to insert after: the **last** paragraph
/// labelled `number`, since earlier occurrences tend to be cross-references
pub fn find_last_section(body: &Body, number: u32) -> Result<usize> {
    body.indexed_paragraphs()
        .rev()
        .find(|(_, p)| SectionLabel::parse(&p.text()).is_some_and(|l| l.number == number))
        .map(|(index, _)| {
            debug!("last heading of section {} at block {}", number, index);
            index
        })
        .ok_or_else(|| Error::AnchorNotFound(format!("heading of section {}", number)))
}

/// Byte offset of the first `.` in the paragraph text
pub fn find_sentence_end(paragraph: &Paragraph) -> Result<usize> {
    paragraph
        .text()
        .find('.')
        .ok_or_else(|| Error::AnchorNotFound("sentence terminator".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Run;

    fn body_of(texts: &[&str]) -> Body {
        let mut body = Body::default();
        for text in texts {
            body.add_paragraph(Paragraph::with_runs(None, [Run::new(*text)]));
        }
        body
    }

    #[test]
    fn test_parse_label() {
        let label = SectionLabel::parse("  11. Term").unwrap();
        assert_eq!(label.number, 11);
        assert_eq!(label.digits, 2..4);
        assert_eq!(label.delimiter, Delimiter::Period);
        assert_eq!(label.content_start("  11. Term"), 6);

        assert_eq!(SectionLabel::parse("3) x").unwrap().delimiter, Delimiter::Paren);
        assert_eq!(SectionLabel::parse("4\tx").unwrap().delimiter, Delimiter::Whitespace);
        assert!(SectionLabel::parse("1.2. Nested").is_none());
        assert!(SectionLabel::parse("11").is_none());
        assert!(SectionLabel::parse("11a").is_none());
        assert!(SectionLabel::parse("Section 11.").is_none());
        assert!(SectionLabel::parse("99999999999. Huge").is_none());
    }

    #[test]
    fn test_find_heading() {
        let body = body_of(&["Intro", "1. Definitions", "Definitions again"]);
        assert_eq!(find_heading(&body, "Definitions").unwrap(), 1);
        assert!(matches!(
            find_heading(&body, "definitions"),
            Err(Error::AnchorNotFound(_))
        ));
        assert!(find_heading(&body, "").is_err());
    }

    #[test]
    fn test_heading_text_spans_runs() {
        let mut body = Body::default();
        body.add_paragraph(Paragraph::with_runs(
            None,
            [Run::new("Defin"), Run::new("itions")],
        ));
        assert_eq!(find_heading(&body, "Definitions").unwrap(), 0);
    }

    #[test]
    fn test_section_first_vs_last() {
        let body = body_of(&["10. See 11. below", "11. First", "10. Term", "11. Second"]);
        assert_eq!(find_section(&body, 11, None).unwrap(), 1);
        assert_eq!(find_last_section(&body, 10).unwrap(), 2);
        assert!(find_section(&body, 12, None).is_err());
        assert!(find_last_section(&body, 1).is_err());
    }

    #[test]
    fn test_section_fallback_text() {
        let body = body_of(&["Preamble", "the disclosing party is bound."]);
        assert_eq!(
            find_section(&body, 11, Some("The Disclosing Party is")).unwrap(),
            1
        );
        assert!(find_section(&body, 11, None).is_err());
    }

    #[test]
    fn test_blank_fallback_matches_nothing() {
        let body = body_of(&["Preamble", "Body."]);
        assert!(find_section(&body, 11, Some("")).is_err());
        assert!(find_section(&body, 11, Some("  ")).is_err());
        assert_eq!(find_section(&body, 11, Some(" body")).unwrap(), 1);
    }

    fn linked(xml: &str) -> Body {
        let document = crate::Document::parse(&format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{xml}</w:body></w:document>"#
        ))
        .unwrap();
        document.body
    }

    #[test]
    fn test_lookups_see_text_in_inline_containers() {
        let body = linked(concat!(
            r#"<w:p><w:r><w:t xml:space="preserve">1. </w:t></w:r><w:hyperlink w:anchor="defs"><w:r><w:t>Definitions</w:t></w:r></w:hyperlink></w:p>"#,
            r#"<w:p><w:smartTag w:element="number"><w:r><w:t>11</w:t></w:r></w:smartTag><w:r><w:t>. Notices</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t xml:space="preserve">See </w:t></w:r><w:hyperlink w:anchor="site"><w:r><w:t>www.example.com</w:t></w:r></w:hyperlink></w:p>"#,
        ));

        assert_eq!(find_heading(&body, "Definitions").unwrap(), 0);
        assert_eq!(find_section(&body, 11, None).unwrap(), 1);
        assert_eq!(find_last_section(&body, 1).unwrap(), 0);
        assert_eq!(find_sentence_end(body.paragraph(2).unwrap()).unwrap(), 7);
    }

    #[test]
    fn test_sentence_end() {
        let body = body_of(&["The Disclosing Party is bound. Nothing else follows.", "No stop"]);
        assert_eq!(find_sentence_end(body.paragraph(0).unwrap()).unwrap(), 29);
        assert!(find_sentence_end(body.paragraph(1).unwrap()).is_err());
    }

    #[test]
    fn test_is_numbered() {
        let body = body_of(&["12. Term", "12 months", "Body"]);
        assert!(is_numbered(body.paragraph(0).unwrap()));
        assert!(!is_numbered(body.paragraph(1).unwrap()));
        assert!(!is_numbered(body.paragraph(2).unwrap()));
    }
}
