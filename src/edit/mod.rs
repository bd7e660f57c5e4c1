//! Edit applier
//!
//! Each instruction is applied to the markup of the main document part:
//! parse, locate every anchor, mutate the owned tree, serialize. An anchor
//! that is not present leaves the markup untouched ([`Outcome::NoOp`]); a
//! parse or serialize failure is [`Error::MalformedDocument`]. Nothing in
//! between is ever returned.

mod instruction;
pub mod locate;
pub mod renumber;
pub mod split;
pub mod style;

pub use instruction::{EditInstruction, SectionPosition};

use crate::document::{Body, Document, Paragraph, PropertyBag, Run};
use crate::error::{Error, Result};
use locate::SectionLabel;
use log::{debug, info};

/// Result of applying instructions to a document part
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The document changed; new markup
    Applied(Vec<u8>),
    /// No anchor matched; the input markup
    NoOp(Vec<u8>),
}

impl Outcome {
    /// Markup after the edit
    pub fn markup(&self) -> &[u8] {
        match self {
            Outcome::Applied(markup) | Outcome::NoOp(markup) => markup,
        }
    }

    /// Take the markup
    pub fn into_markup(self) -> Vec<u8> {
        match self {
            Outcome::Applied(markup) | Outcome::NoOp(markup) => markup,
        }
    }

    /// Whether the document changed
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

/// Apply one instruction to the markup of a main document part
pub fn apply(markup: &[u8], instruction: &EditInstruction) -> Result<Outcome> {
    let mut document = Document::from_bytes(markup)?;

    match apply_to(&mut document, instruction) {
        Ok(()) => {
            let output = document.to_bytes()?;
            info!("applied {} instruction", instruction.kind());
            Ok(Outcome::Applied(output))
        }
        Err(Error::AnchorNotFound(anchor)) => {
            debug!("{} skipped, no {}", instruction.kind(), anchor);
            Ok(Outcome::NoOp(markup.to_vec()))
        }
        Err(e) => Err(e),
    }
}

/// Apply instructions in order, each one seeing the previous one's output.
///
/// The result is [`Outcome::NoOp`] with the input markup if nothing applied.
pub fn apply_all(markup: &[u8], instructions: &[EditInstruction]) -> Result<Outcome> {
    let mut current = Outcome::NoOp(markup.to_vec());

    for instruction in instructions {
        if let Outcome::Applied(next) = apply(current.markup(), instruction)? {
            current = Outcome::Applied(next);
        }
    }

    Ok(current)
}

/// Apply one instruction to a parsed document.
///
/// All anchors are located before the tree is touched, so an
/// [`Error::AnchorNotFound`] leaves `document` unchanged.
pub fn apply_to(document: &mut Document, instruction: &EditInstruction) -> Result<()> {
    let body = &mut document.body;
    match instruction {
        EditInstruction::InsertAfterHeading { search, text, bold } => {
            insert_after_heading(body, search, text, *bold)
        }
        EditInstruction::InsertInSection {
            section,
            text,
            position,
            fallback,
        } => insert_in_section(body, *section, text, *position, fallback.as_deref()),
        EditInstruction::AddNewSection {
            after_section,
            title,
            text,
            bold,
            underline,
        } => add_new_section(body, *after_section, title, text, *bold, *underline),
    }
}

fn insert_after_heading(body: &mut Body, search: &str, text: &str, bold: Option<bool>) -> Result<()> {
    let heading = locate::find_heading(body, search)?;
    let donor = style::following_style(body, heading);

    let runs = match split_defined_term(text) {
        Some((term, rest)) => {
            let term_props = if bold == Some(false) {
                donor.run.clone()
            } else {
                Some(bolded(donor.run.clone()))
            };
            vec![Run::styled(term, term_props), Run::styled(rest, donor.run)]
        }
        None => {
            let props = if bold == Some(true) {
                Some(bolded(donor.run))
            } else {
                donor.run
            };
            vec![Run::styled(text, props)]
        }
    };

    body.insert_after(heading, new_paragraph(donor.paragraph, runs).into());
    Ok(())
}

fn insert_in_section(
    body: &mut Body,
    section: u32,
    text: &str,
    position: SectionPosition,
    fallback: Option<&str>,
) -> Result<()> {
    let index = locate::find_section(body, section, fallback)?;
    let paragraph = body
        .paragraph(index)
        .ok_or_else(|| Error::AnchorNotFound(format!("section {}", section)))?;

    let (offset, piece) = match position {
        SectionPosition::Start => {
            let current = paragraph.text();
            let at = SectionLabel::parse(&current).map_or(0, |l| l.content_start(&current));
            (at, format!("{} ", text))
        }
        SectionPosition::AfterFirstSentence => {
            (locate::find_sentence_end(paragraph)? + 1, format!(" {}", text))
        }
        SectionPosition::End => (paragraph.text_len(), format!(" {}", text)),
    };
    debug!("inserting into section {} at offset {}", section, offset);

    let inserted = Run::styled(piece, style::run_style_of(paragraph));
    let (mut content, after) = split::split(paragraph, offset);
    content.push(inserted.into());
    content.extend(after);

    if let Some(paragraph) = body.paragraph_mut(index) {
        paragraph.replace_content(content);
    }
    Ok(())
}

fn add_new_section(
    body: &mut Body,
    after_section: u32,
    title: &str,
    text: &str,
    bold: Option<bool>,
    underline: Option<bool>,
) -> Result<()> {
    let number = after_section
        .checked_add(1)
        .ok_or_else(|| Error::AnchorNotFound(format!("number after section {}", after_section)))?;
    let anchor = locate::find_last_section(body, after_section)?;
    let inherited = style::section_style(body, anchor);

    let mut number_props = inherited.heading_run.clone();
    if let Some(props) = &mut number_props {
        props.remove("u");
    }
    let mut title_props = inherited.heading_run;
    if underline == Some(true) && title_props.as_ref().and_then(PropertyBag::underline).is_none() {
        title_props
            .get_or_insert_with(PropertyBag::run)
            .set_underline("single");
    }
    if bold == Some(true) {
        number_props = Some(bolded(number_props));
        title_props = Some(bolded(title_props));
    }

    let runs = vec![
        Run::styled(format!("{}. ", number), number_props),
        Run::styled(title, title_props),
        Run::styled(format!(" {}", text), inherited.body.run),
    ];
    body.insert_after(anchor, new_paragraph(inherited.body.paragraph, runs).into());

    let renumbered = renumber::renumber_from(body, anchor + 2, number);
    debug!("section {} added after block {}, {} labels renumbered", number, anchor, renumbered);
    Ok(())
}

/// Split a leading quoted term (`"Term"` or `“Term”`) from the rest
fn split_defined_term(text: &str) -> Option<(&str, &str)> {
    let mut chars = text.chars();
    let close = match chars.next()? {
        '"' => '"',
        '\u{201c}' => '\u{201d}',
        _ => return None,
    };
    let body = chars.as_str();
    let end = text.len() - body.len() + body.find(close)? + close.len_utf8();
    Some(text.split_at(end))
}

fn bolded(props: Option<PropertyBag>) -> PropertyBag {
    let mut props = props.unwrap_or_else(PropertyBag::run);
    props.set_bold();
    props
}

fn new_paragraph(properties: Option<PropertyBag>, runs: Vec<Run>) -> Paragraph {
    Paragraph::with_runs(properties, runs.into_iter().filter(|r| !r.is_blank()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn doc(paragraphs: &str) -> Vec<u8> {
        format!(r#"<w:document {W}><w:body>{paragraphs}</w:body></w:document>"#).into_bytes()
    }

    fn texts(markup: &[u8]) -> Vec<String> {
        Document::from_bytes(markup)
            .unwrap()
            .paragraphs()
            .map(Paragraph::text)
            .collect()
    }

    #[test]
    fn test_split_defined_term() {
        assert_eq!(
            split_defined_term(r#""Affiliate" means any entity"#),
            Some((r#""Affiliate""#, " means any entity"))
        );
        assert_eq!(
            split_defined_term("\u{201c}Term\u{201d} rest"),
            Some(("\u{201c}Term\u{201d}", " rest"))
        );
        assert_eq!(split_defined_term(r#""unterminated"#), None);
        assert_eq!(split_defined_term("plain"), None);
        assert_eq!(split_defined_term(""), None);
    }

    #[test]
    fn test_missing_anchor_is_noop_unchanged() {
        let markup = doc("<w:p><w:r><w:t>1. Definitions</w:t></w:r></w:p>");
        for instruction in [
            EditInstruction::insert_after_heading("Zzz-not-present", "x"),
            EditInstruction::insert_in_section(7, "x"),
            EditInstruction::add_new_section(7, "T", "x"),
            EditInstruction::add_new_section(u32::MAX, "T", "x"),
        ] {
            assert_eq!(apply(&markup, &instruction).unwrap(), Outcome::NoOp(markup.clone()));
        }
    }

    #[test]
    fn test_section_without_sentence_is_noop() {
        let markup = doc("<w:p><w:r><w:t>11 no terminator</w:t></w:r></w:p>");
        let outcome = apply(&markup, &EditInstruction::insert_in_section(11, "x")).unwrap();
        assert!(!outcome.is_applied());
    }

    #[test]
    fn test_malformed_is_failure() {
        let err = apply(b"<w:document>", &EditInstruction::insert_in_section(1, "x")).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_insert_positions() {
        let markup = doc("<w:p><w:r><w:t>11. First. Second.</w:t></w:r></w:p>");
        let at = |position| {
            let instruction = EditInstruction::insert_in_section(11, "NEW.").at(position);
            texts(apply(&markup, &instruction).unwrap().markup()).remove(0)
        };

        assert_eq!(at(SectionPosition::Start), "11. NEW. First. Second.");
        assert_eq!(at(SectionPosition::AfterFirstSentence), "11. NEW. First. Second.");
        assert_eq!(at(SectionPosition::End), "11. First. Second. NEW.");
    }

    #[test]
    fn test_plain_text_after_heading() {
        let markup = doc("<w:p><w:r><w:t>Heading</w:t></w:r></w:p>");
        let outcome = apply(&markup, &EditInstruction::insert_after_heading("Head", "Plain")).unwrap();

        let document = Document::from_bytes(outcome.markup()).unwrap();
        let inserted = document.body.paragraph(1).unwrap();
        assert_eq!(inserted.text(), "Plain");
        assert_eq!(inserted.runs().count(), 1);
        assert!(!inserted.first_run().unwrap().bold());
    }

    #[test]
    fn test_apply_all_composes() {
        let markup = doc(concat!(
            "<w:p><w:r><w:t>10. Term</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>11. Confidentiality. More.</w:t></w:r></w:p>",
        ));
        let instructions = [
            EditInstruction::add_new_section(10, "Residuals.", "Text."),
            EditInstruction::insert_after_heading("Zzz", "skipped"),
            EditInstruction::insert_in_section(12, "Added."),
        ];

        let outcome = apply_all(&markup, &instructions).unwrap();
        assert!(outcome.is_applied());
        assert_eq!(
            texts(outcome.markup()),
            vec![
                "10. Term",
                "11. Residuals. Text.",
                "12. Added. Confidentiality. More.",
            ]
        );

        let untouched = apply_all(&markup, &instructions[1..2]).unwrap();
        assert_eq!(untouched, Outcome::NoOp(markup));
    }
}
