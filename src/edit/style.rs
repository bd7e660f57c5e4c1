//! Formatting inherited from neighbouring paragraphs

use crate::document::{Body, Paragraph, PropertyBag};
use crate::edit::locate::is_numbered;
use log::debug;

/// Paragraph properties of a paragraph
pub fn paragraph_style_of(paragraph: &Paragraph) -> Option<PropertyBag> {
    paragraph.properties.clone()
}

/// Run properties of a paragraph's first run
pub fn run_style_of(paragraph: &Paragraph) -> Option<PropertyBag> {
    paragraph.first_run()?.properties.clone()
}

/// Paragraph and run properties copied from a donor paragraph
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InheritedStyle {
    /// Paragraph properties, page and section breaks removed
    pub paragraph: Option<PropertyBag>,
    /// Properties of the donor's first run
    pub run: Option<PropertyBag>,
}

impl InheritedStyle {
    /// Copy the style of `donor`
    pub fn of(donor: &Paragraph) -> Self {
        InheritedStyle {
            paragraph: paragraph_style_of(donor).and_then(PropertyBag::without_breaks),
            run: run_style_of(donor),
        }
    }
}

/// Styles for a new numbered section inserted after a heading
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionStyle {
    /// First-run properties of the heading
    pub heading_run: Option<PropertyBag>,
    /// Style of the body text, from the nearest non-numbered paragraph
    /// after the heading. Its run falls back to the heading's.
    pub body: InheritedStyle,
}

/// Style of the block right after `heading`, the presumed body style.
///
/// Empty if that block is not a paragraph.
pub fn following_style(body: &Body, heading: usize) -> InheritedStyle {
    body.paragraph(heading + 1)
        .map(InheritedStyle::of)
        .unwrap_or_default()
}

/// Nearest paragraph after block `heading` without a section label
pub fn body_donor(body: &Body, heading: usize) -> Option<(usize, &Paragraph)> {
    body.indexed_paragraphs()
        .skip_while(|(index, _)| *index <= heading)
        .find(|(_, p)| !is_numbered(p))
}

/// Styles for a section inserted after the heading at block `heading`
pub fn section_style(body: &Body, heading: usize) -> SectionStyle {
    let heading_run = body.paragraph(heading).and_then(run_style_of);

    let mut inherited = match body_donor(body, heading) {
        Some((index, donor)) => {
            debug!("body style donor at block {}", index);
            InheritedStyle::of(donor)
        }
        None => InheritedStyle::default(),
    };
    if inherited.run.is_none() {
        inherited.run = heading_run.clone();
    }

    SectionStyle {
        heading_run,
        body: inherited,
    }
}
