//! Splitting a paragraph's runs at a text offset

use crate::document::{Paragraph, ParagraphContent, Run};
use log::debug;

/// Partition a paragraph's inline content at a byte offset into its text.
///
/// Runs ending at or before the offset go to the first half, runs starting at
/// or after it to the second; a run straddling the offset is cut in two, both
/// halves keeping its properties. A half with nothing left in it is dropped.
/// Hyperlinks and similar containers are split the same way, each half
/// wrapped in a copy of the element. Atomic containers (fields, content
/// controls) straddling the offset stay whole in the first half.
/// Zero-width items (bookmarks, empty runs) sitting at the offset stay in the
/// first half. The offset is clamped to the text length.
pub fn split(
    paragraph: &Paragraph,
    offset: usize,
) -> (Vec<ParagraphContent>, Vec<ParagraphContent>) {
    split_content(&paragraph.content, offset.min(paragraph.text_len()))
}

fn split_content(
    content: &[ParagraphContent],
    offset: usize,
) -> (Vec<ParagraphContent>, Vec<ParagraphContent>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut pos = 0;

    for item in content {
        let len = item.text_len();
        let end = pos + len;

        if end <= offset {
            before.push(item.clone());
        } else if pos >= offset {
            after.push(item.clone());
        } else {
            match item {
                ParagraphContent::Run(run) => {
                    debug!("splitting run {:?} at {}", run.text(), offset - pos);
                    let (head, tail) = run.split_at(offset - pos);
                    if !head.is_blank() {
                        before.push(ParagraphContent::Run(head));
                    }
                    if !tail.is_blank() {
                        after.push(ParagraphContent::Run(tail));
                    }
                }
                ParagraphContent::Container(container) if container.is_atomic() => {
                    debug!("{} kept whole across offset {}", container.name, offset);
                    before.push(item.clone());
                }
                ParagraphContent::Container(container) => {
                    let (head, tail) = split_content(&container.content, offset - pos);
                    if !head.is_empty() {
                        before.push(container.with_content(head).into());
                    }
                    if !tail.is_empty() {
                        after.push(container.with_content(tail).into());
                    }
                }
                ParagraphContent::Unknown(_) => {}
            }
        }
        pos = end;
    }

    (before, after)
}

/// [`split`], keeping only the runs
pub fn split_runs(paragraph: &Paragraph, offset: usize) -> (Vec<Run>, Vec<Run>) {
    let (before, after) = split(paragraph, offset);
    (only_runs(&before), only_runs(&after))
}

fn only_runs(content: &[ParagraphContent]) -> Vec<Run> {
    content.iter().flat_map(|c| c.runs()).cloned().collect()
}
