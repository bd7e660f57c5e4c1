//! Section label renumbering

use crate::document::{BlockContent, Body};
use crate::edit::locate::SectionLabel;
use log::{debug, warn};

/// Shift every section label `N.`/`N)` with `N >= threshold` to `N + 1`,
/// starting at block `start`. Returns how many labels were rewritten.
///
/// Single forward pass; the delimiter and the rest of the paragraph keep
/// their text and formatting.
pub fn renumber_from(body: &mut Body, start: usize, threshold: u32) -> usize {
    let mut rewritten = 0;

    for (index, block) in body.content.iter_mut().enumerate().skip(start) {
        let BlockContent::Paragraph(para) = block else {
            continue;
        };
        let text = para.text();
        let Some(label) = SectionLabel::parse(&text).filter(SectionLabel::is_punctuated) else {
            continue;
        };
        if label.number < threshold {
            continue;
        }
        let Some(next) = label.number.checked_add(1) else {
            warn!("section label {} at block {} cannot be incremented", label.number, index);
            continue;
        };

        if para.replace_text(label.digits.start, label.digits.end, &next.to_string()) {
            debug!("renumbered block {}: {} -> {}", index, label.number, next);
            rewritten += 1;
        }
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Paragraph, Run};
    use pretty_assertions::assert_eq;

    fn body_of(texts: &[&str]) -> Body {
        let mut body = Body::default();
        for text in texts {
            body.add_paragraph(Paragraph::with_runs(None, [Run::new(*text)]));
        }
        body
    }

    fn texts(body: &Body) -> Vec<String> {
        body.paragraphs().map(Paragraph::text).collect()
    }

    #[test]
    fn test_renumber_at_and_above_threshold() {
        let mut body = body_of(&["10. A", "11. New", "11. B", "Body 11.", "12) C", "3. List", "9 days"]);
        assert_eq!(renumber_from(&mut body, 2, 11), 2);
        assert_eq!(
            texts(&body),
            vec!["10. A", "11. New", "12. B", "Body 11.", "13) C", "3. List", "9 days"]
        );
    }

    #[test]
    fn test_renumber_digit_count_grows() {
        let mut body = body_of(&["9. Nine"]);
        body.paragraph_mut(0).unwrap().content.insert(0, Run::new(" ").into());
        assert_eq!(renumber_from(&mut body, 0, 9), 1);
        assert_eq!(texts(&body), vec![" 10. Nine"]);
    }

    #[test]
    fn test_whitespace_labels_untouched() {
        let mut body = body_of(&["2024 was a year", "12\tTab"]);
        assert_eq!(renumber_from(&mut body, 0, 1), 0);
    }
}
