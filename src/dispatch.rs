//! Choosing which instructions apply to a document
//!
//! The engine itself does not know which edit belongs to which document; a
//! [`Classifier`] decides from the file name and the parsed content.

use crate::document::Document;
use crate::edit::EditInstruction;
use log::debug;

/// Decides the instructions for a document (possibly none)
pub trait Classifier {
    fn classify(&self, name: &str, document: &Document) -> Vec<EditInstruction>;
}

impl<F> Classifier for F
where
    F: Fn(&str, &Document) -> Vec<EditInstruction>,
{
    fn classify(&self, name: &str, document: &Document) -> Vec<EditInstruction> {
        self(name, document)
    }
}

/// A keyword rule: matches by file name, or by terms in the document text.
/// All comparisons are case-insensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rule {
    name_keywords: Vec<String>,
    required: Vec<String>,
    excluded: Vec<String>,
    instructions: Vec<EditInstruction>,
}

impl Rule {
    /// Rule emitting `instructions` when it matches
    pub fn new(instructions: impl IntoIterator<Item = EditInstruction>) -> Self {
        Rule {
            instructions: instructions.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Match file names containing `keyword`
    pub fn name_keyword(mut self, keyword: impl AsRef<str>) -> Self {
        self.name_keywords.push(keyword.as_ref().to_lowercase());
        self
    }

    /// Require `term` in the document text
    pub fn requires(mut self, term: impl AsRef<str>) -> Self {
        self.required.push(term.as_ref().to_lowercase());
        self
    }

    /// Reject documents whose text contains `term`
    pub fn excludes(mut self, term: impl AsRef<str>) -> Self {
        self.excluded.push(term.as_ref().to_lowercase());
        self
    }

    /// Instructions of this rule
    pub fn instructions(&self) -> &[EditInstruction] {
        &self.instructions
    }

    fn matches_name(&self, name: &str) -> bool {
        self.name_keywords.iter().any(|k| name.contains(k.as_str()))
    }

    /// A rule without required terms never matches by content
    fn matches_content(&self, text: &str) -> bool {
        !self.required.is_empty()
            && self.required.iter().all(|t| text.contains(t.as_str()))
            && !self.excluded.iter().any(|t| text.contains(t.as_str()))
    }
}

/// Ordered keyword rules with an optional fallback.
///
/// A file-name match on any rule wins over content matches; content rules
/// are tried in order; the fallback applies when nothing matched.
#[derive(Clone, Debug, Default)]
pub struct KeywordClassifier {
    rules: Vec<Rule>,
    fallback: Vec<EditInstruction>,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Instructions for documents no rule matches
    pub fn with_fallback(mut self, instructions: impl IntoIterator<Item = EditInstruction>) -> Self {
        self.fallback = instructions.into_iter().collect();
        self
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, name: &str, document: &Document) -> Vec<EditInstruction> {
        let name = name.to_lowercase();
        if let Some((index, rule)) = self.rules.iter().enumerate().find(|(_, r)| r.matches_name(&name)) {
            debug!("{:?} matched rule {} by name", name, index);
            return rule.instructions.clone();
        }

        let text = document.text().to_lowercase();
        if let Some((index, rule)) = self.rules.iter().enumerate().find(|(_, r)| r.matches_content(&text)) {
            debug!("{:?} matched rule {} by content", name, index);
            return rule.instructions.clone();
        }

        debug!("{:?} matched no rule, {} fallback instructions", name, self.fallback.len());
        self.fallback.clone()
    }
}
