//! Formatting property bags (w:rPr, w:pPr)
//!
//! Properties are carried opaquely as their raw child elements, in document
//! order. Only a few toggles (bold, underline) get first-class setters; every
//! other property is copied verbatim.

use crate::error::Result;
use crate::xml::{parse_bool, RawXmlElement, RawXmlNode};
use quick_xml::events::BytesStart;
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Child order of `w:rPr` (CT_RPr). New toggles are inserted at their
/// position in this sequence; Word rejects out-of-order run properties.
const RUN_PROPERTY_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike",
    "outline", "shadow", "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden",
    "color", "spacing", "w", "kern", "position", "sz", "szCs", "highlight", "u", "effect", "bdr",
    "shd", "fitText", "vertAlign", "rtl", "cs", "em", "lang", "eastAsianLayout", "specVanish",
    "oMath",
];

/// Paragraph properties that carry page or section breaks
const BREAK_PROPERTIES: &[&str] = &["pageBreakBefore", "br", "sectPr"];

/// An ordered bag of formatting properties
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyBag {
    /// Container element name (`w:rPr` or `w:pPr`)
    name: String,
    /// Attributes of the container element
    attributes: Vec<(String, String)>,
    /// Property elements, verbatim
    entries: Vec<RawXmlNode>,
}

impl PropertyBag {
    /// Empty run property bag (`w:rPr`)
    pub fn run() -> Self {
        Self::named("w:rPr")
    }

    /// Empty paragraph property bag (`w:pPr`)
    pub fn paragraph() -> Self {
        Self::named("w:pPr")
    }

    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Parse from reader (after the container start tag).
    ///
    /// Returns `None` for a bag without entries.
    pub fn from_reader<R: BufRead>(
        reader: &mut Reader<R>,
        start: &BytesStart,
    ) -> Result<Option<Self>> {
        let raw = RawXmlElement::from_reader(reader, start)?;
        Ok(Self::from_raw(raw))
    }

    /// Build from an already parsed container element
    pub fn from_raw(raw: RawXmlElement) -> Option<Self> {
        let bag = Self {
            name: raw.name,
            attributes: raw.attributes,
            entries: raw.children,
        };
        (!bag.is_empty()).then_some(bag)
    }

    /// Whether the bag has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Property elements in order
    pub fn elements(&self) -> impl Iterator<Item = &RawXmlElement> {
        self.entries.iter().filter_map(RawXmlNode::as_element)
    }

    /// First property with the given local name
    pub fn get(&self, local: &str) -> Option<&RawXmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// Whether a property with the given local name is present
    pub fn contains(&self, local: &str) -> bool {
        self.get(local).is_some()
    }

    /// Remove every property with the given local name, returning how many went
    pub fn remove(&mut self, local: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|n| n.as_element().map_or(true, |e| e.local_name() != local));
        before - self.entries.len()
    }

    /// Insert a property at its schema position, replacing any existing one
    pub fn set(&mut self, element: RawXmlElement) {
        let local = element.local_name().to_string();
        self.remove(&local);

        let rank = property_rank(&local);
        let at = self
            .entries
            .iter()
            .position(|n| {
                n.as_element()
                    .is_some_and(|e| property_rank(e.local_name()) > rank)
            })
            .unwrap_or(self.entries.len());
        self.entries.insert(at, RawXmlNode::Element(element));
    }

    /// Bold toggle
    pub fn is_bold(&self) -> bool {
        self.get("b").is_some_and(parse_bool)
    }

    /// Turn bold on
    pub fn set_bold(&mut self) {
        self.set(RawXmlElement::new("w:b"));
    }

    /// Underline type, if any
    pub fn underline(&self) -> Option<&str> {
        self.get("u").map(|u| u.w_val().unwrap_or("single"))
    }

    /// Set the underline type
    pub fn set_underline(&mut self, kind: &str) {
        self.set(RawXmlElement::new("w:u").with_attr("w:val", kind));
    }

    /// Paragraph or character style ID
    pub fn style_id(&self) -> Option<&str> {
        self.get("pStyle")
            .or_else(|| self.get("rStyle"))
            .and_then(RawXmlElement::w_val)
    }

    /// Drop page-break-before, explicit breaks and section properties.
    ///
    /// Returns `None` if nothing is left.
    pub fn without_breaks(mut self) -> Option<Self> {
        for local in BREAK_PROPERTIES {
            self.remove(local);
        }
        (!self.is_empty()).then_some(self)
    }

    /// Write to XML writer (nothing for an empty bag)
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        RawXmlElement {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: self.entries.clone(),
            self_closing: false,
        }
        .write_to(writer)
    }
}

/// Position in the run property sequence; unknown properties sort last
fn property_rank(local: &str) -> usize {
    RUN_PROPERTY_ORDER
        .iter()
        .position(|p| *p == local)
        .unwrap_or(RUN_PROPERTY_ORDER.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(children: &[RawXmlElement]) -> PropertyBag {
        let mut bag = PropertyBag::run();
        bag.entries = children.iter().cloned().map(RawXmlNode::Element).collect();
        bag
    }

    fn locals(bag: &PropertyBag) -> Vec<&str> {
        bag.elements().map(|e| e.local_name()).collect()
    }

    #[test]
    fn test_set_bold_in_schema_order() {
        let mut props = bag(&[
            RawXmlElement::new("w:rFonts").with_attr("w:ascii", "Arial"),
            RawXmlElement::new("w:sz").with_attr("w:val", "22"),
        ]);
        assert!(!props.is_bold());

        props.set_bold();
        assert!(props.is_bold());
        assert_eq!(locals(&props), vec!["rFonts", "b", "sz"]);
    }

    #[test]
    fn test_set_bold_replaces_explicit_off() {
        let mut props = bag(&[RawXmlElement::new("w:b").with_attr("w:val", "0")]);
        assert!(!props.is_bold());

        props.set_bold();
        assert!(props.is_bold());
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_underline() {
        let mut props = bag(&[RawXmlElement::new("w:u")]);
        assert_eq!(props.underline(), Some("single"));

        props.set_underline("double");
        assert_eq!(props.underline(), Some("double"));

        assert_eq!(props.remove("u"), 1);
        assert_eq!(props.underline(), None);
    }

    #[test]
    fn test_without_breaks() {
        let mut props = PropertyBag::paragraph();
        props.entries = vec![
            RawXmlNode::Element(RawXmlElement::new("w:pStyle").with_attr("w:val", "Body")),
            RawXmlNode::Element(RawXmlElement::new("w:pageBreakBefore")),
            RawXmlNode::Element(RawXmlElement::new("w:sectPr")),
        ];

        let stripped = props.without_breaks().unwrap();
        assert_eq!(stripped.style_id(), Some("Body"));
        assert_eq!(stripped.len(), 1);

        let only_break = PropertyBag::from_raw(
            RawXmlElement::new("w:pPr").with_child(RawXmlElement::new("w:pageBreakBefore")),
        )
        .unwrap();
        assert_eq!(only_break.without_breaks(), None);
    }

    #[test]
    fn test_empty_container_is_none() {
        assert_eq!(PropertyBag::from_raw(RawXmlElement::new("w:rPr")), None);
    }
}
