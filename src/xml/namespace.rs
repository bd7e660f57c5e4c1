//! XML namespaces used in OOXML

/// WordprocessingML main namespace
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Relationships namespace
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Whether a root element's attributes bind the `w:` prefix to WordprocessingML
pub fn binds_wordprocessing_ml(attributes: &[(String, String)]) -> bool {
    attributes
        .iter()
        .any(|(key, value)| key == "xmlns:w" && value == W)
}
