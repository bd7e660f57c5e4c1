//! XML utilities and raw element preservation for round-trip support

mod namespace;
mod raw;

pub use namespace::*;
pub use raw::{RawXmlElement, RawXmlNode};

use crate::error::Result;
use quick_xml::events::BytesStart;
use quick_xml::name::QName;

/// Qualified name of a start tag as a string
pub fn element_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// Strip the namespace prefix from a qualified name
pub fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Local name of a `w:` element, empty for any other prefix
pub fn w_local(name: QName<'_>) -> &[u8] {
    name.0.strip_prefix(b"w:").unwrap_or_default()
}

/// All attributes of a start tag as unescaped (name, value) pairs
pub fn collect_attrs(element: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in element.attributes() {
        let attr = attr?;
        attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value()?.into_owned(),
        ));
    }
    Ok(attrs)
}

/// Parse an OOXML on/off toggle (handles "1", "true", "on", or missing val)
pub fn parse_bool(element: &RawXmlElement) -> bool {
    match element.w_val() {
        None => true, // <w:b/> means on
        Some(v) => matches!(v, "1" | "true" | "on"),
    }
}
