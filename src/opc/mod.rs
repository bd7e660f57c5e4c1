//! Open Packaging Convention (OPC) container access
//!
//! Reads a DOCX (ZIP) package, hands out the bytes of a part and writes the
//! package back with replaced parts.

mod package;

pub use package::Package;

/// Main document part of a WordprocessingML package
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";
