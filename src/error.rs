//! Error types for linch-docx-edit

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The main document part could not be parsed or serialized
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// An edit anchor was not present in the document.
    ///
    /// The edit applier turns this into a no-op; it is never returned
    /// from [`crate::edit::apply`].
    #[error("Anchor not found: {0}")]
    AnchorNotFound(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// A fatal failure tagged with the document it happened in
    #[error("Failed to edit '{name}': {source}")]
    Document {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Collapse any parse/serialize failure into [`Error::MalformedDocument`]
    pub fn into_malformed(self) -> Self {
        match self {
            Error::MalformedDocument(_) => self,
            other => Error::MalformedDocument(other.to_string()),
        }
    }

    /// Attach a document identity
    pub fn in_document(self, name: impl Into<String>) -> Self {
        Error::Document {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Whether this is (or wraps) a malformed-document failure
    pub fn is_malformed(&self) -> bool {
        match self {
            Error::MalformedDocument(_) => true,
            Error::Document { source, .. } => source.is_malformed(),
            _ => false,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_malformed_keeps_message() {
        let err = Error::PartNotFound("word/document.xml".into()).into_malformed();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_document_identity() {
        let err = Error::MalformedDocument("bad root".into()).in_document("contract1.docx");
        assert!(err.is_malformed());
        assert_eq!(
            err.to_string(),
            "Failed to edit 'contract1.docx': Malformed document: bad root"
        );
    }
}
