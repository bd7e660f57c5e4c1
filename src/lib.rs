//! # linch-docx-edit
//!
//! Structural edits for DOCX documents.
//!
//! ## Features
//!
//! - Locate anchors in the flat paragraph/run text: headings, numbered
//!   sections, sentence ends
//! - Split runs at any text offset without losing their formatting
//! - Insert paragraphs and runs that inherit their neighbours' style
//! - Renumber section labels after a new section is added
//! - Round-trip preservation (unknown elements are kept intact)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linch_docx_edit::{EditInstruction, Editor};
//!
//! let instructions = [
//!     EditInstruction::insert_after_heading("Definitions", "\"Affiliate\" means ...")
//!         .with_bold(true),
//!     EditInstruction::add_new_section(10, "Residuals. ", "Nothing in this Agreement ...")
//!         .with_underline(true),
//! ];
//!
//! let editor = Editor::default();
//! editor.edit_file("contract.docx", "contract-edited.docx", &instructions)?;
//! ```
//!
//! Single document parts can be edited without the package:
//!
//! ```rust,ignore
//! use linch_docx_edit::edit::{apply, Outcome};
//!
//! match apply(markup, &instruction)? {
//!     Outcome::Applied(new_markup) => { /* changed */ }
//!     Outcome::NoOp(_) => { /* anchor not found, input returned */ }
//! }
//! ```

pub mod dispatch;
pub mod document;
pub mod edit;
pub mod editor;
pub mod error;
pub mod opc;
pub mod xml;

pub use dispatch::{Classifier, KeywordClassifier, Rule};
pub use document::{Document, Paragraph, PropertyBag, Run};
pub use edit::{EditInstruction, Outcome, SectionPosition};
pub use editor::{Editor, EditorOptions};
pub use error::{Error, Result};
pub use opc::Package;
