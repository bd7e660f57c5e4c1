//! Package-level editing: extract the main part, apply, put it back

use crate::dispatch::Classifier;
use crate::document::Document;
use crate::edit::{self, EditInstruction, Outcome};
use crate::error::{Error, Result};
use crate::opc::{Package, MAIN_DOCUMENT_PART};
use log::{debug, warn};
use std::path::Path;

/// Editor settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorOptions {
    /// Path of the main document part inside the package
    pub document_part: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            document_part: MAIN_DOCUMENT_PART.to_string(),
        }
    }
}

/// Applies edit instructions to whole DOCX packages.
///
/// Holds no per-document state; one editor can serve any number of
/// documents from any number of threads.
#[derive(Clone, Debug, Default)]
pub struct Editor {
    options: EditorOptions,
}

impl Editor {
    pub fn new(options: EditorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Apply `instructions` in order to the package `archive`.
    ///
    /// Returns the input bytes unchanged when no instruction applied. Fatal
    /// failures carry `name`.
    pub fn edit_bytes(
        &self,
        name: &str,
        archive: &[u8],
        instructions: &[EditInstruction],
    ) -> Result<Vec<u8>> {
        self.edit_package(archive, instructions)
            .map_err(|e| fail(name, e))
    }

    /// Edit the package at `input`, writing the result to `output`
    pub fn edit_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        instructions: &[EditInstruction],
    ) -> Result<()> {
        let name = input.as_ref().display().to_string();
        let archive = std::fs::read(input.as_ref()).map_err(|e| fail(&name, e.into()))?;
        let edited = self.edit_bytes(&name, &archive, instructions)?;
        std::fs::write(output, edited).map_err(|e| fail(&name, e.into()))
    }

    /// Let `classifier` pick the instructions for this document, then apply them
    pub fn edit_classified(
        &self,
        name: &str,
        archive: &[u8],
        classifier: &dyn Classifier,
    ) -> Result<Vec<u8>> {
        let instructions = self
            .read_document(archive)
            .map(|document| classifier.classify(name, &document))
            .map_err(|e| fail(name, e))?;
        debug!("{}: {} instructions selected", name, instructions.len());

        if instructions.is_empty() {
            return Ok(archive.to_vec());
        }
        self.edit_bytes(name, archive, &instructions)
    }

    fn read_document(&self, archive: &[u8]) -> Result<Document> {
        let package = Package::from_bytes(archive)?;
        Document::from_bytes(package.read_part(&self.options.document_part)?)
    }

    fn edit_package(&self, archive: &[u8], instructions: &[EditInstruction]) -> Result<Vec<u8>> {
        let mut package = Package::from_bytes(archive)?;
        let markup = package.read_part(&self.options.document_part)?;

        match edit::apply_all(markup, instructions)? {
            Outcome::NoOp(_) => Ok(archive.to_vec()),
            Outcome::Applied(markup) => {
                package.write_part(&self.options.document_part, markup);
                package.to_bytes()
            }
        }
    }
}

fn fail(name: &str, error: Error) -> Error {
    warn!("{}: {}", name, error);
    error.in_document(name)
}
