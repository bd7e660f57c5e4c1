//! Edit instructions

/// Where text goes inside a located section paragraph
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SectionPosition {
    /// Right after the section's leading label (`11. `)
    Start,
    /// After the first `.` of the paragraph
    #[default]
    AfterFirstSentence,
    /// After the last character of the paragraph
    End,
}

/// A declarative edit applied to one document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditInstruction {
    /// Insert a new paragraph after the first paragraph containing `search`
    InsertAfterHeading {
        search: String,
        text: String,
        /// Bold for a leading quoted term; `None` means bold
        bold: Option<bool>,
    },
    /// Insert text into the paragraph of section `section`
    InsertInSection {
        section: u32,
        text: String,
        position: SectionPosition,
        /// Case-insensitive text prefix matched when no paragraph carries the label
        fallback: Option<String>,
    },
    /// Add section `after_section + 1` after the last paragraph labelled
    /// `after_section`, renumbering the sections that follow
    AddNewSection {
        after_section: u32,
        title: String,
        text: String,
        bold: Option<bool>,
        underline: Option<bool>,
    },
}

impl EditInstruction {
    /// Insert-after-heading with the default (bold) defined term
    pub fn insert_after_heading(search: impl Into<String>, text: impl Into<String>) -> Self {
        EditInstruction::InsertAfterHeading {
            search: search.into(),
            text: text.into(),
            bold: None,
        }
    }

    /// Insert after the first sentence of section `section`
    pub fn insert_in_section(section: u32, text: impl Into<String>) -> Self {
        EditInstruction::InsertInSection {
            section,
            text: text.into(),
            position: SectionPosition::default(),
            fallback: None,
        }
    }

    /// Add a new section after `after_section`
    pub fn add_new_section(
        after_section: u32,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        EditInstruction::AddNewSection {
            after_section,
            title: title.into(),
            text: text.into(),
            bold: None,
            underline: None,
        }
    }

    /// Override the bold toggle (ignored by `InsertInSection`)
    pub fn with_bold(mut self, value: bool) -> Self {
        match &mut self {
            EditInstruction::InsertAfterHeading { bold, .. }
            | EditInstruction::AddNewSection { bold, .. } => *bold = Some(value),
            EditInstruction::InsertInSection { .. } => {}
        }
        self
    }

    /// Override the underline toggle (only `AddNewSection` has a title to underline)
    pub fn with_underline(mut self, value: bool) -> Self {
        if let EditInstruction::AddNewSection { underline, .. } = &mut self {
            *underline = Some(value);
        }
        self
    }

    /// Set the insertion position (only `InsertInSection`)
    pub fn at(mut self, value: SectionPosition) -> Self {
        if let EditInstruction::InsertInSection { position, .. } = &mut self {
            *position = value;
        }
        self
    }

    /// Set the fallback text prefix (only `InsertInSection`)
    pub fn with_fallback(mut self, prefix: impl Into<String>) -> Self {
        if let EditInstruction::InsertInSection { fallback, .. } = &mut self {
            *fallback = Some(prefix.into());
        }
        self
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            EditInstruction::InsertAfterHeading { .. } => "insert-after-heading",
            EditInstruction::InsertInSection { .. } => "insert-in-section",
            EditInstruction::AddNewSection { .. } => "add-new-section",
        }
    }
}
