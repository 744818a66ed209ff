//! Script parsing and audio assembly
//!
//! A script is an ordered sequence of [`ScriptLine`] records. The
//! [`Assembler`] turns one into a single audio buffer by synthesizing
//! each line through a speech engine and inserting pauses between
//! segments.

pub mod assembler;
pub mod parser;

pub use assembler::{Assembler, AssemblyMode};
pub use parser::{parse_script, split_paragraphs};

use std::collections::BTreeSet;

/// One line of a script: who speaks and what they say.
///
/// The speaker name doubles as the engine voice name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub speaker: String,
    pub text: String,
}

impl ScriptLine {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// The set of voice names a script is allowed to reference.
///
/// Names are matched exactly. The script parser lower-cases speaker
/// names before the lookup, so sets built from engine voice lists
/// should hold lower-case names.
#[derive(Debug, Clone, Default)]
pub struct VoiceSet {
    names: BTreeSet<String>,
}

impl VoiceSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
