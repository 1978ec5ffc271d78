//! Per-line dictionary records and tag extraction.

use std::collections::HashSet;

use log::trace;
use serde::Deserialize;

/// One dictionary entry, parsed from a single line of a `.kds` file.
///
/// The files as a whole are not valid JSON; every line is its own document.
/// Records are immutable and only live for the duration of filtering one
/// line. Keys other than the ones below are ignored.
#[derive(Debug, Deserialize)]
pub struct WordRecord {
    /// The headword being classified.
    pub word: String,
    /// The senses of the word. Kaikki dumps always carry this key.
    #[serde(default)]
    pub senses: Vec<Sense>,
    /// Inflected forms of the word, when present.
    #[serde(default)]
    pub forms: Vec<Form>,
}

/// One sense of a [`WordRecord`], reduced to its tags.
#[derive(Debug, Default, Deserialize)]
pub struct Sense {
    /// Descriptors such as "slang" or "plural".
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One form of a [`WordRecord`], reduced to its tags.
#[derive(Debug, Default, Deserialize)]
pub struct Form {
    /// Descriptors such as "slang" or "plural".
    #[serde(default)]
    pub tags: Vec<String>,
}

impl WordRecord {
    /// Flatten the tags of every sense and form into one case-folded set.
    ///
    /// Order-independent; duplicates collapse naturally.
    #[must_use]
    pub fn tags(&self) -> HashSet<String> {
        let tags: HashSet<String> = self
            .senses
            .iter()
            .map(|sense| &sense.tags)
            .chain(self.forms.iter().map(|form| &form.tags))
            .flatten()
            .map(|tag| tag.to_lowercase())
            .collect();
        trace!("found a total of {} tags for the word {}", tags.len(), self.word);
        tags
    }
}
