//! The usage-frequency collaborator and the gate built on top of it.

/// A word must be more frequent than this to count as used.
const USAGE_THRESHOLD: f64 = 5.62e-6;

/// External frequency-data collaborator.
///
/// Implementations wrap whatever frequency dataset is available; wordsieve
/// deliberately ships none of its own. The builder only ever queries it
/// through [`is_used`].
pub trait FrequencyTable {
    /// The frequency of `word` in `lang`, looked up in `wordlist`, never
    /// below `minimum`.
    fn frequency(&self, word: &str, lang: &str, wordlist: &str, minimum: f64)
    -> f64;

    /// Split `word` into the tokens the frequency data is keyed by.
    ///
    /// The default splits on whitespace and hyphens, which is all the gate
    /// needs to spot hyphenated compounds. Override it when the dataset
    /// tokenizes differently for `lang`.
    fn tokenize(&self, word: &str, _lang: &str) -> Vec<String> {
        word.split(|c: char| c.is_whitespace() || c == '-')
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Whether `word` is common enough in `lang` to keep.
///
/// Words that tokenize to more than two tokens are multi-word phrases and
/// are never considered used; everything else is a pure frequency lookup
/// against the "best" word list.
pub fn is_used(table: &dyn FrequencyTable, word: &str, lang: &str) -> bool {
    if table.tokenize(word, lang).len() > 2 {
        return false;
    }
    table.frequency(word, lang, "best", 0.0) > USAGE_THRESHOLD
}
