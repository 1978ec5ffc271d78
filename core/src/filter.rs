//! Deciding which candidate headwords make it into an output list.

use std::{collections::HashSet, ops::RangeInclusive};

use log::{debug, info};

/// Semantic tags that disqualify a headword outright.
const BLACKLISTED_TAGS: [&str; 5] =
    ["abbreviation", "initialism", "slang", "vulgar", "obsolete"];

/// ASCII punctuation (plus `°`, `¡`, and `¿`) checked before the block
/// policy, which is far cheaper than walking [`BLACKLISTED_BLOCKS`].
const BLACKLISTED_CHARACTERS: &str = "°!¡\"#$%&'()*+,./:;<=>¿?@[\\]^_`{|}~";

/// Unicode block ranges denied by the character policy.
///
/// Everything is allowed by default; a word is rejected as soon as one of
/// its characters lands in any of these ranges. Zalgo is not filtered.
const BLACKLISTED_BLOCKS: &[RangeInclusive<u32>] = &[
    // Currency Symbols
    0x20A0..=0x20CF,
    // Number Forms through Miscellaneous Symbols and Arrows (arrows,
    // mathematical operators, enclosed alphanumerics, box drawing,
    // geometric shapes, dingbats, braille patterns, ...)
    0x2150..=0x2BFF,
    // Common Indic Number Forms
    0xA830..=0xA83F,
    // Variation Selectors, Vertical Forms
    0xFE00..=0xFE1F,
    // Combining Half Marks
    0xFE20..=0xFE2F,
    // Small Form Variants
    0xFE50..=0xFE6F,
    // Halfwidth and Fullwidth Forms, Specials
    0xFF00..=0xFFFF,
    // Aegean Numbers, Ancient Greek Numbers
    0x10100..=0x1018F,
    // Coptic Epact Numbers
    0x102E0..=0x102FF,
    // Rumi Numeral Symbols
    0x10E60..=0x10E7F,
    // Sinhala Archaic Numbers
    0x111E0..=0x111FF,
    // Cuneiform Numbers and Punctuation
    0x12400..=0x1247F,
    // Shorthand Format Controls through Mayan Numerals (byzantine and
    // western musical symbols, ancient greek musical notation)
    0x1BCA0..=0x1D2FF,
    // Counting Rod Numerals, Mathematical Alphanumeric Symbols, Sutton
    // SignWriting
    0x1D360..=0x1DAAF,
    // Indic Siyaq Numbers through Symbols and Pictographs Extended-A
    // (mahjong/domino tiles, playing cards, enclosed supplements,
    // emoticons, transport and map symbols, chess symbols, ...)
    0x1EC70..=0x1FAFF,
];

/// Why a word was turned away. Every check reports a distinct reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The word is a multi-word phrase, not a lexical item.
    Phrase,
    /// The word contains a numeric character or a blacklisted ASCII
    /// character.
    Character(char),
    /// The word carries a blacklisted semantic tag.
    Tag(&'static str),
    /// The word was previously rejected for this language.
    Known,
    /// The word contains a character from a denied Unicode block.
    Block(char),
    /// The word is an anchored-prefix variant of a previously rejected
    /// word (the referenced one).
    Variant(String),
}

/// Headwords already rejected for the current language.
///
/// Scoped to one language: [`BlacklistMemo::clear`] must run before the
/// next language's records are processed, so nothing leaks across
/// languages.
#[derive(Debug, Default)]
pub struct BlacklistMemo(HashSet<String>);

impl BlacklistMemo {
    /// Create an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the word was already rejected.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    /// Remember a rejected word.
    pub fn record(&mut self, word: &str) {
        info!("adding word to blacklist: {word}");
        self.0.insert(word.to_owned());
    }

    /// Find a previously rejected word that starts with `word`, if any.
    #[must_use]
    pub fn find_variant_of(&self, word: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|rejected| rejected.starts_with(word))
            .map(String::as_str)
    }

    /// Forget everything. Called at language boundaries.
    pub fn clear(&mut self) {
        debug!("blacklist cleared");
        self.0.clear();
    }

    /// How many words have been rejected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no word has been rejected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decides, per candidate word, whether it is admitted into the output
/// list.
///
/// Holds the per-language [`BlacklistMemo`]; call [`WordFilter::reset`]
/// before moving on to another language.
#[derive(Debug, Default)]
pub struct WordFilter {
    memo: BlacklistMemo,
}

impl WordFilter {
    /// Create a filter with an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the word should be kept out of the output list.
    pub fn should_reject(&mut self, word: &str, tags: &HashSet<String>) -> bool {
        self.rejection(word, tags).is_some()
    }

    /// Run the rejection checks in order; the first match wins.
    ///
    /// Tag and block rejections record the word in the memo so later
    /// look-alikes can be short-circuited; variant rejections reference the
    /// originating word without being recorded themselves.
    pub fn rejection(
        &mut self,
        word: &str,
        tags: &HashSet<String>,
    ) -> Option<Rejection> {
        // A whitespaced word is probably a saying and should be skipped.
        // One split is enough, checking for further whitespace is pointless.
        if word.split_whitespace().nth(1).is_some() {
            debug!("{word} contains whitespaced character/s");
            return Some(Rejection::Phrase);
        }

        // is_numeric spans decimal digits in any script plus number forms
        // like ½ and Ⅻ
        if let Some(c) = word
            .chars()
            .find(|c| c.is_numeric() || BLACKLISTED_CHARACTERS.contains(*c))
        {
            debug!("({c}) - {word} contains a blacklisted character");
            return Some(Rejection::Character(c));
        }

        if let Some(tag) =
            BLACKLISTED_TAGS.iter().copied().find(|tag| tags.contains(*tag))
        {
            debug!("{word} contains a blacklisted tag");
            self.memo.record(word);
            return Some(Rejection::Tag(tag));
        }

        if self.memo.contains(word) {
            debug!("word was previously blacklisted: {word}");
            return Some(Rejection::Known);
        }

        if let Some(c) = word.chars().find(|c| {
            BLACKLISTED_BLOCKS.iter().any(|block| block.contains(&(*c as u32)))
        }) {
            debug!("{word} contains a blacklisted unicode character");
            self.memo.record(word);
            return Some(Rejection::Block(c));
        }

        // The memo size makes this scan degrade over long inputs; it stays
        // last for that reason.
        if let Some(rejected) = self.memo.find_variant_of(word) {
            let rejected = rejected.to_owned();
            debug!("variant {word} of previously blacklisted {rejected}");
            return Some(Rejection::Variant(rejected));
        }

        None
    }

    /// Remember `word` as rejected for the current language.
    pub fn record_rejection(&mut self, word: &str) {
        self.memo.record(word);
    }

    /// Clear the memo at a language boundary.
    pub fn reset(&mut self) {
        self.memo.clear();
    }

    /// Read access to the memo, mostly for observability.
    #[must_use]
    pub fn memo(&self) -> &BlacklistMemo {
        &self.memo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_tags() -> HashSet<String> {
        HashSet::new()
    }

    fn tagged(tag: &str) -> HashSet<String> {
        HashSet::from([tag.to_owned()])
    }

    #[test]
    fn multi_token_words_are_phrases() {
        let mut filter = WordFilter::new();
        assert_eq!(
            filter.rejection("coffee table", &tagged("slang")),
            Some(Rejection::Phrase),
        );
        assert_eq!(
            filter.rejection("a b c", &no_tags()),
            Some(Rejection::Phrase),
        );
        // Leading whitespace alone is not a phrase
        assert_eq!(filter.rejection(" chair", &no_tags()), None);
    }

    #[test]
    fn digits_always_reject() {
        let mut filter = WordFilter::new();
        for word in ["4x4", "covid19", "1", "mp3"] {
            assert_eq!(
                filter.rejection(word, &no_tags()),
                Some(Rejection::Character(
                    word.chars().find(char::is_ascii_digit).unwrap(),
                )),
            );
        }
    }

    #[test]
    fn numeric_characters_of_any_script_reject() {
        let mut filter = WordFilter::new();
        // U+0664 ARABIC-INDIC DIGIT FOUR, a decimal digit outside ASCII
        assert_eq!(
            filter.rejection("ربع٤", &no_tags()),
            Some(Rejection::Character('٤')),
        );
        // Number forms are caught here, before the block policy runs
        assert_eq!(
            filter.rejection("chapterⅫ", &no_tags()),
            Some(Rejection::Character('Ⅻ')),
        );
        assert_eq!(
            filter.rejection("½cup", &no_tags()),
            Some(Rejection::Character('½')),
        );
    }

    #[test]
    fn ascii_punctuation_rejects() {
        let mut filter = WordFilter::new();
        assert_eq!(
            filter.rejection("don't", &no_tags()),
            Some(Rejection::Character('\'')),
        );
        assert_eq!(
            filter.rejection("e.g", &no_tags()),
            Some(Rejection::Character('.')),
        );
        // Hyphenated compounds pass this check
        assert_eq!(filter.rejection("well-known", &no_tags()), None);
    }

    #[test]
    fn blacklisted_tags_reject_and_record() {
        let mut filter = WordFilter::new();
        assert_eq!(
            filter.rejection("table", &tagged("slang")),
            Some(Rejection::Tag("slang")),
        );
        assert!(filter.memo().contains("table"));
        // Same word again, even without tags, is now known
        assert_eq!(filter.rejection("table", &no_tags()), Some(Rejection::Known));
    }

    #[test]
    fn denied_blocks_reject_and_record() {
        let mut filter = WordFilter::new();
        // U+20AC EURO SIGN sits in Currency Symbols
        assert_eq!(
            filter.rejection("€uro", &no_tags()),
            Some(Rejection::Block('€')),
        );
        assert!(filter.memo().contains("€uro"));
        // U+FF21 FULLWIDTH LATIN CAPITAL LETTER A
        assert_eq!(
            filter.rejection("Ａbc", &no_tags()),
            Some(Rejection::Block('Ａ')),
        );
        // U+1F600 GRINNING FACE
        assert_eq!(
            filter.rejection("ha😀", &no_tags()),
            Some(Rejection::Block('😀')),
        );
    }

    #[test]
    fn ordinary_letters_survive_the_block_policy() {
        let mut filter = WordFilter::new();
        for word in ["chair", "über", "кошка", "çay", "αβγ"] {
            assert_eq!(filter.rejection(word, &no_tags()), None, "{word}");
        }
    }

    #[test]
    fn prefixes_of_rejected_words_are_variants() {
        let mut filter = WordFilter::new();
        assert!(filter.should_reject("tables", &tagged("obsolete")));
        assert_eq!(
            filter.rejection("table", &no_tags()),
            Some(Rejection::Variant("tables".to_owned())),
        );
        // Variant rejections are not themselves recorded
        assert!(!filter.memo().contains("table"));
    }

    #[test]
    fn reset_clears_the_memo() {
        let mut filter = WordFilter::new();
        assert!(filter.should_reject("gonna", &tagged("slang")));
        filter.reset();
        assert!(filter.memo().is_empty());
        assert_eq!(filter.rejection("gonna", &no_tags()), None);
    }

    #[test]
    fn record_rejection_feeds_the_memo() {
        let mut filter = WordFilter::new();
        filter.record_rejection("lol");
        assert_eq!(filter.rejection("lol", &no_tags()), Some(Rejection::Known));
    }
}
