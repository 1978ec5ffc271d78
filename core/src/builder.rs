//! Streaming source records through the filter into per-language output
//! lists.

use std::{
    collections::BTreeSet,
    fs::{self, File},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use itertools::Itertools;
use log::{debug, error, info};

use crate::{
    errors::BuildError,
    filter::WordFilter,
    frequency::{self, FrequencyTable},
    records::WordRecord,
    wordsets::{WordClass, WordsetEntry},
};

/// Cooperative cancellation flag, checked between records.
///
/// Cancelling stops the read loop: the file being processed persists
/// whatever it admitted up to that point, while files not yet started are
/// left untouched so a later run can still complete them. This
/// partial-save behavior is on purpose and covered by tests.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect before the next record.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters for one processed source file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileSummary {
    /// Words admitted into the output list.
    pub admitted: usize,
    /// Words turned away by the filter.
    pub ignored: usize,
    /// Lines that could not be read or parsed.
    pub skipped_lines: usize,
}

/// What happened to one word-class file.
#[derive(Debug, PartialEq, Eq)]
pub enum FileOutcome {
    /// The output file already existed; nothing was overwritten.
    AlreadyExists,
    /// The source file could not be opened; the run continued.
    MissingSource,
    /// Cancellation was requested before this file was started; nothing
    /// was written.
    Cancelled,
    /// An output list was written (possibly cut short by cancellation).
    Written(FileSummary),
}

/// Drives the pipeline: streams each source file of a manifest entry
/// through tag extraction, the [`WordFilter`], and the usage gate, then
/// persists the admitted words.
///
/// The filter memo is reset at every [`DictionaryBuilder::build`] call, so
/// rejections never leak from one language into the next.
pub struct DictionaryBuilder<'a> {
    frequencies: &'a dyn FrequencyTable,
    filter: WordFilter,
    cancel: CancelToken,
}

impl<'a> DictionaryBuilder<'a> {
    /// Create a builder around the given frequency collaborator.
    #[must_use]
    pub fn new(frequencies: &'a dyn FrequencyTable) -> Self {
        DictionaryBuilder {
            frequencies,
            filter: WordFilter::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Use `token` for cooperative cancellation.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Build both output lists for one language.
    ///
    /// Output goes to `<destination>/<lang>_<nouns|adj>.json`; existing
    /// output files are left untouched and missing source files are logged,
    /// in both cases the run continues with the next file.
    ///
    /// Once cancellation is requested, the file being read persists the
    /// words admitted so far and every remaining file is skipped without
    /// output, so a later run can still produce it.
    pub fn build(
        &mut self,
        entry: &WordsetEntry,
        destination: impl AsRef<Path>,
    ) -> Result<Vec<(WordClass, FileOutcome)>, BuildError> {
        let destination = destination.as_ref();
        debug!("handling language: {}", entry.lang);

        // A new language, a fresh memo
        self.filter.reset();

        fs::create_dir_all(destination).map_err(|io_err| {
            BuildError::CreateDir(destination.to_owned(), io_err)
        })?;

        WordClass::ALL
            .into_iter()
            .map(|class| {
                Ok((class, self.build_file(entry, class, destination)?))
            })
            .collect()
    }

    fn build_file(
        &mut self,
        entry: &WordsetEntry,
        class: WordClass,
        destination: &Path,
    ) -> Result<FileOutcome, BuildError> {
        let source = entry.source(class);
        let out_path = output_path(destination, &entry.lang, class);

        // An unstarted file must stay absent, or the existence check below
        // would treat an empty list as final on the next run
        if self.cancel.is_cancelled() {
            info!(
                "cancelled before {} was started, leaving it untouched",
                source.display(),
            );
            return Ok(FileOutcome::Cancelled);
        }

        if out_path.exists() {
            // TODO: add the ability to overwrite existing content
            info!("file \"{}\" already exists", out_path.display());
            return Ok(FileOutcome::AlreadyExists);
        }

        let file = match File::open(source) {
            Ok(file) => file,
            Err(io_err) => {
                error!("cannot open {}: {io_err}", source.display());
                return Ok(FileOutcome::MissingSource);
            },
        };
        info!(
            "parsing {} for {} in {}",
            entry.lang,
            class.label(),
            source.display(),
        );

        // A set, so duplicated headwords collapse
        let mut words = BTreeSet::new();
        let mut summary = FileSummary::default();
        // Every line is its own JSON document; parsing the file as a whole
        // would fail
        for (index, line) in BufReader::new(file).lines().enumerate() {
            if self.cancel.is_cancelled() {
                info!(
                    "cancelled while processing {}, saving partial results",
                    source.display(),
                );
                break;
            }

            let line = match line {
                Ok(line) => line,
                Err(io_err) => {
                    error!(
                        "error reading {} at line {}: {io_err}",
                        source.display(),
                        index + 1,
                    );
                    summary.skipped_lines += 1;
                    continue;
                },
            };
            let record: WordRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(json_err) => {
                    error!(
                        "error parsing {} at line {}: {json_err}",
                        source.display(),
                        index + 1,
                    );
                    summary.skipped_lines += 1;
                    continue;
                },
            };

            let word = record.word.to_lowercase();
            let tags = record.tags();

            if self.filter.should_reject(&word, &tags) {
                debug!("{word} is blacklisted");
                summary.ignored += 1;
                continue;
            }

            if frequency::is_used(self.frequencies, &word, &entry.lang) {
                words.insert(word);
            }
        }

        summary.admitted = words.len();
        persist(&out_path, &words)?;
        info!(
            "a total of {} words were ignored for the {} language",
            summary.ignored, entry.lang,
        );
        info!(
            "created \"{}_{}.json\" with a total of {} {}",
            entry.lang,
            class.label(),
            summary.admitted,
            class.human(),
        );
        Ok(FileOutcome::Written(summary))
    }
}

/// Where the output list for a (language, word class) pair lands.
#[must_use]
pub fn output_path(destination: &Path, lang: &str, class: WordClass) -> PathBuf {
    destination.join(format!("{lang}_{}.json", class.label()))
}

/// Write the admitted words as a pretty-printed JSON array, shortest words
/// first, equal lengths ordered lexicographically.
fn persist(path: &Path, words: &BTreeSet<String>) -> Result<(), BuildError> {
    // BTreeSet iteration is lexicographic and the sort is stable, which
    // settles the equal-length tie-break
    let matches = words
        .iter()
        .sorted_by_key(|word| word.chars().count())
        .collect::<Vec<_>>();
    let json = serde_json::to_string_pretty(&matches)
        .map_err(|json_err| BuildError::Serialize(path.to_owned(), json_err))?;
    fs::write(path, json)
        .map_err(|io_err| BuildError::WriteOutput(path.to_owned(), io_err))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;
    use crate::frequency::tests::StubFrequencies;

    fn frequencies() -> StubFrequencies {
        StubFrequencies(HashMap::from([
            ("chair", 1e-4),
            ("table", 1e-4),
            ("stool", 1e-4),
            ("bench", 1e-4),
            ("settee", 1e-4),
            ("red", 1e-4),
        ]))
    }

    fn write_entry(dir: &Path, lang: &str, nouns: &str, adj: &str) -> WordsetEntry {
        let noun = dir.join(format!("{lang}_nouns.kds"));
        let adj_path = dir.join(format!("{lang}_adj.kds"));
        fs::write(&noun, nouns).unwrap();
        fs::write(&adj_path, adj).unwrap();
        WordsetEntry {
            lang: lang.to_owned(),
            noun,
            adj: adj_path,
        }
    }

    fn read_list(path: &Path) -> Vec<String> {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn admitted_words_land_in_the_output_file() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(
            dir.path(),
            "en",
            concat!(
                r#"{"word":"chair","senses":[{}]}"#,
                "\n",
                r#"{"word":"Table","senses":[{"tags":["slang"]}]}"#,
                "\n",
                r#"{"word":"zyzzyva","senses":[{}]}"#,
                "\n",
            ),
            r#"{"word":"red","senses":[{}]}"#,
        );
        let frequencies = frequencies();
        let mut builder = DictionaryBuilder::new(&frequencies);
        let dest = dir.path().join("dict");

        let outcomes = builder.build(&entry, &dest).unwrap();
        assert_eq!(outcomes[0], (
            WordClass::Noun,
            FileOutcome::Written(FileSummary {
                admitted: 1,
                ignored: 1,
                skipped_lines: 0,
            }),
        ));

        // "table" was tag-blacklisted, "zyzzyva" failed the usage gate
        let nouns = read_list(&output_path(&dest, "en", WordClass::Noun));
        assert_eq!(nouns, ["chair"]);
        let adj = read_list(&output_path(&dest, "en", WordClass::Adj));
        assert_eq!(adj, ["red"]);
    }

    #[test]
    fn existing_output_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(
            dir.path(),
            "en",
            r#"{"word":"chair","senses":[{}]}"#,
            r#"{"word":"red","senses":[{}]}"#,
        );
        let dest = dir.path().join("dict");
        fs::create_dir_all(&dest).unwrap();
        let noun_out = output_path(&dest, "en", WordClass::Noun);
        fs::write(&noun_out, "[\"sentinel\"]").unwrap();

        let frequencies = frequencies();
        let mut builder = DictionaryBuilder::new(&frequencies);
        let outcomes = builder.build(&entry, &dest).unwrap();

        assert_eq!(outcomes[0], (WordClass::Noun, FileOutcome::AlreadyExists));
        assert_eq!(read_list(&noun_out), ["sentinel"]);
        // Running again changes nothing further
        let outcomes = builder.build(&entry, &dest).unwrap();
        assert!(matches!(outcomes[0].1, FileOutcome::AlreadyExists));
        assert!(matches!(outcomes[1].1, FileOutcome::AlreadyExists));
    }

    #[test]
    fn missing_source_is_logged_and_skipped() {
        let dir = TempDir::new().unwrap();
        let entry = WordsetEntry {
            lang: "en".to_owned(),
            noun: dir.path().join("en_nouns.kds"),
            adj: dir.path().join("en_adj.kds"),
        };
        let frequencies = frequencies();
        let mut builder = DictionaryBuilder::new(&frequencies);

        let outcomes = builder.build(&entry, dir.path().join("dict")).unwrap();
        assert_eq!(outcomes[0], (WordClass::Noun, FileOutcome::MissingSource));
        assert_eq!(outcomes[1], (WordClass::Adj, FileOutcome::MissingSource));
    }

    #[test]
    fn malformed_lines_are_counted_and_skipped() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(
            dir.path(),
            "en",
            concat!(
                r#"{"word":"chair","senses":[{}]}"#,
                "\n",
                "{not json}\n",
                r#"{"word":"stool","senses":[{}]}"#,
                "\n",
            ),
            "",
        );
        let frequencies = frequencies();
        let mut builder = DictionaryBuilder::new(&frequencies);
        let dest = dir.path().join("dict");

        let outcomes = builder.build(&entry, &dest).unwrap();
        let FileOutcome::Written(summary) = &outcomes[0].1 else {
            panic!("expected a written outcome");
        };
        assert_eq!(summary.skipped_lines, 1);
        assert_eq!(summary.admitted, 2);
    }

    #[test]
    fn output_is_sorted_by_length_then_lexicographically() {
        let dir = TempDir::new().unwrap();
        let lines = ["settee", "bench", "chair", "table", "stool"]
            .map(|word| format!("{{\"word\":\"{word}\",\"senses\":[{{}}]}}\n"))
            .concat();
        let entry = write_entry(dir.path(), "en", &lines, "");
        let frequencies = frequencies();
        let mut builder = DictionaryBuilder::new(&frequencies);
        let dest = dir.path().join("dict");

        builder.build(&entry, &dest).unwrap();
        let nouns = read_list(&output_path(&dest, "en", WordClass::Noun));
        assert_eq!(nouns, ["bench", "chair", "stool", "table", "settee"]);
    }

    /// Flips its token during the first lookup, as if the user interrupted
    /// a long-running build.
    struct CancellingFrequencies {
        inner: StubFrequencies,
        token: CancelToken,
    }

    impl FrequencyTable for CancellingFrequencies {
        fn frequency(
            &self,
            word: &str,
            lang: &str,
            wordlist: &str,
            minimum: f64,
        ) -> f64 {
            self.token.cancel();
            self.inner.frequency(word, lang, wordlist, minimum)
        }
    }

    #[test]
    fn a_cancelled_builder_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(
            dir.path(),
            "en",
            r#"{"word":"chair","senses":[{}]}"#,
            r#"{"word":"red","senses":[{}]}"#,
        );
        let frequencies = frequencies();
        let token = CancelToken::new();
        token.cancel();
        let mut builder =
            DictionaryBuilder::new(&frequencies).with_cancel_token(token);
        let dest = dir.path().join("dict");

        let outcomes = builder.build(&entry, &dest).unwrap();
        assert_eq!(outcomes[0], (WordClass::Noun, FileOutcome::Cancelled));
        assert_eq!(outcomes[1], (WordClass::Adj, FileOutcome::Cancelled));
        assert!(!output_path(&dest, "en", WordClass::Noun).exists());
        assert!(!output_path(&dest, "en", WordClass::Adj).exists());
    }

    #[test]
    fn cancellation_keeps_the_interrupted_file_and_spares_the_rest() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(
            dir.path(),
            "en",
            concat!(
                r#"{"word":"chair","senses":[{}]}"#,
                "\n",
                r#"{"word":"stool","senses":[{}]}"#,
                "\n",
            ),
            r#"{"word":"red","senses":[{}]}"#,
        );
        let frequencies = CancellingFrequencies {
            inner: frequencies(),
            token: CancelToken::new(),
        };
        let mut builder = DictionaryBuilder::new(&frequencies)
            .with_cancel_token(frequencies.token.clone());
        let dest = dir.path().join("dict");

        let outcomes = builder.build(&entry, &dest).unwrap();
        // The noun file stops after its first record but keeps it
        assert_eq!(outcomes[0], (
            WordClass::Noun,
            FileOutcome::Written(FileSummary {
                admitted: 1,
                ignored: 0,
                skipped_lines: 0,
            }),
        ));
        let nouns = read_list(&output_path(&dest, "en", WordClass::Noun));
        assert_eq!(nouns, ["chair"]);
        // The adjective file was never started and stays absent
        assert_eq!(outcomes[1], (WordClass::Adj, FileOutcome::Cancelled));
        assert!(!output_path(&dest, "en", WordClass::Adj).exists());
    }

    #[test]
    fn a_rerun_after_cancellation_completes_the_skipped_files() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(
            dir.path(),
            "en",
            r#"{"word":"chair","senses":[{}]}"#,
            r#"{"word":"red","senses":[{}]}"#,
        );
        let dest = dir.path().join("dict");

        let cancelling = CancellingFrequencies {
            inner: frequencies(),
            token: CancelToken::new(),
        };
        let mut builder = DictionaryBuilder::new(&cancelling)
            .with_cancel_token(cancelling.token.clone());
        let outcomes = builder.build(&entry, &dest).unwrap();
        assert_eq!(outcomes[1], (WordClass::Adj, FileOutcome::Cancelled));

        // A fresh run picks up where the cancelled one left off
        let frequencies = frequencies();
        let mut builder = DictionaryBuilder::new(&frequencies);
        let outcomes = builder.build(&entry, &dest).unwrap();
        assert_eq!(outcomes[0], (WordClass::Noun, FileOutcome::AlreadyExists));
        let FileOutcome::Written(_) = outcomes[1].1 else {
            panic!("expected a written outcome");
        };
        let adj = read_list(&output_path(&dest, "en", WordClass::Adj));
        assert_eq!(adj, ["red"]);
    }

    #[test]
    fn the_memo_never_leaks_across_languages() {
        let dir = TempDir::new().unwrap();
        // "table" is tag-blacklisted for English...
        let en = write_entry(
            dir.path(),
            "en",
            r#"{"word":"table","senses":[{"tags":["slang"]}]}"#,
            "",
        );
        // ...but carries no tags in the second language
        let de = write_entry(
            dir.path(),
            "de",
            r#"{"word":"table","senses":[{}]}"#,
            "",
        );
        let frequencies = frequencies();
        let mut builder = DictionaryBuilder::new(&frequencies);
        let dest = dir.path().join("dict");

        builder.build(&en, &dest).unwrap();
        assert!(read_list(&output_path(&dest, "en", WordClass::Noun)).is_empty());

        builder.build(&de, &dest).unwrap();
        let de_nouns = read_list(&output_path(&dest, "de", WordClass::Noun));
        assert_eq!(de_nouns, ["table"]);
    }
}
