//! Locating paired noun/adjective source files and the manifest they form.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

/// File extension of kaikki dictionary set files.
pub const SET_EXTENSION: &str = "kds";

/// Name of the manifest sidecar file.
pub const MANIFEST_FILE: &str = "wordsets.json";

/// The two word classes this crate processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordClass {
    /// Nouns.
    Noun,
    /// Adjectives.
    Adj,
}

impl WordClass {
    /// Both word classes, in processing order.
    pub const ALL: [WordClass; 2] = [WordClass::Noun, WordClass::Adj];

    /// The label used in file names (`en_nouns.kds`, `en_adj.json`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            WordClass::Noun => "nouns",
            WordClass::Adj => "adj",
        }
    }

    /// The part-of-speech segment kaikki uses in its URLs.
    #[must_use]
    pub const fn pos(self) -> &'static str {
        match self {
            WordClass::Noun => "noun",
            WordClass::Adj => "adj",
        }
    }

    /// Human label for log messages.
    #[must_use]
    pub const fn human(self) -> &'static str {
        match self {
            WordClass::Noun => "nouns",
            WordClass::Adj => "adjectives",
        }
    }
}

/// Paths of one language's noun and adjective source files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordsetEntry {
    /// Short language code, derived from the file name prefix.
    pub lang: String,
    /// The noun source file.
    pub noun: PathBuf,
    /// The adjective source file.
    pub adj: PathBuf,
}

impl WordsetEntry {
    /// The source file for the given word class.
    #[must_use]
    pub fn source(&self, class: WordClass) -> &Path {
        match class {
            WordClass::Noun => &self.noun,
            WordClass::Adj => &self.adj,
        }
    }
}

/// The ordered per-language mapping of located source files.
pub type Manifest = Vec<WordsetEntry>;

/// Scan `directory` for paired `*_nouns.kds` / `*_adj.kds` files.
///
/// Languages keep at most one entry (first match wins, files visited in
/// file-name order); a noun file without its adjective sibling excludes the
/// language entirely, with a warning. Returns `Ok(None)` when the directory
/// holds no noun files at all.
///
/// When `persist` is set the manifest is written to [`MANIFEST_FILE`] next
/// to the sources. When it is not set and that sidecar already exists, its
/// parsed contents are returned directly without rescanning — the cache is
/// trusted, there is no staleness check.
pub fn locate(
    directory: impl AsRef<Path>,
    persist: bool,
) -> Result<Option<Manifest>, ConfigurationError> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        error!("directory specified is not a folder");
        return Err(ConfigurationError::NotADirectory(directory.to_owned()));
    }
    let directory = fs::canonicalize(directory).map_err(|io_err| {
        ConfigurationError::ManifestIo(directory.to_owned(), io_err)
    })?;

    let sidecar = directory.join(MANIFEST_FILE);
    if !persist && sidecar.is_file() {
        debug!("\"{MANIFEST_FILE}\" already exists in the directory");
        let content = fs::read_to_string(&sidecar).map_err(|io_err| {
            ConfigurationError::ManifestIo(sidecar.clone(), io_err)
        })?;
        let manifest = serde_json::from_str(&content).map_err(|json_err| {
            ConfigurationError::ManifestFormat(sidecar.clone(), json_err)
        })?;
        debug!("returning \"{MANIFEST_FILE}\" content");
        return Ok(Some(manifest));
    }

    // All nouns should have their adjectives; if not, the language is
    // ignored with a warning.
    info!("reading wordset files from {}", directory.display());
    let mut noun_files = fs::read_dir(&directory)
        .map_err(|io_err| {
            ConfigurationError::ManifestIo(directory.clone(), io_err)
        })?
        .filter_map(|entry| Some(entry.ok()?.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == SET_EXTENSION)
                && path
                    .file_stem()
                    .is_some_and(|stem| {
                        stem.to_string_lossy().ends_with("_nouns")
                    })
        })
        .collect::<Vec<_>>();

    if noun_files.is_empty() {
        error!("no wordsets found in the directory");
        return Ok(None);
    }
    noun_files.sort();

    let mut seen = HashSet::new();
    let mut manifest = Manifest::new();
    for noun in noun_files {
        let lang = wordset_language(&noun);
        if !seen.insert(lang.clone()) {
            debug!("language \"{lang}\" already sorted, ignoring");
            continue;
        }

        let adj = directory.join(format!("{lang}_adj.{SET_EXTENSION}"));
        if !adj.is_file() {
            warn!("no matching adjective file found for the {lang} language");
            continue;
        }

        debug!(
            "added to wordsets: {lang} - noun: {} - adj: {}",
            noun.display(),
            adj.display(),
        );
        manifest.push(WordsetEntry { lang, noun, adj });
    }

    if persist {
        info!("saving wordsets data to {}", sidecar.display());
        let data = serde_json::to_string_pretty(&manifest).map_err(|json_err| {
            ConfigurationError::ManifestFormat(sidecar.clone(), json_err)
        })?;
        fs::write(&sidecar, data).map_err(|io_err| {
            ConfigurationError::ManifestIo(sidecar.clone(), io_err)
        })?;
    }

    Ok(Some(manifest))
}

/// Derive the language code from a set file path: the file stem with its
/// trailing class segment removed (`en_nouns.kds` → `en`,
/// `middle_english_nouns.kds` → `middle_english`).
fn wordset_language(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    debug!("getting file language from: {}", path.display());
    match stem.rsplit_once('_') {
        Some((lang, _)) => lang.to_owned(),
        None => stem.into_owned(),
    }
}
