//! Fetching kaikki.org dictionary sets.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, error, info, warn};

use crate::{
    errors::{FetchError, FetchSetError, ValidationError},
    wordsets::{SET_EXTENSION, WordClass},
};

/// Where the dictionary sets live.
const DICTIONARY_URL: &str = "https://kaikki.org/dictionary";

/// Extra attempts after the first when a download comes up short.
const MAX_RETRIES: u32 = 5;

/// Directory the sets land in when no destination is given.
const DEFAULT_DESTINATION: &str = "sets";

/// Display name → ISO 639-1 code pairs for the languages the fetcher knows
/// out of the box. Names the table misses fall back to a normalized form of
/// the name itself.
pub const KNOWN_LANGUAGES: &[(&str, &str)] = &[
    ("Arabic", "ar"),
    ("Catalan", "ca"),
    ("Czech", "cs"),
    ("Danish", "da"),
    ("Dutch", "nl"),
    ("English", "en"),
    ("Finnish", "fi"),
    ("French", "fr"),
    ("German", "de"),
    ("Greek", "el"),
    ("Hungarian", "hu"),
    ("Icelandic", "is"),
    ("Indonesian", "id"),
    ("Irish", "ga"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Latin", "la"),
    ("Norwegian", "no"),
    ("Persian", "fa"),
    ("Polish", "pl"),
    ("Portuguese", "pt"),
    ("Romanian", "ro"),
    ("Russian", "ru"),
    ("Serbo-Croatian", "sh"),
    ("Spanish", "es"),
    ("Swedish", "sv"),
    ("Thai", "th"),
    ("Turkish", "tr"),
    ("Ukrainian", "uk"),
    ("Vietnamese", "vi"),
];

/// Maps language display names to short codes.
///
/// An external lookup concern: the built-in [`StaticLanguageCodes`] covers
/// [`KNOWN_LANGUAGES`], implement this to plug in a fuller registry.
pub trait LanguageCodes {
    /// The short code for `name`, if known.
    fn short_code(&self, name: &str) -> Option<&str>;
}

/// [`LanguageCodes`] backed by the built-in [`KNOWN_LANGUAGES`] table.
///
/// Lookups ignore case and treat underscores as spaces, matching how the
/// CLI accepts language names.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticLanguageCodes;

impl LanguageCodes for StaticLanguageCodes {
    fn short_code(&self, name: &str) -> Option<&str> {
        let name = name.trim().replace('_', " ");
        KNOWN_LANGUAGES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(&name))
            .map(|(_, code)| *code)
    }
}

/// Which of a language's two downloads succeeded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    /// The noun set was downloaded.
    pub nouns: bool,
    /// The adjective set was downloaded.
    pub adjectives: bool,
}

/// Retrieves a language's noun and adjective source files.
pub struct Fetcher<C> {
    codes: C,
}

impl<C: LanguageCodes> Fetcher<C> {
    /// Create a fetcher around the given code-lookup collaborator.
    #[must_use]
    pub const fn new(codes: C) -> Self {
        Fetcher { codes }
    }

    /// Download both set files for `language` into `destination`.
    ///
    /// Existing files are overwritten and the destination directory is
    /// created as needed (default: `./sets`). Each download retries up to
    /// five more times on short content and gives up immediately on a hard
    /// HTTP failure; one failing does not stop the other.
    pub fn fetch_set(
        &self,
        language: &str,
        destination: Option<&str>,
    ) -> Result<FetchOutcome, FetchSetError> {
        if language.trim().is_empty() {
            return Err(ValidationError::BlankLanguage.into());
        }
        if let Some(dest) = destination {
            if dest.trim().is_empty() {
                return Err(ValidationError::BlankDestination.into());
            }
        }
        debug!("fetching {language}...");

        let destination = destination
            .map_or_else(|| PathBuf::from(DEFAULT_DESTINATION), PathBuf::from);
        fs::create_dir_all(&destination).map_err(|io_err| {
            FetchSetError::CreateDir(destination.clone(), io_err)
        })?;

        let code = match self.codes.short_code(language) {
            Some(code) => code.to_owned(),
            None => {
                warn!("no language code found, the name will be used instead");
                language.to_lowercase().replace('_', "")
            },
        };
        debug!("language code for \"{language}\" is \"{code}\"");

        let name = normalize_language(language);
        let mut outcome = FetchOutcome::default();
        for class in WordClass::ALL {
            let url = download_url(&name, class);
            let dest =
                destination.join(format!("{code}_{}.{SET_EXTENSION}", class.label()));
            match retrieve(&url, &dest) {
                Ok(()) => {
                    info!("successfully downloaded {name} {}", class.human());
                    match class {
                        WordClass::Noun => outcome.nouns = true,
                        WordClass::Adj => outcome.adjectives = true,
                    }
                },
                Err(fetch_err) => {
                    error!(
                        "cannot get language set {}: {fetch_err}",
                        dest.display(),
                    );
                },
            }
        }

        info!("finished fetching language sets");
        Ok(outcome)
    }
}

/// Normalize a display name the way kaikki spells its languages: trimmed,
/// each word title-cased, underscores treated as spaces
/// (`middle_english` → `Middle English`).
fn normalize_language(language: &str) -> String {
    let mut titled = String::with_capacity(language.len());
    let mut prev_alphabetic = false;
    for c in language.trim().replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_alphabetic {
                titled.extend(c.to_lowercase());
            } else {
                titled.extend(c.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            titled.push(c);
            prev_alphabetic = false;
        }
    }
    titled
}

/// The download URL for one word class of a language.
///
/// Kaikki escapes spaces in the path segment but drops them entirely from
/// the file name.
fn download_url(name: &str, class: WordClass) -> String {
    let escaped = name.replace(' ', "%20");
    let file = name.replace(' ', "");
    let pos = class.pos();
    format!(
        "{DICTIONARY_URL}/{escaped}/by-pos-{pos}/kaikki_dot_org-dictionary-{file}-by-pos-{pos}.json"
    )
}

/// Download `url` to `dest`, retrying short-content failures.
fn retrieve(url: &str, dest: &Path) -> Result<(), FetchError> {
    if dest.exists() {
        info!(
            "file \"{}\" already exists, content will be overwritten",
            dest.display(),
        );
    }
    debug!("downloading \"{}\": {url}", dest.display());

    let mut attempt = 0;
    loop {
        match download_once(url, dest) {
            // Short content is most likely a bad connection, keep retrying
            Err(FetchError::TooShort { expected, received })
                if attempt < MAX_RETRIES =>
            {
                attempt += 1;
                warn!(
                    "content too short ({received}/{expected} bytes): {url} - \
                     will retry ({attempt}/{MAX_RETRIES})",
                );
            },
            Err(fetch_err) => {
                if matches!(fetch_err, FetchError::TooShort { .. }) {
                    warn!("max retries exceeded: {url}");
                }
                return Err(fetch_err);
            },
            Ok(()) => return Ok(()),
        }
    }
}

fn download_once(url: &str, dest: &Path) -> Result<(), FetchError> {
    let response = minreq::get(url).send()?;
    if !(200..300).contains(&response.status_code) {
        return Err(FetchError::Http {
            status: response.status_code,
            url: url.to_owned(),
        });
    }

    let body = response.as_bytes();
    if let Some(expected) = response
        .headers
        .get("content-length")
        .and_then(|value| value.parse::<usize>().ok())
    {
        if body.len() < expected {
            return Err(FetchError::TooShort {
                expected,
                received: body.len(),
            });
        }
    }

    fs::write(dest, body)
        .map_err(|io_err| FetchError::Io(dest.to_owned(), io_err))
}
