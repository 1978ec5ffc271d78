//! Curate per-language noun and adjective word lists from kaikki.org
//! dictionary dumps.
//!
//! A kaikki dictionary set (`.kds`) holds one JSON document per line, each
//! describing a headword with its senses and forms. This crate turns pairs
//! of those files (one noun set, one adjective set per language) into
//! deduplicated JSON word lists, dropping everything that is tagged as
//! nonstandard, orthographically suspect, or too rare to matter:
//!
//! - [`wordsets::locate`] scans a directory for paired set files and builds
//!   a [`Manifest`], optionally cached as a `wordsets.json` sidecar;
//! - [`fetch::Fetcher`] downloads the set files from kaikki.org;
//! - [`WordFilter`] decides word by word what gets through, remembering
//!   rejections per language in a [`filter::BlacklistMemo`];
//! - [`DictionaryBuilder`] streams records through the filter and the
//!   usage-frequency gate and persists the survivors, shortest first.
//!
//! Usage-frequency data is not included; bring your own by implementing
//! [`FrequencyTable`].

pub mod builder;
pub mod errors;
pub mod fetch;
pub mod filter;
pub mod frequency;
pub mod records;
pub mod wordsets;

pub use builder::{CancelToken, DictionaryBuilder};
pub use filter::{Rejection, WordFilter};
pub use frequency::FrequencyTable;
pub use records::WordRecord;
pub use wordsets::{Manifest, WordClass, WordsetEntry};
