//! The errors produced by wordsieve.
//!
//! Per-line and per-file problems inside the build pipeline are recovered
//! locally (logged and skipped) and never surface here; these types cover
//! the failures that abort a unit of work.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The directory or path arguments handed to the locator were unusable.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The wordset directory does not exist or is not a directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    /// The manifest sidecar could not be read or written.
    #[error("failed to access manifest {}: {}", .0.display(), .1)]
    ManifestIo(PathBuf, #[source] io::Error),
    /// The manifest sidecar held something other than a manifest.
    #[error("failed to parse manifest {}: {}", .0.display(), .1)]
    ManifestFormat(PathBuf, #[source] serde_json::Error),
}

/// A string argument to the fetch entrypoint was blank.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The language name was empty or whitespace.
    #[error("a language name must be provided")]
    BlankLanguage,
    /// A destination was supplied, but was empty or whitespace.
    #[error("the destination can not be empty")]
    BlankDestination,
}

/// A single download failed.
///
/// [`FetchError::TooShort`] is the transient class: the fetcher retries it
/// up to its retry budget. Everything else aborts that one download without
/// aborting the run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FetchError {
    /// The body was shorter than the advertised Content-Length.
    #[error("content too short: got {received} of {expected} bytes")]
    TooShort {
        /// Bytes promised by the Content-Length header.
        expected: usize,
        /// Bytes actually received.
        received: usize,
    },
    /// The server answered with a non-success status.
    #[error("HTTP {status} while retrieving {url}")]
    Http {
        /// Response status code.
        status: i32,
        /// The URL that was being retrieved.
        url: String,
    },
    /// The request could not be made at all.
    #[error(transparent)]
    Transport(#[from] minreq::Error),
    /// The downloaded content could not be written to disk.
    #[error("failed to write {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),
}

/// The fetch entrypoint could not start downloading.
#[derive(Debug, Error)]
pub enum FetchSetError {
    /// A string argument was blank.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The destination directory could not be created.
    #[error("failed to create destination directory {}: {}", .0.display(), .1)]
    CreateDir(PathBuf, #[source] io::Error),
}

/// The builder could not persist an output list.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BuildError {
    /// The destination directory could not be created.
    #[error("failed to create destination directory {}: {}", .0.display(), .1)]
    CreateDir(PathBuf, #[source] io::Error),
    /// The output file could not be written.
    #[error("failed to write output file {}: {}", .0.display(), .1)]
    WriteOutput(PathBuf, #[source] io::Error),
    /// The admitted words could not be serialized.
    #[error("failed to serialize output for {}: {}", .0.display(), .1)]
    Serialize(PathBuf, #[source] serde_json::Error),
}
