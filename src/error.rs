//! Error types for archive alignment.
//!
//! This module provides the [`Error`] enum which represents every failure mode
//! of an alignment run, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Failures
//! are never retried: ZIP structural corruption is not a transient condition.
//!
//! ```rust,no_run
//! use apkalign::{AlignOptions, Error, align_file};
//!
//! fn align(input: &str, output: &str) -> apkalign::Result<()> {
//!     match align_file(input, output, &AlignOptions::default(), false) {
//!         Ok(result) => {
//!             println!("inserted {} padding bytes", result.padding_bytes);
//!             Ok(())
//!         }
//!         Err(e @ Error::EocdNotFound { .. }) => {
//!             eprintln!("{} is not a ZIP archive", input);
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```
//!
//! ## Error Categories
//!
//! | Category | Variants | Typical Cause |
//! |----------|----------|---------------|
//! | I/O | [`Io`][Error::Io] | Read, seek or write failure |
//! | Structure | [`EocdNotFound`][Error::EocdNotFound], [`CorruptDirectory`][Error::CorruptDirectory], [`CorruptLocalHeader`][Error::CorruptLocalHeader] | Corrupt or non-ZIP input |
//! | Limits | [`Zip64Unsupported`][Error::Zip64Unsupported], [`OffsetOverflow`][Error::OffsetOverflow], [`ExtraFieldOverflow`][Error::ExtraFieldOverflow] | 32-bit / 16-bit field limits |
//! | Usage | [`InvalidAlignment`][Error::InvalidAlignment], [`InvalidLibrarySuffix`][Error::InvalidLibrarySuffix], [`SamePath`][Error::SamePath], [`OutputExists`][Error::OutputExists] | Caller configuration |
//! | Keys | [`InvalidKey`][Error::InvalidKey] | Unreadable PKCS#8 key |

use std::io;
use std::path::PathBuf;

/// The main error type for alignment operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred on the source or destination.
    ///
    /// A partially written destination must be discarded by the caller;
    /// [`align_file`](crate::align_file) does this automatically.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No end-of-central-directory record was found in the trailer window.
    ///
    /// `searched` is the number of trailing bytes that were examined.
    #[error("No end-of-central-directory found (searched last {searched} bytes)")]
    EocdNotFound {
        /// Bytes examined at the end of the file.
        searched: u64,
    },

    /// A central directory record is malformed.
    #[error("Corrupt central directory at offset {offset:#x}: {reason}")]
    CorruptDirectory {
        /// Offset of the offending record in the source archive.
        offset: u64,
        /// Description of the problem.
        reason: String,
    },

    /// A local file header referenced by the central directory is malformed.
    #[error("Corrupt local file header at offset {offset:#x}: {reason}")]
    CorruptLocalHeader {
        /// Offset of the local header in the source archive.
        offset: u64,
        /// Description of the problem.
        reason: String,
    },

    /// The archive relies on ZIP64 extensions, which are not supported.
    #[error("ZIP64 archives are not supported ({field} holds a ZIP64 sentinel)")]
    Zip64Unsupported {
        /// Name of the EOCD field carrying the sentinel.
        field: &'static str,
    },

    /// Shifting an offset by the inserted padding overflowed 32 bits.
    #[error("Offset {offset:#x} shifted by {shift} bytes no longer fits in 32 bits")]
    OffsetOverflow {
        /// Original offset.
        offset: u64,
        /// Cumulative padding that was to be added.
        shift: u64,
    },

    /// Padding an entry would make its extra field longer than 65535 bytes.
    #[error("Extra field of '{entry}' would grow to {length} bytes (max 65535)")]
    ExtraFieldOverflow {
        /// Entry name (lossy UTF-8).
        entry: String,
        /// Length the extra field would have needed.
        length: u32,
    },

    /// An alignment value was rejected.
    #[error("Invalid alignment {value}: {reason}")]
    InvalidAlignment {
        /// The rejected value.
        value: u32,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The shared-library suffix was rejected.
    #[error("Invalid library suffix: {reason}")]
    InvalidLibrarySuffix {
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Input and output refer to the same file.
    #[error("Input and output are the same file: {}", path.display())]
    SamePath {
        /// The shared path.
        path: PathBuf,
    },

    /// The output file exists and overwriting was not requested.
    #[error("Output file already exists: {}", path.display())]
    OutputExists {
        /// The existing path.
        path: PathBuf,
    },

    /// A signing key could not be decoded.
    #[error("Invalid PKCS#8 key {}: {reason}", path.display())]
    InvalidKey {
        /// Path of the key file.
        path: PathBuf,
        /// Description of the decoding failure.
        reason: String,
    },
}

impl Error {
    /// Returns `true` if the error reports structural damage in the archive.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::EocdNotFound { .. }
                | Error::CorruptDirectory { .. }
                | Error::CorruptLocalHeader { .. }
        )
    }

    /// Returns `true` if the archive exceeds the 32-bit/16-bit field limits.
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(
            self,
            Error::Zip64Unsupported { .. }
                | Error::OffsetOverflow { .. }
                | Error::ExtraFieldOverflow { .. }
        )
    }

    /// Returns `true` if the error is an underlying I/O failure.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Returns the archive offset associated with this error, if any.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::CorruptDirectory { offset, .. }
            | Error::CorruptLocalHeader { offset, .. }
            | Error::OffsetOverflow { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub(crate) fn corrupt_directory(offset: u64, reason: impl Into<String>) -> Self {
        Error::CorruptDirectory {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt_local_header(offset: u64, reason: impl Into<String>) -> Self {
        Error::CorruptLocalHeader {
            offset,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for alignment operations.
pub type Result<T> = std::result::Result<T, Error>;
