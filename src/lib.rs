//! # apkalign
//!
//! A pure-Rust library for aligning ZIP entries, as required for APK files.
//!
//! Alignment inserts zero padding into the extra field of selected local file
//! headers so that each selected entry's data starts on a boundary that is a
//! multiple of a configured alignment. Stored (uncompressed) entries get the
//! general alignment, and shared libraries get page alignment so they can be
//! memory-mapped directly from the archive. Entry data is never decompressed
//! or recompressed, and the rewrite is a single streaming pass.
//!
//! ## Quick Start
//!
//! ### Aligning a File
//!
//! ```rust,no_run
//! use apkalign::{AlignOptions, Result, align_file};
//!
//! fn main() -> Result<()> {
//!     let result = align_file(
//!         "app-unaligned.apk",
//!         "app-aligned.apk",
//!         &AlignOptions::default(),
//!         false,
//!     )?;
//!     println!(
//!         "Padded {} of {} entries ({} bytes)",
//!         result.entries_padded, result.entries_total, result.padding_bytes
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ### Aligning In Memory
//!
//! Any `Read + Seek` source and `Write` destination can be used:
//!
//! ```rust,no_run
//! use apkalign::{AlignOptions, ZipAligner, Result};
//! use std::io::Cursor;
//!
//! fn main() -> Result<()> {
//!     let input: Vec<u8> = std::fs::read("app.apk")?;
//!     let mut output = Vec::new();
//!
//!     let result = ZipAligner::new(Cursor::new(input))
//!         .with_options(AlignOptions::android_page())
//!         .align(&mut output)?;
//!     assert_eq!(output.len() as u64, result.output_size);
//!     Ok(())
//! }
//! ```
//!
//! ### Checking Alignment
//!
//! ```rust,no_run
//! use apkalign::{AlignOptions, ZipAligner, Result};
//!
//! fn main() -> Result<()> {
//!     let mut aligner = ZipAligner::open_path("app.apk")?;
//!     let report = aligner.check()?;
//!     for entry in report.misaligned() {
//!         println!("{} is not aligned ({:#x})", entry.name, entry.data_offset);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Alignment Policy
//!
//! | Entry | Alignment | Default |
//! |-------|-----------|---------|
//! | Name ends with the library suffix (`.so`) | `so_alignment`, any compression method | 16384 |
//! | Stored (method 0) | `alignment` | 4 |
//! | Anything else | none | |
//!
//! Either alignment can be disabled by setting it to 0.
//!
//! ## Progress and Logging
//!
//! The library never installs a logger. Diagnostics go through the `log`
//! facade, and every run reports [`AlignEvent`]s to an explicit
//! [`EventSink`] supplied by the caller (see [`progress`]).
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`:
//!
//! ```rust,no_run
//! use apkalign::{AlignOptions, Error, align_file};
//!
//! fn align(input: &str, output: &str) -> apkalign::Result<()> {
//!     match align_file(input, output, &AlignOptions::default(), false) {
//!         Ok(_) => Ok(()),
//!         Err(Error::OutputExists { path }) => {
//!             eprintln!("{} exists, pass force to overwrite", path.display());
//!             Ok(())
//!         }
//!         Err(e) if e.is_limit_exceeded() => {
//!             eprintln!("Archive too large for 32-bit ZIP: {}", e);
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! ## Limitations
//!
//! ZIP64 archives are rejected, as are archives whose shifted offsets no
//! longer fit in 32 bits.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

/// Default buffer size for read operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod align;
pub mod error;
pub mod format;
pub mod key;
pub mod progress;
pub mod verify;

pub use error::{Error, Result};

// Re-export alignment API at crate root for convenience
pub use align::{
    AlignOptions, AlignResult, AlignmentClass, AlignmentPatch, AlignmentRule, OffsetPatch,
    PatchPlan, ZipAligner, align_archive, align_file, align_file_with_events,
};

// Re-export progress API
pub use progress::{
    AlignEvent, ClosureEvents, CollectEvents, EventSink, LogEvents, NoEvents, events_fn,
};

// Re-export verification API
pub use verify::{AlignmentReport, CrcStatus, IntegrityReport, check_alignment, verify_integrity};

// Re-export signing key API
pub use key::{Pk8Key, SigningKey};
