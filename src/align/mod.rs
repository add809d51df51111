//! Archive alignment.
//!
//! Alignment runs in two phases. The scan phase locates the
//! end-of-central-directory record, walks the central directory once and
//! builds a [`PatchPlan`]: which local headers receive padding, which
//! central directory offsets move, and by how much. The rewrite phase then
//! streams the source into the destination in a single forward pass,
//! applying the plan. Entry data is never decompressed or recompressed.
//!
//! # Example
//!
//! ```rust,no_run
//! use apkalign::{AlignOptions, ZipAligner};
//! use std::fs::File;
//!
//! # fn main() -> apkalign::Result<()> {
//! let mut aligner = ZipAligner::open_path("app-unaligned.apk")?
//!     .with_options(AlignOptions::android_page());
//!
//! let plan = aligner.plan()?;
//! println!("{} entries need {} padding bytes", plan.entries_padded(), plan.total_padding());
//!
//! let result = aligner.align(File::create("app-aligned.apk")?)?;
//! assert_eq!(result.output_size, plan.output_size());
//! # Ok(())
//! # }
//! ```

mod options;
mod patch;
mod planner;
mod rewriter;
mod scanner;

pub use options::{
    AlignOptions, DEFAULT_ALIGNMENT, DEFAULT_LIBRARY_SUFFIX, DEFAULT_SO_ALIGNMENT, MAX_ALIGNMENT,
};
pub use patch::{AlignmentPatch, OffsetPatch, PatchPlan};
pub use planner::{AlignmentClass, AlignmentRule, padding_for, required_alignment};

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::progress::{AlignEvent, EventSink, LogEvents, NoEvents};
use crate::verify::{AlignmentReport, check_alignment};
use crate::{Error, Result};
use rewriter::StreamRewriter;

/// Result of an alignment run.
#[must_use = "align result should be checked to verify operation completed as expected"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignResult {
    /// Entries listed in the central directory.
    pub entries_total: usize,
    /// Entries that received padding.
    pub entries_padded: usize,
    /// Padding bytes inserted.
    pub padding_bytes: u64,
    /// Size of the source archive.
    pub input_size: u64,
    /// Size of the written archive.
    pub output_size: u64,
}

impl AlignResult {
    fn from_plan(plan: &PatchPlan, output_size: u64) -> Self {
        Self {
            entries_total: plan.entries_scanned(),
            entries_padded: plan.entries_padded(),
            padding_bytes: plan.total_padding(),
            input_size: plan.input_size(),
            output_size,
        }
    }

    /// Returns `true` if the output is a byte-for-byte copy of the input.
    pub fn is_unchanged(&self) -> bool {
        self.padding_bytes == 0
    }
}

/// Aligns the archive in `reader` and writes the result to `writer`.
///
/// `reader` is read from offset 0 regardless of its current position. The
/// writer is flushed but not closed. On error the writer may hold a partial
/// archive which the caller must discard.
///
/// # Errors
///
/// Returns an error if the options are invalid, the archive is malformed or
/// exceeds the 32-bit field limits, or an I/O operation fails.
pub fn align_archive<R, W>(
    reader: &mut R,
    writer: &mut W,
    options: &AlignOptions,
    events: &mut dyn EventSink,
) -> Result<AlignResult>
where
    R: Read + Seek,
    W: Write,
{
    options.validate()?;

    let input_size = reader.seek(SeekFrom::End(0))?;
    events.on_event(AlignEvent::Started {
        input_size,
        alignment: options.alignment,
        so_alignment: options.so_alignment,
    });

    let plan = scanner::scan(reader, options, events)?;
    let output_size =
        StreamRewriter::new(reader, writer, events, plan.input_size()).rewrite(&plan)?;

    events.on_event(AlignEvent::Finished { output_size });
    Ok(AlignResult::from_plan(&plan, output_size))
}

/// Aligns the archive at `input` into a new file at `output`.
///
/// Progress is reported through the `log` facade. See
/// [`align_file_with_events`] for the rules applied to `output`.
pub fn align_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &AlignOptions,
    force: bool,
) -> Result<AlignResult> {
    align_file_with_events(input, output, options, force, &mut LogEvents)
}

/// Aligns the archive at `input` into a new file at `output`, reporting to `events`.
///
/// # Errors
///
/// - [`Error::SamePath`] if `input` and `output` name the same file
/// - [`Error::OutputExists`] if `output` exists and `force` is `false`
/// - any error from [`align_archive`]; the partially written output is
///   removed before returning
pub fn align_file_with_events(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &AlignOptions,
    force: bool,
    events: &mut dyn EventSink,
) -> Result<AlignResult> {
    let input = input.as_ref();
    let output = output.as_ref();

    if is_same_file(input, output)? {
        return Err(Error::SamePath {
            path: output.to_path_buf(),
        });
    }
    if !force && output.exists() {
        return Err(Error::OutputExists {
            path: output.to_path_buf(),
        });
    }

    let mut reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);

    let result = align_archive(&mut reader, &mut writer, options, events).and_then(|result| {
        writer.into_inner().map_err(|e| e.into_error())?;
        Ok(result)
    });

    if result.is_err() {
        if let Err(e) = fs::remove_file(output) {
            log::warn!(
                "Failed to remove partial output {}: {}",
                output.display(),
                e
            );
        }
    }
    result
}

fn is_same_file(input: &Path, output: &Path) -> io::Result<bool> {
    if !output.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(input)? == fs::canonicalize(output)?)
}

/// Aligns a single archive, with optional dry run and verification.
///
/// Mirrors the editor-style workflow: configure, inspect, then apply.
pub struct ZipAligner<R: Read + Seek> {
    reader: R,
    options: AlignOptions,
}

impl ZipAligner<BufReader<File>> {
    /// Opens the archive at `path` with default options.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read + Seek> ZipAligner<R> {
    /// Creates an aligner for the archive in `reader` with default options.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            options: AlignOptions::default(),
        }
    }

    /// Sets the alignment options.
    pub fn with_options(mut self, options: AlignOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the alignment options.
    pub fn options(&self) -> &AlignOptions {
        &self.options
    }

    /// Computes the patch plan without writing anything.
    pub fn plan(&mut self) -> Result<PatchPlan> {
        self.plan_with_events(&mut NoEvents)
    }

    /// Computes the patch plan, reporting scan events to `events`.
    pub fn plan_with_events(&mut self, events: &mut dyn EventSink) -> Result<PatchPlan> {
        self.options.validate()?;
        scanner::scan(&mut self.reader, &self.options, events)
    }

    /// Reports which entries of the source archive violate the options.
    pub fn check(&mut self) -> Result<AlignmentReport> {
        check_alignment(&mut self.reader, &self.options)
    }

    /// Writes the aligned archive to `output`.
    pub fn align<W: Write>(self, output: W) -> Result<AlignResult> {
        self.align_with_events(output, NoEvents)
    }

    /// Writes the aligned archive to `output`, reporting progress to `events`.
    pub fn align_with_events<W, E>(mut self, mut output: W, mut events: E) -> Result<AlignResult>
    where
        W: Write,
        E: EventSink,
    {
        align_archive(&mut self.reader, &mut output, &self.options, &mut events)
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
