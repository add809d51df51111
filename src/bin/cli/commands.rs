//! Command implementations for the CLI tool.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use apkalign::{
    AlignOptions, CollectEvents, ZipAligner, align_file_with_events, check_alignment,
    verify_integrity,
};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;
use crate::progress::{AlignProgress, PaddedEntry};
use crate::{AlignmentArgs, OutputFormat};

/// Configuration for the align command.
pub struct AlignConfig<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub alignment: &'a AlignmentArgs,
    pub force: bool,
    pub verify: bool,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Align command implementation
pub fn align(config: &AlignConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let options = match alignment_options(config.alignment) {
        Ok(o) => o,
        Err(code) => return code,
    };

    let mut progress = AlignProgress::new(config.quiet);
    let result = match align_file_with_events(
        config.input,
        config.output,
        &options,
        config.force,
        &mut progress,
    ) {
        Ok(r) => r,
        Err(e) => {
            progress.finish_with_message("Failed");
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    progress.finish();
    print!(
        "{}",
        formatter.format_align_result(config.input, config.output, &result, progress.padded())
    );

    if config.verify {
        return check_archive(config.output, &options, true, false, config.format);
    }

    ExitCode::Success
}

/// Check command implementation
pub fn check(
    archive_path: &Path,
    alignment: &AlignmentArgs,
    crc: bool,
    verbose: bool,
    format: OutputFormat,
) -> ExitCode {
    let options = match alignment_options(alignment) {
        Ok(o) => o,
        Err(code) => return code,
    };
    check_archive(archive_path, &options, crc, verbose, format)
}

/// Plan command implementation
pub fn plan(archive_path: &Path, alignment: &AlignmentArgs, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let options = match alignment_options(alignment) {
        Ok(o) => o,
        Err(code) => return code,
    };

    let mut aligner = match ZipAligner::open_path(archive_path) {
        Ok(a) => a.with_options(options),
        Err(e) => {
            eprintln!("Error opening archive: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let mut events = CollectEvents::new();
    let plan = match aligner.plan_with_events(&mut events) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let padded: Vec<_> = events
        .events
        .iter()
        .filter_map(PaddedEntry::from_event)
        .collect();
    print!("{}", formatter.format_plan(archive_path, &plan, &padded));

    ExitCode::Success
}

fn check_archive(
    archive_path: &Path,
    options: &AlignOptions,
    crc: bool,
    verbose: bool,
    format: OutputFormat,
) -> ExitCode {
    let formatter = create_formatter(format);

    let mut reader = match File::open(archive_path) {
        Ok(f) => BufReader::new(f),
        Err(e) => {
            eprintln!("Error opening archive: {}", e);
            return ExitCode::IoError;
        }
    };

    let report = match check_alignment(&mut reader, options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let integrity = if crc {
        let result = reader
            .seek(SeekFrom::Start(0))
            .map_err(apkalign::Error::from)
            .and_then(|_| verify_integrity(&mut reader));
        match result {
            Ok(r) => Some(r),
            Err(e) => {
                eprintln!("Error: {}", e);
                return error_to_exit_code(&e);
            }
        }
    } else {
        None
    };

    print!(
        "{}",
        formatter.format_check(archive_path, &report, integrity.as_ref(), verbose)
    );

    let crc_ok = integrity.as_ref().is_none_or(|i| i.is_ok());
    if report.is_aligned() && crc_ok {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}

fn alignment_options(args: &AlignmentArgs) -> Result<AlignOptions, ExitCode> {
    args.to_options().map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::BadArgs
    })
}
