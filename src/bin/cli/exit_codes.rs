//! Exit codes for the CLI tool.

use apkalign::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Archive is not aligned, or a verification check failed
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// Archive exceeds 32-bit ZIP limits
pub const LIMIT_EXCEEDED: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadArchive,
    LimitExceeded,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::LimitExceeded => LIMIT_EXCEEDED,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts an apkalign error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::EocdNotFound { .. }
        | Error::CorruptDirectory { .. }
        | Error::CorruptLocalHeader { .. } => ExitCode::BadArchive,
        Error::Zip64Unsupported { .. }
        | Error::OffsetOverflow { .. }
        | Error::ExtraFieldOverflow { .. } => ExitCode::LimitExceeded,
        Error::InvalidAlignment { .. }
        | Error::InvalidLibrarySuffix { .. }
        | Error::SamePath { .. }
        | Error::OutputExists { .. } => ExitCode::BadArgs,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
