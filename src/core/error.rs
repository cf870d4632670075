//! Error types for peak-classifier
//!
//! Every failure falls into one of four classes: bad configuration, I/O,
//! malformed data, or a failed external tool. Each class maps to its own
//! process exit status.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for malformed command line or configuration (EX_USAGE)
pub const EXIT_USAGE: i32 = 64;
/// Exit status for malformed input data (EX_DATAERR)
pub const EXIT_DATAERR: i32 = 65;
/// Exit status for an input that cannot be opened (EX_NOINPUT)
pub const EXIT_NOINPUT: i32 = 66;
/// Exit status for a failed external tool (EX_SOFTWARE)
pub const EXIT_SOFTWARE: i32 = 70;
/// Exit status for an output that cannot be created (EX_CANTCREAT)
pub const EXIT_CANTCREAT: i32 = 73;

/// Main error type for peak-classifier operations
#[derive(Debug, Error)]
pub enum PeakError {
    /// Malformed boundary list, overlap fraction or file name
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A stream could not be opened, created, read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        kind: IoKind,
        #[source]
        source: std::io::Error,
    },

    /// A record failed field validation
    #[error("Invalid data at line {line}: {message}")]
    Data { line: usize, message: String },

    /// The sort or overlap subprocess failed or could not be launched
    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },
}

/// Which side of the stream an I/O error happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    Read,
    Write,
}

impl PeakError {
    pub fn config(message: impl Into<String>) -> Self {
        PeakError::Configuration(message.into())
    }

    pub fn data(line: usize, message: impl Into<String>) -> Self {
        PeakError::Data {
            line,
            message: message.into(),
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PeakError::Io {
            path: path.into(),
            kind: IoKind::Read,
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PeakError::Io {
            path: path.into(),
            kind: IoKind::Write,
            source,
        }
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        PeakError::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PeakError::Configuration(_) => EXIT_USAGE,
            PeakError::Io { kind: IoKind::Read, .. } => EXIT_NOINPUT,
            PeakError::Io { kind: IoKind::Write, .. } => EXIT_CANTCREAT,
            PeakError::Data { .. } => EXIT_DATAERR,
            PeakError::ExternalTool { .. } => EXIT_SOFTWARE,
        }
    }
}

/// Result type alias for peak-classifier operations
pub type Result<T> = std::result::Result<T, PeakError>;
