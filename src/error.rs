//! Error types for pdfsplice.
//!
//! Every fallible operation in the crate returns [`SpliceError`]. Malformed
//! outlines are deliberately *not* represented here: the outline extractor
//! degrades instead of failing, so a broken bookmark tree never aborts a
//! split or merge.
//!
//! # Error Categories
//!
//! - **I/O Errors**: File not found, permission denied, etc.
//! - **PDF Errors**: Unreadable, encrypted or page-less documents
//! - **Range Errors**: Page selections that cannot be satisfied
//! - **Job Errors**: Split or merge failures, cancellation

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfsplice operations.
pub type Result<T> = std::result::Result<T, SpliceError>;

/// Main error type for pdfsplice operations.
#[derive(Debug, thiserror::Error)]
pub enum SpliceError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to load PDF data.
    #[error("Failed to load PDF: {name}\n  Reason: {reason}")]
    FailedToLoadPdf {
        /// Name of the document (usually its file name).
        name: String,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF is structurally unusable (for example it has no pages).
    #[error("Corrupted or invalid PDF: {name}\n  Details: {details}")]
    CorruptedPdf {
        /// Name of the document.
        name: String,
        /// Details about the corruption.
        details: String,
    },

    /// PDF is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {name}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools"
    )]
    EncryptedPdf {
        /// Name of the encrypted document.
        name: String,
    },

    /// No files were provided for merging.
    #[error("No input files specified for merging")]
    NoFilesToMerge,

    /// Page selection produced no groups to split into.
    #[error("No valid page groups: {details}")]
    NoPageGroups {
        /// What was requested.
        details: String,
    },

    /// A custom range token was rejected under the strict token policy.
    #[error("Invalid page range token '{token}': {reason}")]
    InvalidRangeToken {
        /// The offending token, trimmed.
        token: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A page number is outside the document.
    #[error(
        "Invalid page range '{range}' for PDF: {name}\n  \
         PDF has {total_pages} page(s). Page numbers must be between 1 and {total_pages}"
    )]
    InvalidPageRange {
        /// Name of the document.
        name: String,
        /// Requested page range.
        range: String,
        /// Total pages in the document.
        total_pages: usize,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to serialize a document to bytes.
    #[error("Failed to serialize PDF: {reason}")]
    FailedToSerialize {
        /// Description of the failure.
        reason: String,
    },

    /// Failed to read input list file.
    #[error("Failed to read input list file: {}\n  Reason: {source}", path.display())]
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Configuration is invalid.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// The job was stopped from its progress callback.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for SpliceError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl SpliceError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            name: name.into(),
            details: details.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(name: impl Into<String>) -> Self {
        Self::EncryptedPdf { name: name.into() }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a NoPageGroups error.
    pub fn no_page_groups(details: impl Into<String>) -> Self {
        Self::NoPageGroups {
            details: details.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only concerns the document part being built.
    ///
    /// A best-effort split keeps the parts produced before such an error;
    /// any other error still fails the whole split.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FailedToLoadPdf { .. }
                | Self::CorruptedPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::InvalidPageRange { .. }
                | Self::FailedToSerialize { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::FailedToReadInputList { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::NoFilesToMerge => 1,
            Self::NoPageGroups { .. } => 1,
            Self::InvalidRangeToken { .. } => 1,
            Self::InvalidPageRange { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::FailedToSerialize { .. } => 6,
            Self::MergeFailed { .. } => 6,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Other { .. } => 1,
        }
    }
}
