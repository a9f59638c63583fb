//! Error types for the docmine pipeline.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for docmine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document processing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The document is password protected and cannot be opened.
    #[error("Document is password protected")]
    Encrypted,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted document: {0}")]
    Corrupted(String),

    /// The document rendered to zero pages.
    #[error("Document has no extractable pages")]
    ZeroPages,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Page rendering failed.
    #[error("Page rendering failed: {0}")]
    Render(String),

    /// A recognition engine failed on an image.
    #[error("Recognition failed ({engine}): {cause}")]
    Recognition { engine: String, cause: String },

    /// Image enhancement failed.
    #[error("Image enhancement failed: {0}")]
    Enhance(String),

    /// Per-document time budget exceeded.
    #[error("Processing exceeded time budget of {0:?}")]
    Timeout(Duration),

    /// A configured collaborator is missing or unusable.
    ///
    /// Surfaced at startup by `EngineSet::validate`, never as a silent
    /// runtime fallback.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure of the batch scheduling infrastructure itself.
    #[error("Batch failure: {0}")]
    Batch(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this failure is worth retrying with the same operation.
    ///
    /// Transient causes (interrupted I/O, temporary resource
    /// unavailability, recoverable parse glitches) are retried by
    /// `RetryPolicy`; everything else propagates immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            ),
            Error::PdfParse(_) => true,
            Error::Recognition { .. } => true,
            _ => false,
        }
    }

    /// Whether this failure is fatal for the document itself.
    ///
    /// Structural causes terminate the extraction ladder: no cheaper or
    /// more expensive strategy can recover a corrupt or password-protected
    /// file.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::Encrypted | Error::Corrupted(_) | Error::ZeroPages | Error::UnknownFormat
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
