//! Error types for the tablesnap library.
//!
//! Every fallible operation returns [`VisionError`]. Callers rarely need the
//! individual variant; what matters at the action boundary is the
//! [`ErrorKind`], which decides the single message a user sees:
//!
//! * [`ErrorKind::Configuration`]: no credential, bad config. Raised before
//!   any network activity, fatal to every action.
//! * [`ErrorKind::Service`]: transport or remote-side failure. Reported once,
//!   never retried automatically.
//! * [`ErrorKind::NoImageReturned`]: the edit call went through but carried
//!   no image. Reported distinctly so the user can adjust the instruction.
//! * [`ErrorKind::Input`] / [`ErrorKind::Output`]: local file, instruction
//!   and clipboard problems.
//!
//! A table that decodes to zero rows is not an error at all; see
//! [`crate::preview::Preview::RawFallback`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the tablesnap library.
#[derive(Debug, Error)]
pub enum VisionError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No API key was configured.
    #[error("API key is missing.\n{hint}")]
    MissingCredential { hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Service errors ────────────────────────────────────────────────────
    /// The generation API returned a non-success status, or the connection
    /// failed before a status was received (`status: None`).
    #[error("Generation API error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Generation API call timed out after {elapsed_ms}ms")]
    ApiTimeout { elapsed_ms: u64 },

    /// The API rejected the credential (401/403).
    #[error("Authentication error from the generation API: {detail}")]
    AuthError { detail: String },

    /// The API returned HTTP 429.
    #[error("Rate limit exceeded (retry after {})", .retry_after_secs.map(|s| format!("{s}s")).unwrap_or_else(|| "an unspecified delay".into()))]
    RateLimited { retry_after_secs: Option<u64> },

    /// The response body could not be interpreted.
    #[error("Malformed response from the generation API: {detail}")]
    MalformedResponse { detail: String },

    // ── Edit-specific ─────────────────────────────────────────────────────
    /// The edit call succeeded but no part carried image data.
    #[error("Model '{model}' returned no image for this instruction")]
    NoImageReturned { model: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// An edit instruction must contain non-whitespace characters.
    #[error("Edit instruction is empty")]
    EmptyInstruction,

    /// Image file was not found or could not be read.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    ImageNotFound { path: PathBuf },

    /// The file was read but is not a recognised image format.
    #[error("File is not a supported image: '{path}'")]
    NotAnImage { path: PathBuf },

    /// A `data:` URI could not be parsed or its payload decoded.
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an export file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The system clipboard could not be opened or written.
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`VisionError`], one per user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    Configuration,
    Service,
    NoImageReturned,
    Input,
    Output,
}

impl ErrorKind {
    /// The message shown to the user for this kind of failure.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Configuration => {
                "API key is missing. Set GEMINI_API_KEY (or API_KEY) and try again."
            }
            ErrorKind::Service => "Failed to process image. Please try again.",
            ErrorKind::NoImageReturned => {
                "The model did not return an image. Try rephrasing the instruction."
            }
            ErrorKind::Input => "The input could not be used. Check the image and instruction.",
            ErrorKind::Output => "The result could not be saved.",
        }
    }
}

impl VisionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VisionError::MissingCredential { .. } | VisionError::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            VisionError::ApiError { .. }
            | VisionError::ApiTimeout { .. }
            | VisionError::AuthError { .. }
            | VisionError::RateLimited { .. }
            | VisionError::MalformedResponse { .. }
            | VisionError::Internal(_) => ErrorKind::Service,
            VisionError::NoImageReturned { .. } => ErrorKind::NoImageReturned,
            VisionError::EmptyInstruction
            | VisionError::ImageNotFound { .. }
            | VisionError::NotAnImage { .. }
            | VisionError::InvalidDataUri(_) => ErrorKind::Input,
            VisionError::OutputWriteFailed { .. } | VisionError::ClipboardUnavailable(_) => {
                ErrorKind::Output
            }
        }
    }

    /// Shorthand for `self.kind().user_message()`.
    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}
