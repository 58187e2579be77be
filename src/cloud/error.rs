//! Error types for bucket uploads.
//!
//! Every failure on the upload path is reported through [`UploadError`]. The
//! variants separate failures that never produced a response from the ones
//! where the service answered with something we could not accept.

use reqwest::StatusCode;
use thiserror::Error;

/// Primary error type for all upload operations
#[derive(Debug, Error)]
pub enum UploadError {
    /// No response was obtained (connect, timeout, broken body stream)
    #[error("{operation} transport failure: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a status other than 200
    #[error("{operation} failed with status {status}: {body}")]
    Protocol {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    /// A 200 response carried a body we could not decode
    #[error("{operation} returned a malformed body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A part was accepted but the response had no ETag header
    #[error("part {part_number} response carried no ETag header")]
    MissingEtag { part_number: usize },

    /// The session handed out by the service cannot be used
    #[error("invalid upload session: {reason}")]
    InvalidSession { reason: String },

    /// A part failed after the session was opened; nothing was finalized
    #[error("part {part_number} failed after {completed}/{total} parts completed: {source}")]
    PartialUpload {
        part_number: usize,
        completed: usize,
        total: usize,
        #[source]
        source: Box<UploadError>,
    },

    /// A part worker stopped without reporting a result
    #[error("part worker failed: {0}")]
    Worker(String),

    /// The caller cancelled the upload
    #[error("upload cancelled")]
    Cancelled,
}

impl UploadError {
    /// Returns true if no response was obtained from the service
    pub fn is_transport(&self) -> bool {
        match self {
            UploadError::Transport { .. } => true,
            UploadError::PartialUpload { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// HTTP status of the failing response, if the service answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UploadError::Protocol { status, .. } => Some(*status),
            UploadError::PartialUpload { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, UploadError::Cancelled)
    }
}

/// Result type alias for upload operations
pub type Result<T> = std::result::Result<T, UploadError>;
