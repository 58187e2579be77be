use async_trait::async_trait;
use bytes::Bytes;

use crate::cloud::error::Result;
use crate::cloud::models::{PartResult, UploadOutcome, UploadSession};

/// The remote operations an upload is built from.
///
/// [`crate::cloud::ufile::UfileClient`] implements this over HTTP. The
/// orchestrator only talks to the service through this trait, so every
/// method must be safe to call from several part workers at once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UfileApi: Send + Sync {
    /// Upload a whole object with one PUT request
    async fn put(&self, content: Bytes, key: &str) -> Result<()>;

    /// Open a multipart session for `key`
    async fn initiate(&self, key: &str) -> Result<UploadSession>;

    /// Upload one numbered part of an open session
    async fn upload_part(&self, part: Bytes, session: &UploadSession, part_number: usize) -> Result<PartResult>;

    /// Commit the object from the comma-joined part ETags, in part order
    async fn finish(&self, session: &UploadSession, etags: &str) -> Result<UploadOutcome>;

    /// Discard an open session and the parts already uploaded to it
    async fn abort(&self, session: &UploadSession) -> Result<()>;
}
