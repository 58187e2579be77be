//! Test utilities for ufile_uploader
//!
//! This module provides common testing helpers for use across unit tests.

#![cfg(test)]

use anyhow::Result;
use bytes::Bytes;
use tempfile::NamedTempFile;

use crate::cloud::models::UploadSession;

/// Creates a temporary file with the given content
pub fn create_temp_file(content: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    use std::io::Write;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

/// Creates a test YAML configuration file without an upload section
pub fn create_test_config() -> Result<NamedTempFile> {
    let config_content = r#"
credential:
  public_key: "test-public"
  private_key: "test-private"
  bucket: "test-bucket"
upload:
  max_put_size: 1024
"#;

    create_temp_file(config_content.as_bytes())
}

/// A session as the service would hand it out
pub fn test_session(block_size: u64) -> UploadSession {
    UploadSession {
        upload_id: "test-upload-id".to_string(),
        block_size,
        bucket: "test-bucket".to_string(),
        key: "test-key".to_string(),
    }
}

/// Payload whose bytes encode their own offset, so misplaced parts are visible
pub fn patterned_payload(len: usize) -> Bytes {
    (0..len).map(|i| (i % 251) as u8).collect::<Vec<u8>>().into()
}
