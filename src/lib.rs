//! # ufile_uploader
//!
//! Uploads files and in-memory payloads into a UCloud UFile bucket.
//!
//! ## Overview
//!
//! Small payloads are stored with a single signed PUT. Anything above the
//! configured threshold (50MB by default) goes through the multipart
//! protocol: a session is opened, the payload is cut into parts of the block
//! size the service assigns, full parts are uploaded by a bounded pool of
//! concurrent workers and the session is finished with the part ETags in
//! part order. If any part fails the session is never finished.
//!
//! ## Usage
//!
//! ```no_run
//! use bytes::Bytes;
//! use ufile_uploader::cloud::{StorageCredential, UfileClient, Uploader};
//! use ufile_uploader::config::UploadSettings;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = UploadSettings::default();
//! let credential = StorageCredential::new("public-key", "private-key", "my-bucket");
//! let uploader = Uploader::new(UfileClient::new(credential, &settings)?, settings);
//!
//! let payload = Bytes::from(std::fs::read("/var/backups/db.dump")?);
//! let outcome = uploader.save(payload, "backups/db.dump").await?;
//! println!("stored {} bytes", outcome.size());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and argument parsing
//! - [`cloud`]: Signing, the UFile HTTP client and the upload orchestration
//! - [`config`]: YAML/JSON configuration and environment overrides
//! - [`security`]: Credential scrubbing for log output
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// UFile storage integration
pub mod cloud;

/// Configuration management
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Credential protection for log output
pub mod security;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
