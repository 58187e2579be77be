//! UFile object storage integration.
//!
//! This module uploads byte payloads into a UFile bucket. Payloads up to the
//! single-PUT threshold go up in one request; larger ones use the multipart
//! protocol, with full-size parts uploaded concurrently.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    Uploader     │── size <= threshold ──▶ PUT /{key}
//! └────────┬────────┘
//!          │ size > threshold
//!    ┌─────▼──────────┐
//!    │ POST ?uploads  │  initiate: UploadId + BlkSize
//!    └─────┬──────────┘
//!          │
//!    ┌─────▼──────────────────────────┐
//!    │ PUT ?uploadId&partNumber (xN)  │  bounded worker pool
//!    └─────┬──────────────────────────┘
//!          │ every part has an ETag
//!    ┌─────▼──────────────────┐
//!    │ POST ?uploadId&newKey  │  finish: comma-joined ETags
//!    └────────────────────────┘
//! ```
//!
//! Every request is signed by [`signer`] and sent by [`ufile::UfileClient`].
//! The orchestration in [`uploader::Uploader`] only sees the [`api::UfileApi`]
//! trait, so tests drive it with an in-memory service.
//!
//! ## Usage Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use ufile_uploader::cloud::Uploader;
//! use ufile_uploader::config::load_config;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = load_config(Path::new("ufile.yaml"))?;
//! let uploader = Uploader::from_config(&config)?;
//!
//! let outcome = uploader.save(Bytes::from_static(b"hello"), "greetings/hello.txt").await?;
//! println!("stored {} ({} bytes)", outcome.key(), outcome.size());
//! # Ok(())
//! # }
//! ```

/// The service operations the uploader depends on
pub mod api;

/// HTTP client construction and endpoint addressing
pub mod client;

/// Upload error types
pub mod error;

/// Wire and result types
pub mod models;

/// Part arithmetic for multipart uploads
pub mod multipart;

/// Request signing
pub mod signer;

/// HTTP implementation of the service operations
pub mod ufile;

/// Single-PUT and multipart orchestration
pub mod uploader;

pub use api::UfileApi;
pub use error::{Result, UploadError};
pub use models::{SaveOutcome, StorageCredential, UploadOutcome, UploadSession};
pub use ufile::UfileClient;
pub use uploader::{upload_file, Uploader};
