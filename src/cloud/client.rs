use std::time::Duration;

use log::debug;
use reqwest::Client;

use crate::cloud::error::{Result, UploadError};
use crate::config::UploadSettings;

/// Where bucket endpoints live: `{scheme}://{bucket}{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    suffix: String,
}

impl Endpoint {
    pub fn new(scheme: &str, suffix: &str) -> Self {
        Endpoint {
            scheme: scheme.trim_end_matches("://").to_string(),
            suffix: suffix.to_string(),
        }
    }

    pub fn from_settings(settings: &UploadSettings) -> Self {
        Endpoint::new(&settings.scheme, &settings.suffix)
    }

    /// Base URL of a bucket, without a trailing slash
    pub fn bucket_url(&self, bucket: &str) -> String {
        format!("{}://{}{}", self.scheme, bucket, self.suffix)
    }

    /// URL of an object inside a bucket.
    ///
    /// The key is used as given, so the path always matches the
    /// `/bucket/key` resource the request is signed for.
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}", self.bucket_url(bucket), key)
    }
}

/// Create the HTTP client shared by every request of an uploader
pub fn create_http_client(settings: &UploadSettings) -> Result<Client> {
    debug!(
        "Creating HTTP client with {}s connect timeout for {}://*{}",
        settings.connection_timeout_secs, settings.scheme, settings.suffix
    );

    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connection_timeout_secs))
        .build()
        .map_err(|source| UploadError::Transport {
            operation: "client setup",
            source,
        })
}
