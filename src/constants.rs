//! Global constants for the ufile uploader.
//!
//! These are the defaults that seed [`crate::config::UploadSettings`]; the
//! upload path itself only reads the values carried by its configuration.

// Endpoint constants
/// Default URL scheme for bucket endpoints
pub const DEFAULT_SCHEME: &str = "http";

/// Default host suffix appended to the bucket name
pub const DEFAULT_HOST_SUFFIX: &str = ".ufile.ucloud.cn";

/// Scheme name used in the `Authorization` header
pub const AUTH_SCHEME: &str = "UCloud";

// Size constants
/// Payloads up to this size (50MB) are sent with a single PUT
pub const MAX_PUT_SIZE: u64 = 50 * 1024 * 1024;

// Timeout constants
/// Default connection timeout in seconds
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Part workers per CPU for the default pool size
pub const WORKERS_PER_CPU: usize = 2;

// Content types
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";
pub const CONTENT_TYPE_TEXT_PLAIN: &str = "text/plain";

// Environment overrides
pub const ENV_PUBLIC_KEY: &str = "UFILE_PUBLIC_KEY";
pub const ENV_PRIVATE_KEY: &str = "UFILE_PRIVATE_KEY";
pub const ENV_BUCKET: &str = "UFILE_BUCKET";

/// Key prefix under which JSON configuration documents keep the ufile section
pub const JSON_CONFIG_PREFIX: &str = "ufile";

// Default file names
pub const DEFAULT_CONFIG_NAME: &str = "ufile.yaml";

/// Default pool size for concurrent part uploads
pub fn default_concurrency() -> usize {
    (num_cpus::get() * WORKERS_PER_CPU).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_put_size() {
        assert_eq!(MAX_PUT_SIZE, 52_428_800);
    }

    #[test]
    fn test_default_concurrency_is_bounded() {
        let workers = default_concurrency();
        assert!(workers >= 1);
        assert_eq!(workers, num_cpus::get() * WORKERS_PER_CPU);
    }
}
