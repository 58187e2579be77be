//! Wire and domain models for bucket uploads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key pair and bucket used to sign every request.
///
/// Built once and shared read-only by all part workers.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StorageCredential {
    pub public_key: String,
    pub private_key: String,
    pub bucket: String,
}

impl StorageCredential {
    pub fn new(public_key: &str, private_key: &str, bucket: &str) -> Self {
        StorageCredential {
            public_key: public_key.to_string(),
            private_key: private_key.to_string(),
            bucket: bucket.to_string(),
        }
    }
}

impl fmt::Debug for StorageCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredential")
            .field("public_key", &self.public_key)
            .field("private_key", &"<REDACTED>")
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Multipart context handed out by the service when an upload is initiated.
///
/// `block_size` is authoritative for partitioning the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadSession {
    #[serde(rename = "UploadId")]
    pub upload_id: String,
    #[serde(rename = "BlkSize")]
    pub block_size: u64,
    #[serde(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Key")]
    pub key: String,
}

/// Body of a successful part upload.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct PartAck {
    #[serde(rename = "PartNumber")]
    pub part_number: usize,
}

/// One uploaded part and the ETag needed to finalize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartResult {
    pub part_number: usize,
    pub etag: String,
}

/// The committed object, as reported by the finish call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadOutcome {
    #[serde(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "FileSize")]
    pub file_size: u64,
}

/// Which path a save took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Sent with one PUT request
    SinglePut { key: String, size: u64 },
    /// Sent as a multipart session and finalized
    Multipart(UploadOutcome),
}

impl SaveOutcome {
    pub fn key(&self) -> &str {
        match self {
            SaveOutcome::SinglePut { key, .. } => key,
            SaveOutcome::Multipart(outcome) => &outcome.key,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            SaveOutcome::SinglePut { size, .. } => *size,
            SaveOutcome::Multipart(outcome) => outcome.file_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_hides_private_key() {
        let credential = StorageCredential::new("pub-key", "very-private", "bucket");
        let printed = format!("{:?}", credential);
        assert!(printed.contains("pub-key"));
        assert!(printed.contains("<REDACTED>"));
        assert!(!printed.contains("very-private"));
    }

    #[test]
    fn test_session_from_service_json() {
        let body = r#"{"UploadId":"abc-123","BlkSize":4194304,"Bucket":"photos","Key":"2024/a.bin"}"#;
        let session: UploadSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.upload_id, "abc-123");
        assert_eq!(session.block_size, 4_194_304);
        assert_eq!(session.bucket, "photos");
        assert_eq!(session.key, "2024/a.bin");
    }

    #[test]
    fn test_outcome_from_service_json() {
        let body = r#"{"Bucket":"photos","Key":"a.bin","FileSize":104857600}"#;
        let outcome: UploadOutcome = serde_json::from_str(body).unwrap();
        assert_eq!(outcome.file_size, 104_857_600);

        let saved = SaveOutcome::Multipart(outcome);
        assert_eq!(saved.key(), "a.bin");
        assert_eq!(saved.size(), 104_857_600);
    }

    #[test]
    fn test_part_ack_ignores_extra_fields() {
        let ack: PartAck = serde_json::from_str(r#"{"PartNumber":7,"RetCode":0}"#).unwrap();
        assert_eq!(ack.part_number, 7);
    }
}
