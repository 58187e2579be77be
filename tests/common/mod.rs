//! Shared helpers for the integration tests.
//!
//! [`FakeService`] stands in for the UFile endpoint: it records every call,
//! hands out `etag{N}` tags and can be told to fail or stall specific parts.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;

use ufile_uploader::cloud::error::{Result, UploadError};
use ufile_uploader::cloud::models::{PartResult, UploadOutcome, UploadSession};
use ufile_uploader::cloud::UfileApi;
use ufile_uploader::config::UploadSettings;

/// One received part: number, length and the first byte of its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReceivedPart {
    pub part_number: usize,
    pub len: usize,
    pub first_byte: u8,
}

pub struct FakeService {
    block_size: u64,
    failing_part: Option<usize>,
    delays: HashMap<usize, Duration>,
    default_delay: Duration,

    pub puts: Mutex<Vec<(String, usize)>>,
    pub initiated: AtomicUsize,
    pub parts: Mutex<Vec<ReceivedPart>>,
    pub finished: Mutex<Vec<String>>,
    pub aborted: AtomicUsize,

    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeService {
    pub fn new(block_size: u64) -> Self {
        FakeService {
            block_size,
            failing_part: None,
            delays: HashMap::new(),
            default_delay: Duration::ZERO,
            puts: Mutex::new(Vec::new()),
            initiated: AtomicUsize::new(0),
            parts: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
            aborted: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Answer 500 for this part number
    pub fn failing_part(mut self, part_number: usize) -> Self {
        self.failing_part = Some(part_number);
        self
    }

    pub fn part_delay(mut self, part_number: usize, delay: Duration) -> Self {
        self.delays.insert(part_number, delay);
        self
    }

    pub fn default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Received parts sorted by part number
    pub fn received_parts(&self) -> Vec<ReceivedPart> {
        let mut parts = self.parts.lock().unwrap().clone();
        parts.sort();
        parts
    }

    pub fn finish_calls(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    fn session(&self, key: &str) -> UploadSession {
        UploadSession {
            upload_id: "fake-upload-id".to_string(),
            block_size: self.block_size,
            bucket: "fake-bucket".to_string(),
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl UfileApi for FakeService {
    async fn put(&self, content: Bytes, key: &str) -> Result<()> {
        self.puts.lock().unwrap().push((key.to_string(), content.len()));
        Ok(())
    }

    async fn initiate(&self, key: &str) -> Result<UploadSession> {
        self.initiated.fetch_add(1, Ordering::SeqCst);
        Ok(self.session(key))
    }

    async fn upload_part(&self, part: Bytes, _session: &UploadSession, part_number: usize) -> Result<PartResult> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&part_number).copied().unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_part == Some(part_number) {
            return Err(UploadError::Protocol {
                operation: "upload part",
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: r#"{"RetCode":-1,"ErrMsg":"internal error"}"#.to_string(),
            });
        }

        self.parts.lock().unwrap().push(ReceivedPart {
            part_number,
            len: part.len(),
            first_byte: part.first().copied().unwrap_or_default(),
        });

        Ok(PartResult {
            part_number,
            etag: format!("etag{}", part_number),
        })
    }

    async fn finish(&self, session: &UploadSession, etags: &str) -> Result<UploadOutcome> {
        self.finished.lock().unwrap().push(etags.to_string());

        let file_size = self.parts.lock().unwrap().iter().map(|p| p.len as u64).sum();
        Ok(UploadOutcome {
            bucket: session.bucket.clone(),
            key: session.key.clone(),
            file_size,
        })
    }

    async fn abort(&self, _session: &UploadSession) -> Result<()> {
        self.aborted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn settings(max_put_size: u64, concurrency: usize) -> UploadSettings {
    UploadSettings {
        max_put_size,
        concurrency,
        ..UploadSettings::default()
    }
}

/// Payload whose bytes encode their own offset
pub fn patterned_payload(len: usize) -> Bytes {
    (0..len).map(|i| (i % 251) as u8).collect::<Vec<u8>>().into()
}
