use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context};
use bytes::Bytes;
use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::cloud::api::UfileApi;
use crate::cloud::error::{Result, UploadError};
use crate::cloud::models::{PartResult, SaveOutcome, UploadOutcome, UploadSession};
use crate::cloud::multipart::{join_etags, PartPlan};
use crate::cloud::ufile::UfileClient;
use crate::config::{AppConfig, UploadSettings};
use crate::security::safe_error_message;

/// Saves objects into a bucket, choosing single PUT or multipart by size.
///
/// Large payloads are split by the block size the service assigns to the
/// session. Full parts are uploaded concurrently, at most
/// `settings.concurrency` at a time; the trailing short part, if any, is
/// uploaded after them. ETags are kept in slots indexed by part number, so
/// the finish call always lists them in part order.
///
/// # Fields
///
/// * `api` - The service operations, shared read-only with part workers
/// * `settings` - Threshold, pool size and failure policy
/// * `total_bytes` - Bytes handed to `save` so far (for progress tracking)
/// * `bytes_uploaded` - Bytes acknowledged by the service so far
pub struct Uploader<A: UfileApi + 'static> {
    api: Arc<A>,
    settings: UploadSettings,
    total_bytes: Arc<AtomicU64>,
    bytes_uploaded: Arc<AtomicU64>,
}

impl Uploader<UfileClient> {
    /// Build an HTTP-backed uploader from a loaded configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = UfileClient::new(config.credential.clone(), &config.upload)?;
        Ok(Uploader::new(client, config.upload.clone()))
    }
}

impl<A: UfileApi + 'static> Uploader<A> {
    pub fn new(api: A, settings: UploadSettings) -> Self {
        Self::with_shared_api(Arc::new(api), settings)
    }

    pub fn with_shared_api(api: Arc<A>, settings: UploadSettings) -> Self {
        Uploader {
            api,
            settings,
            total_bytes: Arc::new(AtomicU64::new(0)),
            bytes_uploaded: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Get upload progress.
    ///
    /// Returns `(bytes_uploaded, total_bytes)` across every save issued
    /// through this uploader.
    pub fn get_progress(&self) -> (u64, u64) {
        (
            self.bytes_uploaded.load(Ordering::SeqCst),
            self.total_bytes.load(Ordering::SeqCst),
        )
    }

    /// Save `content` under `key`.
    pub async fn save(&self, content: Bytes, key: &str) -> Result<SaveOutcome> {
        self.save_with_cancel(content, key, &CancellationToken::new()).await
    }

    /// Save `content` under `key`, stopping early once `cancel` fires.
    ///
    /// After cancellation no further parts are launched, parts in flight are
    /// dropped and the session is never finalized.
    pub async fn save_with_cancel(
        &self,
        content: Bytes,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<SaveOutcome> {
        let size = content.len() as u64;
        self.total_bytes.fetch_add(size, Ordering::SeqCst);

        debug!("Starting save of {} ({} bytes)", key, size);
        let start_time = Instant::now();

        let result = if size <= self.settings.max_put_size {
            self.put_whole(content, key, cancel).await
        } else {
            self.upload_multipart(content, key, cancel)
                .await
                .map(SaveOutcome::Multipart)
        };

        match &result {
            Ok(outcome) => {
                let elapsed = start_time.elapsed();
                let throughput = if elapsed.as_secs() > 0 {
                    size / elapsed.as_secs()
                } else {
                    size
                };
                info!(
                    "Saved {} ({} bytes) in {:?} ({} KB/s)",
                    outcome.key(),
                    size,
                    elapsed,
                    throughput / 1024
                );
            }
            Err(e) => warn!("{}", safe_error_message(&format!("Failed to save {}", key), e)),
        }

        result
    }

    async fn put_whole(&self, content: Bytes, key: &str, cancel: &CancellationToken) -> Result<SaveOutcome> {
        let size = content.len() as u64;
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            result = self.api.put(content, key) => result?,
        }

        self.bytes_uploaded.fetch_add(size, Ordering::SeqCst);
        Ok(SaveOutcome::SinglePut {
            key: key.to_string(),
            size,
        })
    }

    async fn upload_multipart(&self, content: Bytes, key: &str, cancel: &CancellationToken) -> Result<UploadOutcome> {
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        let session = Arc::new(self.api.initiate(key).await?);
        debug!(
            "Started multipart upload {} for {}/{} with block size {}",
            session.upload_id, session.bucket, session.key, session.block_size
        );

        let result = match self.upload_parts(&content, &session, cancel).await {
            Ok(etags) => self.api.finish(&session, &etags).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                debug!("Completed multipart upload {} for {}", session.upload_id, outcome.key);
                Ok(outcome)
            }
            Err(e) => {
                if self.settings.abort_on_failure {
                    self.abort_session(&session).await;
                } else {
                    debug!("Leaving multipart upload {} open on the service", session.upload_id);
                }
                Err(e)
            }
        }
    }

    /// Upload every part of the payload; returns the comma-joined ETags in
    /// part order.
    async fn upload_parts(
        &self,
        content: &Bytes,
        session: &Arc<UploadSession>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let plan = PartPlan::new(content.len() as u64, session.block_size)?;
        let total = plan.total_parts();
        let mut slots: Vec<Option<String>> = vec![None; total];

        debug!(
            "Uploading {} parts ({} full, remainder: {}) with up to {} workers",
            total,
            plan.full_parts(),
            plan.remainder().is_some(),
            self.settings.concurrency
        );

        // Cancelled by the caller, or by the first failing worker
        let stop = cancel.child_token();
        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));
        let mut workers = JoinSet::new();

        for index in 0..plan.full_parts() {
            let permit = tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => {
                    permit.map_err(|_| UploadError::Worker("part pool closed".to_string()))?
                }
            };

            let part = content.slice(plan.full_part_range(index));
            let api = Arc::clone(&self.api);
            let session = Arc::clone(session);
            let stop = stop.clone();
            let bytes_uploaded = Arc::clone(&self.bytes_uploaded);

            workers.spawn(async move {
                let _permit = permit;
                // Stops the launch loop on error or panic; declared after the
                // permit so it fires before the permit is released
                let failure_guard = stop.clone().drop_guard();
                let len = part.len() as u64;

                let result = tokio::select! {
                    biased;
                    _ = stop.cancelled() => Err(UploadError::Cancelled),
                    result = api.upload_part(part, &session, index) => result,
                };

                if result.is_ok() {
                    bytes_uploaded.fetch_add(len, Ordering::SeqCst);
                    failure_guard.disarm();
                }
                (index, result)
            });
        }

        let mut first_error: Option<(usize, UploadError)> = None;
        let mut worker_error: Option<UploadError> = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, Ok(part))) => store_part(&mut slots, index, part),
                Ok((index, Err(e))) => record_failure(&mut first_error, index, e),
                Err(join_error) => {
                    stop.cancel();
                    worker_error.get_or_insert(UploadError::Worker(join_error.to_string()));
                }
            }
        }

        if let Some(e) = worker_error {
            log_completed_parts(session, &slots);
            return Err(e);
        }
        if cancel.is_cancelled() {
            log_completed_parts(session, &slots);
            return Err(UploadError::Cancelled);
        }
        if let Some((part_number, e)) = first_error {
            return Err(partial_failure(session, &slots, part_number, e));
        }

        if let Some((part_number, range)) = plan.remainder() {
            let part = content.slice(range);
            let len = part.len() as u64;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(UploadError::Cancelled),
                result = self.api.upload_part(part, session, part_number) => result,
            };

            match result {
                Ok(part) => {
                    self.bytes_uploaded.fetch_add(len, Ordering::SeqCst);
                    store_part(&mut slots, part_number, part);
                }
                Err(UploadError::Cancelled) => {
                    log_completed_parts(session, &slots);
                    return Err(UploadError::Cancelled);
                }
                Err(e) => return Err(partial_failure(session, &slots, part_number, e)),
            }
        }

        join_etags(&slots)
            .map_err(|missing| UploadError::Worker(format!("part {} finished without an ETag", missing)))
    }

    async fn abort_session(&self, session: &UploadSession) {
        match self.api.abort(session).await {
            Ok(()) => info!("Aborted multipart upload {} for {}", session.upload_id, session.key),
            Err(e) => warn!(
                "{}",
                safe_error_message(&format!("Failed to abort multipart upload {}", session.upload_id), &e)
            ),
        }
    }
}

fn store_part(slots: &mut [Option<String>], index: usize, part: PartResult) {
    debug!("Part {} uploaded with ETag {}", index, part.etag);
    slots[index] = Some(part.etag);
}

/// Keep the first real failure; cancellations caused by it come second.
fn record_failure(first: &mut Option<(usize, UploadError)>, index: usize, error: UploadError) {
    let replace = match first {
        None => true,
        Some((_, existing)) => existing.is_cancelled() && !error.is_cancelled(),
    };
    if replace {
        *first = Some((index, error));
    }
}

fn completed_parts(slots: &[Option<String>]) -> Vec<usize> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
        .collect()
}

fn log_completed_parts(session: &UploadSession, slots: &[Option<String>]) {
    let done = completed_parts(slots);
    debug!(
        "Multipart upload {}: {}/{} parts completed: {:?}",
        session.upload_id,
        done.len(),
        slots.len(),
        done
    );
}

fn partial_failure(session: &UploadSession, slots: &[Option<String>], part_number: usize, error: UploadError) -> UploadError {
    log_completed_parts(session, slots);
    UploadError::PartialUpload {
        part_number,
        completed: completed_parts(slots).len(),
        total: slots.len(),
        source: Box::new(error),
    }
}

/// Read a local file and save it under `key` (the file name by default).
pub async fn upload_file<A: UfileApi + 'static>(
    uploader: &Uploader<A>,
    file_path: &Path,
    key: Option<&str>,
    cancel: &CancellationToken,
) -> anyhow::Result<SaveOutcome> {
    let key = match key {
        Some(key) => key.to_string(),
        None => file_path
            .file_name()
            .ok_or_else(|| anyhow!("Invalid file path - no filename component: {}", file_path.display()))?
            .to_string_lossy()
            .into_owned(),
    };

    let content = tokio::fs::read(file_path)
        .await
        .context(format!("Failed to read {} for upload", file_path.display()))?;

    info!("Uploading {} ({} bytes) as {}", file_path.display(), content.len(), key);

    uploader
        .save_with_cancel(Bytes::from(content), &key, cancel)
        .await
        .context(format!("Failed to upload {}", file_path.display()))
}
