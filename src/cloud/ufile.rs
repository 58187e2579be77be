use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, ETAG};
use reqwest::{Client, Method, Request, StatusCode};
use serde::de::DeserializeOwned;

use crate::cloud::api::UfileApi;
use crate::cloud::client::{create_http_client, Endpoint};
use crate::cloud::error::{Result, UploadError};
use crate::cloud::models::{PartAck, PartResult, StorageCredential, UploadOutcome, UploadSession};
use crate::cloud::signer::authorization;
use crate::config::UploadSettings;
use crate::constants::{CONTENT_TYPE_OCTET_STREAM, CONTENT_TYPE_TEXT_PLAIN};

const OP_PUT: &str = "put";
const OP_INITIATE: &str = "initiate multipart upload";
const OP_UPLOAD_PART: &str = "upload part";
const OP_FINISH: &str = "finish multipart upload";
const OP_ABORT: &str = "abort multipart upload";

/// HTTP implementation of [`UfileApi`].
///
/// Holds one credential and one connection pool. Requests are built by the
/// `*_request` methods and sent by the trait methods, so the exact wire form
/// of each call can be inspected without a server.
pub struct UfileClient {
    http: Client,
    credential: StorageCredential,
    endpoint: Endpoint,
}

impl UfileClient {
    pub fn new(credential: StorageCredential, settings: &UploadSettings) -> Result<Self> {
        let http = create_http_client(settings)?;
        Ok(Self::with_client(http, credential, Endpoint::from_settings(settings)))
    }

    pub fn with_client(http: Client, credential: StorageCredential, endpoint: Endpoint) -> Self {
        UfileClient {
            http,
            credential,
            endpoint,
        }
    }

    pub fn credential(&self) -> &StorageCredential {
        &self.credential
    }

    /// Single PUT of a whole object into the configured bucket
    pub fn put_request(&self, content: Bytes, key: &str) -> Result<Request> {
        let bucket = &self.credential.bucket;
        let auth = authorization(&self.credential, &Method::PUT, CONTENT_TYPE_OCTET_STREAM, bucket, key);

        self.http
            .put(self.endpoint.object_url(bucket, key))
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)
            .header(CONTENT_LENGTH, content.len())
            .body(content)
            .build()
            .map_err(|source| UploadError::Transport { operation: OP_PUT, source })
    }

    pub fn initiate_request(&self, key: &str) -> Result<Request> {
        let bucket = &self.credential.bucket;
        let auth = authorization(&self.credential, &Method::POST, CONTENT_TYPE_OCTET_STREAM, bucket, key);

        self.http
            .post(format!("{}?uploads", self.endpoint.object_url(bucket, key)))
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)
            .build()
            .map_err(|source| UploadError::Transport { operation: OP_INITIATE, source })
    }

    /// One part of a session.
    ///
    /// `Content-Length` declares the session block size even for the short
    /// trailing part; the service expects fixed-size blocks.
    pub fn upload_part_request(&self, part: Bytes, session: &UploadSession, part_number: usize) -> Result<Request> {
        let auth = authorization(
            &self.credential,
            &Method::PUT,
            CONTENT_TYPE_OCTET_STREAM,
            &session.bucket,
            &session.key,
        );
        let url = format!(
            "{}?uploadId={}&partNumber={}",
            self.endpoint.object_url(&session.bucket, &session.key),
            session.upload_id,
            part_number
        );

        self.http
            .put(url)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)
            .header(CONTENT_LENGTH, session.block_size)
            .body(part)
            .build()
            .map_err(|source| UploadError::Transport { operation: OP_UPLOAD_PART, source })
    }

    pub fn finish_request(&self, session: &UploadSession, etags: &str) -> Result<Request> {
        let auth = authorization(
            &self.credential,
            &Method::POST,
            CONTENT_TYPE_TEXT_PLAIN,
            &session.bucket,
            &session.key,
        );
        // newKey repeats the upload key; the service treats it as required
        let url = format!(
            "{}?uploadId={}&newKey={}",
            self.endpoint.object_url(&session.bucket, &session.key),
            session.upload_id,
            session.key
        );

        self.http
            .post(url)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_LENGTH, etags.len())
            .header(CONTENT_TYPE, CONTENT_TYPE_TEXT_PLAIN)
            .body(etags.to_string())
            .build()
            .map_err(|source| UploadError::Transport { operation: OP_FINISH, source })
    }

    pub fn abort_request(&self, session: &UploadSession) -> Result<Request> {
        let auth = authorization(
            &self.credential,
            &Method::DELETE,
            CONTENT_TYPE_OCTET_STREAM,
            &session.bucket,
            &session.key,
        );
        let url = format!(
            "{}?uploadId={}",
            self.endpoint.object_url(&session.bucket, &session.key),
            session.upload_id
        );

        self.http
            .delete(url)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)
            .build()
            .map_err(|source| UploadError::Transport { operation: OP_ABORT, source })
    }

    /// Send a request and read the whole response.
    async fn execute(&self, operation: &'static str, request: Request) -> Result<(StatusCode, HeaderMap, Bytes)> {
        debug!("{}: {} {}", operation, request.method(), request.url());

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| UploadError::Transport { operation, source })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| UploadError::Transport { operation, source })?;

        debug!("{}: status {}, {} byte body", operation, status, body.len());
        Ok((status, headers, body))
    }

    /// Like `execute`, but anything other than 200 becomes a protocol error
    async fn execute_ok(&self, operation: &'static str, request: Request) -> Result<(HeaderMap, Bytes)> {
        let (status, headers, body) = self.execute(operation, request).await?;
        if status != StatusCode::OK {
            return Err(protocol_error(operation, status, &body));
        }
        Ok((headers, body))
    }
}

fn protocol_error(operation: &'static str, status: StatusCode, body: &[u8]) -> UploadError {
    UploadError::Protocol {
        operation,
        status,
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| UploadError::Decode { operation, source })
}

#[async_trait]
impl UfileApi for UfileClient {
    async fn put(&self, content: Bytes, key: &str) -> Result<()> {
        let request = self.put_request(content, key)?;
        self.execute_ok(OP_PUT, request).await?;
        Ok(())
    }

    async fn initiate(&self, key: &str) -> Result<UploadSession> {
        let request = self.initiate_request(key)?;
        let (_, body) = self.execute_ok(OP_INITIATE, request).await?;
        decode(OP_INITIATE, &body)
    }

    async fn upload_part(&self, part: Bytes, session: &UploadSession, part_number: usize) -> Result<PartResult> {
        let request = self.upload_part_request(part, session, part_number)?;
        let (headers, body) = self.execute_ok(OP_UPLOAD_PART, request).await?;

        let ack: PartAck = decode(OP_UPLOAD_PART, &body)?;
        if ack.part_number != part_number {
            debug!("Service acknowledged part {} for request {}", ack.part_number, part_number);
        }

        let etag = headers
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .ok_or(UploadError::MissingEtag { part_number })?;

        Ok(PartResult {
            part_number,
            etag: etag.to_string(),
        })
    }

    async fn finish(&self, session: &UploadSession, etags: &str) -> Result<UploadOutcome> {
        let request = self.finish_request(session, etags)?;
        let (_, body) = self.execute_ok(OP_FINISH, request).await?;
        decode(OP_FINISH, &body)
    }

    async fn abort(&self, session: &UploadSession) -> Result<()> {
        let request = self.abort_request(session)?;
        let (status, _, body) = self.execute(OP_ABORT, request).await?;
        if !status.is_success() {
            return Err(protocol_error(OP_ABORT, status, &body));
        }
        Ok(())
    }
}
