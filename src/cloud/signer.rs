//! Request signing for the UFile API.
//!
//! Each request carries `Authorization: UCloud <public_key>:<token>` where the
//! token is an HMAC-SHA1 over a five-line canonical string, base64 encoded.
//! The Content-MD5 and Date lines are always left empty.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha1::Sha1;

use crate::cloud::models::StorageCredential;
use crate::constants::AUTH_SCHEME;

type HmacSha1 = Hmac<Sha1>;

/// Build the string the token is computed over.
pub fn canonical_string(method: &Method, content_type: &str, bucket: &str, key: &str) -> String {
    format!("{}\n\n{}\n\n/{}/{}", method.as_str(), content_type, bucket, key)
}

/// Compute the signing token for one request.
///
/// Deterministic: identical inputs always yield the identical token.
pub fn sign(private_key: &str, method: &Method, content_type: &str, bucket: &str, key: &str) -> String {
    let data = canonical_string(method, content_type, bucket, key);

    let mut mac = HmacSha1::new_from_slice(private_key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Full `Authorization` header value for a request.
pub fn authorization(
    credential: &StorageCredential,
    method: &Method,
    content_type: &str,
    bucket: &str,
    key: &str,
) -> String {
    let token = sign(&credential.private_key, method, content_type, bucket, key);
    format!("{} {}:{}", AUTH_SCHEME, credential.public_key, token)
}
