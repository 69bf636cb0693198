//! Query-parameter request signing (signature version 2, HMAC-SHA256).
//!
//! The signer adds the authentication parameters to a request's parameter
//! set and computes a signature over:
//!
//! ```text
//! METHOD\n
//! host\n
//! /path\n
//! canonical query string
//! ```
//!
//! The signature is the standard base64 encoding of the raw HMAC-SHA256
//! digest, keyed with the secret key. Nothing is sent over the network here.

use crate::credentials::Credentials;
use crate::params::{Params, SIGNATURE};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HOST};
use sha2::Sha256;

#[cfg(test)]
#[path = "signer_tests.rs"]
mod tests;

type HmacSha256 = Hmac<Sha256>;

/// Parameter carrying the public access key
pub const ACCESS_KEY_PARAM: &str = "AWSAccessKeyId";
/// Parameter naming the signing algorithm
pub const SIGNATURE_METHOD_PARAM: &str = "SignatureMethod";
/// Parameter naming the signing protocol version
pub const SIGNATURE_VERSION_PARAM: &str = "SignatureVersion";
/// Parameter carrying the computed signature
pub const SIGNATURE_PARAM: &str = SIGNATURE;

/// Fixed signing algorithm identifier
pub const SIGNATURE_METHOD: &str = "HmacSHA256";
/// Fixed signing protocol version
pub const SIGNATURE_VERSION: &str = "2";

/// Signs request parameters with a credential pair
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Add authentication parameters and a signature to `params`.
    ///
    /// `headers` must already contain `Host`; a missing Host contributes an
    /// empty line to the signed payload and produces a signature the service
    /// will reject. Any previous `Signature` value is discarded before the
    /// canonical string is computed.
    pub fn sign(&self, method: &str, path: &str, params: &mut Params, headers: &HeaderMap) {
        params.remove(SIGNATURE_PARAM);
        params.set(ACCESS_KEY_PARAM, self.credentials.access_key());
        params.set(SIGNATURE_METHOD_PARAM, SIGNATURE_METHOD);
        params.set(SIGNATURE_VERSION_PARAM, SIGNATURE_VERSION);

        let host = headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        let payload = string_to_sign(method, host, path, params);
        let signature = self.compute_signature(&payload);
        params.set(SIGNATURE_PARAM, signature);
    }

    /// HMAC-SHA256 of `payload`, base64 encoded
    fn compute_signature(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.credentials.secret_key().expose_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// Newline-joined signing payload
pub fn string_to_sign(method: &str, host: &str, path: &str, params: &Params) -> String {
    [
        method,
        host,
        path,
        params.canonical_query_string().as_str(),
    ]
    .join("\n")
}
