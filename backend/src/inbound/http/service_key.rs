//! Bearer-key guard for the `/functions/v1` routes.
//!
//! Both sides are hashed with SHA-256 and compared with
//! [`subtle::ConstantTimeEq`], so the comparison always covers 32 bytes
//! regardless of the presented key's length.

use std::fmt;

use actix_web::HttpRequest;
use actix_web::http::header;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Shared secret presented as `Authorization: Bearer <key>`.
#[derive(Clone)]
pub struct ServiceKey {
    digest: [u8; 32],
    fingerprint: String,
}

fn digest(raw: &[u8]) -> [u8; 32] {
    Sha256::digest(raw).into()
}

impl ServiceKey {
    /// Wrap a configured key. Blank keys are refused.
    pub fn new(raw: &Zeroizing<String>) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let digest = digest(trimmed.as_bytes());
        let fingerprint = hex::encode(digest.get(..4).unwrap_or_default());
        Some(Self {
            digest,
            fingerprint,
        })
    }

    /// Short hex prefix of the key digest, safe to log.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Compare a presented key in constant time.
    pub fn matches(&self, presented: &str) -> bool {
        let candidate = digest(presented.as_bytes());
        self.digest.as_slice().ct_eq(candidate.as_slice()).into()
    }

    /// Check the request's bearer token.
    pub fn authorizes(&self, req: &HttpRequest) -> bool {
        bearer_token(req).is_some_and(|token| self.matches(token))
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceKey")
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}
