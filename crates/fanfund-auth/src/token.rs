//! Self-contained HS256 session tokens.
//!
//! Standard JWT framing: `base64url(header).base64url(payload).base64url(sig)`
//! with `=` padding stripped, signed with HMAC-SHA256 over the first two
//! segments. Verification failures are reported in a fixed order so a given
//! bad token always fails the same way: framing, then signature, then payload
//! decoding, then claim validation, then expiry.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

use fanfund_types::Role;
use fanfund_types::api::Claims;

use crate::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("malformed payload")]
    MalformedPayload,
    #[error("invalid claims")]
    InvalidClaims,
    #[error("token expired")]
    Expired,
}

#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

/// Signs and verifies session tokens with a shared server-wide secret.
/// Construct once at startup with the configured secret; nothing in here
/// reads the environment.
pub struct TokenCodec {
    secret: String,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Mints a token for `subject` acting as `role`, valid for `ttl_seconds`
    /// starting at `now` (wall clock when `None`).
    pub fn sign(&self, subject: i64, role: Role, ttl_seconds: i64, now: Option<i64>) -> String {
        let now = now.unwrap_or_else(unix_now);
        let header = serde_json::to_string(&Header {
            alg: "HS256",
            typ: "JWT",
        })
        .expect("static header serializes");

        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now + ttl_seconds,
        };
        let payload = serde_json::to_string(&claims).expect("claims serialize");

        let signing_input = format!("{}.{}", B64.encode(header), B64.encode(payload));
        let signature = self.signature(&signing_input);
        format!("{}.{}", signing_input, signature)
    }

    /// Verifies a token and returns its claims. Failure modes, in the order
    /// they are checked:
    ///
    /// - [`TokenError::Malformed`]: not exactly three dot-separated segments
    /// - [`TokenError::BadSignature`]: HMAC over the first two segments does
    ///   not match the third (compared timing-safely)
    /// - [`TokenError::MalformedPayload`]: payload is not base64url JSON
    /// - [`TokenError::InvalidClaims`]: `sub` missing/empty/non-string,
    ///   unknown `role`, or non-integer `iat`/`exp`
    /// - [`TokenError::Expired`]: `exp <= now`, so expiry at exactly `now`
    ///   already fails
    pub fn verify(&self, token: &str, now: Option<i64>) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(TokenError::Malformed),
            };

        let expected = self.signature(&format!("{}.{}", header_b64, payload_b64));
        if !constant_time_eq(expected.as_bytes(), signature_b64.as_bytes()) {
            return Err(TokenError::BadSignature);
        }

        let payload = B64
            .decode(payload_b64)
            .map_err(|_| TokenError::MalformedPayload)?;
        let payload: serde_json::Value =
            serde_json::from_slice(&payload).map_err(|_| TokenError::MalformedPayload)?;

        let sub = payload
            .get("sub")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::InvalidClaims)?;
        let role = payload
            .get("role")
            .and_then(|v| v.as_str())
            .and_then(Role::parse)
            .ok_or(TokenError::InvalidClaims)?;
        let iat = payload
            .get("iat")
            .and_then(|v| v.as_i64())
            .ok_or(TokenError::InvalidClaims)?;
        let exp = payload
            .get("exp")
            .and_then(|v| v.as_i64())
            .ok_or(TokenError::InvalidClaims)?;

        let now = now.unwrap_or_else(unix_now);
        if exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(Claims {
            sub: sub.to_string(),
            role,
            iat,
            exp,
        })
    }

    fn signature(&self, signing_input: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(signing_input.as_bytes());
        B64.encode(mac.finalize().into_bytes())
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
