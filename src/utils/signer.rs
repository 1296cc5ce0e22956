use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use log::warn;
use serde::Serialize;
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;

type HmacSha256 = Hmac<Sha256>;

/// Digest algorithm used to sign QR payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningScheme {
    #[default]
    HmacSha256,
    /// 32-bit rolling hash used by cards issued before HMAC signing. Weak;
    /// only kept so those cards still verify.
    RollingHash,
}

impl FromStr for SigningScheme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hmac" | "hmac-sha256" | "hmac_sha256" => Ok(SigningScheme::HmacSha256),
            "rolling" | "rolling-hash" | "legacy" => Ok(SigningScheme::RollingHash),
            other => Err(format!("unknown signing scheme: {}", other)),
        }
    }
}

impl fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningScheme::HmacSha256 => write!(f, "hmac-sha256"),
            SigningScheme::RollingHash => write!(f, "rolling-hash"),
        }
    }
}

/// Outcome of signing a payload.
///
/// Signing never blocks card issuance, so a failure is represented as
/// `Unsigned` and stored as an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Signed { digest: String, timestamp: i64 },
    Unsigned,
}

impl Signature {
    /// Stored form: `<digest>.<unix seconds>`, or `""` when unsigned.
    pub fn to_stored(&self) -> String {
        match self {
            Signature::Signed { digest, timestamp } => format!("{}.{}", digest, timestamp),
            Signature::Unsigned => String::new(),
        }
    }

    /// Parse the stored form. Returns `None` when the string is neither empty
    /// nor a `<digest>.<seconds>` pair.
    pub fn from_stored(stored: &str) -> Option<Self> {
        if stored.is_empty() {
            return Some(Signature::Unsigned);
        }

        let (digest, timestamp) = stored.rsplit_once('.')?;
        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let timestamp = timestamp.parse::<i64>().ok()?;

        Some(Signature::Signed {
            digest: digest.to_string(),
            timestamp,
        })
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Signature::Signed { .. })
    }

    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Signature::Signed { timestamp, .. } => Some(*timestamp),
            Signature::Unsigned => None,
        }
    }
}

/// Result of checking a stored signature against a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Expired,
    Invalid,
    Unsigned,
}

/// Sign `payload` with `secret` at the current unix time.
pub fn sign<T: Serialize>(payload: &T, secret: &str, scheme: SigningScheme) -> Signature {
    sign_at(payload, secret, scheme, Utc::now().timestamp())
}

/// Sign `payload` with `secret` at an explicit unix timestamp (seconds).
pub fn sign_at<T: Serialize>(
    payload: &T,
    secret: &str,
    scheme: SigningScheme,
    timestamp: i64,
) -> Signature {
    if secret.is_empty() {
        warn!("QR signing secret is empty, issuing unsigned QR code");
        return Signature::Unsigned;
    }

    let serialized = match serde_json::to_string(payload) {
        Ok(serialized) => serialized,
        Err(e) => {
            warn!("Failed to serialize QR payload for signing: {}", e);
            return Signature::Unsigned;
        }
    };

    match compute_digest(scheme, &serialized, secret, timestamp) {
        Some(digest) => Signature::Signed { digest, timestamp },
        None => Signature::Unsigned,
    }
}

/// Verify a stored signature string for `payload`.
///
/// The digest is checked first; a correct digest whose timestamp is older
/// than `max_age` is reported as `Expired`.
pub fn verify<T: Serialize>(
    payload: &T,
    stored: &str,
    secret: &str,
    scheme: SigningScheme,
    max_age: Duration,
    now: DateTime<Utc>,
) -> SignatureCheck {
    let (digest, timestamp) = match Signature::from_stored(stored) {
        Some(Signature::Signed { digest, timestamp }) => (digest, timestamp),
        Some(Signature::Unsigned) => return SignatureCheck::Unsigned,
        None => return SignatureCheck::Invalid,
    };

    let expected = match sign_at(payload, secret, scheme, timestamp) {
        Signature::Signed { digest, .. } => digest,
        Signature::Unsigned => return SignatureCheck::Invalid,
    };

    if !constant_time_eq(expected.as_bytes(), digest.to_ascii_lowercase().as_bytes()) {
        return SignatureCheck::Invalid;
    }

    if is_expired(timestamp.saturating_mul(1000), max_age, now) {
        return SignatureCheck::Expired;
    }

    SignatureCheck::Valid
}

/// `true` when `now - timestamp_ms` exceeds `max_age`.
pub fn is_expired(timestamp_ms: i64, max_age: Duration, now: DateTime<Utc>) -> bool {
    now.timestamp_millis().saturating_sub(timestamp_ms) > max_age.num_milliseconds()
}

fn compute_digest(
    scheme: SigningScheme,
    serialized: &str,
    secret: &str,
    timestamp: i64,
) -> Option<String> {
    match scheme {
        SigningScheme::HmacSha256 => {
            let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
                Ok(mac) => mac,
                Err(e) => {
                    warn!("Failed to initialise HMAC: {}", e);
                    return None;
                }
            };
            mac.update(format!("{}.{}", serialized, timestamp).as_bytes());
            Some(format!("{:x}", mac.finalize().into_bytes()))
        }
        SigningScheme::RollingHash => Some(rolling_hash(&format!(
            "{}{}{}",
            serialized, secret, timestamp
        ))),
    }
}

/// `hash = hash * 31 + unit` over UTF-16 code units, wrapped to 32 bits,
/// rendered as the hex of its absolute value.
fn rolling_hash(data: &str) -> String {
    let hash = data.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    format!("{:x}", hash.unsigned_abs())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
