//! Runtime checks for QR payloads arriving from scanners or API clients.
//!
//! None of these functions fail: malformed input yields `false`, `None` or
//! the caller's fallback, with the underlying error logged.

use log::warn;
use serde_json::{Map, Value};
use std::fmt::Display;

use crate::models::qr_payload::{
    CustomerQrData, LoyaltyCardQrData, PromoCodeQrData, QrPayload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QrKind {
    Customer,
    LoyaltyCard,
    PromoCode,
    Unknown,
}

impl QrKind {
    fn from_discriminant(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(QrKind::Customer),
            "loyaltyCard" => Some(QrKind::LoyaltyCard),
            "promoCode" => Some(QrKind::PromoCode),
            "unknown" => Some(QrKind::Unknown),
            _ => None,
        }
    }

    fn required_fields(self) -> &'static [&'static str] {
        match self {
            QrKind::Customer => &["customerId"],
            QrKind::LoyaltyCard => &["cardId", "customerId", "programId", "businessId"],
            QrKind::PromoCode => &["code", "businessId"],
            QrKind::Unknown => &[],
        }
    }
}

fn kind_of(object: &Map<String, Value>) -> Option<QrKind> {
    object
        .get("type")
        .and_then(Value::as_str)
        .and_then(QrKind::from_discriminant)
}

/// A field counts as present when it holds a number or a non-empty string,
/// the only shapes an id or timestamp decodes from.
fn has_field(object: &Map<String, Value>, key: &str) -> bool {
    match object.get(key) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}

fn is_kind(value: &Value, expected: QrKind) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    kind_of(object) == Some(expected)
        && expected
            .required_fields()
            .iter()
            .all(|field| has_field(object, field))
}

/// `true` for any recognised QR payload shape, including legacy payloads
/// that predate the `type` field but carry an `id`, `customerId` or
/// `timestamp`.
pub fn is_qr_code_data(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    if kind_of(object).is_some() {
        return true;
    }
    ["id", "customerId", "timestamp"]
        .iter()
        .any(|field| has_field(object, field))
}

pub fn is_customer_qr_code_data(value: &Value) -> bool {
    is_kind(value, QrKind::Customer)
}

pub fn is_loyalty_card_qr_code_data(value: &Value) -> bool {
    is_kind(value, QrKind::LoyaltyCard)
}

pub fn is_promo_code_qr_code_data(value: &Value) -> bool {
    is_kind(value, QrKind::PromoCode)
}

/// Narrow an arbitrary JSON value to a typed payload.
///
/// Only `customer`, `loyaltyCard` and `promoCode` payloads with all their
/// required fields are accepted; everything else, `null` and a missing
/// value included, gives `None`.
pub fn validate_qr_code_data(value: Option<&Value>) -> Option<QrPayload> {
    let value = value?;
    let kind = value.as_object().and_then(kind_of)?;
    if !is_kind(value, kind) {
        return None;
    }

    let converted = match kind {
        QrKind::Customer => {
            serde_json::from_value::<CustomerQrData>(value.clone()).map(QrPayload::Customer)
        }
        QrKind::LoyaltyCard => serde_json::from_value::<LoyaltyCardQrData>(value.clone())
            .map(QrPayload::LoyaltyCard),
        QrKind::PromoCode => {
            serde_json::from_value::<PromoCodeQrData>(value.clone()).map(QrPayload::PromoCode)
        }
        QrKind::Unknown => return None,
    };

    match converted {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("Rejecting {:?} QR payload: {}", kind, e);
            None
        }
    }
}

/// Return `value` when `predicate` accepts it, otherwise `fallback`. A
/// predicate error counts as a rejection.
pub fn validate_with_fallback<T, P, E>(value: T, predicate: P, fallback: T) -> T
where
    P: FnOnce(&T) -> Result<bool, E>,
    E: Display,
{
    match predicate(&value) {
        Ok(true) => value,
        Ok(false) => fallback,
        Err(e) => {
            warn!("Validation predicate failed: {}", e);
            fallback
        }
    }
}

/// Decode the text read from a QR code with the given validator.
/// Unrecognised content is kept as [`QrPayload::Unknown`] carrying the raw
/// text.
pub fn parse_scanned_with<F>(raw: &str, validate: F) -> QrPayload
where
    F: FnOnce(&Value) -> Option<QrPayload>,
{
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => validate(&value).unwrap_or_else(|| QrPayload::unknown(raw)),
        Err(_) => QrPayload::unknown(raw),
    }
}
