use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::qr_payload::QrPayload;

pub const QR_CODES_COLLECTION: &str = "qr_codes";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A stored QR artifact. Payload and signature are written once and only
/// ever replaced wholesale when the code is regenerated.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QrCodeRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub customer_id: Option<String>,
    pub business_id: Option<String>,
    pub qr_data: QrPayload,
    pub image_url: Option<String>,
    pub qr_type: QrCodeType,
    pub status: QrCodeStatus,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    pub digital_signature: String,
    pub expiry_date: i64, // epoch milliseconds
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QrCodeType {
    CustomerCard,
    LoyaltyCard,
    PromoCode,
}

impl QrCodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QrCodeType::CustomerCard => "CUSTOMER_CARD",
            QrCodeType::LoyaltyCard => "LOYALTY_CARD",
            QrCodeType::PromoCode => "PROMO_CODE",
        }
    }

    pub fn for_payload(payload: &QrPayload) -> Option<Self> {
        match payload {
            QrPayload::Customer(_) => Some(QrCodeType::CustomerCard),
            QrPayload::LoyaltyCard(_) => Some(QrCodeType::LoyaltyCard),
            QrPayload::PromoCode(_) => Some(QrCodeType::PromoCode),
            QrPayload::Unknown(_) => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QrCodeStatus {
    Active,
    Inactive,
    Revoked,
}

impl QrCodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QrCodeStatus::Active => "ACTIVE",
            QrCodeStatus::Inactive => "INACTIVE",
            QrCodeStatus::Revoked => "REVOKED",
        }
    }
}

impl QrCodeRecord {
    pub fn new(
        qr_data: QrPayload,
        qr_type: QrCodeType,
        digital_signature: String,
        image_url: Option<String>,
        validity_days: i64,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();

        Self {
            id: None,
            customer_id: qr_data.customer_id().map(String::from),
            business_id: qr_data.business_id().map(String::from),
            qr_data,
            image_url,
            qr_type,
            status: QrCodeStatus::Active,
            is_primary: false,
            card_number: None,
            digital_signature,
            expiry_date: now.saturating_add(validity_days.saturating_mul(DAY_MS)),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp_millis() > self.expiry_date
    }

    pub fn is_active(&self) -> bool {
        self.status == QrCodeStatus::Active
    }
}

// For API responses
#[derive(Serialize, Debug)]
pub struct QrCodeResponse {
    pub id: String,
    pub customer_id: Option<String>,
    pub business_id: Option<String>,
    pub qr_type: QrCodeType,
    pub status: QrCodeStatus,
    pub is_primary: bool,
    pub card_number: Option<String>,
    pub qr_data: QrPayload,
    pub image_url: Option<String>,
    pub signed: bool,
    pub expiry_date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<QrCodeRecord> for QrCodeResponse {
    fn from(record: QrCodeRecord) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            customer_id: record.customer_id,
            business_id: record.business_id,
            qr_type: record.qr_type,
            status: record.status,
            is_primary: record.is_primary,
            card_number: record.card_number,
            qr_data: record.qr_data,
            image_url: record.image_url,
            signed: !record.digital_signature.is_empty(),
            expiry_date: record.expiry_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_active_and_expires_after_validity() {
        let record = QrCodeRecord::new(
            QrPayload::loyalty_card("1", "2", "3", "4"),
            QrCodeType::LoyaltyCard,
            String::from("abc.1"),
            None,
            365,
        );

        assert!(record.is_active());
        assert!(!record.is_expired());
        assert!(!record.is_primary);
        assert_eq!(record.customer_id.as_deref(), Some("2"));
        assert_eq!(record.business_id.as_deref(), Some("4"));
        assert_eq!(record.expiry_date - record.created_at, 365 * DAY_MS);
    }

    #[test]
    fn huge_validity_saturates_instead_of_overflowing() {
        let record = QrCodeRecord::new(
            QrPayload::customer("1", None),
            QrCodeType::CustomerCard,
            String::new(),
            None,
            i64::MAX,
        );
        assert_eq!(record.expiry_date, i64::MAX);
        assert!(!record.is_expired());
    }

    #[test]
    fn record_with_past_expiry_is_expired() {
        let mut record = QrCodeRecord::new(
            QrPayload::customer("1", None),
            QrCodeType::CustomerCard,
            String::new(),
            None,
            365,
        );
        record.expiry_date = chrono::Utc::now().timestamp_millis() - 1;
        assert!(record.is_expired());
    }

    #[test]
    fn type_tags_serialize_in_screaming_case() {
        assert_eq!(
            serde_json::to_value(QrCodeType::CustomerCard).unwrap(),
            QrCodeType::CustomerCard.as_str()
        );
        assert_eq!(
            serde_json::to_value(QrCodeStatus::Revoked).unwrap(),
            QrCodeStatus::Revoked.as_str()
        );
    }

    #[test]
    fn response_reports_unsigned_records() {
        let record = QrCodeRecord::new(
            QrPayload::promo_code("A", "1"),
            QrCodeType::PromoCode,
            String::new(),
            None,
            30,
        );
        let response = QrCodeResponse::from(record);
        assert!(!response.signed);
        assert_eq!(response.id, "");
    }
}
