use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::qr_payload::QrPayload;

#[derive(Deserialize, Validate)]
pub struct CustomerQrRequest {
    #[validate(length(min = 1, max = 64, message = "customer_id is required"))]
    pub customer_id: String,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct LoyaltyCardQrRequest {
    #[validate(length(min = 1, max = 64, message = "card_id is required"))]
    pub card_id: String,
    #[validate(length(min = 1, max = 64, message = "customer_id is required"))]
    pub customer_id: String,
    #[validate(length(min = 1, max = 64, message = "program_id is required"))]
    pub program_id: String,
    #[validate(length(min = 1, max = 64, message = "business_id is required"))]
    pub business_id: String,
    pub program_name: Option<String>,
    pub business_name: Option<String>,
    #[validate(range(min = 0))]
    pub points: Option<i64>,
}

#[derive(Deserialize, Validate)]
pub struct PromoQrRequest {
    /// Generated when absent.
    #[validate(length(min = 3, max = 32, message = "code must be 3-32 characters"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 64, message = "business_id is required"))]
    pub business_id: String,
    pub name: Option<String>,
    pub expires_at: Option<i64>,
}

/// Text read by a scanner, exactly as encoded in the QR image.
#[derive(Deserialize, Validate)]
pub struct ScanRequest {
    #[validate(length(min = 1, max = 4096, message = "data must not be empty"))]
    pub data: String,
}

#[derive(Deserialize)]
pub struct RenderParams {
    pub size: Option<u32>,
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub valid: bool,
    pub payload: QrPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
