use serde::{Deserialize, Deserializer, Serialize};

/// Data encoded inside a scannable QR code.
///
/// The `type` field of the JSON form selects the variant. Anything that is
/// not a recognised shape is kept as [`QrPayload::Unknown`] with the raw
/// scanned text so it can still be shown or logged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QrPayload {
    Customer(CustomerQrData),
    LoyaltyCard(LoyaltyCardQrData),
    PromoCode(PromoCodeQrData),
    Unknown(UnknownQrData),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerQrData {
    #[serde(deserialize_with = "id_string")]
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub timestamp: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyCardQrData {
    #[serde(deserialize_with = "id_string")]
    pub card_id: String,
    #[serde(deserialize_with = "id_string")]
    pub customer_id: String,
    #[serde(deserialize_with = "id_string")]
    pub program_id: String,
    #[serde(deserialize_with = "id_string")]
    pub business_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub timestamp: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeQrData {
    #[serde(deserialize_with = "id_string")]
    pub code: String,
    #[serde(deserialize_with = "id_string")]
    pub business_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub timestamp: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnknownQrData {
    pub raw: String,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub timestamp: i64,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl QrPayload {
    pub fn customer(customer_id: impl Into<String>, card_number: Option<String>) -> Self {
        QrPayload::Customer(CustomerQrData {
            customer_id: customer_id.into(),
            name: None,
            email: None,
            card_number,
            timestamp: now_millis(),
        })
    }

    pub fn loyalty_card(
        card_id: impl Into<String>,
        customer_id: impl Into<String>,
        program_id: impl Into<String>,
        business_id: impl Into<String>,
    ) -> Self {
        QrPayload::LoyaltyCard(LoyaltyCardQrData {
            card_id: card_id.into(),
            customer_id: customer_id.into(),
            program_id: program_id.into(),
            business_id: business_id.into(),
            program_name: None,
            business_name: None,
            points: None,
            timestamp: now_millis(),
        })
    }

    pub fn promo_code(code: impl Into<String>, business_id: impl Into<String>) -> Self {
        QrPayload::PromoCode(PromoCodeQrData {
            code: code.into(),
            business_id: business_id.into(),
            name: None,
            expires_at: None,
            timestamp: now_millis(),
        })
    }

    pub fn unknown(raw: impl Into<String>) -> Self {
        QrPayload::Unknown(UnknownQrData {
            raw: raw.into(),
            timestamp: now_millis(),
        })
    }

    /// The `type` discriminant as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            QrPayload::Customer(_) => "customer",
            QrPayload::LoyaltyCard(_) => "loyaltyCard",
            QrPayload::PromoCode(_) => "promoCode",
            QrPayload::Unknown(_) => "unknown",
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            QrPayload::Customer(data) => data.timestamp,
            QrPayload::LoyaltyCard(data) => data.timestamp,
            QrPayload::PromoCode(data) => data.timestamp,
            QrPayload::Unknown(data) => data.timestamp,
        }
    }

    pub fn customer_id(&self) -> Option<&str> {
        match self {
            QrPayload::Customer(data) => Some(&data.customer_id),
            QrPayload::LoyaltyCard(data) => Some(&data.customer_id),
            QrPayload::PromoCode(_) | QrPayload::Unknown(_) => None,
        }
    }

    pub fn business_id(&self) -> Option<&str> {
        match self {
            QrPayload::LoyaltyCard(data) => Some(&data.business_id),
            QrPayload::PromoCode(data) => Some(&data.business_id),
            QrPayload::Customer(_) | QrPayload::Unknown(_) => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, QrPayload::Unknown(_))
    }

    /// Same payload stamped with the current time. Used when a stored QR
    /// code is regenerated.
    pub fn restamped(&self) -> Self {
        let mut payload = self.clone();
        let now = now_millis();
        match &mut payload {
            QrPayload::Customer(data) => data.timestamp = now,
            QrPayload::LoyaltyCard(data) => data.timestamp = now,
            QrPayload::PromoCode(data) => data.timestamp = now,
            QrPayload::Unknown(data) => data.timestamp = now,
        }
        payload
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Identifiers arrive both as JSON strings and as numbers.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(value) => Ok(value.to_string()),
        NumberOrText::Float(value) if value.fract() == 0.0 => Ok(format!("{}", value as i64)),
        NumberOrText::Float(value) => Ok(value.to_string()),
        NumberOrText::Text(value) => Ok(value),
    }
}

fn lenient_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(value) => Ok(value),
        NumberOrText::Float(value) => Ok(value as i64),
        NumberOrText::Text(value) => value.trim().parse::<i64>().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn customer_payload_uses_type_discriminant() {
        let payload = QrPayload::customer("42", Some(String::from("GC-000042-6")));
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["type"], "customer");
        assert_eq!(value["customerId"], "42");
        assert_eq!(value["cardNumber"], "GC-000042-6");
        assert!(value["timestamp"].as_i64().unwrap() > 0);
        assert!(value.get("name").is_none());
    }

    #[test]
    fn builders_stamp_current_time() {
        let before = chrono::Utc::now().timestamp_millis();
        let payload = QrPayload::promo_code("SPRING10", "7");
        let after = chrono::Utc::now().timestamp_millis();

        assert!(payload.timestamp() >= before && payload.timestamp() <= after);
        assert_eq!(payload.kind(), "promoCode");
        assert_eq!(payload.business_id(), Some("7"));
        assert_eq!(payload.customer_id(), None);
    }

    #[test]
    fn numeric_ids_are_normalised_to_strings() {
        let payload: QrPayload = serde_json::from_value(json!({
            "type": "loyaltyCard",
            "cardId": 7890,
            "customerId": 4,
            "programId": "12",
            "businessId": 3,
            "timestamp": 1700000000000.0
        }))
        .unwrap();

        match payload {
            QrPayload::LoyaltyCard(data) => {
                assert_eq!(data.card_id, "7890");
                assert_eq!(data.customer_id, "4");
                assert_eq!(data.business_id, "3");
                assert_eq!(data.timestamp, 1_700_000_000_000);
            }
            other => panic!("unexpected variant {:?}", other),
        }
    }

    #[test]
    fn restamped_keeps_identity_fields() {
        let mut original = QrPayload::loyalty_card("1", "2", "3", "4");
        if let QrPayload::LoyaltyCard(data) = &mut original {
            data.timestamp = 1;
        }

        let fresh = original.restamped();
        assert!(fresh.timestamp() > 1);
        assert_eq!(fresh.customer_id(), Some("2"));
        assert_eq!(fresh.business_id(), Some("4"));
    }

    #[test]
    fn missing_timestamp_defaults_to_zero() {
        let payload: QrPayload =
            serde_json::from_value(json!({"type": "promoCode", "code": "X", "businessId": "1"}))
                .unwrap();
        assert_eq!(payload.timestamp(), 0);
    }
}
