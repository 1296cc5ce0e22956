//! QR issuance, regeneration and scan validation on top of the `qr_codes`
//! collection.

use chrono::Duration;
use futures_util::TryStreamExt;
use log::{info, warn};
use mongodb::Collection;
use mongodb::bson::{Document, doc, oid::ObjectId};
use nanoid::nanoid;
use serde::Serialize;
use std::fmt;

use crate::models::qr_code_record::{
    QR_CODES_COLLECTION, QrCodeRecord, QrCodeStatus, QrCodeType,
};
use crate::models::qr_payload::QrPayload;
use crate::services::errors::ServiceError;
use crate::state::app_state::AppState;
use crate::utils::card_number::{generate_consistent_card_number, is_valid_card_number};
use crate::utils::image_renderer::render_image_url;
use crate::utils::signer::{self, SignatureCheck};
use crate::utils::verifier::{is_qr_code_data, parse_scanned_with};

const PROMO_CODE_ALPHABET: [char; 32] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T',
    'U', 'V', 'W', 'X', 'Y', 'Z', '2', '3', '4', '5', '6', '7', '8', '9',
];

type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, Default)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Why a scanned code was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanRejection {
    Unrecognized,
    Incomplete,
    NotFound,
    Expired,
    Superseded,
    Unsigned,
    BadSignature,
    SignatureExpired,
}

impl fmt::Display for ScanRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ScanRejection::Unrecognized => "not a loyalty QR code",
            ScanRejection::Incomplete => "QR payload is missing required fields",
            ScanRejection::NotFound => "no active QR code matches this payload",
            ScanRejection::Expired => "QR code has expired",
            ScanRejection::Superseded => "QR code has been replaced by a newer one",
            ScanRejection::Unsigned => "QR code is not signed",
            ScanRejection::BadSignature => "QR code signature does not match",
            ScanRejection::SignatureExpired => "QR code signature is too old",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub payload: QrPayload,
    pub record: Option<QrCodeRecord>,
    pub rejection: Option<ScanRejection>,
}

impl ScanOutcome {
    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }

    fn rejected(payload: QrPayload, record: Option<QrCodeRecord>, reason: ScanRejection) -> Self {
        Self {
            payload,
            record,
            rejection: Some(reason),
        }
    }
}

fn qr_codes(state: &AppState) -> Collection<QrCodeRecord> {
    state.db.collection::<QrCodeRecord>(QR_CODES_COLLECTION)
}

/// Sign the payload and resolve its image URL, producing a fresh record.
async fn build_record(state: &AppState, payload: QrPayload, qr_type: QrCodeType) -> QrCodeRecord {
    let config = &state.config;
    let signature = signer::sign(&payload, &config.qr_secret, config.signing_scheme);
    if !signature.is_signed() {
        warn!("Issuing unsigned {} QR code", qr_type.as_str());
    }

    let image_url = render_image_url(&payload, &config.image, &state.http)
        .await
        .map(|url| url.into_string());

    QrCodeRecord::new(
        payload,
        qr_type,
        signature.to_stored(),
        image_url,
        config.card_validity_days,
    )
}

async fn insert_record(state: &AppState, mut record: QrCodeRecord) -> ServiceResult<QrCodeRecord> {
    let result = qr_codes(state).insert_one(&record).await?;
    record.id = result.inserted_id.as_object_id();
    Ok(record)
}

/// Issue the primary customer card, or return the current one when it is
/// still active. Returns the record and whether it was newly written.
pub async fn issue_customer_card(
    state: &AppState,
    customer_id: &str,
    details: CustomerDetails,
) -> ServiceResult<(QrCodeRecord, bool)> {
    let collection = qr_codes(state);
    let card_number = generate_consistent_card_number(customer_id);

    let existing = collection
        .find_one(doc! { "card_number": &card_number })
        .await?;

    if let Some(existing) = &existing {
        if keep_existing_card(existing, customer_id, &card_number)? {
            return Ok((existing.clone(), false));
        }
    }

    let now = chrono::Utc::now().timestamp_millis();
    collection
        .update_many(
            doc! {
                "customer_id": customer_id,
                "qr_type": QrCodeType::CustomerCard.as_str(),
                "card_number": { "$ne": &card_number },
            },
            doc! { "$set": { "is_primary": false, "updated_at": now } },
        )
        .await?;

    let mut payload = QrPayload::customer(customer_id, Some(card_number.clone()));
    if let QrPayload::Customer(data) = &mut payload {
        data.name = details.name;
        data.email = details.email;
    }

    let mut record = build_record(state, payload, QrCodeType::CustomerCard).await;
    record.is_primary = true;
    record.card_number = Some(card_number.clone());

    match existing.and_then(|existing| existing.id) {
        Some(id) => {
            // same card number, stale row: overwrite it
            record.id = Some(id);
            collection.replace_one(doc! { "_id": id }, &record).await?;
            info!("Reissued customer card {} for {}", card_number, customer_id);
            Ok((record, true))
        }
        None => {
            let record = insert_record(state, record).await?;
            info!("Issued customer card {} for {}", card_number, customer_id);
            Ok((record, true))
        }
    }
}

/// Decide what happens to the row already holding `card_number`: `true`
/// keeps it as the customer's current card, `false` marks it stale. A row
/// owned by another customer is a conflict.
fn keep_existing_card(
    existing: &QrCodeRecord,
    customer_id: &str,
    card_number: &str,
) -> ServiceResult<bool> {
    if existing.customer_id.as_deref() != Some(customer_id) {
        warn!(
            "Card number {} collides between customers {:?} and {}",
            card_number, existing.customer_id, customer_id
        );
        return Err(ServiceError::Conflict(format!(
            "Card number {} is already assigned",
            card_number
        )));
    }
    Ok(existing.is_active() && existing.is_primary && !existing.is_expired())
}

/// Issue the QR code of a loyalty card. An active, unexpired code for the
/// same card is returned unchanged.
pub async fn issue_loyalty_card(
    state: &AppState,
    payload: QrPayload,
) -> ServiceResult<(QrCodeRecord, bool)> {
    let QrPayload::LoyaltyCard(data) = &payload else {
        return Err(ServiceError::BadRequest(String::from(
            "Expected a loyalty card payload",
        )));
    };

    let existing = qr_codes(state)
        .find_one(doc! {
            "qr_type": QrCodeType::LoyaltyCard.as_str(),
            "status": QrCodeStatus::Active.as_str(),
            "qr_data.cardId": &data.card_id,
        })
        .await?;

    if let Some(existing) = existing {
        if !existing.is_expired() {
            return Ok((existing, false));
        }
        qr_codes(state)
            .update_one(
                doc! { "_id": existing.id },
                doc! { "$set": {
                    "status": QrCodeStatus::Inactive.as_str(),
                    "updated_at": chrono::Utc::now().timestamp_millis(),
                }},
            )
            .await?;
    }

    let record = build_record(state, payload, QrCodeType::LoyaltyCard).await;
    let record = insert_record(state, record).await?;
    Ok((record, true))
}

/// Issue a promotion QR code. A code is generated when none is given.
pub async fn issue_promo(
    state: &AppState,
    code: Option<String>,
    business_id: &str,
    name: Option<String>,
    expires_at: Option<i64>,
) -> ServiceResult<QrCodeRecord> {
    let code = match code {
        Some(code) => code.trim().to_uppercase(),
        None => nanoid!(8, &PROMO_CODE_ALPHABET),
    };

    let in_use = qr_codes(state)
        .find_one(doc! {
            "qr_type": QrCodeType::PromoCode.as_str(),
            "status": QrCodeStatus::Active.as_str(),
            "business_id": business_id,
            "qr_data.code": &code,
        })
        .await?;
    if in_use.is_some() {
        return Err(ServiceError::Conflict(String::from(
            "Promo code already in use",
        )));
    }

    let mut payload = QrPayload::promo_code(code, business_id);
    if let QrPayload::PromoCode(data) = &mut payload {
        data.name = name;
        data.expires_at = expires_at;
    }

    let record = build_record(state, payload, QrCodeType::PromoCode).await;
    insert_record(state, record).await
}

pub async fn find_by_id(state: &AppState, id: &ObjectId) -> ServiceResult<QrCodeRecord> {
    qr_codes(state)
        .find_one(doc! { "_id": id })
        .await?
        .ok_or(ServiceError::NotFound)
}

pub async fn list_customer_codes(
    state: &AppState,
    customer_id: &str,
) -> ServiceResult<Vec<QrCodeRecord>> {
    let records = qr_codes(state)
        .find(doc! { "customer_id": customer_id })
        .sort(doc! { "is_primary": -1, "created_at": -1 })
        .await?
        .try_collect::<Vec<QrCodeRecord>>()
        .await?;
    Ok(records)
}

/// Rebuild a stored QR code: fresh payload timestamp, new signature, new
/// image URL and expiry. The stored row is replaced as a whole.
pub async fn regenerate(state: &AppState, id: &ObjectId) -> ServiceResult<QrCodeRecord> {
    let current = find_by_id(state, id).await?;

    let mut payload = current.qr_data.restamped();
    if let QrPayload::Customer(data) = &mut payload {
        data.card_number = Some(generate_consistent_card_number(&data.customer_id));
    }
    if payload.is_unknown() {
        return Err(ServiceError::BadRequest(String::from(
            "Cannot regenerate a QR code with an unknown payload",
        )));
    }

    let mut record = build_record(state, payload, current.qr_type).await;
    record.id = current.id;
    record.created_at = current.created_at;
    record.is_primary = current.qr_type == QrCodeType::CustomerCard;
    record.card_number = match current.qr_type {
        QrCodeType::CustomerCard => record
            .qr_data
            .customer_id()
            .map(generate_consistent_card_number),
        _ => current.card_number,
    };

    if let Some((filter, update)) = displaced_rows(&record.qr_data, id, record.updated_at) {
        let retired = qr_codes(state).update_many(filter, update).await?;
        if retired.modified_count > 0 {
            info!(
                "Retired {} QR code(s) replaced by {}",
                retired.modified_count, id
            );
        }
    }

    qr_codes(state)
        .replace_one(doc! { "_id": id }, &record)
        .await?;
    info!("Regenerated QR code {}", id);
    Ok(record)
}

/// Filter and update retiring the rows that a regenerated `id` replaces:
/// other primary cards of the same customer, or other active codes for the
/// same loyalty card or promo code.
fn displaced_rows(payload: &QrPayload, id: &ObjectId, now: i64) -> Option<(Document, Document)> {
    let active = QrCodeStatus::Active.as_str();
    let deactivate = doc! { "$set": {
        "status": QrCodeStatus::Inactive.as_str(),
        "updated_at": now,
    }};

    match payload {
        QrPayload::Customer(data) => Some((
            doc! {
                "_id": { "$ne": id },
                "qr_type": QrCodeType::CustomerCard.as_str(),
                "customer_id": &data.customer_id,
                "is_primary": true,
            },
            doc! { "$set": { "is_primary": false, "updated_at": now } },
        )),
        QrPayload::LoyaltyCard(data) => Some((
            doc! {
                "_id": { "$ne": id },
                "qr_type": QrCodeType::LoyaltyCard.as_str(),
                "status": active,
                "qr_data.cardId": &data.card_id,
            },
            deactivate,
        )),
        QrPayload::PromoCode(data) => Some((
            doc! {
                "_id": { "$ne": id },
                "qr_type": QrCodeType::PromoCode.as_str(),
                "status": active,
                "business_id": &data.business_id,
                "qr_data.code": &data.code,
            },
            deactivate,
        )),
        QrPayload::Unknown(_) => None,
    }
}

pub async fn revoke(state: &AppState, id: &ObjectId) -> ServiceResult<QrCodeRecord> {
    let now = chrono::Utc::now().timestamp_millis();
    let result = qr_codes(state)
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "status": QrCodeStatus::Revoked.as_str(),
                "is_primary": false,
                "updated_at": now,
            }},
        )
        .await?;

    if result.matched_count == 0 {
        return Err(ServiceError::NotFound);
    }
    info!("Revoked QR code {}", id);
    find_by_id(state, id).await
}

async fn find_active_record(
    state: &AppState,
    payload: &QrPayload,
) -> ServiceResult<Option<QrCodeRecord>> {
    let active = QrCodeStatus::Active.as_str();
    let filter = match payload {
        QrPayload::Customer(data) => doc! {
            "qr_type": QrCodeType::CustomerCard.as_str(),
            "status": active,
            "is_primary": true,
            "customer_id": &data.customer_id,
        },
        QrPayload::LoyaltyCard(data) => doc! {
            "qr_type": QrCodeType::LoyaltyCard.as_str(),
            "status": active,
            "qr_data.cardId": &data.card_id,
        },
        QrPayload::PromoCode(data) => doc! {
            "qr_type": QrCodeType::PromoCode.as_str(),
            "status": active,
            "business_id": &data.business_id,
            "qr_data.code": &data.code,
        },
        QrPayload::Unknown(_) => return Ok(None),
    };

    Ok(qr_codes(state).find_one(filter).await?)
}

/// Validate text read by a scanner against the stored QR records.
pub async fn validate_scan(state: &AppState, raw: &str) -> ServiceResult<ScanOutcome> {
    let payload = parse_scanned_with(raw, |value| state.validation_cache.validate(value));

    // bare card numbers are printed on physical cards and typed in by staff
    if payload.is_unknown() && is_valid_card_number(raw.trim()) {
        let record = qr_codes(state)
            .find_one(doc! {
                "card_number": raw.trim(),
                "status": QrCodeStatus::Active.as_str(),
            })
            .await?;
        return Ok(match record {
            Some(record) => check_record(state, record.qr_data.clone(), record),
            None => ScanOutcome::rejected(payload, None, ScanRejection::NotFound),
        });
    }

    if payload.is_unknown() {
        let reason = match serde_json::from_str::<serde_json::Value>(raw.trim()) {
            Ok(value) if is_qr_code_data(&value) => ScanRejection::Incomplete,
            _ => ScanRejection::Unrecognized,
        };
        return Ok(ScanOutcome::rejected(payload, None, reason));
    }

    let Some(record) = find_active_record(state, &payload).await? else {
        return Ok(ScanOutcome::rejected(payload, None, ScanRejection::NotFound));
    };

    Ok(match_record(state, payload, record))
}

/// A scanned payload is only honoured while it is the one stored on the
/// live row; anything older was replaced by a regeneration.
fn match_record(state: &AppState, payload: QrPayload, record: QrCodeRecord) -> ScanOutcome {
    if record.qr_data != payload {
        return ScanOutcome::rejected(payload, Some(record), ScanRejection::Superseded);
    }
    check_record(state, payload, record)
}

/// Expiry and signature checks for a scanned payload that matches `record`.
fn check_record(state: &AppState, payload: QrPayload, record: QrCodeRecord) -> ScanOutcome {
    let now = chrono::Utc::now();

    if record.is_expired() {
        return ScanOutcome::rejected(payload, Some(record), ScanRejection::Expired);
    }
    if let QrPayload::PromoCode(data) = &payload {
        if data.expires_at.is_some_and(|expiry| now.timestamp_millis() > expiry) {
            return ScanOutcome::rejected(payload, Some(record), ScanRejection::Expired);
        }
    }

    let config = &state.config;
    let check = signer::verify(
        &record.qr_data,
        &record.digital_signature,
        &config.qr_secret,
        config.signing_scheme,
        Duration::milliseconds(config.signature_max_age_ms()),
        now,
    );

    let rejection = match check {
        SignatureCheck::Valid => None,
        SignatureCheck::Unsigned => Some(ScanRejection::Unsigned),
        SignatureCheck::Invalid => Some(ScanRejection::BadSignature),
        SignatureCheck::Expired => Some(ScanRejection::SignatureExpired),
    };

    ScanOutcome {
        payload,
        record: Some(record),
        rejection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;
    use chrono::Utc;

    fn signed_record(state: &AppState, payload: QrPayload, qr_type: QrCodeType) -> QrCodeRecord {
        let config = &state.config;
        let signature = signer::sign(&payload, &config.qr_secret, config.signing_scheme);
        QrCodeRecord::new(
            payload,
            qr_type,
            signature.to_stored(),
            None,
            config.card_validity_days,
        )
    }

    fn primary_card(customer_id: &str) -> QrCodeRecord {
        let card_number = generate_consistent_card_number(customer_id);
        let mut record = QrCodeRecord::new(
            QrPayload::customer(customer_id, Some(card_number.clone())),
            QrCodeType::CustomerCard,
            String::new(),
            None,
            365,
        );
        record.is_primary = true;
        record.card_number = Some(card_number);
        record
    }

    #[test]
    fn promo_alphabet_has_no_ambiguous_characters() {
        for ambiguous in ['0', 'O', '1', 'I'] {
            assert!(!PROMO_CODE_ALPHABET.contains(&ambiguous));
        }
    }

    #[test]
    fn rejection_reasons_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_value(ScanRejection::SignatureExpired).unwrap(),
            "signature_expired"
        );
        assert_eq!(
            ScanRejection::Superseded.to_string(),
            "QR code has been replaced by a newer one"
        );
    }

    #[test]
    fn live_primary_card_is_reused() {
        let card = primary_card("4");
        assert!(keep_existing_card(&card, "4", "GC-000004-4").unwrap());
    }

    #[test]
    fn stale_primary_card_is_replaced() {
        let mut revoked = primary_card("4");
        revoked.status = QrCodeStatus::Revoked;
        let mut demoted = primary_card("4");
        demoted.is_primary = false;
        let mut expired = primary_card("4");
        expired.expiry_date = Utc::now().timestamp_millis() - 1;

        for stale in [&revoked, &demoted, &expired] {
            assert!(!keep_existing_card(stale, "4", "GC-000004-4").unwrap());
        }
    }

    #[test]
    fn card_number_owned_by_another_customer_conflicts() {
        // 1000004 and 4 share their last six digits
        let card = primary_card("4");
        let error = keep_existing_card(&card, "1000004", "GC-000004-4").unwrap_err();

        assert!(matches!(error, ServiceError::Conflict(_)));
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn regenerated_customer_card_demotes_other_primaries() {
        let id = ObjectId::new();
        let (filter, update) =
            displaced_rows(&QrPayload::customer("4", None), &id, 1_000).unwrap();

        assert_eq!(filter.get_str("customer_id").unwrap(), "4");
        assert_eq!(filter.get_str("qr_type").unwrap(), "CUSTOMER_CARD");
        assert_eq!(
            filter.get_document("_id").unwrap().get_object_id("$ne").unwrap(),
            id
        );
        let set = update.get_document("$set").unwrap();
        assert!(!set.get_bool("is_primary").unwrap());
        assert_eq!(set.get_i64("updated_at").unwrap(), 1_000);
    }

    #[test]
    fn regenerated_loyalty_card_and_promo_deactivate_their_twins() {
        let id = ObjectId::new();

        let (filter, update) =
            displaced_rows(&QrPayload::loyalty_card("10", "4", "20", "1"), &id, 1_000).unwrap();
        assert_eq!(filter.get_str("qr_data.cardId").unwrap(), "10");
        assert_eq!(filter.get_str("status").unwrap(), "ACTIVE");
        assert_eq!(
            update.get_document("$set").unwrap().get_str("status").unwrap(),
            "INACTIVE"
        );

        let (filter, _) =
            displaced_rows(&QrPayload::promo_code("SAVE10", "1"), &id, 1_000).unwrap();
        assert_eq!(filter.get_str("qr_data.code").unwrap(), "SAVE10");
        assert_eq!(filter.get_str("business_id").unwrap(), "1");

        assert!(displaced_rows(&QrPayload::unknown("x"), &id, 1_000).is_none());
    }

    #[actix_web::test]
    async fn signed_live_record_is_accepted() {
        let state = AppState::for_tests().await;
        let record = signed_record(&state, QrPayload::customer("4", None), QrCodeType::CustomerCard);

        let outcome = match_record(&state, record.qr_data.clone(), record);
        assert!(outcome.is_valid());
        assert!(outcome.record.is_some());
    }

    #[actix_web::test]
    async fn older_payload_is_superseded() {
        let state = AppState::for_tests().await;
        let record = signed_record(&state, QrPayload::customer("4", None), QrCodeType::CustomerCard);
        let mut scanned = record.qr_data.clone();
        if let QrPayload::Customer(data) = &mut scanned {
            data.timestamp -= 60_000;
        }

        let outcome = match_record(&state, scanned, record);
        assert_eq!(outcome.rejection, Some(ScanRejection::Superseded));
    }

    #[actix_web::test]
    async fn expired_record_is_rejected() {
        let state = AppState::for_tests().await;
        let mut record =
            signed_record(&state, QrPayload::loyalty_card("10", "4", "20", "1"), QrCodeType::LoyaltyCard);
        record.expiry_date = Utc::now().timestamp_millis() - 1;

        let outcome = check_record(&state, record.qr_data.clone(), record);
        assert_eq!(outcome.rejection, Some(ScanRejection::Expired));
    }

    #[actix_web::test]
    async fn promo_past_its_end_date_is_expired() {
        let state = AppState::for_tests().await;
        let mut payload = QrPayload::promo_code("SAVE10", "1");
        if let QrPayload::PromoCode(data) = &mut payload {
            data.expires_at = Some(Utc::now().timestamp_millis() - 1_000);
        }
        let record = signed_record(&state, payload, QrCodeType::PromoCode);

        let outcome = check_record(&state, record.qr_data.clone(), record);
        assert_eq!(outcome.rejection, Some(ScanRejection::Expired));
    }

    #[actix_web::test]
    async fn unsigned_record_is_rejected() {
        let state = AppState::for_tests().await;
        let mut record = signed_record(&state, QrPayload::customer("4", None), QrCodeType::CustomerCard);
        record.digital_signature = String::new();

        let outcome = check_record(&state, record.qr_data.clone(), record);
        assert_eq!(outcome.rejection, Some(ScanRejection::Unsigned));
    }

    #[actix_web::test]
    async fn signature_from_another_secret_is_rejected() {
        let state = AppState::for_tests().await;
        let mut record = signed_record(&state, QrPayload::customer("4", None), QrCodeType::CustomerCard);
        record.digital_signature =
            signer::sign(&record.qr_data, "another-secret", state.config.signing_scheme).to_stored();

        let outcome = check_record(&state, record.qr_data.clone(), record);
        assert_eq!(outcome.rejection, Some(ScanRejection::BadSignature));
    }

    #[actix_web::test]
    async fn signature_older_than_max_age_is_rejected() {
        let state = AppState::for_tests().await;
        let mut record = signed_record(&state, QrPayload::customer("4", None), QrCodeType::CustomerCard);
        // test config allows 24 hours
        let signed_at = (Utc::now() - Duration::hours(25)).timestamp();
        record.digital_signature = signer::sign_at(
            &record.qr_data,
            &state.config.qr_secret,
            state.config.signing_scheme,
            signed_at,
        )
        .to_stored();

        let outcome = check_record(&state, record.qr_data.clone(), record);
        assert_eq!(outcome.rejection, Some(ScanRejection::SignatureExpired));
    }

    #[actix_web::test]
    async fn card_number_scan_checks_the_stored_card() {
        let state = AppState::for_tests().await;
        let mut record = signed_record(
            &state,
            QrPayload::customer("4", Some(generate_consistent_card_number("4"))),
            QrCodeType::CustomerCard,
        );
        record.card_number = Some(generate_consistent_card_number("4"));

        let outcome = check_record(&state, record.qr_data.clone(), record.clone());
        assert!(outcome.is_valid());

        record.expiry_date = Utc::now().timestamp_millis() - 1;
        let outcome = check_record(&state, record.qr_data.clone(), record);
        assert_eq!(outcome.rejection, Some(ScanRejection::Expired));
    }

    #[actix_web::test]
    async fn malformed_card_number_is_unrecognized() {
        let state = AppState::for_tests().await;
        // wrong checksum, never looked up
        let outcome = validate_scan(&state, "GC-000004-5").await.unwrap();

        assert_eq!(outcome.rejection, Some(ScanRejection::Unrecognized));
        assert!(outcome.payload.is_unknown());
    }
}
