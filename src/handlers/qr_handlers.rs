use actix_web::{HttpMessage, HttpRequest, HttpResponse, Result, error, web};
use log::info;
use mongodb::bson::oid::ObjectId;
use validator::Validate;

use crate::models::qr_code_record::{QrCodeRecord, QrCodeResponse};
use crate::models::qr_payload::QrPayload;
use crate::services::qr_service::{self, CustomerDetails};
use crate::state::app_state::AppState;
use crate::structs::qr_request::{
    CustomerQrRequest, LoyaltyCardQrRequest, PromoQrRequest, RenderParams, ScanRequest,
    ScanResponse,
};
use crate::utils::image_renderer::{render_png, render_svg};
use crate::utils::jwt::Claims;
use crate::utils::verifier::validate_with_fallback;

const MIN_RENDER_SIZE: u32 = 64;
const MAX_RENDER_SIZE: u32 = 1024;

fn current_claims(req: &HttpRequest) -> Result<Claims> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| error::ErrorUnauthorized("Authentication required"))
}

fn parse_qr_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| error::ErrorBadRequest("Invalid QR code id"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordAccess {
    /// Rendering the image: the card holder or the issuing business.
    Render,
    /// Revoking: the issuing business only.
    Manage,
}

/// Admins pass every check. Customer cards carry no business, so only the
/// card holder (for rendering) and admins reach them.
fn authorize_record(claims: &Claims, record: &QrCodeRecord, access: RecordAccess) -> Result<()> {
    if claims.acts_for_business(record.business_id.as_deref()) {
        return Ok(());
    }
    if access == RecordAccess::Render && claims.owns_customer(record.customer_id.as_deref()) {
        return Ok(());
    }
    Err(error::ErrorForbidden("Access denied to this QR code"))
}

fn authorize_business(claims: &Claims, business_id: &str) -> Result<()> {
    if claims.acts_for_business(Some(business_id)) {
        Ok(())
    } else {
        Err(error::ErrorForbidden(
            "QR codes can only be issued for your own business",
        ))
    }
}

fn issued(record: QrCodeResponse, created: bool) -> HttpResponse {
    if created {
        HttpResponse::Created().json(record)
    } else {
        HttpResponse::Ok().json(record)
    }
}

/// Issue (or return) the primary customer card QR code
pub async fn create_customer_qr(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<CustomerQrRequest>,
) -> Result<HttpResponse> {
    if let Err(errors) = body.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let claims = current_claims(&req)?;
    if !claims.is_admin() && claims.user_id != body.customer_id {
        return Err(error::ErrorForbidden(
            "Customers can only issue their own card",
        ));
    }

    let details = CustomerDetails {
        name: body.name,
        email: body.email,
    };
    let (record, created) =
        qr_service::issue_customer_card(&app_state, &body.customer_id, details).await?;

    Ok(issued(record.into(), created))
}

/// Issue the QR code for a loyalty card
pub async fn create_loyalty_card_qr(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<LoyaltyCardQrRequest>,
) -> Result<HttpResponse> {
    if let Err(errors) = body.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }
    authorize_business(&current_claims(&req)?, &body.business_id)?;

    let mut payload = QrPayload::loyalty_card(
        body.card_id,
        body.customer_id,
        body.program_id,
        body.business_id,
    );
    if let QrPayload::LoyaltyCard(data) = &mut payload {
        data.program_name = body.program_name;
        data.business_name = body.business_name;
        data.points = body.points;
    }

    let (record, created) = qr_service::issue_loyalty_card(&app_state, payload).await?;
    Ok(issued(record.into(), created))
}

/// Issue a promotion QR code
pub async fn create_promo_qr(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<PromoQrRequest>,
) -> Result<HttpResponse> {
    if let Err(errors) = body.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }
    authorize_business(&current_claims(&req)?, &body.business_id)?;

    let record = qr_service::issue_promo(
        &app_state,
        body.code,
        &body.business_id,
        body.name,
        body.expires_at,
    )
    .await?;

    Ok(HttpResponse::Created().json(QrCodeResponse::from(record)))
}

/// List every QR code of a customer, primary card first
pub async fn get_customer_qr_codes(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let customer_id = path.into_inner();
    let records = qr_service::list_customer_codes(&app_state, &customer_id).await?;

    let response: Vec<QrCodeResponse> = records.into_iter().map(QrCodeResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// Validate the text read by a scanner
pub async fn validate_qr(
    app_state: web::Data<AppState>,
    web::Json(body): web::Json<ScanRequest>,
) -> Result<HttpResponse> {
    if let Err(errors) = body.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let outcome = qr_service::validate_scan(&app_state, &body.data).await?;
    if let Some(reason) = outcome.rejection {
        info!("Rejected {} QR scan: {}", outcome.payload.kind(), reason);
    }

    let response = ScanResponse {
        valid: outcome.is_valid(),
        qr_code_id: outcome
            .record
            .as_ref()
            .and_then(|record| record.id)
            .map(|id| id.to_hex()),
        reason: outcome.rejection.map(|reason| reason.to_string()),
        payload: outcome.payload,
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Regenerate payload, signature and image of a stored QR code
pub async fn fix_qr(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = parse_qr_id(&path.into_inner())?;
    let record = qr_service::regenerate(&app_state, &id).await?;
    Ok(HttpResponse::Ok().json(QrCodeResponse::from(record)))
}

pub async fn revoke_qr(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let claims = current_claims(&req)?;
    let id = parse_qr_id(&path.into_inner())?;
    let current = qr_service::find_by_id(&app_state, &id).await?;
    authorize_record(&claims, &current, RecordAccess::Manage)?;

    let record = qr_service::revoke(&app_state, &id).await?;
    Ok(HttpResponse::Ok().json(QrCodeResponse::from(record)))
}

fn render_size(params: &RenderParams, default: u32) -> u32 {
    validate_with_fallback(
        params.size.unwrap_or(default),
        |size| Ok::<_, String>((MIN_RENDER_SIZE..=MAX_RENDER_SIZE).contains(size)),
        default,
    )
}

/// Render a stored QR code locally as SVG
pub async fn get_qr_svg(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<RenderParams>,
) -> Result<HttpResponse> {
    let claims = current_claims(&req)?;
    let id = parse_qr_id(&path.into_inner())?;
    let record = qr_service::find_by_id(&app_state, &id).await?;
    authorize_record(&claims, &record, RecordAccess::Render)?;

    let size = render_size(&query, app_state.config.image.size);
    let svg = render_svg(&record.qr_data, size).map_err(|e| {
        error::ErrorInternalServerError(format!("QR code generation error: {}", e))
    })?;

    Ok(HttpResponse::Ok().content_type("image/svg+xml").body(svg))
}

/// Render a stored QR code locally as PNG
pub async fn get_qr_png(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<RenderParams>,
) -> Result<HttpResponse> {
    let claims = current_claims(&req)?;
    let id = parse_qr_id(&path.into_inner())?;
    let record = qr_service::find_by_id(&app_state, &id).await?;
    authorize_record(&claims, &record, RecordAccess::Render)?;

    let size = render_size(&query, app_state.config.image.size);
    let png = render_png(&record.qr_data, size).map_err(|e| {
        error::ErrorInternalServerError(format!("QR code generation error: {}", e))
    })?;

    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

pub async fn clear_validation_cache(app_state: web::Data<AppState>) -> HttpResponse {
    let cleared = app_state.validation_cache.len();
    app_state.validation_cache.clear();
    info!("Cleared {} cached QR validations", cleared);

    HttpResponse::Ok().json(serde_json::json!({ "cleared": cleared }))
}
