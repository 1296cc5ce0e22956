use actix_web::{HttpResponse, web};
use mongodb::bson::doc;

use crate::state::app_state::AppState;

/// Database ping plus the signing setup scanners depend on
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let ping_result = state.db.run_command(doc! { "ping": 1 }).await;

    let details = serde_json::json!({
        "signing_scheme": state.config.signing_scheme.to_string(),
        "image_probe": state.config.image.probe,
        "cached_validations": state.validation_cache.len(),
    });

    match ping_result {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "success": true, "qr": details })),
        Err(e) => {
            log::error!("Health check ping failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "success": false,
                "error": "Database connection failed",
                "qr": details,
            }))
        }
    }
}
