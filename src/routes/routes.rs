use actix_web::web;

use crate::handlers::health_handlers::health_check;
use crate::handlers::qr_handlers::{
    clear_validation_cache, create_customer_qr, create_loyalty_card_qr, create_promo_qr, fix_qr,
    get_customer_qr_codes, get_qr_png, get_qr_svg, revoke_qr, validate_qr,
};
use crate::middlewares::authmw::{JwtAuth, RequireRoles};
use crate::middlewares::res_owner::ResourceOwnership;
use crate::models::role::Role;

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Everything lives under /api; JwtAuth lets scans and health checks through
    cfg.service(
        web::scope("/api")
            .wrap(JwtAuth)
            .route("/health/check", web::get().to(health_check))
            .route("/qr/validate", web::post().to(validate_qr))
            .route("/qr/customer", web::post().to(create_customer_qr))
            .service(
                web::resource("/qr/loyalty-card")
                    .wrap(RequireRoles(vec![Role::BusinessOwner]))
                    .route(web::post().to(create_loyalty_card_qr)),
            )
            .service(
                web::resource("/qr/promo")
                    .wrap(RequireRoles(vec![Role::BusinessOwner]))
                    .route(web::post().to(create_promo_qr)),
            )
            .service(
                web::resource("/qr/validation-cache")
                    .wrap(RequireRoles(vec![Role::Admin]))
                    .route(web::delete().to(clear_validation_cache)),
            )
            .service(
                web::resource("/qr/{id}/fix")
                    .wrap(RequireRoles(vec![Role::Admin]))
                    .route(web::post().to(fix_qr)),
            )
            .service(
                web::resource("/qr/{id}/revoke")
                    .wrap(RequireRoles(vec![Role::BusinessOwner, Role::Staff]))
                    .route(web::post().to(revoke_qr)),
            )
            .route("/qr/{id}/svg", web::get().to(get_qr_svg))
            .route("/qr/{id}/png", web::get().to(get_qr_png))
            .service(
                web::resource("/customers/{customer_id}/qr")
                    .wrap(ResourceOwnership {
                        param_name: "customer_id".to_string(),
                    })
                    .route(web::get().to(get_customer_qr_codes)),
            ),
    );
}
