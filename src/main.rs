use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use loyalty_qr::config::app_config::AppConfig;
use loyalty_qr::db::mongodb::get_database;
use loyalty_qr::routes::init_routes;
use loyalty_qr::state::app_state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize the database connection
    let db = match get_database(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Error connecting to the database: {:#}", e);
            std::process::exit(1);
        }
    };

    let bind = (config.bind_addr.clone(), config.port);
    let cors_origins = config.cors_origins.clone();
    info!(
        "Signing QR codes with {}, listening on {}:{}",
        config.signing_scheme, bind.0, bind.1
    );

    // Create shared state
    let app_state = web::Data::new(AppState::new(db, config));

    HttpServer::new(move || {
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .max_age(3600);
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(init_routes)
    })
    .bind(bind)?
    .run()
    .await
}
