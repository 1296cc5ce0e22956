use anyhow::{Context, Result};
use log::info;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use crate::config::app_config::AppConfig;
use crate::models::qr_code_record::{QR_CODES_COLLECTION, QrCodeRecord};

/// Connect to MongoDB and make sure the QR collection indexes exist.
pub async fn get_database(config: &AppConfig) -> Result<Database> {
    let client = Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("Failed to create MongoDB client")?;
    let db = client.database(&config.database_name);

    db.run_command(doc! { "ping": 1 })
        .await
        .context("Failed to ping MongoDB")?;
    info!("Connected to MongoDB database {}", config.database_name);

    ensure_indexes(&db).await?;
    Ok(db)
}

/// Uniqueness backstops: one row per card number and one primary
/// customer card per customer.
async fn ensure_indexes(db: &Database) -> Result<()> {
    let qr_codes = db.collection::<QrCodeRecord>(QR_CODES_COLLECTION);

    let card_number_index = IndexModel::builder()
        .keys(doc! { "card_number": 1 })
        .options(
            IndexOptions::builder()
                .name(String::from("uniq_card_number"))
                .unique(true)
                .partial_filter_expression(doc! { "card_number": { "$type": "string" } })
                .build(),
        )
        .build();

    let primary_index = IndexModel::builder()
        .keys(doc! { "customer_id": 1 })
        .options(
            IndexOptions::builder()
                .name(String::from("uniq_primary_customer_card"))
                .unique(true)
                .partial_filter_expression(doc! {
                    "is_primary": true,
                    "qr_type": "CUSTOMER_CARD",
                })
                .build(),
        )
        .build();

    let lookup_index = IndexModel::builder()
        .keys(doc! { "customer_id": 1, "qr_type": 1, "status": 1 })
        .build();

    qr_codes
        .create_indexes(vec![card_number_index, primary_index, lookup_index])
        .await
        .context("Failed to create qr_codes indexes")?;

    Ok(())
}
