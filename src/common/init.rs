use crate::adapters::firebase_storage::FirebaseStorage;
use crate::common::state::AppState;
use crate::repositories::messages::MySqlMessageCollection;
use crate::settings::AppSettings;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub fn initialize_logging(settings: &AppSettings) {
    tracing_subscriber::fmt()
        .with_max_level(settings.level)
        // .json()
        .with_timer(tracing_subscriber::fmt::time())
        .with_level(true)
        .compact()
        .init();
}

pub async fn initialize_state(settings: &AppSettings) -> anyhow::Result<AppState> {
    let db = initialize_db(settings).await?;
    let storage = initialize_storage(settings)?;
    Ok(AppState {
        messages: Arc::new(MySqlMessageCollection::new(db)),
        storage: Arc::new(storage),
    })
}

pub fn initialize_db(settings: &AppSettings) -> impl Future<Output = sqlx::Result<Pool<MySql>>> {
    MySqlPoolOptions::new()
        .acquire_timeout(settings.db_wait_timeout)
        .max_connections(settings.db_max_connections as _)
        .connect(&settings.database_url)
}

pub fn initialize_storage(settings: &AppSettings) -> anyhow::Result<FirebaseStorage> {
    FirebaseStorage::new(
        &settings.storage_base_url,
        &settings.storage_bucket,
        settings.storage_access_token.clone(),
    )
}
