use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: u64,
    pub name: String,
    pub message: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
