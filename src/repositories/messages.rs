use crate::entities::messages::Message;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

const TABLE_NAME: &str = "guestbook_messages";
const READ_FIELDS: &str = "id, name, message, image_url, created_at";

/// Append-only store of guestbook messages.
#[async_trait]
pub trait MessageCollection: Send + Sync {
    /// Appends a record; the id and timestamp are assigned by the store.
    async fn append(
        &self,
        name: &str,
        message: &str,
        image_url: Option<&str>,
    ) -> anyhow::Result<Message>;

    /// Most recent first, ties broken by id.
    async fn fetch_recent(&self, limit: u32) -> anyhow::Result<Vec<Message>>;

    async fn fetch_image_urls(&self) -> anyhow::Result<Vec<String>>;
}

pub struct MySqlMessageCollection {
    db: Pool<MySql>,
}

impl MySqlMessageCollection {
    pub fn new(db: Pool<MySql>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageCollection for MySqlMessageCollection {
    async fn append(
        &self,
        name: &str,
        message: &str,
        image_url: Option<&str>,
    ) -> anyhow::Result<Message> {
        const INSERT_QUERY: &str = const_str::concat!(
            "INSERT INTO ",
            TABLE_NAME,
            " (name, message, image_url) VALUES (?, ?, ?)"
        );
        let result = sqlx::query(INSERT_QUERY)
            .bind(name)
            .bind(message)
            .bind(image_url)
            .execute(&self.db)
            .await?;

        const READ_QUERY: &str = const_str::concat!(
            "SELECT ",
            READ_FIELDS,
            " FROM ",
            TABLE_NAME,
            " WHERE id = ?"
        );
        let message = sqlx::query_as(READ_QUERY)
            .bind(result.last_insert_id())
            .fetch_one(&self.db)
            .await?;
        Ok(message)
    }

    async fn fetch_recent(&self, limit: u32) -> anyhow::Result<Vec<Message>> {
        const QUERY: &str = const_str::concat!(
            "SELECT ",
            READ_FIELDS,
            " FROM ",
            TABLE_NAME,
            " ORDER BY created_at DESC, id DESC LIMIT ?"
        );
        let messages = sqlx::query_as(QUERY)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        Ok(messages)
    }

    async fn fetch_image_urls(&self) -> anyhow::Result<Vec<String>> {
        const QUERY: &str = const_str::concat!(
            "SELECT image_url FROM ",
            TABLE_NAME,
            " WHERE image_url IS NOT NULL"
        );
        let image_urls = sqlx::query_scalar(QUERY).fetch_all(&self.db).await?;
        Ok(image_urls)
    }
}
