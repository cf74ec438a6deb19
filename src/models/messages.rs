use crate::entities::messages::Message as MessageEntity;
use crate::models::images::ImageUpload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LENGTH: usize = 50;
pub const CONTENT_MAX_LENGTH: usize = 500;
pub const DEFAULT_FEED_LIMIT: u32 = 50;
pub const MAX_FEED_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_id: u64,
    pub name: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageEntity> for Message {
    fn from(value: MessageEntity) -> Self {
        Self {
            message_id: value.id,
            name: value.name,
            content: value.message,
            image_url: value.image_url,
            created_at: value.created_at,
        }
    }
}

impl Message {
    /// Shown by the feed endpoint when the collection cannot be queried.
    pub fn placeholders() -> Vec<Message> {
        vec![
            Message {
                message_id: 1,
                name: "Sarah M.".to_owned(),
                content: "Incredible journey ahead! Your determination is truly inspiring. Sending all my support from California.".to_owned(),
                image_url: None,
                created_at: DateTime::from_timestamp(1734258600, 0).unwrap_or_default(),
            },
            Message {
                message_id: 2,
                name: "Mike R.".to_owned(),
                content: "Go Paolo! 240 miles of pure grit. We believe in you and the entire team!"
                    .to_owned(),
                image_url: None,
                created_at: DateTime::from_timestamp(1734191100, 0).unwrap_or_default(),
            },
        ]
    }
}

#[derive(Debug, Clone)]
pub struct SubmitMessageArgs {
    pub name: String,
    pub content: String,
    pub image: Option<ImageUpload>,
}

#[derive(Deserialize)]
pub struct FeedArgs {
    pub limit: Option<u32>,
}

impl FeedArgs {
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_FEED_LIMIT)
            .clamp(1, MAX_FEED_LIMIT)
    }
}

#[derive(Serialize)]
pub struct ResponseBase {
    pub message: &'static str,
    pub status: u16,
}

impl Default for ResponseBase {
    fn default() -> Self {
        Self {
            message: "ok",
            status: 200,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub name: String,
    pub message: String,
    pub image_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(value: Message) -> Self {
        Self {
            id: value.message_id.to_string(),
            name: value.name,
            message: value.content,
            image_url: value.image_url,
            timestamp: value.created_at,
        }
    }
}

#[derive(Default, Serialize)]
pub struct FeedResponse {
    #[serde(flatten)]
    pub base: ResponseBase,
    pub result: Vec<MessageResponse>,
    pub fallback: bool,
    pub error: Option<&'static str>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub base: ResponseBase,
    pub result: MessageResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_limit_defaults_and_clamps() {
        assert_eq!(FeedArgs { limit: None }.limit(), DEFAULT_FEED_LIMIT);
        assert_eq!(FeedArgs { limit: Some(0) }.limit(), 1);
        assert_eq!(FeedArgs { limit: Some(10) }.limit(), 10);
        assert_eq!(FeedArgs { limit: Some(10_000) }.limit(), MAX_FEED_LIMIT);
    }

    #[test]
    fn test_message_response_uses_camel_case_and_null_image() {
        let message = Message {
            message_id: 7,
            name: "Ana".to_owned(),
            content: "Go!".to_owned(),
            image_url: None,
            created_at: DateTime::from_timestamp(1734258600, 0).unwrap(),
        };
        let json = serde_json::to_value(MessageResponse::from(message)).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["message"], "Go!");
        assert!(json["imageUrl"].is_null());
        assert_eq!(json["timestamp"], "2024-12-15T10:30:00Z");
    }

    #[test]
    fn test_placeholders_are_newest_first() {
        let placeholders = Message::placeholders();
        assert_eq!(placeholders.len(), 2);
        assert!(placeholders[0].created_at > placeholders[1].created_at);
    }
}
