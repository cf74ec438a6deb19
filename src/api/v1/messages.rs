use crate::api::RequestContext;
use crate::common::error::{AppError, ServiceResponse, ServiceResult};
use crate::models::images::ImageUpload;
use crate::models::messages::{
    FeedArgs, FeedResponse, Message, MessageResponse, SubmitMessageArgs, SubmitResponse,
};
use crate::usecases::messages;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query};
use axum::http::StatusCode;
use tracing::warn;

/// Recent messages. Falls back to the placeholder list when the collection
/// cannot be queried, so the page never renders an empty wall on outages.
pub async fn fetch_feed(ctx: RequestContext, Query(args): Query<FeedArgs>) -> Json<FeedResponse> {
    match messages::fetch_recent(&ctx, args.limit()).await {
        Ok(messages) => Json(FeedResponse {
            result: messages.into_iter().map(MessageResponse::from).collect(),
            ..Default::default()
        }),
        Err(e) => {
            warn!(code = e.code(), "Serving placeholder messages");
            Json(FeedResponse {
                result: Message::placeholders()
                    .into_iter()
                    .map(MessageResponse::from)
                    .collect(),
                fallback: true,
                error: Some(e.message()),
                ..Default::default()
            })
        }
    }
}

pub async fn submit(ctx: RequestContext, multipart: Multipart) -> ServiceResponse<SubmitResponse> {
    let args = read_submission(multipart).await?;
    let message = messages::submit(&ctx, args).await?;
    Ok(Json(SubmitResponse {
        base: Default::default(),
        result: MessageResponse::from(message),
    }))
}

fn decoding_error(e: MultipartError) -> AppError {
    match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::ImagesTooLarge,
        _ => {
            warn!("Failed to decode submission: {}", e.body_text());
            AppError::DecodingRequestFailed
        }
    }
}

/// Multipart fields: `name`, `message` and an optional `image` file.
async fn read_submission(mut multipart: Multipart) -> ServiceResult<SubmitMessageArgs> {
    let mut args = SubmitMessageArgs {
        name: String::new(),
        content: String::new(),
        image: None,
    };
    while let Some(field) = multipart.next_field().await.map_err(decoding_error)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => args.name = field.text().await.map_err(decoding_error)?,
            Some("message") => args.content = field.text().await.map_err(decoding_error)?,
            Some("image") => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(decoding_error)?;
                // Browsers send an empty part when no file was picked.
                if !bytes.is_empty() {
                    args.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(args)
}
