use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, backend_failure};
use crate::models::messages::{CONTENT_MAX_LENGTH, Message, NAME_MAX_LENGTH, SubmitMessageArgs};
use crate::usecases::images;
use tracing::info;

fn validate_text(
    value: &str,
    max_length: usize,
    empty: AppError,
    too_long: AppError,
) -> ServiceResult<&str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(empty);
    }
    if value.chars().count() > max_length {
        return Err(too_long);
    }
    Ok(value)
}

/// Validates, uploads the optional image, then appends the record.
///
/// The record is only written once the image upload has succeeded. If the
/// process dies between the two writes the uploaded object is left orphaned;
/// the cleanup cron takes care of those.
pub async fn submit<C: Context>(ctx: &C, args: SubmitMessageArgs) -> ServiceResult<Message> {
    let name = validate_text(
        &args.name,
        NAME_MAX_LENGTH,
        AppError::MessagesNameRequired,
        AppError::MessagesNameTooLong,
    )?;
    let content = validate_text(
        &args.content,
        CONTENT_MAX_LENGTH,
        AppError::MessagesContentRequired,
        AppError::MessagesContentTooLong,
    )?;

    let image_url = match args.image {
        Some(upload) => {
            images::validate(&upload)?;
            let prepared = images::prepare_blocking(upload).await?;
            Some(images::upload(ctx, prepared).await?)
        }
        None => None,
    };

    match ctx
        .messages()
        .append(name, content, image_url.as_deref())
        .await
    {
        Ok(entity) => {
            let message = Message::from(entity);
            info!(
                message_id = message.message_id,
                has_image = message.image_url.is_some(),
                "Message of support created"
            );
            Ok(message)
        }
        Err(e) => backend_failure(AppError::MessagesSubmitFailed, e),
    }
}

/// Most recent messages first, at most `limit` of them.
pub async fn fetch_recent<C: Context>(ctx: &C, limit: u32) -> ServiceResult<Vec<Message>> {
    match ctx.messages().fetch_recent(limit).await {
        Ok(messages) => Ok(messages.into_iter().map(Message::from).collect()),
        Err(e) => backend_failure(AppError::MessagesFetchFailed, e),
    }
}
