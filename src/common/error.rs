use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

/// Logs the backend cause and surfaces `err` with its generic message instead.
#[track_caller]
pub fn backend_failure<T, E: Into<anyhow::Error>>(err: AppError, e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!(code = err.code(), "Backend failure at {caller}: {:#}", e.into());
    Err(err)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    Unexpected,
    DecodingRequestFailed,

    ImagesInvalidType,
    ImagesTooLarge,
    ImagesLoadFailed,
    ImagesEncodeFailed,
    ImagesUploadFailed,

    MessagesNameRequired,
    MessagesNameTooLong,
    MessagesContentRequired,
    MessagesContentTooLong,
    MessagesSubmitFailed,
    MessagesFetchFailed,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::DecodingRequestFailed => "decoding_request_failed",

            AppError::ImagesInvalidType => "images.invalid_type",
            AppError::ImagesTooLarge => "images.too_large",
            AppError::ImagesLoadFailed => "images.load_failed",
            AppError::ImagesEncodeFailed => "images.encode_failed",
            AppError::ImagesUploadFailed => "images.upload_failed",

            AppError::MessagesNameRequired => "messages.name_required",
            AppError::MessagesNameTooLong => "messages.name_too_long",
            AppError::MessagesContentRequired => "messages.content_required",
            AppError::MessagesContentTooLong => "messages.content_too_long",
            AppError::MessagesSubmitFailed => "messages.submit_failed",
            AppError::MessagesFetchFailed => "messages.fetch_failed",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::DecodingRequestFailed => "Failed to decode request",

            AppError::ImagesInvalidType => "Please select an image file.",
            AppError::ImagesTooLarge => "Image size must be less than 5MB.",
            AppError::ImagesLoadFailed => "Failed to load image.",
            AppError::ImagesEncodeFailed => "Image processing is currently unavailable.",
            AppError::ImagesUploadFailed => "Failed to upload image.",

            AppError::MessagesNameRequired => "Please enter your name.",
            AppError::MessagesNameTooLong => "Your name must be at most 50 characters long.",
            AppError::MessagesContentRequired => "Please enter a message.",
            AppError::MessagesContentTooLong => {
                "Your message must be at most 500 characters long."
            }
            AppError::MessagesSubmitFailed => "Failed to send message. Please try again.",
            AppError::MessagesFetchFailed => "Failed to load messages. Please try again.",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::DecodingRequestFailed
            | AppError::ImagesLoadFailed
            | AppError::MessagesNameRequired
            | AppError::MessagesNameTooLong
            | AppError::MessagesContentRequired
            | AppError::MessagesContentTooLong => StatusCode::BAD_REQUEST,

            AppError::ImagesInvalidType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::ImagesTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            AppError::ImagesUploadFailed
            | AppError::MessagesSubmitFailed
            | AppError::MessagesFetchFailed => StatusCode::BAD_GATEWAY,

            AppError::Unexpected | AppError::ImagesEncodeFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}
