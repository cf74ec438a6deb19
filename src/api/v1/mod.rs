pub mod messages;

use crate::common::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;

/// A 5 MiB image plus the text fields and multipart framing.
const MAX_SUBMISSION_BYTES: usize = 6 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/messages",
        get(messages::fetch_feed)
            .post(messages::submit)
            .layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES)),
    )
}
