use crate::common::context::Context;
use crate::common::error::{ServiceResult, unexpected};
use crate::usecases::images::{self, IMAGE_FOLDER};
use chrono::{DateTime, TimeDelta, Utc};
use hashbrown::HashSet;
use tracing::{info, warn};

/// Uploads younger than this may still be waiting for their record to be appended.
const ORPHAN_GRACE_PERIOD: i64 = 60 * 60;

/// Upload time encoded in the generated file name (`<unix millis>_<token>.<ext>`).
fn uploaded_at(path: &str) -> Option<DateTime<Utc>> {
    let file_name = path.rsplit('/').next()?;
    let (millis, _) = file_name.split_once('_')?;
    DateTime::from_timestamp_millis(millis.parse().ok()?)
}

fn is_orphan(path: &str, referenced_paths: &HashSet<String>, now: DateTime<Utc>) -> bool {
    if referenced_paths.contains(path) {
        return false;
    }
    match uploaded_at(path) {
        Some(uploaded_at) => uploaded_at + TimeDelta::seconds(ORPHAN_GRACE_PERIOD) < now,
        None => false,
    }
}

/// Deletes uploaded images no message refers to. Returns how many deletions were attempted.
pub async fn cleanup_orphaned_images<C: Context>(ctx: &C) -> ServiceResult<usize> {
    let prefix = format!("{IMAGE_FOLDER}/");
    let stored_paths = match ctx.storage().list(&prefix).await {
        Ok(paths) => paths,
        Err(e) => return unexpected(e),
    };
    let image_urls = match ctx.messages().fetch_image_urls().await {
        Ok(urls) => urls,
        Err(e) => return unexpected(e),
    };
    // Stored urls may predate a change of storage host or bucket.
    let mut referenced_paths = HashSet::with_capacity(image_urls.len());
    for url in &image_urls {
        match ctx.storage().object_path(url) {
            Some(path) => {
                referenced_paths.insert(path);
            }
            None => warn!(url = url.as_str(), "Image url does not point into storage"),
        }
    }

    let now = Utc::now();
    let orphans: Vec<String> = stored_paths
        .into_iter()
        .filter(|path| is_orphan(path, &referenced_paths, now))
        .collect();
    for path in &orphans {
        info!(path = path.as_str(), "Deleting orphaned image");
        images::delete_best_effort(ctx, path).await;
    }
    Ok(orphans.len())
}
