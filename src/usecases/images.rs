use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, backend_failure, unexpected};
use crate::models::images::{ImageUpload, PreparedImage};
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use rand::distr::{Alphanumeric, SampleString};
use std::io::Cursor;
use tracing::{debug, info, warn};

pub const IMAGE_FOLDER: &str = "message-images";
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 800;
pub const JPEG_QUALITY: u8 = 80;

const FILE_TOKEN_LENGTH: usize = 9;

/// Checks the declared type and size. Never touches the network.
pub fn validate(upload: &ImageUpload) -> ServiceResult<()> {
    if !upload.declares_image() {
        return Err(AppError::ImagesInvalidType);
    }
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::ImagesTooLarge);
    }
    Ok(())
}

/// Uniform factor fitting both dimensions into `max_dimension`, never above 1.
pub fn scale_factor(width: u32, height: u32, max_dimension: u32) -> f64 {
    let max_dimension = max_dimension as f64;
    let ratio = f64::min(max_dimension / width as f64, max_dimension / height as f64);
    ratio.min(1.0)
}

fn scaled_dimension(dimension: u32, scale: f64) -> u32 {
    (dimension as f64 * scale).round().max(1.0) as u32
}

/// `<unix millis>_<random token>.<extension>`
pub fn generate_file_name(extension: &str) -> String {
    let token = Alphanumeric
        .sample_string(&mut rand::rng(), FILE_TOKEN_LENGTH)
        .to_ascii_lowercase();
    format!("{}_{token}.{extension}", Utc::now().timestamp_millis())
}

fn file_type(format: ImageFormat) -> (&'static str, &'static str) {
    match format {
        ImageFormat::Jpeg => ("jpg", "image/jpeg"),
        ImageFormat::Png => ("png", "image/png"),
        ImageFormat::Gif => ("gif", "image/gif"),
        ImageFormat::WebP => ("webp", "image/webp"),
        ImageFormat::Bmp => ("bmp", "image/bmp"),
        ImageFormat::Tiff => ("tiff", "image/tiff"),
        _ => ("img", "application/octet-stream"),
    }
}

struct Encoded {
    bytes: Vec<u8>,
    extension: &'static str,
    content_type: String,
}

fn encode_jpeg(image: &DynamicImage) -> ServiceResult<Encoded> {
    let rgb = image.to_rgb8();
    let mut bytes = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
        if let Err(e) = encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        {
            return backend_failure(AppError::ImagesEncodeFailed, e);
        }
    }
    Ok(Encoded {
        bytes,
        extension: "jpg",
        content_type: "image/jpeg".to_owned(),
    })
}

/// Lossless re-encode in the uploaded format. `None` when the format has no encoder.
fn encode_as(image: &DynamicImage, format: ImageFormat) -> Option<Encoded> {
    let mut bytes = Vec::new();
    if let Err(e) = image.write_to(&mut Cursor::new(&mut bytes), format) {
        debug!(?format, "Cannot re-encode resized image: {e}");
        return None;
    }
    let (extension, content_type) = file_type(format);
    Some(Encoded {
        bytes,
        extension,
        content_type: content_type.to_owned(),
    })
}

/// Decodes, downscales and re-encodes `upload`, keeping the smallest encoding.
///
/// Candidates are the JPEG, the uploaded bytes themselves when no resize was
/// needed, and the resized image in the uploaded format otherwise. A resized
/// image can only end up larger than the upload when every candidate is.
///
/// CPU bound, use [`prepare_blocking`] from async code.
pub fn prepare(upload: &ImageUpload) -> ServiceResult<PreparedImage> {
    validate(upload)?;

    let source_format = image::guess_format(&upload.bytes).ok();
    let source = match image::load_from_memory(&upload.bytes) {
        Ok(source) => source,
        Err(e) => {
            warn!(file_name = upload.file_name.as_deref(), "Failed to load image: {e}");
            return Err(AppError::ImagesLoadFailed);
        }
    };

    let (width, height) = source.dimensions();
    let scale = scale_factor(width, height, MAX_IMAGE_DIMENSION);
    let resized = match scale < 1.0 {
        true => source.resize_exact(
            scaled_dimension(width, scale),
            scaled_dimension(height, scale),
            FilterType::Triangle,
        ),
        false => source,
    };

    let mut best = encode_jpeg(&resized)?;
    if best.bytes.len() > upload.bytes.len() {
        let fallback = match (source_format, scale < 1.0) {
            (Some(ImageFormat::Jpeg), true) | (None, _) => None,
            (Some(format), true) => encode_as(&resized, format),
            (Some(format), false) => Some(Encoded {
                bytes: upload.bytes.clone(),
                extension: file_type(format).0,
                content_type: upload.content_type.trim().to_owned(),
            }),
        };
        if let Some(fallback) = fallback.filter(|f| f.bytes.len() < best.bytes.len()) {
            best = fallback;
        }
    }
    if best.bytes.len() > upload.bytes.len() {
        warn!(
            upload_size = upload.bytes.len(),
            prepared_size = best.bytes.len(),
            "Prepared image is larger than the upload"
        );
    }

    let (width, height) = resized.dimensions();
    Ok(PreparedImage {
        file_name: generate_file_name(best.extension),
        content_type: best.content_type,
        bytes: best.bytes,
        width,
        height,
    })
}

pub async fn prepare_blocking(upload: ImageUpload) -> ServiceResult<PreparedImage> {
    match tokio::task::spawn_blocking(move || prepare(&upload)).await {
        Ok(prepared) => prepared,
        Err(e) => unexpected(e),
    }
}

/// Uploads under [`IMAGE_FOLDER`] and resolves the public URL.
pub async fn upload<C: Context>(ctx: &C, image: PreparedImage) -> ServiceResult<String> {
    let path = format!("{IMAGE_FOLDER}/{}", image.file_name);
    let (width, height) = (image.width, image.height);
    match ctx
        .storage()
        .put(&path, image.bytes, &image.content_type)
        .await
    {
        Ok(object) => {
            info!(
                path = object.path.as_str(),
                size = object.size,
                width,
                height,
                "Uploaded message image"
            );
            Ok(ctx.storage().public_url(&object.path))
        }
        Err(e) => backend_failure(AppError::ImagesUploadFailed, e),
    }
}

/// Deletes the object at `path`. Failures are logged and discarded by contract:
/// no caller may depend on the object being gone afterwards.
pub async fn delete_best_effort<C: Context>(ctx: &C, path: &str) {
    match ctx.storage().delete(path).await {
        Ok(()) => info!(path, "Deleted image"),
        Err(e) => warn!(path, "Failed to delete image: {e:#}"),
    }
}
