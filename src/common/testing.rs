//! In-memory backends for exercising use cases without MySQL or Firebase.

use crate::adapters::object_storage::{ObjectStorage, StoredObject};
use crate::common::context::Context;
use crate::entities::messages::Message as MessageEntity;
use crate::models::images::ImageUpload;
use crate::repositories::messages::MessageCollection;
use anyhow::bail;
use async_trait::async_trait;
use chrono::Utc;
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const MEMORY_BASE_URL: &str = "memory://guestbook";

#[derive(Default)]
pub struct InMemoryMessages {
    records: Mutex<Vec<MessageEntity>>,
    append_calls: AtomicUsize,
    fail_appends: AtomicBool,
    fail_queries: AtomicBool,
}

impl InMemoryMessages {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageCollection for InMemoryMessages {
    async fn append(
        &self,
        name: &str,
        message: &str,
        image_url: Option<&str>,
    ) -> anyhow::Result<MessageEntity> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_appends.load(Ordering::SeqCst) {
            bail!("append rejected by test backend");
        }
        let mut records = self.records.lock().unwrap();
        let record = MessageEntity {
            id: records.len() as u64 + 1,
            name: name.to_owned(),
            message: message.to_owned(),
            image_url: image_url.map(str::to_owned),
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn fetch_recent(&self, limit: u32) -> anyhow::Result<Vec<MessageEntity>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            bail!("query rejected by test backend");
        }
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn fetch_image_urls(&self) -> anyhow::Result<Vec<String>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            bail!("query rejected by test backend");
        }
        let records = self.records.lock().unwrap();
        Ok(records.iter().filter_map(|r| r.image_url.clone()).collect())
    }
}

pub struct InMemoryStorage {
    base_url: String,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    put_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::with_base_url(MEMORY_BASE_URL)
    }
}

impl InMemoryStorage {
    /// Storage whose public URLs start with `base_url`.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_owned(),
            objects: Mutex::default(),
            put_calls: AtomicUsize::default(),
            delete_calls: AtomicUsize::default(),
            fail_puts: AtomicBool::default(),
            fail_deletes: AtomicBool::default(),
        }
    }

    pub fn insert(&self, path: &str, bytes: Vec<u8>) {
        self.objects.lock().unwrap().insert(path.to_owned(), bytes);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn fetch_by_url(&self, url: &str) -> Option<Vec<u8>> {
        let path = self.object_path(url)?;
        self.objects.lock().unwrap().get(&path).cloned()
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> anyhow::Result<StoredObject> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            bail!("upload rejected by test backend");
        }
        let size = bytes.len() as u64;
        self.insert(path, bytes);
        Ok(StoredObject {
            path: path.to_owned(),
            size,
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/o/{path}", self.base_url)
    }

    fn object_path(&self, url: &str) -> Option<String> {
        let (_, path) = url.split_once("/o/")?;
        Some(path.to_owned())
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            bail!("delete rejected by test backend");
        }
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .keys()
            .filter(|path| path.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct TestContext {
    pub messages: InMemoryMessages,
    pub storage: InMemoryStorage,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Context for TestContext {
    fn messages(&self) -> &dyn MessageCollection {
        &self.messages
    }

    fn storage(&self) -> &dyn ObjectStorage {
        &self.storage
    }
}

/// Deterministic noise, which compresses poorly as PNG.
pub fn noise_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let seed = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(2_246_822_519);
        let hash = seed.wrapping_mul(3_266_489_917).rotate_left(13);
        let [r, g, b, _] = hash.to_le_bytes();
        image::Rgb([r, g, b])
    })
}

/// Alternating bands `band` pixels wide, which compress far better as PNG than as JPEG.
pub fn striped_image(width: u32, height: u32, band: u32, vertical: bool) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let offset = if vertical { x } else { y };
        match (offset / band) % 2 {
            0 => image::Rgb([20, 40, 200]),
            _ => image::Rgb([250, 240, 230]),
        }
    })
}

pub fn png_upload(image: &RgbImage) -> ImageUpload {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    ImageUpload {
        file_name: Some("upload.png".to_owned()),
        content_type: "image/png".to_owned(),
        bytes,
    }
}
