use async_trait::async_trait;

/// Handle to an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub size: u64,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<StoredObject>;

    /// Stable public URL of the object at `path`.
    fn public_url(&self, path: &str) -> String;

    /// Object path behind a URL returned by [`ObjectStorage::public_url`], regardless
    /// of the host or bucket it was built with.
    fn object_path(&self, url: &str) -> Option<String>;

    async fn delete(&self, path: &str) -> anyhow::Result<()>;

    /// Paths of every object whose path starts with `prefix`.
    async fn list(&self, prefix: &str) -> anyhow::Result<Vec<String>>;
}
