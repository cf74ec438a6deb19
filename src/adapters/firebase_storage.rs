use crate::adapters::object_storage::{ObjectStorage, StoredObject};
use anyhow::anyhow;
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};

/// Firebase Storage REST API (`/v0/b/{bucket}/o`).
pub struct FirebaseStorage {
    client: reqwest::Client,
    objects_url: Url,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct ObjectMetadata {
    name: String,
    /// Firebase reports sizes as decimal strings.
    size: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListObjectsResponse {
    #[serde(default)]
    items: Vec<ObjectMetadata>,
    next_page_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListObjectsQuery<'a> {
    prefix: &'a str,
    page_token: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadQuery<'a> {
    upload_type: &'static str,
    name: &'a str,
}

impl FirebaseStorage {
    pub fn new(base_url: &str, bucket: &str, access_token: Option<String>) -> anyhow::Result<Self> {
        let mut objects_url = Url::parse(base_url)?;
        objects_url
            .path_segments_mut()
            .map_err(|_| anyhow!("Storage base url {base_url} cannot be a base"))?
            .pop_if_empty()
            .extend(["v0", "b", bucket, "o"]);
        Ok(Self {
            client: reqwest::Client::new(),
            objects_url,
            access_token,
        })
    }

    /// `/` inside `path` is percent-encoded, the API addresses objects by their full name.
    fn object_url(&self, path: &str) -> Url {
        let mut url = self.objects_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(path);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStorage for FirebaseStorage {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<StoredObject> {
        let byte_count = bytes.len() as u64;
        let request = self
            .client
            .post(self.objects_url.clone())
            .query(&UploadQuery {
                upload_type: "media",
                name: path,
            })
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        let metadata: ObjectMetadata = self
            .authorize(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let size = match metadata.size {
            Some(size) => size.parse()?,
            None => byte_count,
        };
        Ok(StoredObject {
            path: metadata.name,
            size,
        })
    }

    fn public_url(&self, path: &str) -> String {
        let mut url = self.object_url(path);
        url.query_pairs_mut().append_pair("alt", "media");
        url.into()
    }

    fn object_path(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let mut segments = url.path_segments()?;
        let name = segments.next_back()?;
        match segments.next_back() {
            Some("o") => {}
            _ => return None,
        }
        let path = percent_decode_str(name).decode_utf8().ok()?;
        Some(path.into_owned())
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let request = self.client.delete(self.object_url(path));
        let response = self.authorize(request).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            _ => {
                response.error_for_status()?;
                Ok(())
            }
        }
    }

    async fn list(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let mut paths = vec![];
        let mut page_token: Option<String> = None;
        loop {
            let request = self.client.get(self.objects_url.clone()).query(&ListObjectsQuery {
                prefix,
                page_token: page_token.as_deref(),
            });
            let page: ListObjectsResponse = self
                .authorize(request)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            paths.extend(page.items.into_iter().map(|item| item.name));
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(paths)
    }
}
