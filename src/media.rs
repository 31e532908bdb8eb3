use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MediaConfig;

/// Metadata returned by the image host, stored verbatim on the offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub key: String,
    pub url: String,
    #[serde(rename = "secureUrl")]
    pub secure_url: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, body: Bytes, content_type: &str) -> anyhow::Result<UploadedImage>;
}

#[derive(Clone)]
pub struct S3MediaStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3MediaStore {
    pub async fn new(cfg: &MediaConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            public_base_url: cfg.public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn upload(&self, body: Bytes, content_type: &str) -> anyhow::Result<UploadedImage> {
        let ext = ext_from_mime(content_type).unwrap_or("bin");
        let key = format!("offers/{}.{}", Uuid::new_v4(), ext);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("put_object {}", key))?;

        let url = format!("{}/{}", self.public_base_url, key);
        Ok(UploadedImage {
            secure_url: secure_variant(&url),
            url,
            key,
            content_type: content_type.to_string(),
        })
    }
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

fn secure_variant(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}
