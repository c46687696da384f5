//! 生成したレポートの保存先

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub const GCS_UPLOAD_URL: &str = "https://storage.googleapis.com/upload/storage/v1";
pub const GCE_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// 期限切れ直前のトークンは使わない
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// オブジェクトストレージへの書き込みの抽象化トレイト
#[async_trait]
pub trait ObjectSink: Send + Sync {
    /// オブジェクトを保存し、保存先の位置を返す
    async fn store(
        &self,
        bucket: &str,
        object_name: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;
}

/// Cloud Storage への認証方法
#[derive(Debug, Clone, PartialEq)]
pub enum GcsCredentials {
    /// 固定のアクセストークン。更新しない
    Static(String),
    /// サービスアカウントのトークンをメタデータサーバーから取得し、期限まで使い回す
    Metadata { token_url: String },
}

impl Default for GcsCredentials {
    fn default() -> Self {
        GcsCredentials::Metadata {
            token_url: GCE_METADATA_TOKEN_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Cloud Storage JSON API の単純アップロード
#[derive(Debug)]
pub struct GcsSink {
    client: Client,
    upload_url: String,
    credentials: GcsCredentials,
    cached_token: Mutex<Option<CachedToken>>,
}

impl GcsSink {
    pub fn new(credentials: GcsCredentials) -> Result<Self> {
        Self::with_upload_url(GCS_UPLOAD_URL, credentials)
    }

    pub fn with_upload_url(upload_url: impl Into<String>, credentials: GcsCredentials) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            upload_url: upload_url.into().trim_end_matches('/').to_string(),
            credentials,
            cached_token: Mutex::new(None),
        })
    }

    /// アップロードに使うトークン。メタデータ認証では期限切れ時に取り直す
    async fn access_token(&self) -> Result<String> {
        let token_url = match &self.credentials {
            GcsCredentials::Static(token) => return Ok(token.clone()),
            GcsCredentials::Metadata { token_url } => token_url,
        };

        let mut cached = self.cached_token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .client
            .get(token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| Error::SinkFailure(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::SinkFailure(format!("token request rejected: {} - {}", status, message)));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| Error::SinkFailure(format!("token response unreadable: {}", e)))?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        debug!(expires_in = token.expires_in, "refreshed storage access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}

#[async_trait]
impl ObjectSink for GcsSink {
    async fn store(
        &self,
        bucket: &str,
        object_name: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let access_token = self.access_token().await?;
        let url = format!(
            "{}/b/{}/o",
            self.upload_url,
            urlencoding::encode(bucket)
        );
        let size = content.len();

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", object_name)])
            .bearer_auth(&access_token)
            .header(header::CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await
            .map_err(|e| Error::SinkFailure(format!("upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::SinkFailure(format!("upload rejected: {} - {}", status, message)));
        }

        let location = format!("gs://{}/{}", bucket, object_name);
        info!(%location, bytes = size, "uploaded report");
        Ok(location)
    }
}

/// ローカルディレクトリをバケットとして扱う保存先
///
/// `<root>/<bucket>/<object_name>` に書き込む。
#[derive(Debug, Clone)]
pub struct LocalDirSink {
    root: PathBuf,
}

impl LocalDirSink {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn object_path(&self, bucket: &str, object_name: &str) -> Result<PathBuf> {
        let is_plain = |s: &str| {
            !s.is_empty() && !s.contains('/') && !s.contains('\\') && s != "." && s != ".."
        };
        if !is_plain(bucket) || !is_plain(object_name) {
            return Err(Error::SinkFailure(format!(
                "invalid object location: {}/{}",
                bucket, object_name
            )));
        }
        Ok(self.root.join(bucket).join(object_name))
    }
}

#[async_trait]
impl ObjectSink for LocalDirSink {
    async fn store(
        &self,
        bucket: &str,
        object_name: &str,
        content: Vec<u8>,
        _content_type: &str,
    ) -> Result<String> {
        let path = self.object_path(bucket, object_name)?;
        let sink_error = |e: std::io::Error| Error::SinkFailure(format!("{}: {}", path.display(), e));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(sink_error)?;
        }
        let mut file = fs::File::create(&path).await.map_err(sink_error)?;
        file.write_all(&content).await.map_err(sink_error)?;
        file.flush().await.map_err(sink_error)?;

        let location = path.display().to_string();
        info!(%location, bytes = content.len(), "wrote report");
        Ok(location)
    }
}
