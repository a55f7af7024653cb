//! HTTP Snapshot Store - 远程快照存储客户端
//!
//! 远端为另一个 chapterhouse 服务（或兼容实现），协议与本服务的
//! `/api/snapshot/*` 接口一致：
//!
//! POST {base}/api/snapshot/load  {"user_id", "book_id"}
//! POST {base}/api/snapshot/save  {"user_id", "book_id", "revision", "chapters"}
//! Response: {"errno": 0, "error": "", "data": ...}，errno=409 表示 revision 过旧

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{
    ChapterRecord, RepositoryError, SnapshotKey, SnapshotStorePort, StoredSnapshot,
};

const ERRNO_NOT_FOUND: i32 = 404;
const ERRNO_CONFLICT: i32 = 409;

#[derive(Debug, Serialize)]
struct LoadRequest<'a> {
    user_id: &'a str,
    book_id: &'a str,
}

#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    user_id: &'a str,
    book_id: &'a str,
    revision: u64,
    chapters: &'a [ChapterRecord],
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    errno: i32,
    #[serde(default)]
    error: String,
    data: Option<T>,
}

/// 远程快照存储配置
#[derive(Debug, Clone)]
pub struct HttpSnapshotStoreConfig {
    /// 远端服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSnapshotStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5070".to_string(),
            timeout_secs: 10,
        }
    }
}

impl HttpSnapshotStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// 远程快照存储
pub struct HttpSnapshotStore {
    client: Client,
    config: HttpSnapshotStoreConfig,
}

impl HttpSnapshotStore {
    pub fn new(config: HttpSnapshotStoreConfig) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RepositoryError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, action: &str) -> String {
        format!("{}/api/snapshot/{}", self.config.base_url.trim_end_matches('/'), action)
    }

    async fn post<B, T>(&self, action: &str, body: &B) -> Result<Envelope<T>, RepositoryError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = self.url(action);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RepositoryError::NetworkError(format!("Request to {} timed out", url))
                } else if e.is_connect() {
                    RepositoryError::NetworkError(format!("Cannot connect to snapshot service: {}", e))
                } else {
                    RepositoryError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RepositoryError::NetworkError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }
}

#[async_trait]
impl SnapshotStorePort for HttpSnapshotStore {
    async fn load_snapshot(&self, key: &SnapshotKey) -> Result<Option<StoredSnapshot>, RepositoryError> {
        let request = LoadRequest {
            user_id: &key.user_id,
            book_id: &key.book_id,
        };

        tracing::debug!(url = %self.url("load"), key = %key, "Loading remote snapshot");

        let envelope: Envelope<StoredSnapshot> = self.post("load", &request).await?;
        match envelope.errno {
            0 => Ok(envelope.data),
            ERRNO_NOT_FOUND => Ok(None),
            errno => Err(RepositoryError::DatabaseError(format!(
                "Remote errno {}: {}",
                errno, envelope.error
            ))),
        }
    }

    async fn save_snapshot(&self, key: &SnapshotKey, snapshot: &StoredSnapshot) -> Result<(), RepositoryError> {
        let request = SaveRequest {
            user_id: &key.user_id,
            book_id: &key.book_id,
            revision: snapshot.revision,
            chapters: &snapshot.chapters,
        };

        tracing::debug!(
            url = %self.url("save"),
            key = %key,
            revision = snapshot.revision,
            "Saving remote snapshot"
        );

        let envelope: Envelope<serde_json::Value> = self.post("save", &request).await?;
        match envelope.errno {
            0 => Ok(()),
            ERRNO_CONFLICT => {
                let stored = self
                    .load_snapshot(key)
                    .await
                    .ok()
                    .flatten()
                    .map(|s| s.revision)
                    .unwrap_or(snapshot.revision);
                Err(RepositoryError::Stale {
                    key: key.to_string(),
                    revision: snapshot.revision,
                    stored,
                })
            }
            errno => Err(RepositoryError::DatabaseError(format!(
                "Remote errno {}: {}",
                errno, envelope.error
            ))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
