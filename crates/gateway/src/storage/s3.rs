//! # S3互換オブジェクトストア実装
//!
//! AWS S3, MinIO 等のS3互換APIを使用する。

use super::ObjectStore;
use crate::error::GatewayError;

/// S3互換ストレージによるオブジェクトストア実装。
pub struct S3ObjectStore {
    bucket: s3::Bucket,
}

impl S3ObjectStore {
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// 環境変数から構築する。
    ///
    /// - `S3_ENDPOINT`: 設定時はカスタムエンドポイント（path style）を使用
    /// - `S3_REGION`: 未設定時は `us-east-1`
    /// - `S3_ACCESS_KEY` / `S3_SECRET_KEY`: 未設定時は既定の認証情報チェーン
    pub fn from_env(bucket_name: &str) -> anyhow::Result<Self> {
        let region_name = std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let credentials = match (
            std::env::var("S3_ACCESS_KEY").ok(),
            std::env::var("S3_SECRET_KEY").ok(),
        ) {
            (Some(access_key), Some(secret_key)) => s3::creds::Credentials::new(
                Some(&access_key),
                Some(&secret_key),
                None,
                None,
                None,
            )?,
            _ => s3::creds::Credentials::default()?,
        };

        let bucket = match std::env::var("S3_ENDPOINT").ok() {
            Some(endpoint) => {
                tracing::info!(s3_endpoint = %endpoint, "カスタムS3エンドポイントを使用");
                let region = s3::Region::Custom {
                    region: region_name,
                    endpoint,
                };
                s3::Bucket::new(bucket_name, region, credentials)?.with_path_style()
            }
            None => s3::Bucket::new(bucket_name, region_name.parse()?, credentials)?,
        };

        Ok(Self::new(*bucket))
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        object_key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), GatewayError> {
        let response = self
            .bucket
            .put_object_with_content_type(object_key, body, content_type)
            .await
            .map_err(|e| GatewayError::Storage(format!("オブジェクト書き込み失敗: {e}")))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(GatewayError::Storage(format!(
                "オブジェクト書き込み失敗: HTTP {status} ({object_key})"
            )));
        }
        Ok(())
    }
}
