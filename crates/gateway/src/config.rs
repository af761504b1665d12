//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//! 共有状態は起動時に一度だけ構築され、以降は変更されない。

use std::path::PathBuf;
use std::time::Duration;

use crate::error::IssuanceError;
use crate::issuer::SignedUrlIssuer;
use crate::metadata::CardMetadataStore;
use crate::storage::ObjectStore;

/// 署名付きURLの有効期限のデフォルト（秒）
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;
/// アップロード最大サイズのデフォルト（バイト）
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;
/// 待受アドレスのデフォルト
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// 外部サービスの実装選択。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Secrets Manager / S3 / DynamoDB
    Aws,
    /// ファイルのシークレットとメモリ内ストア（ローカル開発用）
    Local,
}

/// 環境変数から読み込んだGateway設定。
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 待受アドレス（`BIND_ADDR`）
    pub bind_addr: String,
    /// 外部サービスの実装（`CARDS_BACKEND`）
    pub backend: Backend,
    /// メタデータテーブル名（`COMPANY_CARDS_TABLE`）。`Aws` では必須。
    pub cards_table: Option<String>,
    /// カード画像を保存するバケット名（`COMPANY_CARDS_BUCKET`）
    pub cards_bucket: String,
    /// 秘密鍵を保持するシークレットのID（`PRIVATE_KEY_SECRET_MGR_ARN`）
    pub private_key_secret_id: String,
    /// CloudFrontの公開鍵ID（`PUBLIC_KEY_CLOUDFRONT_ID`）
    pub public_key_id: String,
    /// 署名付きURLの有効期間（`SIGNED_URL_TTL_SECS`）
    pub signed_url_ttl: Duration,
    /// アップロード最大サイズ（`MAX_UPLOAD_SIZE`）
    pub max_upload_size: usize,
    /// `Local` でシークレットファイルを探すディレクトリ（`LOCAL_SECRET_DIR`）
    pub local_secret_dir: Option<PathBuf>,
}

impl GatewayConfig {
    /// 環境変数から設定を読み込み、検証する。
    pub fn from_env() -> Result<Self, IssuanceError> {
        let backend = match optional("CARDS_BACKEND").as_deref() {
            None | Some("aws") => Backend::Aws,
            Some("local") => Backend::Local,
            Some(other) => {
                return Err(IssuanceError::Configuration(format!(
                    "CARDS_BACKENDは aws または local である必要があります: {other}"
                )))
            }
        };

        let cards_table = optional("COMPANY_CARDS_TABLE");
        if backend == Backend::Aws && cards_table.is_none() {
            return Err(IssuanceError::Configuration(
                "COMPANY_CARDS_TABLEが設定されていません".to_string(),
            ));
        }

        let signed_url_ttl_secs = parse_or("SIGNED_URL_TTL_SECS", DEFAULT_SIGNED_URL_TTL_SECS)?;
        if signed_url_ttl_secs == 0 {
            return Err(IssuanceError::Configuration(
                "SIGNED_URL_TTL_SECSは1以上である必要があります".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            backend,
            cards_table,
            cards_bucket: required("COMPANY_CARDS_BUCKET")?,
            private_key_secret_id: required("PRIVATE_KEY_SECRET_MGR_ARN")?,
            public_key_id: required("PUBLIC_KEY_CLOUDFRONT_ID")?,
            signed_url_ttl: Duration::from_secs(signed_url_ttl_secs),
            max_upload_size: parse_or("MAX_UPLOAD_SIZE", DEFAULT_MAX_UPLOAD_SIZE)?,
            local_secret_dir: optional("LOCAL_SECRET_DIR").map(PathBuf::from),
        })
    }
}

/// 空でない値を持つ環境変数を返す。
fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &str) -> Result<String, IssuanceError> {
    optional(name)
        .ok_or_else(|| IssuanceError::Configuration(format!("{name}が設定されていません")))
}

fn parse_or<T>(name: &str, default: T) -> Result<T, IssuanceError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e| IssuanceError::Configuration(format!("{name}が不正です ({value}): {e}"))),
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// カード画像を保存するバケット名
    pub bucket_name: String,
    /// オブジェクトストア（S3等、トレイトで抽象化）
    pub object_store: Box<dyn ObjectStore>,
    /// カードのメタデータテーブル（DynamoDB等、トレイトで抽象化）
    pub metadata_store: Box<dyn CardMetadataStore>,
    /// 署名付きURL発行
    pub issuer: SignedUrlIssuer,
    /// アップロード最大サイズ（バイト）
    pub max_upload_size: usize,
}
