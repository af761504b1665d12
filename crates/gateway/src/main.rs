//! # Card Template Service Gateway
//!
//! カード画像テンプレートの保存と、CloudFront署名付きURLによる配信を行う。
//!
//! ## 役割
//! - カード画像のオブジェクトストアへの保存とメタデータ登録
//! - 保存済みカードの署名付きURL発行
//!
//! ## API エンドポイント
//! - `POST /cards` — カード画像のアップロード（`card-name` ヘッダー）
//! - `GET /cards` — カード情報と署名付きURLの取得（`card-id` ヘッダー）
//!
//! 署名鍵は起動時に一度だけシークレットストアから読み込む。
//! 読み込みに失敗した場合は起動しない。

mod config;
mod endpoints;
mod error;
mod issuer;
mod metadata;
mod secrets;
mod storage;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use config::{Backend, GatewayConfig, GatewayState};
use issuer::SignedUrlIssuer;
use metadata::{CardMetadataStore, MemoryCardStore};
use secrets::{FileSecretStore, KeyMaterialProvider, SecretStore};
use storage::{MemoryObjectStore, ObjectStore};

/// 設定に応じた外部サービス実装。
struct Backends {
    secret_store: Box<dyn SecretStore>,
    object_store: Box<dyn ObjectStore>,
    metadata_store: Box<dyn CardMetadataStore>,
}

async fn build_backends(config: &GatewayConfig) -> anyhow::Result<Backends> {
    match config.backend {
        #[cfg(feature = "vendor-aws")]
        Backend::Aws => {
            let sdk_config = aws_config::load_from_env().await;
            let table_name = config
                .cards_table
                .clone()
                .ok_or_else(|| anyhow::anyhow!("COMPANY_CARDS_TABLEが設定されていません"))?;
            Ok(Backends {
                secret_store: Box::new(secrets::aws::AwsSecretsManager::from_sdk_config(
                    &sdk_config,
                )),
                object_store: Box::new(storage::s3::S3ObjectStore::from_env(&config.cards_bucket)?),
                metadata_store: Box::new(metadata::dynamodb::DynamoCardStore::from_sdk_config(
                    &sdk_config,
                    table_name,
                )),
            })
        }
        #[cfg(not(feature = "vendor-aws"))]
        Backend::Aws => anyhow::bail!(
            "CARDS_BACKEND=aws にはvendor-aws featureが必要です"
        ),
        Backend::Local => {
            tracing::warn!("ローカルバックエンドを使用します（開発環境用、データは保存されません）");
            Ok(Backends {
                secret_store: Box::new(FileSecretStore::new(config.local_secret_dir.clone())),
                object_store: Box::new(MemoryObjectStore::new()),
                metadata_store: Box::new(MemoryCardStore::new()),
            })
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        backend = ?config.backend,
        bucket = %config.cards_bucket,
        signed_url_ttl_secs = config.signed_url_ttl.as_secs(),
        max_upload_size = config.max_upload_size,
        "設定を読み込みました"
    );

    let backends = build_backends(&config).await?;

    // 署名鍵の読み込み（失敗時は起動を中断）
    let provider = KeyMaterialProvider::new(
        backends.secret_store,
        config.private_key_secret_id.clone(),
        config.public_key_id.clone(),
    );
    let issuer = SignedUrlIssuer::new(config.signed_url_ttl)?;
    issuer.initialize(&provider).await?;
    tracing::info!(state = ?issuer.state(), "署名付きURL発行の準備が完了しました");

    let state = Arc::new(GatewayState {
        bucket_name: config.cards_bucket.clone(),
        object_store: backends.object_store,
        metadata_store: backends.metadata_store,
        issuer,
        max_upload_size: config.max_upload_size,
    });

    let app = endpoints::router(state);

    tracing::info!("Gatewayを {} で起動します", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
