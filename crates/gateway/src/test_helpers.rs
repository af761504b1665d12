//! テスト用のモック・共有状態ビルダー。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayState;
use crate::error::IssuanceError;
use crate::issuer::SignedUrlIssuer;
use crate::metadata::MemoryCardStore;
use crate::secrets::{KeyMaterialProvider, RetryPolicy, SecretStore};
use crate::storage::MemoryObjectStore;

/// テスト用RSA秘密鍵（PKCS#1 PEM）
pub const TEST_KEY_PEM: &str = include_str!("../../crypto/tests/fixtures/test_rsa_2048.pem");

pub const TEST_BUCKET: &str = "cards-bucket";

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
    }
}

/// 呼び出し回数を記録するモックSecretStore。
/// 最初の `failures` 回は `SecretUnavailable` を返し、以降は `value` を返す。
pub struct MockSecretStore {
    value: Option<String>,
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl MockSecretStore {
    pub fn with_value(value: &str) -> Self {
        Self::failing_then(0, value)
    }

    pub fn failing_then(failures: usize, value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            failures,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            value: None,
            failures: usize::MAX,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl SecretStore for MockSecretStore {
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, IssuanceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.value {
            Some(value) if call >= self.failures => Ok(value.clone()),
            _ => Err(IssuanceError::SecretUnavailable(format!(
                "{secret_id}: connection refused"
            ))),
        }
    }
}

/// `Ready` の発行者を構築する。
pub async fn ready_issuer() -> SignedUrlIssuer {
    let issuer = SignedUrlIssuer::new(Duration::from_secs(3600))
        .unwrap()
        .with_retry_policy(fast_retry());
    let provider = KeyMaterialProvider::new(
        Box::new(MockSecretStore::with_value(TEST_KEY_PEM)),
        "arn:valid",
        "PK123",
    );
    issuer.initialize(&provider).await.unwrap();
    issuer
}

/// メモリ内ストアを使う共有状態を構築する。
/// 書き込み内容を確認できるよう、ストアへの参照も返す。
pub async fn test_state(
    max_upload_size: usize,
) -> (Arc<GatewayState>, Arc<MemoryObjectStore>, Arc<MemoryCardStore>) {
    let objects = Arc::new(MemoryObjectStore::new());
    let cards = Arc::new(MemoryCardStore::new());
    let state = Arc::new(GatewayState {
        bucket_name: TEST_BUCKET.to_string(),
        object_store: Box::new(Arc::clone(&objects)),
        metadata_store: Box::new(Arc::clone(&cards)),
        issuer: ready_issuer().await,
        max_upload_size,
    });
    (state, objects, cards)
}
