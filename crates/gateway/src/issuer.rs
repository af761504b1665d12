//! # 署名付きURL発行
//!
//! 署名鍵を一度だけ読み込み（`Uninitialized` → `Ready`）、以降は
//! 署名付きURLをロックなしで発行する。
//!
//! 読み込みは [`tokio::sync::OnceCell`] で一度だけ行われ、失敗した場合は
//! `Uninitialized` のまま残る。発行はメモリ上の計算のみで、I/Oを行わない。

use std::time::Duration;

use cards_crypto::{canonicalize, sign_canned_url, unix_now, KeyMaterial, RsaPublicKey};
use cards_types::SignedUrl;
use tokio::sync::OnceCell;

use crate::error::IssuanceError;
use crate::secrets::{KeyMaterialProvider, RetryPolicy};

/// 発行者の状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerState {
    /// 署名鍵が未読み込み。発行は `NotReady` で失敗する。
    Uninitialized,
    /// 署名鍵を保持し、発行可能。
    Ready,
}

/// 署名付きURLの発行者。
pub struct SignedUrlIssuer {
    key_material: OnceCell<KeyMaterial>,
    validity_window: Duration,
    retry_policy: RetryPolicy,
}

impl SignedUrlIssuer {
    /// 有効期間を指定して未初期化の発行者を構築する。
    ///
    /// 1秒未満の有効期間は `Configuration` エラー。
    pub fn new(validity_window: Duration) -> Result<Self, IssuanceError> {
        if validity_window.as_secs() == 0 {
            return Err(IssuanceError::Configuration(
                "署名付きURLの有効期間は1秒以上である必要があります".to_string(),
            ));
        }
        Ok(Self {
            key_material: OnceCell::new(),
            validity_window,
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn state(&self) -> IssuerState {
        if self.key_material.initialized() {
            IssuerState::Ready
        } else {
            IssuerState::Uninitialized
        }
    }

    /// 署名鍵を読み込み `Ready` に遷移する。
    ///
    /// 既に `Ready` の場合は何もしない。同時に呼ばれても読み込みは一度だけ行われる。
    pub async fn initialize(&self, provider: &KeyMaterialProvider) -> Result<(), IssuanceError> {
        self.key_material
            .get_or_try_init(|| provider.load_key_material(&self.retry_policy))
            .await?;
        Ok(())
    }

    /// 保持している署名鍵の公開鍵。`Uninitialized` では `None`。
    pub fn public_key(&self) -> Option<RsaPublicKey> {
        self.key_material.get().map(KeyMaterial::public_key)
    }

    /// オブジェクトの署名付きURLを発行する。
    ///
    /// 有効期限は現在時刻 + 有効期間。
    pub fn issue_signed_url(
        &self,
        container_name: &str,
        object_key: &str,
    ) -> Result<SignedUrl, IssuanceError> {
        let material = self.key_material.get().ok_or(IssuanceError::NotReady)?;

        let expires_at = unix_now()?
            .checked_add(self.validity_window.as_secs())
            .ok_or_else(|| IssuanceError::Signing("有効期限がオーバーフローしました".to_string()))?;

        let resource = canonicalize(container_name, object_key)?;
        let url = sign_canned_url(
            &resource,
            material.private_key(),
            material.public_key_id(),
            expires_at,
        )?;

        tracing::debug!(
            container = %container_name,
            object_key = %object_key,
            expires_at,
            "署名付きURLを発行"
        );
        Ok(SignedUrl { url, expires_at })
    }
}
