//! # Gateway エラー型
//!
//! 署名鍵の初期化・署名付きURL発行のエラー（[`IssuanceError`]）と、
//! HTTPレスポンスに変換されるエラー（[`GatewayError`]）。

use axum::http::StatusCode;
use cards_crypto::CryptoError;

/// 署名付きURL発行に関するエラー型。
///
/// `Configuration` / `SecretUnavailable` / `EmptySecret` / `MalformedKey` は
/// 起動時に発生し、プロセスの起動を中断する。それ以外はリクエスト単位。
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    /// 必須設定の欠落・不正
    #[error("設定が不正です: {0}")]
    Configuration(String),
    /// シークレットストアに到達できない、またはシークレットが存在しない
    #[error("シークレットを取得できません: {0}")]
    SecretUnavailable(String),
    /// シークレットは存在するが値が空
    #[error("シークレットの値が空です: {0}")]
    EmptySecret(String),
    /// シークレットの内容が秘密鍵として解釈できない
    #[error("秘密鍵の形式が不正です: {0}")]
    MalformedKey(String),
    /// バケット名・オブジェクトキーが不正
    #[error("リソース参照が不正です: {0}")]
    InvalidReference(String),
    /// 署名処理に失敗
    #[error("署名に失敗しました: {0}")]
    Signing(String),
    /// 署名鍵の初期化前に発行が要求された
    #[error("署名鍵が初期化されていません")]
    NotReady,
}

impl IssuanceError {
    /// リトライで回復しうるエラーかどうか。
    pub fn is_transient(&self) -> bool {
        matches!(self, IssuanceError::SecretUnavailable(_))
    }
}

impl From<CryptoError> for IssuanceError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::MalformedKey(reason) => IssuanceError::MalformedKey(reason.to_string()),
            CryptoError::EmptyKeyPairId => {
                IssuanceError::Configuration("公開鍵IDが空です".to_string())
            }
            CryptoError::InvalidReference(msg) | CryptoError::InvalidUrl(msg) => {
                IssuanceError::InvalidReference(msg)
            }
            other => IssuanceError::Signing(other.to_string()),
        }
    }
}

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),
    /// 対象のカードが存在しない
    #[error("見つかりません: {0}")]
    NotFound(String),
    /// オブジェクトストア操作に失敗
    #[error("ストレージ操作に失敗: {0}")]
    Storage(String),
    /// メタデータテーブル操作に失敗
    #[error("メタデータ操作に失敗: {0}")]
    Metadata(String),
    /// 署名付きURLの発行に失敗
    #[error("署名付きURLの発行に失敗: {0}")]
    Issuance(#[from] IssuanceError),
}

/// サーバー側エラーでクライアントに返す固定メッセージ
pub const INTERNAL_ERROR_MESSAGE: &str = "内部エラーが発生しました";

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            GatewayError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            GatewayError::Storage(_)
            | GatewayError::Metadata(_)
            | GatewayError::Issuance(_) => {
                // 詳細はログのみに残す
                tracing::error!(error = %self, "リクエスト処理に失敗");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE).into_response()
            }
        }
    }
}
