//! # Card Template Service 暗号処理
//!
//! 署名付きURL発行のための純粋関数群。I/Oは行わない。
//!
//! ## 処理の流れ
//! 1. [`parse_private_key`] — PEM文字列をRSA秘密鍵にデコード
//! 2. [`canonicalize`] — バケット名とオブジェクトキーから正規URLを構築
//! 3. [`sign_canned_url`] — 正規URLと有効期限からCanned Policyを構築し署名
//!
//! ## 暗号アルゴリズム
//! | 用途 | アルゴリズム |
//! |------|------------|
//! | 署名 | RSASSA-PKCS1-v1_5 |
//! | ハッシュ | SHA-1（CloudFront Canned Policy互換） |
//! | 署名エンコード | Base64（`+`→`-`, `=`→`_`, `/`→`~`） |

use std::time::{SystemTime, UNIX_EPOCH};

pub mod canonical;
pub mod cloudfront;
pub mod key;

pub use canonical::canonicalize;
pub use cloudfront::{canned_policy, sign_canned_url, verify_signed_url, VerifiedUrl};
pub use key::{parse_private_key, KeyMaterial};
pub use rsa::{RsaPrivateKey, RsaPublicKey};

/// 暗号処理のエラー型。
///
/// どのバリアントも鍵のバイト列を含まない。
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// 秘密鍵のデコード・検証に失敗
    #[error("秘密鍵の形式が不正です: {0}")]
    MalformedKey(&'static str),
    /// 公開鍵ID（Key-Pair-Id）が空
    #[error("公開鍵IDが空です")]
    EmptyKeyPairId,
    /// バケット名・オブジェクトキーが不正
    #[error("リソース参照が不正です: {0}")]
    InvalidReference(String),
    /// 署名対象URLが絶対URLではない
    #[error("URLが不正です: {0}")]
    InvalidUrl(String),
    /// 署名処理に失敗
    #[error("署名に失敗しました: {0}")]
    Signing(String),
    /// 署名付きURLのクエリパラメータが欠落・不正
    #[error("署名付きURLの形式が不正です: {0}")]
    InvalidSignedUrl(String),
    /// 署名付きURLの有効期限切れ
    #[error("署名付きURLの有効期限が切れています (expires={expires_at})")]
    Expired {
        /// URLに埋め込まれた有効期限（UNIXエポック秒）
        expires_at: u64,
    },
    /// 署名検証に失敗
    #[error("署名検証に失敗しました")]
    SignatureMismatch,
}

/// 現在時刻をUNIXエポック秒で返す。
pub fn unix_now() -> Result<u64, CryptoError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| CryptoError::Signing(format!("時刻取得失敗: {e}")))
}
