//! # Card Template Service 共有型定義
//!
//! Gateway・暗号処理クレートで共有するデータ構造をRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - 時刻: UNIXエポック秒（`u64`）
//! - HTTPレスポンスのフィールド名: PascalCase（既存クライアントとの互換性のため）

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// リソース参照
// ---------------------------------------------------------------------------

/// オブジェクトストア上の1オブジェクトを指す参照。
///
/// `container_name` 内で `object_key` が一意にオブジェクトを識別する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    /// バケット名
    pub container_name: String,
    /// オブジェクトキー
    pub object_key: String,
}

impl ResourceReference {
    /// 参照を構築する。空チェックは正規化時（`cards_crypto::canonicalize`）に行う。
    pub fn new(container_name: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
            object_key: object_key.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// 署名付きURL
// ---------------------------------------------------------------------------

/// 有効期限付きの署名付きURL。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUrl {
    /// 署名・有効期限・鍵ペアIDをクエリに含むURL
    pub url: String,
    /// 有効期限（UNIXエポック秒）。この時刻以降は無効。
    pub expires_at: u64,
}

// ---------------------------------------------------------------------------
// カードメタデータ
// ---------------------------------------------------------------------------

/// メタデータテーブルに保存されるカード1件分のレコード。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    /// カードID（オブジェクトキーと同じ値）
    #[serde(rename = "CardId")]
    pub id: String,
    /// 表示名（アップロード時の `card-name` ヘッダー）
    #[serde(rename = "CardName")]
    pub display_name: String,
    /// カード画像の保存先
    #[serde(rename = "CardLocation")]
    pub resource_reference: ResourceReference,
}

// ---------------------------------------------------------------------------
// HTTPレスポンス
// ---------------------------------------------------------------------------

/// `POST /cards` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCardResponse {
    /// 採番されたカードID
    #[serde(rename = "CardId")]
    pub card_id: String,
}

/// `GET /cards` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCardResponse {
    /// カードID
    #[serde(rename = "CardId")]
    pub card_id: String,
    /// 表示名
    #[serde(rename = "CardName")]
    pub card_name: String,
    /// カード画像の署名付きURL
    #[serde(rename = "CardTemplateURL")]
    pub card_template_url: String,
    /// 署名付きURLの有効期限（UNIXエポック秒）
    #[serde(rename = "ExpiresAt")]
    pub expires_at: u64,
}
