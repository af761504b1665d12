//! # カードメタデータテーブル
//!
//! カードID・表示名・保存先を保持するテーブルの抽象インターフェース。

pub mod memory;
#[cfg(feature = "vendor-aws")]
pub mod dynamodb;

pub use memory::MemoryCardStore;

use cards_types::CardRecord;

use crate::error::GatewayError;

/// テーブル上の属性名
pub const ATTR_CARD_ID: &str = "CardId";
pub const ATTR_CARD_NAME: &str = "CardName";
pub const ATTR_CARD_S3_LOCATION: &str = "CardS3Location";
pub const ATTR_CARD_S3_BUCKET: &str = "CardS3Bucket";

/// カードメタデータテーブルの抽象インターフェース。
#[async_trait::async_trait]
pub trait CardMetadataStore: Send + Sync {
    /// レコードを書き込む。同じIDが存在する場合は上書きする。
    async fn put_card(&self, record: &CardRecord) -> Result<(), GatewayError>;

    /// IDでレコードを取得する。存在しない場合は `None`。
    async fn get_card(&self, card_id: &str) -> Result<Option<CardRecord>, GatewayError>;
}

#[async_trait::async_trait]
impl<T: CardMetadataStore + ?Sized> CardMetadataStore for std::sync::Arc<T> {
    async fn put_card(&self, record: &CardRecord) -> Result<(), GatewayError> {
        (**self).put_card(record).await
    }

    async fn get_card(&self, card_id: &str) -> Result<Option<CardRecord>, GatewayError> {
        (**self).get_card(card_id).await
    }
}
