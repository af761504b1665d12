//! # メモリ内メタデータテーブル

use std::collections::HashMap;

use cards_types::CardRecord;
use tokio::sync::RwLock;

use super::CardMetadataStore;
use crate::error::GatewayError;

/// プロセス内のHashMapに保存するメタデータテーブル。
#[derive(Default)]
pub struct MemoryCardStore {
    records: RwLock<HashMap<String, CardRecord>>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CardMetadataStore for MemoryCardStore {
    async fn put_card(&self, record: &CardRecord) -> Result<(), GatewayError> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_card(&self, card_id: &str) -> Result<Option<CardRecord>, GatewayError> {
        Ok(self.records.read().await.get(card_id).cloned())
    }
}
