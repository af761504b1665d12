//! # DynamoDBによるメタデータテーブル実装
//!
//! パーティションキーは `CardId`。書き込みは `UpdateItem` の `SET` 式、
//! 読み込みは強い整合性の `GetItem` を使用する。

use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use cards_types::{CardRecord, ResourceReference};

use super::{
    CardMetadataStore, ATTR_CARD_ID, ATTR_CARD_NAME, ATTR_CARD_S3_BUCKET, ATTR_CARD_S3_LOCATION,
};
use crate::error::GatewayError;

const UPDATE_EXPRESSION: &str =
    "SET CardName = :CardName, CardS3Location = :CardS3Location, CardS3Bucket = :CardS3Bucket";

/// DynamoDBテーブルに保存するメタデータテーブル。
pub struct DynamoCardStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoCardStore {
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, table_name: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_dynamodb::Client::new(sdk_config),
            table_name: table_name.into(),
        }
    }
}

#[async_trait::async_trait]
impl CardMetadataStore for DynamoCardStore {
    async fn put_card(&self, record: &CardRecord) -> Result<(), GatewayError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_CARD_ID, AttributeValue::S(record.id.clone()))
            .update_expression(UPDATE_EXPRESSION)
            .expression_attribute_values(
                ":CardName",
                AttributeValue::S(record.display_name.clone()),
            )
            .expression_attribute_values(
                ":CardS3Location",
                AttributeValue::S(record.resource_reference.object_key.clone()),
            )
            .expression_attribute_values(
                ":CardS3Bucket",
                AttributeValue::S(record.resource_reference.container_name.clone()),
            )
            .send()
            .await
            .map_err(|e| {
                GatewayError::Metadata(format!("UpdateItem失敗 ({}): {}", record.id, DisplayErrorContext(&e)))
            })?;
        Ok(())
    }

    async fn get_card(&self, card_id: &str) -> Result<Option<CardRecord>, GatewayError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_CARD_ID, AttributeValue::S(card_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| {
                GatewayError::Metadata(format!("GetItem失敗 ({card_id}): {}", DisplayErrorContext(&e)))
            })?;

        output.item().map(record_from_item).transpose()
    }
}

/// DynamoDBのアイテムを [`CardRecord`] に変換する。
fn record_from_item(item: &HashMap<String, AttributeValue>) -> Result<CardRecord, GatewayError> {
    let string_attr = |name: &str| -> Result<String, GatewayError> {
        item.get(name)
            .and_then(|value| value.as_s().ok())
            .cloned()
            .ok_or_else(|| GatewayError::Metadata(format!("文字列属性 {name} がありません")))
    };

    Ok(CardRecord {
        id: string_attr(ATTR_CARD_ID)?,
        display_name: string_attr(ATTR_CARD_NAME)?,
        resource_reference: ResourceReference::new(
            string_attr(ATTR_CARD_S3_BUCKET)?,
            string_attr(ATTR_CARD_S3_LOCATION)?,
        ),
    })
}
