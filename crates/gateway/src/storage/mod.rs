//! # オブジェクトストア
//!
//! カード画像を保存するオブジェクトストアの抽象インターフェース。
//! S3互換ストレージとメモリ内実装を選択できる。

pub mod memory;
#[cfg(feature = "vendor-aws")]
pub mod s3;

pub use memory::MemoryObjectStore;

use crate::error::GatewayError;

/// オブジェクトストアの抽象インターフェース。
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// オブジェクトを書き込む。同じキーが存在する場合は上書きする。
    async fn put_object(
        &self,
        object_key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), GatewayError>;
}

#[async_trait::async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    async fn put_object(
        &self,
        object_key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), GatewayError> {
        (**self).put_object(object_key, body, content_type).await
    }
}
