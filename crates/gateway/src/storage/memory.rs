//! # メモリ内オブジェクトストア

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::ObjectStore;
use crate::error::GatewayError;

/// 保存されたオブジェクト。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// プロセス内のHashMapに保存するオブジェクトストア。
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get_object(&self, object_key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(object_key).cloned()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        object_key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), GatewayError> {
        self.objects.write().await.insert(
            object_key.to_string(),
            StoredObject {
                body: body.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryObjectStore::new();
        store.put_object("a.jpeg", b"first", "image/jpeg").await.unwrap();
        store.put_object("a.jpeg", b"second", "image/jpeg").await.unwrap();

        let stored = store.get_object("a.jpeg").await.unwrap();
        assert_eq!(stored.body, b"second");
        assert_eq!(stored.content_type, "image/jpeg");
        assert!(store.get_object("b.jpeg").await.is_none());
    }
}
