//! # ファイルによるシークレットストア
//!
//! ローカル開発用。シークレットIDをファイルパスとして解釈し、内容を返す。

use std::path::{Path, PathBuf};

use super::SecretStore;
use crate::error::IssuanceError;

/// ファイルシステム上のPEMファイルをシークレットとして扱うストア。
///
/// `base_dir` が設定されている場合、相対パスのシークレットIDはその配下で解決する。
pub struct FileSecretStore {
    base_dir: Option<PathBuf>,
}

impl FileSecretStore {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    fn resolve(&self, secret_id: &str) -> PathBuf {
        let path = Path::new(secret_id);
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, IssuanceError> {
        let path = self.resolve(secret_id);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            IssuanceError::SecretUnavailable(format!("{}: {}", path.display(), e.kind()))
        })
    }
}
